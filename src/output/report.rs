use chrono::NaiveDate;
use owned_ttf_parser::{AsFaceRef, Face, GlyphId, OwnedFace};
use printpdf::{
    BuiltinFont, FontData, FontMetrics, GlyphMetrics, IndirectFontRef, Mm, PdfDocument,
    PdfDocumentReference, PdfLayerReference,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::config::ReportConfig;
use crate::transcribe::TranscriptionResult;
use crate::PipelineError;

const DOCUMENT_TYPE: &str = "Lecture Transcript";

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 20.0;
const FOOTER_BASELINE: f32 = 12.0;
const CONTENT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;

const PT_PER_MM: f32 = 72.0 / 25.4;
const LINE_SPACING: f32 = 1.4;

const TITLE_SIZE: f32 = 20.0;
const SUBTITLE_SIZE: f32 = 16.0;
const LABEL_SIZE: f32 = 11.0;
const HEADING_SIZE: f32 = 14.0;
const SUMMARY_SIZE: f32 = 12.0;
const TRANSCRIPT_SIZE: f32 = 10.0;
const FOOTER_SIZE: f32 = 8.0;

/// Input to the report renderer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRequest {
    pub transcript: String,
    pub summary: String,
    pub title: String,
    pub language: String,
}

impl ReportRequest {
    pub fn from_result(result: &TranscriptionResult, title: &str) -> Self {
        Self {
            transcript: result.transcript.clone(),
            summary: result.summary.clone(),
            title: title.to_string(),
            language: result.language.clone(),
        }
    }
}

/// A parsed TrueType font, embedded into reports and used to measure their text
#[derive(Clone)]
pub struct EmbeddedFont {
    face: Arc<OwnedFace>,
}

impl EmbeddedFont {
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, PipelineError> {
        let face = OwnedFace::from_vec(bytes, 0)
            .map_err(|e| PipelineError::RenderFailure(format!("unreadable report font: {}", e)))?;
        Ok(Self { face: Arc::new(face) })
    }

    pub async fn from_path(path: &Path) -> Result<Self, PipelineError> {
        let bytes = fs_err::tokio::read(path)
            .await
            .map_err(|e| PipelineError::RenderFailure(format!("cannot read report font: {}", e)))?;
        Self::from_bytes(bytes)
    }

    fn face(&self) -> &Face<'_> {
        self.face.as_face_ref()
    }

    fn covers(&self, c: char) -> bool {
        self.face().glyph_index(c).is_some()
    }

    /// Advance width in 1/1000 em
    fn advance(&self, c: char) -> f32 {
        let face = self.face();
        let units = face
            .glyph_index(c)
            .and_then(|id| face.glyph_hor_advance(id))
            .unwrap_or(0);
        units as f32 * 1000.0 / face.units_per_em() as f32
    }
}

impl std::fmt::Debug for EmbeddedFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddedFont")
            .field("glyphs", &self.face().number_of_glyphs())
            .finish()
    }
}

impl FontData for EmbeddedFont {
    fn font_metrics(&self) -> FontMetrics {
        let face = self.face();
        FontMetrics {
            ascent: face.ascender(),
            descent: face.descender(),
            units_per_em: face.units_per_em(),
        }
    }

    fn glyph_id(&self, c: char) -> Option<u16> {
        self.face().glyph_index(c).map(|id| id.0)
    }

    fn glyph_ids(&self) -> HashMap<u16, char> {
        let face = self.face();
        let mut map = HashMap::with_capacity(face.number_of_glyphs().into());
        let Some(cmap) = face.tables().cmap else {
            return map;
        };

        for subtable in cmap.subtables.into_iter().filter(|table| table.is_unicode()) {
            subtable.codepoints(|code| {
                if let Some(c) = char::from_u32(code) {
                    if let Some(id) = subtable.glyph_index(code).filter(|id| id.0 > 0) {
                        map.entry(id.0).or_insert(c);
                    }
                }
            });
        }
        map
    }

    fn glyph_count(&self) -> u16 {
        self.face().number_of_glyphs()
    }

    fn glyph_metrics(&self, glyph_id: u16) -> Option<GlyphMetrics> {
        let face = self.face();
        let id = GlyphId(glyph_id);
        let width = face.glyph_hor_advance(id)?;
        let height = face
            .glyph_bounding_box(id)
            .map(|bbox| bbox.y_max - bbox.y_min - face.descender())
            .unwrap_or(1000);
        Some(GlyphMetrics {
            width: width as u32,
            height: height as u32,
        })
    }
}

/// Lays out a transcript and its summary as a PDF document.
///
/// Body text uses the configured TrueType font, or builtin Helvetica when none is set.
/// Headings always use Helvetica Bold. Text the body font cannot draw is a
/// [`PipelineError::RenderFailure`]; characters are never dropped.
///
/// Layout runs on a blocking worker thread. The returned future resolves to the complete
/// document or to [`PipelineError::RenderFailure`]; partial output is never returned.
#[derive(Debug, Clone, Default)]
pub struct ReportRenderer {
    font: Option<EmbeddedFont>,
}

impl ReportRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_font(font: EmbeddedFont) -> Self {
        Self { font: Some(font) }
    }

    pub async fn from_config(config: &ReportConfig) -> Result<Self, PipelineError> {
        match &config.font_path {
            Some(path) => {
                let font = EmbeddedFont::from_path(path).await?;
                tracing::debug!(path = %path.display(), "Loaded report font");
                Ok(Self::with_font(font))
            }
            None => Ok(Self::new()),
        }
    }

    pub async fn render(&self, request: &ReportRequest) -> Result<Vec<u8>, PipelineError> {
        let request = request.clone();
        let font = self.font.clone();
        let generated_on = chrono::Local::now().date_naive();

        let report = tokio::task::spawn_blocking(move || compose(&request, font, generated_on))
            .await
            .map_err(|e| PipelineError::RenderFailure(format!("layout task failed: {}", e)))??;

        tracing::info!(pages = report.pages, bytes = report.bytes.len(), "Rendered report");
        Ok(report.bytes)
    }
}

struct ComposedReport {
    bytes: Vec<u8>,
    pages: usize,
}

fn compose(
    request: &ReportRequest,
    font: Option<EmbeddedFont>,
    generated_on: NaiveDate,
) -> Result<ComposedReport, PipelineError> {
    let title = format!("{}: {}", DOCUMENT_TYPE, request.title);
    let mut layout = Layout::new(&title, font)?;

    let label = format!("Language: {}", request.language);
    for text in [&request.title, &label, &request.summary, &request.transcript] {
        layout.body.check_coverage(text)?;
    }

    layout.centered(DOCUMENT_TYPE, TITLE_SIZE, Weight::Bold);
    layout.centered(&request.title, SUBTITLE_SIZE, Weight::Regular);
    layout.gap(2.0);
    layout.centered(&label, LABEL_SIZE, Weight::Regular);
    layout.gap(8.0);

    layout.heading("Summary");
    layout.justified(&request.summary, SUMMARY_SIZE);
    layout.gap(6.0);

    layout.heading("Full Transcript");
    layout.justified(&request.transcript, TRANSCRIPT_SIZE);

    layout.footer(&format!("Generated on {}", generated_on.format("%B %d, %Y")));

    let pages = layout.pages;
    let bytes = layout
        .doc
        .save_to_bytes()
        .map_err(|e| PipelineError::RenderFailure(format!("{:?}", e)))?;

    Ok(ComposedReport { bytes, pages })
}

#[derive(Clone, Copy)]
enum Weight {
    Regular,
    Bold,
}

/// How a face measures text and which characters it can draw
enum Metrics {
    Helvetica { bold: bool },
    Embedded(EmbeddedFont),
}

impl Metrics {
    /// Width in points
    fn width(&self, text: &str, size: f32) -> f32 {
        let units: f32 = match self {
            Metrics::Helvetica { bold } => {
                let scale = if *bold { 1.05 } else { 1.0 };
                text.chars().map(|c| helvetica_width(c) as f32 * scale).sum()
            }
            Metrics::Embedded(font) => text.chars().map(|c| font.advance(c)).sum(),
        };
        units / 1000.0 * size
    }

    fn covers(&self, c: char) -> bool {
        match self {
            Metrics::Helvetica { .. } => win_ansi(c),
            Metrics::Embedded(font) => font.covers(c),
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            Metrics::Helvetica { .. } => "builtin Helvetica",
            Metrics::Embedded(_) => "the configured report font",
        }
    }
}

struct Pen {
    font: IndirectFontRef,
    metrics: Metrics,
}

impl Pen {
    fn check_coverage(&self, text: &str) -> Result<(), PipelineError> {
        let mut missing = text.chars().filter(|c| !c.is_whitespace() && !self.metrics.covers(*c));
        let Some(first) = missing.next() else {
            return Ok(());
        };

        Err(PipelineError::RenderFailure(format!(
            "{} cannot draw {} character(s) such as '{}' (U+{:04X}); set report.font_path to a \
             font that covers this script",
            self.metrics.describe(),
            missing.count() + 1,
            first,
            first as u32
        )))
    }
}

/// Cursor-based page writer. `cursor` is the current baseline, in mm from the page bottom.
struct Layout {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    body: Pen,
    bold: Pen,
    cursor: f32,
    pages: usize,
}

impl Layout {
    fn new(title: &str, font: Option<EmbeddedFont>) -> Result<Self, PipelineError> {
        let (doc, page, layer) = PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Page 1");

        let body = match font {
            Some(font) => Pen {
                font: doc
                    .add_external_font_data(font.face.as_slice().to_vec(), font.clone())
                    .map_err(|e| PipelineError::RenderFailure(format!("{:?}", e)))?,
                metrics: Metrics::Embedded(font),
            },
            None => Pen {
                font: doc
                    .add_builtin_font(BuiltinFont::Helvetica)
                    .map_err(|e| PipelineError::RenderFailure(format!("{:?}", e)))?,
                metrics: Metrics::Helvetica { bold: false },
            },
        };
        let bold = Pen {
            font: doc
                .add_builtin_font(BuiltinFont::HelveticaBold)
                .map_err(|e| PipelineError::RenderFailure(format!("{:?}", e)))?,
            metrics: Metrics::Helvetica { bold: true },
        };
        let layer = doc.get_page(page).get_layer(layer);

        Ok(Self {
            doc,
            layer,
            body,
            bold,
            cursor: PAGE_HEIGHT - MARGIN,
            pages: 1,
        })
    }

    fn pen(&self, weight: Weight) -> &Pen {
        match weight {
            Weight::Regular => &self.body,
            Weight::Bold => &self.bold,
        }
    }

    fn gap(&mut self, mm: f32) {
        self.cursor -= mm;
    }

    fn heading(&mut self, text: &str) {
        // keep a heading on the same page as the first line after it
        self.ensure_room(2.0 * line_height(HEADING_SIZE));
        self.advance(HEADING_SIZE);
        self.write_at(text, HEADING_SIZE, Weight::Bold, MARGIN, self.cursor);
        self.gap(1.5);
    }

    fn centered(&mut self, text: &str, size: f32, weight: Weight) {
        let metrics = &self.pen(weight).metrics;
        let lines: Vec<(String, f32)> = wrap(text, size, metrics, CONTENT_WIDTH * PT_PER_MM)
            .into_iter()
            .map(|line| {
                let width = metrics.width(&line, size) / PT_PER_MM;
                (line, ((PAGE_WIDTH - width) / 2.0).max(MARGIN))
            })
            .collect();

        for (line, x) in lines {
            self.advance(size);
            self.write_at(&line, size, weight, x, self.cursor);
        }
    }

    /// Body text, flush with both margins except on the last line of each paragraph
    fn justified(&mut self, text: &str, size: f32) {
        let available = CONTENT_WIDTH * PT_PER_MM;

        for paragraph in text.lines() {
            if paragraph.trim().is_empty() {
                self.gap(line_height(size) / 2.0);
                continue;
            }

            let lines = wrap(paragraph, size, &self.body.metrics, available);
            let last = lines.len().saturating_sub(1);
            for (index, line) in lines.iter().enumerate() {
                self.advance(size);
                if index == last {
                    self.write_at(line, size, Weight::Regular, MARGIN, self.cursor);
                } else {
                    self.write_spread(line, size, available);
                }
            }
        }
    }

    /// Place each word so the line spans exactly `available` points
    fn write_spread(&self, line: &str, size: f32, available: f32) {
        let metrics = &self.body.metrics;
        let words: Vec<&str> = line.split(' ').collect();
        let space = metrics.width(" ", size);
        let extra = if words.len() > 1 {
            ((available - metrics.width(line, size)) / (words.len() - 1) as f32).max(0.0)
        } else {
            0.0
        };

        let mut x = MARGIN;
        for word in words {
            self.write_at(word, size, Weight::Regular, x, self.cursor);
            x += (metrics.width(word, size) + space + extra) / PT_PER_MM;
        }
    }

    fn footer(&mut self, text: &str) {
        let width = self.body.metrics.width(text, FOOTER_SIZE) / PT_PER_MM;
        self.write_at(text, FOOTER_SIZE, Weight::Regular, (PAGE_WIDTH - width) / 2.0, FOOTER_BASELINE);
    }

    /// Move the cursor down one line of `size`, breaking the page when needed
    fn advance(&mut self, size: f32) {
        let height = line_height(size);
        self.ensure_room(height);
        self.cursor -= height;
    }

    fn write_at(&self, text: &str, size: f32, weight: Weight, x: f32, y: f32) {
        let font = &self.pen(weight).font;
        self.layer.begin_text_section();
        self.layer.set_font(font, size);
        self.layer.set_text_cursor(Mm(x), Mm(y));
        self.layer.write_text(text, font);
        self.layer.end_text_section();
    }

    fn ensure_room(&mut self, height: f32) {
        if self.cursor - height < MARGIN {
            self.new_page();
        }
    }

    fn new_page(&mut self) {
        self.pages += 1;
        let (page, layer) = self.doc.add_page(
            Mm(PAGE_WIDTH),
            Mm(PAGE_HEIGHT),
            format!("Page {}", self.pages),
        );
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.cursor = PAGE_HEIGHT - MARGIN;
    }
}

/// Line advance in mm for a font size in points
fn line_height(size: f32) -> f32 {
    size * LINE_SPACING / PT_PER_MM
}

/// Greedy word wrap to `max_width` points. Words wider than a line are split.
fn wrap(text: &str, size: f32, metrics: &Metrics, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        for piece in split_long_word(word, size, metrics, max_width) {
            let candidate = if current.is_empty() {
                piece.clone()
            } else {
                format!("{} {}", current, piece)
            };

            if metrics.width(&candidate, size) <= max_width || current.is_empty() {
                current = candidate;
            } else {
                lines.push(std::mem::replace(&mut current, piece));
            }
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

fn split_long_word(word: &str, size: f32, metrics: &Metrics, max_width: f32) -> Vec<String> {
    if metrics.width(word, size) <= max_width {
        return vec![word.to_string()];
    }

    let mut pieces = Vec::new();
    let mut piece = String::new();
    for c in word.chars() {
        piece.push(c);
        if metrics.width(&piece, size) > max_width && piece.chars().count() > 1 {
            piece.pop();
            pieces.push(std::mem::take(&mut piece));
            piece.push(c);
        }
    }
    if !piece.is_empty() {
        pieces.push(piece);
    }
    pieces
}

/// Characters the builtin fonts can encode (Windows-1252)
fn win_ansi(c: char) -> bool {
    matches!(c, ' '..='~' | '\u{a0}'..='\u{ff}')
        || "€‚ƒ„…†‡ˆ‰Š‹ŒŽ‘’“”•–—˜™š›œžŸ".contains(c)
}

/// Helvetica advance width of a character in 1/1000 em
fn helvetica_width(c: char) -> u32 {
    const ASCII: [u16; 95] = [
        278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
        556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // '0'..'?'
        1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // '@'..'O'
        667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 'P'..'_'
        333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // '`'..'o'
        556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 'p'..'~'
    ];

    match c as u32 {
        code @ 32..=126 => ASCII[(code - 32) as usize] as u32,
        _ => 556,
    }
}
