//! Page content-stream interpretation for table detection.
//!
//! Walks the operators of one page and records two things in user space:
//! positioned text spans, and the straight horizontal/vertical segments drawn
//! by rectangles and stroked or filled paths. Form XObjects painted with `Do`
//! are interpreted in place under their `/Matrix`. Curves and clipping are
//! ignored.

use super::document::{MAX_FORM_DEPTH, is_xobject_subtype, number, page_content, page_resources, resolve, resolve_dict, stream_bytes};
use super::error::{PdfError, Result};
use lopdf::content::Content;
use lopdf::{Dictionary, Document, Encoding, Object, ObjectId};
use std::collections::BTreeMap;

/// Segments whose cross-axis extent is below this are treated as axis-aligned.
const AXIS_EPSILON: f32 = 0.5;

/// Rough average glyph advance as a fraction of the font size.
const AVG_GLYPH_WIDTH: f32 = 0.5;

/// A run of text drawn by one text-showing operator.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSpan {
    pub text: String,
    /// Baseline origin in user space.
    pub x: f32,
    pub y: f32,
    /// Effective font size after text and graphics scaling.
    pub font_size: f32,
    /// Estimated advance width.
    pub width: f32,
}

/// Orientation of a ruling segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// An axis-aligned ruling segment in user space.
///
/// For horizontal segments `position` is y and `start..end` spans x; for
/// vertical segments `position` is x and `start..end` spans y.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub orientation: Orientation,
    pub position: f32,
    pub start: f32,
    pub end: f32,
}

impl Segment {
    /// Build a segment between two points, or `None` if it is not axis-aligned.
    pub fn between(a: (f32, f32), b: (f32, f32)) -> Option<Self> {
        let (dx, dy) = ((a.0 - b.0).abs(), (a.1 - b.1).abs());
        if dy <= AXIS_EPSILON && dx > AXIS_EPSILON {
            Some(Segment {
                orientation: Orientation::Horizontal,
                position: (a.1 + b.1) / 2.0,
                start: a.0.min(b.0),
                end: a.0.max(b.0),
            })
        } else if dx <= AXIS_EPSILON && dy > AXIS_EPSILON {
            Some(Segment {
                orientation: Orientation::Vertical,
                position: (a.0 + b.0) / 2.0,
                start: a.1.min(b.1),
                end: a.1.max(b.1),
            })
        } else {
            None
        }
    }

    pub fn length(&self) -> f32 {
        self.end - self.start
    }
}

/// Text and ruling geometry of one page.
#[derive(Debug, Clone, Default)]
pub struct PageLayout {
    pub spans: Vec<TextSpan>,
    pub segments: Vec<Segment>,
}

/// Affine matrix `[a b c d e f]` in PDF row-vector convention.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Matrix([f32; 6]);

impl Matrix {
    const IDENTITY: Matrix = Matrix([1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);

    fn translation(tx: f32, ty: f32) -> Self {
        Matrix([1.0, 0.0, 0.0, 1.0, tx, ty])
    }

    /// `self × other`: apply `self` first, then `other`.
    fn then(&self, other: &Matrix) -> Matrix {
        let [a, b, c, d, e, f] = self.0;
        let [oa, ob, oc, od, oe, of] = other.0;
        Matrix([
            a * oa + b * oc,
            a * ob + b * od,
            c * oa + d * oc,
            c * ob + d * od,
            e * oa + f * oc + oe,
            e * ob + f * od + of,
        ])
    }

    fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        let [a, b, c, d, e, f] = self.0;
        (a * x + c * y + e, b * x + d * y + f)
    }

    fn vertical_scale(&self) -> f32 {
        let [_, b, _, d, _, _] = self.0;
        (b * b + d * d).sqrt()
    }

    fn horizontal_scale(&self) -> f32 {
        let [a, b, _, _, _, _] = self.0;
        (a * a + b * b).sqrt()
    }
}

fn matrix_operands(operands: &[Object]) -> Option<Matrix> {
    if operands.len() < 6 {
        return None;
    }
    let mut values = [0.0f32; 6];
    for (slot, operand) in values.iter_mut().zip(operands) {
        *slot = number(operand)?;
    }
    Some(Matrix(values))
}

#[derive(Debug, Clone)]
struct TextState {
    matrix: Matrix,
    line_matrix: Matrix,
    font: Vec<u8>,
    font_size: f32,
    leading: f32,
    char_spacing: f32,
    word_spacing: f32,
    horizontal_scaling: f32,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            matrix: Matrix::IDENTITY,
            line_matrix: Matrix::IDENTITY,
            font: Vec::new(),
            font_size: 12.0,
            leading: 0.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            horizontal_scaling: 1.0,
        }
    }
}

impl TextState {
    fn move_line(&mut self, tx: f32, ty: f32) {
        self.line_matrix = Matrix::translation(tx, ty).then(&self.line_matrix);
        self.matrix = self.line_matrix;
    }

    fn next_line(&mut self) {
        let leading = self.leading;
        self.move_line(0.0, -leading);
    }

    fn advance(&mut self, tx: f32) {
        self.matrix = Matrix::translation(tx, 0.0).then(&self.matrix);
    }
}

/// Decodes string operands with the font encodings of one resource dictionary.
struct FontDecoder<'a> {
    doc: &'a Document,
    fonts: BTreeMap<Vec<u8>, &'a Dictionary>,
    encodings: BTreeMap<Vec<u8>, Option<Encoding<'a>>>,
}

impl<'a> FontDecoder<'a> {
    fn new(doc: &'a Document, resources: Option<&'a Dictionary>) -> Self {
        let fonts = resources
            .and_then(|resources| resolve_dict(doc, resources, b"Font"))
            .map(|fonts| {
                fonts
                    .iter()
                    .filter_map(|(name, font)| match resolve(doc, font).ok()? {
                        Object::Dictionary(dict) => Some((name.clone(), dict)),
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default();
        Self {
            doc,
            fonts,
            encodings: BTreeMap::new(),
        }
    }

    fn decode(&mut self, font: &[u8], bytes: &[u8]) -> String {
        if !self.encodings.contains_key(font) {
            let encoding = self
                .fonts
                .get(font)
                .and_then(|dict| dict.get_font_encoding(self.doc).ok());
            self.encodings.insert(font.to_vec(), encoding);
        }

        match self.encodings.get(font).and_then(Option::as_ref) {
            Some(encoding) => Document::decode_text(encoding, bytes).unwrap_or_else(|_| latin1(bytes)),
            None => latin1(bytes),
        }
    }
}

fn latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|b| *b as char).collect()
}

/// Current path under construction, in user space.
#[derive(Debug, Default)]
struct PathBuilder {
    segments: Vec<Segment>,
    current: Option<(f32, f32)>,
    subpath_start: Option<(f32, f32)>,
}

impl PathBuilder {
    fn move_to(&mut self, point: (f32, f32)) {
        self.current = Some(point);
        self.subpath_start = Some(point);
    }

    fn line_to(&mut self, point: (f32, f32)) {
        if let Some(from) = self.current
            && let Some(segment) = Segment::between(from, point)
        {
            self.segments.push(segment);
        }
        self.current = Some(point);
    }

    fn close(&mut self) {
        if let Some(start) = self.subpath_start {
            self.line_to(start);
        }
    }

    fn rectangle(&mut self, corners: [(f32, f32); 4]) {
        self.move_to(corners[0]);
        for corner in &corners[1..] {
            self.line_to(*corner);
        }
        self.close();
    }

    fn take(&mut self) -> Vec<Segment> {
        self.current = None;
        self.subpath_start = None;
        std::mem::take(&mut self.segments)
    }
}

/// Interpret one page and collect its text spans and ruling segments.
pub fn interpret_page(doc: &Document, page_id: ObjectId) -> Result<PageLayout> {
    let bytes = page_content(doc, page_id)?;
    let mut layout = PageLayout::default();
    if bytes.is_empty() {
        return Ok(layout);
    }

    let resources = page_resources(doc, page_id);
    let mut forms = Vec::new();
    interpret_content(doc, &bytes, resources, Matrix::IDENTITY, &mut layout, &mut forms)?;
    Ok(layout)
}

/// Run one content stream, appending what it draws to `layout`.
///
/// `base` maps the stream's coordinates to page user space. `forms` is the
/// chain of form XObjects being drawn, used to stop recursion.
fn interpret_content<'a>(
    doc: &'a Document,
    bytes: &[u8],
    resources: Option<&'a Dictionary>,
    base: Matrix,
    layout: &mut PageLayout,
    forms: &mut Vec<Option<ObjectId>>,
) -> Result<()> {
    let content = Content::decode(bytes).map_err(|e| PdfError::ContentStreamFailed(e.to_string()))?;
    let mut decoder = FontDecoder::new(doc, resources);
    tracing::trace!(
        operations = content.operations.len(),
        depth = forms.len(),
        "Interpreting content stream"
    );

    let mut ctm = base;
    let mut ctm_stack: Vec<Matrix> = Vec::new();
    let mut text = TextState::default();
    let mut path = PathBuilder::default();

    for op in &content.operations {
        let operands = op.operands.as_slice();
        match op.operator.as_str() {
            "q" => ctm_stack.push(ctm),
            "Q" => {
                if let Some(saved) = ctm_stack.pop() {
                    ctm = saved;
                }
            }
            "cm" => {
                if let Some(m) = matrix_operands(operands) {
                    ctm = m.then(&ctm);
                }
            }
            "Do" => {
                if let Some(Object::Name(name)) = operands.first() {
                    draw_form(doc, resources, name, ctm, layout, forms)?;
                }
            }

            "m" => {
                if let Some(point) = point_operand(operands, 0) {
                    path.move_to(ctm.apply(point.0, point.1));
                }
            }
            "l" => {
                if let Some(point) = point_operand(operands, 0) {
                    path.line_to(ctm.apply(point.0, point.1));
                }
            }
            "c" => {
                if let Some(point) = point_operand(operands, 4) {
                    path.current = Some(ctm.apply(point.0, point.1));
                }
            }
            "v" | "y" => {
                if let Some(point) = point_operand(operands, 2) {
                    path.current = Some(ctm.apply(point.0, point.1));
                }
            }
            "h" => path.close(),
            "re" => {
                if let (Some((x, y)), Some((w, h))) = (point_operand(operands, 0), point_operand(operands, 2)) {
                    path.rectangle([
                        ctm.apply(x, y),
                        ctm.apply(x + w, y),
                        ctm.apply(x + w, y + h),
                        ctm.apply(x, y + h),
                    ]);
                }
            }
            "S" | "f" | "F" | "f*" | "B" | "B*" => layout.segments.extend(path.take()),
            "s" | "b" | "b*" => {
                path.close();
                layout.segments.extend(path.take());
            }
            "n" => {
                path.take();
            }

            "BT" => {
                text.matrix = Matrix::IDENTITY;
                text.line_matrix = Matrix::IDENTITY;
            }
            "Tf" => {
                if let Some(Object::Name(font)) = operands.first() {
                    text.font = font.clone();
                }
                if let Some(size) = operands.get(1).and_then(number) {
                    text.font_size = size;
                }
            }
            "TL" => {
                if let Some(leading) = operands.first().and_then(number) {
                    text.leading = leading;
                }
            }
            "Tc" => {
                if let Some(spacing) = operands.first().and_then(number) {
                    text.char_spacing = spacing;
                }
            }
            "Tw" => {
                if let Some(spacing) = operands.first().and_then(number) {
                    text.word_spacing = spacing;
                }
            }
            "Tz" => {
                if let Some(scale) = operands.first().and_then(number) {
                    text.horizontal_scaling = scale / 100.0;
                }
            }
            "Td" => {
                if let Some((tx, ty)) = point_operand(operands, 0) {
                    text.move_line(tx, ty);
                }
            }
            "TD" => {
                if let Some((tx, ty)) = point_operand(operands, 0) {
                    text.leading = -ty;
                    text.move_line(tx, ty);
                }
            }
            "Tm" => {
                if let Some(m) = matrix_operands(operands) {
                    text.line_matrix = m;
                    text.matrix = m;
                }
            }
            "T*" => text.next_line(),
            "Tj" => {
                if let Some(Object::String(bytes, _)) = operands.first() {
                    show_text(&mut *layout, &mut text, &ctm, &mut decoder, bytes);
                }
            }
            "'" => {
                text.next_line();
                if let Some(Object::String(bytes, _)) = operands.first() {
                    show_text(&mut *layout, &mut text, &ctm, &mut decoder, bytes);
                }
            }
            "\"" => {
                if let Some(spacing) = operands.first().and_then(number) {
                    text.word_spacing = spacing;
                }
                if let Some(spacing) = operands.get(1).and_then(number) {
                    text.char_spacing = spacing;
                }
                text.next_line();
                if let Some(Object::String(bytes, _)) = operands.get(2) {
                    show_text(&mut *layout, &mut text, &ctm, &mut decoder, bytes);
                }
            }
            "TJ" => {
                if let Some(Object::Array(items)) = operands.first() {
                    show_text_array(&mut *layout, &mut text, &ctm, &mut decoder, items);
                }
            }
            _ => {}
        }
    }

    Ok(())
}

/// Interpret the form XObject `name` if it is one, under the current CTM.
fn draw_form<'a>(
    doc: &'a Document,
    resources: Option<&'a Dictionary>,
    name: &[u8],
    ctm: Matrix,
    layout: &mut PageLayout,
    forms: &mut Vec<Option<ObjectId>>,
) -> Result<()> {
    let Some(entry) = resources
        .and_then(|resources| resolve_dict(doc, resources, b"XObject"))
        .and_then(|xobjects| xobjects.get(name).ok())
    else {
        return Ok(());
    };
    let Ok(Object::Stream(stream)) = resolve(doc, entry) else {
        return Ok(());
    };
    if !is_xobject_subtype(&stream.dict, b"Form") {
        return Ok(());
    }

    let form_id = entry.as_reference().ok();
    if form_id.is_some() && forms.contains(&form_id) {
        tracing::debug!(form = %String::from_utf8_lossy(name), "Skipping recursive form");
        return Ok(());
    }
    if forms.len() >= MAX_FORM_DEPTH {
        tracing::warn!(depth = forms.len(), "Form nesting too deep, skipping");
        return Ok(());
    }

    let matrix = match stream.dict.get(b"Matrix").map(|m| resolve(doc, m)) {
        Ok(Ok(Object::Array(items))) => matrix_operands(items).unwrap_or(Matrix::IDENTITY),
        _ => Matrix::IDENTITY,
    };
    let bytes = stream_bytes(stream)?;
    let form_resources = resolve_dict(doc, &stream.dict, b"Resources").or(resources);

    forms.push(form_id);
    let drawn = interpret_content(doc, &bytes, form_resources, matrix.then(&ctm), layout, forms);
    forms.pop();
    drawn
}

fn point_operand(operands: &[Object], index: usize) -> Option<(f32, f32)> {
    Some((number(operands.get(index)?)?, number(operands.get(index + 1)?)?))
}

fn glyph_advance(text: &TextState, decoded: &str) -> f32 {
    let glyphs = decoded.chars().count() as f32;
    let spaces = decoded.chars().filter(|c| *c == ' ').count() as f32;
    (glyphs * (AVG_GLYPH_WIDTH * text.font_size + text.char_spacing) + spaces * text.word_spacing)
        * text.horizontal_scaling
}

fn show_text(layout: &mut PageLayout, text: &mut TextState, ctm: &Matrix, decoder: &mut FontDecoder<'_>, bytes: &[u8]) {
    let decoded = decoder.decode(&text.font, bytes);
    let advance = glyph_advance(text, &decoded);
    push_span(layout, text, ctm, decoded, advance);
    text.advance(advance);
}

fn show_text_array(
    layout: &mut PageLayout,
    text: &mut TextState,
    ctm: &Matrix,
    decoder: &mut FontDecoder<'_>,
    items: &[Object],
) {
    // One span per TJ; kerning adjustments only move the pen, large gaps become spaces.
    let start = text.clone();
    let mut combined = String::new();
    let mut advance = 0.0;

    for item in items {
        match item {
            Object::String(bytes, _) => {
                let decoded = decoder.decode(&text.font, bytes);
                advance += glyph_advance(text, &decoded);
                combined.push_str(&decoded);
            }
            other => {
                if let Some(adjustment) = number(other) {
                    let shift = -adjustment / 1000.0 * text.font_size * text.horizontal_scaling;
                    advance += shift;
                    if adjustment < -200.0 && !combined.is_empty() && !combined.ends_with(' ') {
                        combined.push(' ');
                    }
                }
            }
        }
    }

    push_span(layout, &start, ctm, combined, advance);
    text.advance(advance);
}

fn push_span(layout: &mut PageLayout, text: &TextState, ctm: &Matrix, decoded: String, advance: f32) {
    if decoded.trim().is_empty() {
        return;
    }
    let rendering = text.matrix.then(ctm);
    let (x, y) = rendering.apply(0.0, 0.0);
    layout.spans.push(TextSpan {
        text: decoded,
        x,
        y,
        font_size: text.font_size * rendering.vertical_scale(),
        width: advance * rendering.horizontal_scale(),
    });
}
