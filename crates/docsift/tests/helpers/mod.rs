//! Shared fixtures for integration tests: in-memory PDF and DOCX builders and
//! a scripted OCR backend.

#![allow(dead_code)]

use async_trait::async_trait;
use docsift::plugins::{OcrBackend, OcrBackendType, Plugin};
use docsift::{NormalizedImage, OcrConfig, Result};
use image::{DynamicImage, ImageFormat, RgbImage};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};
use std::io::{Cursor, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// OCR backend that returns fixed text and counts its calls.
pub struct MockOcrBackend {
    text: String,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl MockOcrBackend {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Sleep before answering, to exercise request deadlines.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Plugin for MockOcrBackend {
    fn name(&self) -> &str {
        "mock-ocr"
    }

    fn version(&self) -> String {
        "1.0.0".to_string()
    }
}

#[async_trait]
impl OcrBackend for MockOcrBackend {
    async fn process_image(&self, _image: &NormalizedImage, _config: &OcrConfig) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.text.clone())
    }

    fn supports_language(&self, _lang: &str) -> bool {
        true
    }

    fn backend_type(&self) -> OcrBackendType {
        OcrBackendType::Custom
    }
}

/// Solid-color RGB image.
pub fn rgb_image(width: u32, height: u32) -> RgbImage {
    RgbImage::from_pixel(width, height, image::Rgb([200, 30, 30]))
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    encode(rgb_image(width, height), ImageFormat::Png)
}

pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    encode(rgb_image(width, height), ImageFormat::Jpeg)
}

fn encode(image: RgbImage, format: ImageFormat) -> Vec<u8> {
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(image)
        .write_to(&mut Cursor::new(&mut bytes), format)
        .expect("encode test image");
    bytes
}

/// How a test page embeds an image XObject.
pub enum PdfImage {
    /// Uncompressed DeviceRGB samples.
    RawRgb { width: u32, height: u32 },
    /// A JPEG stream with `/DCTDecode`.
    Jpeg { width: u32, height: u32 },
    /// One 4x4 raw image object referenced by every page that uses it.
    Shared,
}

/// One page of a test PDF.
#[derive(Default)]
pub struct PdfPage {
    operations: Vec<Operation>,
    images: Vec<PdfImage>,
    in_form: bool,
    cid_font: bool,
}

impl PdfPage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show `text` at (x, y) in 12pt Helvetica.
    pub fn text(mut self, x: f32, y: f32, text: &str) -> Self {
        self.operations.extend([
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 12.into()]),
            Operation::new("Td", vec![x.into(), y.into()]),
            Operation::new("Tj", vec![Object::string_literal(text)]),
            Operation::new("ET", vec![]),
        ]);
        self
    }

    /// Show raw two-byte codes in a CID font that has no `/ToUnicode` map.
    pub fn cid_text(mut self, x: f32, y: f32, codes: &[u8]) -> Self {
        self.operations.extend([
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F2".into(), 12.into()]),
            Operation::new("Td", vec![x.into(), y.into()]),
            Operation::new(
                "Tj",
                vec![Object::String(codes.to_vec(), lopdf::StringFormat::Hexadecimal)],
            ),
            Operation::new("ET", vec![]),
        ]);
        self.cid_font = true;
        self
    }

    /// Move everything drawn on the page into a form XObject painted with `Do`.
    pub fn in_form(mut self) -> Self {
        self.in_form = true;
        self
    }

    /// Stroke a straight line.
    pub fn line(mut self, from: (f32, f32), to: (f32, f32)) -> Self {
        self.operations.extend([
            Operation::new("m", vec![from.0.into(), from.1.into()]),
            Operation::new("l", vec![to.0.into(), to.1.into()]),
            Operation::new("S", vec![]),
        ]);
        self
    }

    /// Rule a grid whose column and row boundaries are given in user space.
    ///
    /// `rows` are listed top to bottom.
    pub fn grid(mut self, columns: &[f32], rows: &[f32]) -> Self {
        let (left, right) = (columns[0], columns[columns.len() - 1]);
        let (top, bottom) = (rows[0], rows[rows.len() - 1]);
        for y in rows {
            self = self.line((left, *y), (right, *y));
        }
        for x in columns {
            self = self.line((*x, top), (*x, bottom));
        }
        self
    }

    /// Paint an image XObject into a 100x100 box at (x, y).
    pub fn image(mut self, x: f32, y: f32, image: PdfImage) -> Self {
        let name = format!("Im{}", self.images.len() + 1);
        self.operations.extend([
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![100.into(), 0.into(), 0.into(), 100.into(), x.into(), y.into()],
            ),
            Operation::new("Do", vec![Object::Name(name.into_bytes())]),
            Operation::new("Q", vec![]),
        ]);
        self.images.push(image);
        self
    }
}

fn raw_rgb_stream(width: u32, height: u32) -> Stream {
    Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => width as i64,
            "Height" => height as i64,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
        },
        rgb_image(width, height).into_raw(),
    )
}

fn image_object(doc: &mut Document, shared: &mut Option<ObjectId>, image: &PdfImage) -> ObjectId {
    match image {
        PdfImage::RawRgb { width, height } => doc.add_object(raw_rgb_stream(*width, *height)),
        PdfImage::Jpeg { width, height } => doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => *width as i64,
                "Height" => *height as i64,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
                "Filter" => "DCTDecode",
            },
            jpeg_bytes(*width, *height),
        )),
        PdfImage::Shared => *shared.get_or_insert_with(|| doc.add_object(raw_rgb_stream(4, 4))),
    }
}

/// Serialize pages into a PDF document.
pub fn build_pdf(pages: Vec<PdfPage>) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let cid_font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type0",
        "BaseFont" => "NoUnicode",
        "Encoding" => "Identity-H",
        "DescendantFonts" => vec![Object::Dictionary(dictionary! {
            "Type" => "Font",
            "Subtype" => "CIDFontType2",
            "BaseFont" => "NoUnicode",
            "CIDSystemInfo" => dictionary! {
                "Registry" => Object::string_literal("Adobe"),
                "Ordering" => Object::string_literal("Identity"),
                "Supplement" => 0,
            },
        })],
    });
    let mut shared_image = None;

    let mut kids: Vec<Object> = Vec::new();
    for page in pages {
        let mut xobjects = Dictionary::new();
        for (index, image) in page.images.iter().enumerate() {
            let image_id = image_object(&mut doc, &mut shared_image, image);
            xobjects.set(format!("Im{}", index + 1), image_id);
        }
        let mut fonts = dictionary! { "F1" => font_id };
        if page.cid_font {
            fonts.set("F2", cid_font_id);
        }

        let mut operations = page.operations;
        let resources = if page.in_form {
            let form = Content { operations };
            let form_id = doc.add_object(Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Form",
                    "BBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
                    "Resources" => dictionary! { "Font" => fonts, "XObject" => xobjects },
                },
                form.encode().expect("encode form"),
            ));
            operations = vec![
                Operation::new("q", vec![]),
                Operation::new("Do", vec![Object::Name(b"Fm1".to_vec())]),
                Operation::new("Q", vec![]),
            ];
            dictionary! { "XObject" => dictionary! { "Fm1" => form_id } }
        } else {
            dictionary! { "Font" => fonts, "XObject" => xobjects }
        };
        let resources_id = doc.add_object(resources);

        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().expect("encode content")));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("save pdf");
    bytes
}

/// Two pages: text and one image on page 1; a ruled 2x2 table with a blank
/// second row on page 2.
pub fn invoice_pdf() -> Vec<u8> {
    let first = PdfPage::new()
        .text(72.0, 720.0, "Invoice 2024-001")
        .image(72.0, 500.0, PdfImage::RawRgb { width: 8, height: 8 });
    let second = PdfPage::new()
        .text(72.0, 740.0, "Line items")
        .grid(&[100.0, 200.0, 300.0], &[700.0, 650.0, 600.0])
        .text(110.0, 670.0, "Item")
        .text(210.0, 670.0, "Qty");
    build_pdf(vec![first, second])
}

/// Two pages that both paint the same image object.
pub fn shared_image_pdf() -> Vec<u8> {
    let page = || PdfPage::new().image(72.0, 500.0, PdfImage::Shared);
    build_pdf(vec![page(), page()])
}

const W_NAMESPACE: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const IMAGE_RELATIONSHIP: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";

/// Minimal DOCX package builder.
#[derive(Default)]
pub struct DocxBuilder {
    body: String,
    media: Vec<(String, Vec<u8>)>,
}

impl DocxBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn paragraph(mut self, text: &str) -> Self {
        self.body.push_str(&format!("<w:p><w:r><w:t xml:space=\"preserve\">{}</w:t></w:r></w:p>", text));
        self
    }

    pub fn table(mut self, rows: &[&[&str]]) -> Self {
        self.body.push_str("<w:tbl>");
        for row in rows {
            self.body.push_str("<w:tr>");
            for cell in *row {
                self.body
                    .push_str(&format!("<w:tc><w:p><w:r><w:t>{}</w:t></w:r></w:p></w:tc>", cell));
            }
            self.body.push_str("</w:tr>");
        }
        self.body.push_str("</w:tbl>");
        self
    }

    /// Add a media part referenced by an image relationship.
    pub fn image(mut self, name: &str, bytes: Vec<u8>) -> Self {
        self.media.push((name.to_string(), bytes));
        self
    }

    pub fn build(self) -> Vec<u8> {
        let document = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="{}"><w:body>{}</w:body></w:document>"#,
            W_NAMESPACE, self.body
        );

        let relationships: String = self
            .media
            .iter()
            .enumerate()
            .map(|(index, (name, _))| {
                format!(
                    r#"<Relationship Id="rId{}" Type="{}" Target="media/{}"/>"#,
                    index + 1,
                    IMAGE_RELATIONSHIP,
                    name
                )
            })
            .collect();
        let rels = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{}</Relationships>"#,
            relationships
        );

        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = zip::write::SimpleFileOptions::default();

        writer.start_file("word/document.xml", options).expect("start document");
        writer.write_all(document.as_bytes()).expect("write document");
        writer
            .start_file("word/_rels/document.xml.rels", options)
            .expect("start rels");
        writer.write_all(rels.as_bytes()).expect("write rels");
        for (name, bytes) in &self.media {
            writer
                .start_file(format!("word/media/{}", name), options)
                .expect("start media");
            writer.write_all(bytes).expect("write media");
        }

        writer.finish().expect("finish docx").into_inner()
    }
}
