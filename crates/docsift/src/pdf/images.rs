//! Embedded image extraction from PDF pages.
//!
//! Pages are visited in order and each image XObject referenced from a page's
//! resources is decoded once per reference: an image shared by two pages is
//! returned twice. Form XObjects that carry their own `/Resources` are entered
//! in place, so images nested in forms keep their resource order. Every image
//! is re-encoded as PNG.

use super::document::{MAX_FORM_DEPTH, is_xobject_subtype, load_document, page_resources, resolve, resolve_dict};
use super::error::{PdfError, Result};
use crate::extraction::image::{encode_png, normalize_image_bytes};
use crate::types::NormalizedImage;
use image::{DynamicImage, GrayImage, RgbImage};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

/// Filters lopdf can undo before we interpret raw samples.
const DECOMPRESSIBLE_FILTERS: &[&str] = &["FlateDecode", "Fl", "LZWDecode", "LZW"];

const DIMENSIONS_TOO_LARGE: &str = "image dimensions too large";

/// Color model of raw image samples.
#[derive(Debug, Clone, PartialEq)]
enum ColorModel {
    Gray,
    Rgb,
    Cmyk,
    /// Palette lookup into a base model with `hival + 1` entries.
    Indexed { base: Box<ColorModel>, palette: Vec<u8> },
    /// Unknown space; channel count is inferred from the sample length.
    Unknown,
}

impl ColorModel {
    fn channels(&self) -> Option<usize> {
        match self {
            ColorModel::Gray => Some(1),
            ColorModel::Rgb => Some(3),
            ColorModel::Cmyk => Some(4),
            ColorModel::Indexed { .. } => Some(1),
            ColorModel::Unknown => None,
        }
    }
}

/// Extract every embedded image from PDF bytes.
pub fn extract_images_from_pdf(pdf_bytes: &[u8]) -> Result<Vec<NormalizedImage>> {
    let document = load_document(pdf_bytes)?;
    let mut images = Vec::new();

    for (page_number, page_id) in document.get_pages() {
        let Some(resources) = page_resources(&document, page_id) else {
            continue;
        };
        let mut forms = Vec::new();
        collect_images(&document, page_number, resources, &mut forms, &mut images)?;
    }

    tracing::debug!(count = images.len(), "Extracted PDF images");
    Ok(images)
}

/// Decode the image XObjects of one resource dictionary in declaration order,
/// descending into form XObjects where they appear.
///
/// `forms` holds the chain of forms currently being visited; a form already on
/// the chain is not entered again.
fn collect_images(
    doc: &Document,
    page_number: u32,
    resources: &Dictionary,
    forms: &mut Vec<Option<ObjectId>>,
    images: &mut Vec<NormalizedImage>,
) -> Result<()> {
    let Some(xobjects) = resolve_dict(doc, resources, b"XObject") else {
        return Ok(());
    };

    for (name, reference) in xobjects.iter() {
        let Object::Stream(stream) = resolve(doc, reference)? else {
            continue;
        };

        if is_xobject_subtype(&stream.dict, b"Form") {
            let form_id = reference.as_reference().ok();
            if form_id.is_some() && forms.contains(&form_id) {
                tracing::debug!(page = page_number, form = %String::from_utf8_lossy(name), "Skipping recursive form");
                continue;
            }
            if forms.len() >= MAX_FORM_DEPTH {
                tracing::warn!(page = page_number, depth = forms.len(), "Form nesting too deep, skipping");
                continue;
            }
            let Some(form_resources) = resolve_dict(doc, &stream.dict, b"Resources") else {
                continue;
            };
            forms.push(form_id);
            let collected = collect_images(doc, page_number, form_resources, forms, images);
            forms.pop();
            collected?;
            continue;
        }

        if !is_xobject_subtype(&stream.dict, b"Image") {
            continue;
        }

        let image = decode_image_stream(doc, stream).map_err(|e| {
            PdfError::ImageExtractionFailed(format!(
                "page {} image /{}: {}",
                page_number,
                String::from_utf8_lossy(name),
                e
            ))
        })?;
        images.push(image);
    }
    Ok(())
}

fn stream_filters(dict: &Dictionary) -> Vec<String> {
    match dict.get(b"Filter") {
        Ok(Object::Name(name)) => vec![String::from_utf8_lossy(name).into_owned()],
        Ok(Object::Array(items)) => items
            .iter()
            .filter_map(|item| item.as_name().ok())
            .map(|name| String::from_utf8_lossy(name).into_owned())
            .collect(),
        _ => Vec::new(),
    }
}

fn decode_image_stream(doc: &Document, stream: &Stream) -> std::result::Result<NormalizedImage, String> {
    let filters = stream_filters(&stream.dict);

    match filters.last().map(String::as_str) {
        Some("DCTDecode") | Some("DCT") => {
            if filters.len() > 1 {
                return Err(format!("unsupported filter chain {:?}", filters));
            }
            normalize_image_bytes(&stream.content).map_err(|e| e.to_string())
        }
        Some(other) if !DECOMPRESSIBLE_FILTERS.contains(&other) => Err(format!("unsupported filter {}", other)),
        _ => {
            if filters.iter().any(|f| !DECOMPRESSIBLE_FILTERS.contains(&f.as_str())) {
                return Err(format!("unsupported filter chain {:?}", filters));
            }
            let samples = if filters.is_empty() {
                stream.content.clone()
            } else {
                stream
                    .decompressed_content()
                    .map_err(|e| format!("decompression failed: {}", e))?
            };
            let image = decode_raw_samples(doc, &stream.dict, samples)?;
            encode_png(&image).map_err(|e| e.to_string())
        }
    }
}

fn dimension(dict: &Dictionary, key: &[u8]) -> std::result::Result<u32, String> {
    let value = dict
        .get(key)
        .and_then(Object::as_i64)
        .map_err(|_| format!("missing /{}", String::from_utf8_lossy(key)))?;
    u32::try_from(value)
        .ok()
        .filter(|v| *v > 0)
        .ok_or_else(|| format!("invalid /{} {}", String::from_utf8_lossy(key), value))
}

fn decode_raw_samples(doc: &Document, dict: &Dictionary, samples: Vec<u8>) -> std::result::Result<DynamicImage, String> {
    let width = dimension(dict, b"Width")?;
    let height = dimension(dict, b"Height")?;
    let pixels = (width as usize)
        .checked_mul(height as usize)
        .ok_or_else(|| DIMENSIONS_TOO_LARGE.to_string())?;

    let is_mask = matches!(dict.get(b"ImageMask"), Ok(Object::Boolean(true)));
    let bits = if is_mask {
        1
    } else {
        dict.get(b"BitsPerComponent").and_then(Object::as_i64).unwrap_or(8)
    };

    let model = if is_mask {
        ColorModel::Gray
    } else {
        match dict.get(b"ColorSpace") {
            Ok(space) => color_model(doc, space)?,
            Err(_) => ColorModel::Unknown,
        }
    };

    match bits {
        1 => {
            if !matches!(model, ColorModel::Gray | ColorModel::Unknown) {
                return Err("1-bit images are only supported for gray color spaces".to_string());
            }
            let gray = unpack_bits(&samples, width as usize, height as usize, is_mask)?;
            GrayImage::from_raw(width, height, gray)
                .map(DynamicImage::ImageLuma8)
                .ok_or_else(|| "Failed to create image from raw data".to_string())
        }
        8 => {
            let channels = match model.channels() {
                Some(channels) => channels,
                None => infer_channels(samples.len(), pixels)?,
            };
            let needed = pixels
                .checked_mul(channels)
                .ok_or_else(|| DIMENSIONS_TOO_LARGE.to_string())?;
            if samples.len() < needed {
                return Err(format!(
                    "sample data too short: expected {} bytes, found {}",
                    needed,
                    samples.len()
                ));
            }
            build_image(&model, channels, width, height, &samples[..needed])
        }
        other => Err(format!("unsupported BitsPerComponent {}", other)),
    }
}

fn infer_channels(len: usize, pixels: usize) -> std::result::Result<usize, String> {
    [4, 3, 1]
        .into_iter()
        .find(|channels| pixels.checked_mul(*channels).is_some_and(|needed| len >= needed))
        .ok_or_else(|| "cannot infer color channels from sample length".to_string())
}

fn build_image(
    model: &ColorModel,
    channels: usize,
    width: u32,
    height: u32,
    samples: &[u8],
) -> std::result::Result<DynamicImage, String> {
    let image = match (model, channels) {
        (ColorModel::Indexed { base, palette }, _) => {
            let base_channels = base.channels().unwrap_or(3);
            let mut expanded = Vec::with_capacity(samples.len() * base_channels);
            for index in samples {
                let start = *index as usize * base_channels;
                match palette.get(start..start + base_channels) {
                    Some(entry) => expanded.extend_from_slice(entry),
                    None => expanded.extend(std::iter::repeat_n(0u8, base_channels)),
                }
            }
            return build_image(base, base_channels, width, height, &expanded);
        }
        (_, 1) => GrayImage::from_raw(width, height, samples.to_vec()).map(DynamicImage::ImageLuma8),
        (_, 3) => RgbImage::from_raw(width, height, samples.to_vec()).map(DynamicImage::ImageRgb8),
        (_, 4) => RgbImage::from_raw(width, height, cmyk_to_rgb(samples)).map(DynamicImage::ImageRgb8),
        (_, other) => return Err(format!("unsupported channel count {}", other)),
    };
    image.ok_or_else(|| "Failed to create image from raw data".to_string())
}

fn color_model(doc: &Document, space: &Object) -> std::result::Result<ColorModel, String> {
    let space = resolve(doc, space).map_err(|e| e.to_string())?;
    match space {
        Object::Name(name) => Ok(named_color_model(name)),
        Object::Array(items) => {
            let family = items.first().and_then(|item| item.as_name().ok()).unwrap_or_default();
            match family {
                b"ICCBased" => {
                    let components = items
                        .get(1)
                        .and_then(|profile| resolve(doc, profile).ok())
                        .and_then(|profile| profile.as_stream().ok())
                        .and_then(|profile| profile.dict.get(b"N").and_then(Object::as_i64).ok());
                    Ok(match components {
                        Some(1) => ColorModel::Gray,
                        Some(3) => ColorModel::Rgb,
                        Some(4) => ColorModel::Cmyk,
                        _ => ColorModel::Unknown,
                    })
                }
                b"Indexed" | b"I" => {
                    let base = items
                        .get(1)
                        .map(|base| color_model(doc, base))
                        .transpose()?
                        .unwrap_or(ColorModel::Rgb);
                    let palette = match items.get(3).map(|lookup| resolve(doc, lookup)) {
                        Some(Ok(Object::String(bytes, _))) => bytes.clone(),
                        Some(Ok(Object::Stream(stream))) => {
                            if stream.dict.get(b"Filter").is_err() {
                                stream.content.clone()
                            } else {
                                stream
                                    .decompressed_content()
                                    .map_err(|e| format!("palette decompression failed: {}", e))?
                            }
                        }
                        _ => return Err("indexed color space without lookup table".to_string()),
                    };
                    Ok(ColorModel::Indexed {
                        base: Box::new(base),
                        palette,
                    })
                }
                b"CalGray" => Ok(ColorModel::Gray),
                b"CalRGB" | b"Lab" => Ok(ColorModel::Rgb),
                other => Ok(named_color_model(other)),
            }
        }
        _ => Ok(ColorModel::Unknown),
    }
}

fn named_color_model(name: &[u8]) -> ColorModel {
    match name {
        b"DeviceGray" | b"G" | b"CalGray" => ColorModel::Gray,
        b"DeviceRGB" | b"RGB" | b"CalRGB" => ColorModel::Rgb,
        b"DeviceCMYK" | b"CMYK" => ColorModel::Cmyk,
        _ => ColorModel::Unknown,
    }
}

/// Expand 1-bit rows (padded to whole bytes) into 8-bit gray.
///
/// For stencil masks a set bit is painted (black); otherwise 1 is white.
fn unpack_bits(samples: &[u8], width: usize, height: usize, is_mask: bool) -> std::result::Result<Vec<u8>, String> {
    let row_bytes = width.div_ceil(8);
    let needed = row_bytes
        .checked_mul(height)
        .ok_or_else(|| DIMENSIONS_TOO_LARGE.to_string())?;
    if samples.len() < needed {
        return Err("bilevel sample data too short".to_string());
    }

    let mut gray = Vec::with_capacity(width.saturating_mul(height));
    for row in samples.chunks(row_bytes).take(height) {
        for x in 0..width {
            let bit = (row[x / 8] >> (7 - (x % 8))) & 1;
            let white = (bit == 1) != is_mask;
            gray.push(if white { 255 } else { 0 });
        }
    }
    Ok(gray)
}

/// Convert CMYK bytes to RGB.
fn cmyk_to_rgb(cmyk: &[u8]) -> Vec<u8> {
    let mut rgb = Vec::with_capacity((cmyk.len() / 4) * 3);
    for chunk in cmyk.chunks_exact(4) {
        let k = 1.0 - f32::from(chunk[3]) / 255.0;
        for channel in &chunk[..3] {
            let value = 255.0 * (1.0 - f32::from(*channel) / 255.0) * k;
            rgb.push(value.round().clamp(0.0, 255.0) as u8);
        }
    }
    rgb
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::dictionary;

    fn doc() -> Document {
        Document::with_version("1.5")
    }

    #[test]
    fn test_cmyk_to_rgb() {
        assert_eq!(cmyk_to_rgb(&[0, 0, 0, 0]), vec![255, 255, 255]);
        assert_eq!(cmyk_to_rgb(&[0, 0, 0, 255]), vec![0, 0, 0]);
        assert_eq!(cmyk_to_rgb(&[255, 0, 0, 0]), vec![0, 255, 255]);
    }

    #[test]
    fn test_unpack_bits_pads_rows() {
        // 3x2 image: row bytes 0b101xxxxx, 0b010xxxxx
        let gray = unpack_bits(&[0b1010_0000, 0b0100_0000], 3, 2, false).unwrap();
        assert_eq!(gray, vec![255, 0, 255, 0, 255, 0]);

        let mask = unpack_bits(&[0b1000_0000], 1, 1, true).unwrap();
        assert_eq!(mask, vec![0]);
    }

    #[test]
    fn test_raw_rgb_samples() {
        let dict = dictionary! {
            "Width" => 2,
            "Height" => 1,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
        };
        let image = decode_raw_samples(&doc(), &dict, vec![255, 0, 0, 0, 0, 255]).unwrap();
        let rgb = image.to_rgb8();
        assert_eq!(rgb.get_pixel(0, 0).0, [255, 0, 0]);
        assert_eq!(rgb.get_pixel(1, 0).0, [0, 0, 255]);
    }

    #[test]
    fn test_indexed_samples_use_palette() {
        let dict = dictionary! {
            "Width" => 2,
            "Height" => 1,
            "BitsPerComponent" => 8,
            "ColorSpace" => vec![
                Object::Name(b"Indexed".to_vec()),
                Object::Name(b"DeviceRGB".to_vec()),
                Object::Integer(1),
                Object::String(vec![0, 0, 0, 10, 20, 30], lopdf::StringFormat::Hexadecimal),
            ],
        };
        let image = decode_raw_samples(&doc(), &dict, vec![1, 0]).unwrap();
        let rgb = image.to_rgb8();
        assert_eq!(rgb.get_pixel(0, 0).0, [10, 20, 30]);
        assert_eq!(rgb.get_pixel(1, 0).0, [0, 0, 0]);
    }

    #[test]
    fn test_unknown_color_space_infers_gray() {
        let dict = dictionary! { "Width" => 2, "Height" => 2 };
        let image = decode_raw_samples(&doc(), &dict, vec![0, 50, 100, 150]).unwrap();
        assert_eq!(image.to_luma8().get_pixel(1, 1).0, [150]);
    }

    #[test]
    fn test_short_samples_are_an_error() {
        let dict = dictionary! {
            "Width" => 4,
            "Height" => 4,
            "ColorSpace" => "DeviceRGB",
        };
        assert!(decode_raw_samples(&doc(), &dict, vec![0; 10]).is_err());
    }

    #[test]
    fn test_oversized_dimensions_are_an_error() {
        let cmyk = dictionary! {
            "Width" => 4_294_967_295i64,
            "Height" => 4_294_967_295i64,
            "ColorSpace" => "DeviceCMYK",
        };
        assert!(decode_raw_samples(&doc(), &cmyk, vec![0; 16]).is_err());

        let unknown = dictionary! {
            "Width" => 4_294_967_295i64,
            "Height" => 4_294_967_295i64,
        };
        assert!(decode_raw_samples(&doc(), &unknown, vec![0; 16]).is_err());

        let bilevel = dictionary! {
            "Width" => 4_294_967_295i64,
            "Height" => 4_294_967_295i64,
            "ImageMask" => true,
        };
        assert!(decode_raw_samples(&doc(), &bilevel, vec![0; 16]).is_err());
    }

    #[test]
    fn test_unsupported_filter_is_rejected() {
        let stream = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => 1,
                "Height" => 1,
                "Filter" => "JBIG2Decode",
            },
            vec![0],
        );
        let err = decode_image_stream(&doc(), &stream).unwrap_err();
        assert!(err.contains("JBIG2Decode"));
    }

    fn raw_gray_stream() -> Stream {
        Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => 1,
                "Height" => 1,
                "ColorSpace" => "DeviceGray",
                "BitsPerComponent" => 8,
            },
            vec![128],
        )
    }

    #[test]
    fn test_images_inside_forms_are_collected() {
        let mut doc = doc();
        let image_id = doc.add_object(raw_gray_stream());
        let inner_id = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Form",
                "Resources" => dictionary! { "XObject" => dictionary! { "Im1" => image_id } },
            },
            b"/Im1 Do".to_vec(),
        ));
        let outer_id = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Form",
                "Resources" => dictionary! { "XObject" => dictionary! { "Fm2" => inner_id, "Im1" => image_id } },
            },
            b"/Fm2 Do /Im1 Do".to_vec(),
        ));
        let page_resources = dictionary! { "XObject" => dictionary! { "Fm1" => outer_id } };

        let mut images = Vec::new();
        collect_images(&doc, 1, &page_resources, &mut Vec::new(), &mut images).unwrap();
        assert_eq!(images.len(), 2);
    }

    #[test]
    fn test_self_referencing_form_terminates() {
        let mut doc = doc();
        let image_id = doc.add_object(raw_gray_stream());
        let form_id = doc.new_object_id();
        doc.objects.insert(
            form_id,
            Object::Stream(Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Form",
                    "Resources" => dictionary! { "XObject" => dictionary! { "Fm1" => form_id, "Im1" => image_id } },
                },
                b"/Fm1 Do /Im1 Do".to_vec(),
            )),
        );
        let page_resources = dictionary! { "XObject" => dictionary! { "Fm1" => form_id } };

        let mut forms = Vec::new();
        let mut images = Vec::new();
        collect_images(&doc, 1, &page_resources, &mut forms, &mut images).unwrap();
        assert_eq!(images.len(), 1);
        assert!(forms.is_empty());
    }
}
