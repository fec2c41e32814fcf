//! Embed a signature image into the first page of a PDF
//!
//! Only page 1 is touched. Its resources are copied onto the page before the
//! image XObject is added, so dictionaries shared with other pages (by
//! reference or through page-tree inheritance) stay byte-for-byte the same.

use flate2::write::ZlibEncoder;
use flate2::Compression;
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use std::io::{Cursor, Write};

use crate::coords::{Size, TargetRect};
use crate::error::{Result, StampError};
use crate::signature::{SignatureFormat, SignatureImage};

pub const PDF_OUTPUT_MIME: &str = "application/pdf";

/// Resource names are `SigStamp0`, `SigStamp1`, ... first free one wins
const XOBJECT_PREFIX: &str = "SigStamp";

/// Page-tree attributes are inherited at most this many levels up
const MAX_TREE_DEPTH: usize = 64;

/// Visible page area in default user space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Draws a signature onto PDF documents
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfCompositor;

impl PdfCompositor {
    /// Parse the PDF and locate its first page
    pub fn load<'a>(&self, bytes: &'a [u8]) -> Result<LoadedPdf<'a>> {
        let document = Document::load_mem(bytes)
            .map_err(|e| StampError::DecodeError(format!("Failed to parse PDF: {}", e)))?;

        let pages = document.get_pages();
        let page_count = pages.len();
        let (_, first_page) = pages
            .into_iter()
            .next()
            .ok_or_else(|| StampError::DecodeError("PDF has no pages".to_string()))?;

        let page_box = media_box(&document, first_page)?;
        tracing::debug!(page_count, ?page_box, "PDF loaded");

        Ok(LoadedPdf {
            source: bytes,
            document,
            first_page,
            page_box,
            page_count,
        })
    }
}

/// A parsed PDF whose first page can receive a signature
#[derive(Debug)]
pub struct LoadedPdf<'a> {
    source: &'a [u8],
    document: Document,
    first_page: ObjectId,
    page_box: PageBox,
    page_count: usize,
}

impl LoadedPdf<'_> {
    /// Size of the first page in points
    pub fn native_size(&self) -> Size {
        Size::new(self.page_box.width, self.page_box.height)
    }

    pub fn page_box(&self) -> PageBox {
        self.page_box
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// Draw `signature` into `rect` (page space, relative to the media box
    /// origin) on the first page and serialize the result.
    ///
    /// With no stamp the source bytes are returned as they are.
    pub fn composite(self, stamp: Option<(&SignatureImage, TargetRect)>) -> Result<Vec<u8>> {
        let Some((signature, rect)) = stamp else {
            return Ok(self.source.to_vec());
        };

        rect.ensure_drawable()?;

        let LoadedPdf {
            mut document,
            first_page,
            page_box,
            ..
        } = self;

        let pixels = decode_png(signature)?;
        let image_id = add_image_xobject(&mut document, &pixels)?;
        let name = attach_xobject(&mut document, first_page, image_id)?;

        let draw = format!(
            "q {} 0 0 {} {} {} cm /{} Do Q\n",
            fmt_num(rect.width),
            fmt_num(rect.height),
            fmt_num(page_box.x + rect.x),
            fmt_num(page_box.y + rect.y),
            name
        );
        wrap_page_contents(&mut document, first_page, draw.into_bytes())?;

        let mut output = Vec::new();
        document
            .save_to(&mut output)
            .map_err(|e| StampError::DecodeError(format!("Failed to write PDF: {}", e)))?;

        tracing::debug!(xobject = %name, bytes = output.len(), "signature embedded on page 1");
        Ok(output)
    }
}

/// One-shot form: parse `base`, draw `signature` at `rect` on page 1 when
/// both are present, serialize.
pub fn composite_pdf(
    base: &[u8],
    signature: Option<&SignatureImage>,
    rect: Option<TargetRect>,
) -> Result<Vec<u8>> {
    PdfCompositor.load(base)?.composite(signature.zip(rect))
}

/// Signature pixels split into 8-bit RGB and an optional 8-bit alpha plane
struct DecodedSignature {
    width: u32,
    height: u32,
    rgb: Vec<u8>,
    alpha: Option<Vec<u8>>,
}

fn decode_png(signature: &SignatureImage) -> Result<DecodedSignature> {
    let format = signature.format();
    if format != SignatureFormat::Png {
        return Err(StampError::UnsupportedImageFormat(format!(
            "PDF embedding requires PNG, got {:?}",
            format
        )));
    }

    let unsupported = |e: png::DecodingError| StampError::UnsupportedImageFormat(e.to_string());

    let mut decoder = png::Decoder::new(Cursor::new(signature.as_bytes()));
    decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);
    let mut reader = decoder.read_info().map_err(unsupported)?;
    let mut buf = vec![0; reader.output_buffer_size()];
    let frame = reader.next_frame(&mut buf).map_err(unsupported)?;
    let data = &buf[..frame.buffer_size()];

    if frame.bit_depth != png::BitDepth::Eight {
        return Err(StampError::UnsupportedImageFormat(format!(
            "unexpected PNG bit depth {:?}",
            frame.bit_depth
        )));
    }

    let pixel_count = frame.width as usize * frame.height as usize;
    let mut rgb = Vec::with_capacity(pixel_count * 3);
    let mut alpha = Vec::with_capacity(pixel_count);

    match frame.color_type {
        png::ColorType::Rgba => {
            for px in data.chunks_exact(4) {
                rgb.extend_from_slice(&px[..3]);
                alpha.push(px[3]);
            }
        }
        png::ColorType::Rgb => rgb.extend_from_slice(data),
        png::ColorType::GrayscaleAlpha => {
            for px in data.chunks_exact(2) {
                rgb.extend_from_slice(&[px[0], px[0], px[0]]);
                alpha.push(px[1]);
            }
        }
        png::ColorType::Grayscale => {
            for &g in data {
                rgb.extend_from_slice(&[g, g, g]);
            }
        }
        other => {
            return Err(StampError::UnsupportedImageFormat(format!(
                "unexpected PNG color type {:?}",
                other
            )))
        }
    }

    // Fully opaque images don't need a soft mask
    let alpha = if alpha.is_empty() || alpha.iter().all(|&a| a == u8::MAX) {
        None
    } else {
        Some(alpha)
    };

    Ok(DecodedSignature {
        width: frame.width,
        height: frame.height,
        rgb,
        alpha,
    })
}

fn deflate(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

fn add_image_xobject(doc: &mut Document, pixels: &DecodedSignature) -> Result<ObjectId> {
    let mut image_dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => pixels.width as i64,
        "Height" => pixels.height as i64,
        "ColorSpace" => "DeviceRGB",
        "BitsPerComponent" => 8,
        "Filter" => "FlateDecode",
    };

    if let Some(alpha) = &pixels.alpha {
        let smask = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => pixels.width as i64,
                "Height" => pixels.height as i64,
                "ColorSpace" => "DeviceGray",
                "BitsPerComponent" => 8,
                "Filter" => "FlateDecode",
            },
            deflate(alpha)?,
        );
        let smask_id = doc.add_object(smask);
        image_dict.set("SMask", Object::Reference(smask_id));
    }

    let image = Stream::new(image_dict, deflate(&pixels.rgb)?);
    Ok(doc.add_object(image))
}

/// Register `image_id` in page 1's XObject resources under a free name.
fn attach_xobject(doc: &mut Document, page_id: ObjectId, image_id: ObjectId) -> Result<String> {
    let mut resources = inherited_resources(doc, page_id)?;

    let mut xobjects = match resources.get(b"XObject") {
        Ok(Object::Dictionary(dict)) => dict.clone(),
        Ok(Object::Reference(id)) => doc
            .get_object(*id)
            .and_then(|o| o.as_dict())
            .map(|d| d.clone())
            .map_err(|_| StampError::DecodeError("XObject resources are not a dictionary".to_string()))?,
        Ok(_) => {
            return Err(StampError::DecodeError(
                "XObject resources are not a dictionary".to_string(),
            ))
        }
        Err(_) => Dictionary::new(),
    };

    let name = (0..)
        .map(|n| format!("{}{}", XOBJECT_PREFIX, n))
        .find(|candidate| !xobjects.has(candidate.as_bytes()))
        .unwrap_or_else(|| XOBJECT_PREFIX.to_string());

    xobjects.set(name.as_bytes().to_vec(), Object::Reference(image_id));
    resources.set("XObject", Object::Dictionary(xobjects));

    page_dict_mut(doc, page_id)?.set("Resources", Object::Dictionary(resources));
    Ok(name)
}

/// Page resources, following `Parent` links, copied so they can be edited
/// without touching anything another page points at.
fn inherited_resources(doc: &Document, page_id: ObjectId) -> Result<Dictionary> {
    let mut current = Some(page_id);
    let mut depth = 0;

    while let Some(id) = current {
        if depth > MAX_TREE_DEPTH {
            break;
        }
        depth += 1;

        let dict = doc
            .get_object(id)
            .and_then(|o| o.as_dict())
            .map_err(|_| StampError::DecodeError("page is not a dictionary".to_string()))?;

        match dict.get(b"Resources") {
            Ok(Object::Dictionary(res)) => return Ok(res.clone()),
            Ok(Object::Reference(res_id)) => {
                return doc
                    .get_object(*res_id)
                    .and_then(|o| o.as_dict())
                    .map(|d| d.clone())
                    .map_err(|_| {
                        StampError::DecodeError("page resources are not a dictionary".to_string())
                    });
            }
            _ => {}
        }

        current = dict.get(b"Parent").and_then(|p| p.as_reference()).ok();
    }

    Ok(Dictionary::new())
}

/// Wrap the page's existing content in `q ... Q` and append `draw` after it.
fn wrap_page_contents(doc: &mut Document, page_id: ObjectId, draw: Vec<u8>) -> Result<()> {
    let existing: Vec<Object> = {
        let page = doc
            .get_object(page_id)
            .and_then(|o| o.as_dict())
            .map_err(|_| StampError::DecodeError("page is not a dictionary".to_string()))?;

        match page.get(b"Contents") {
            Ok(Object::Reference(id)) => match doc.get_object(*id) {
                Ok(Object::Array(parts)) => parts.clone(),
                _ => vec![Object::Reference(*id)],
            },
            Ok(Object::Array(parts)) => parts.clone(),
            _ => Vec::new(),
        }
    };

    let mut contents = Vec::with_capacity(existing.len() + 2);
    let draw = if existing.is_empty() {
        draw
    } else {
        let save_id = doc.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
        contents.push(Object::Reference(save_id));
        contents.extend(existing);

        let mut restored = b"\nQ\n".to_vec();
        restored.extend_from_slice(&draw);
        restored
    };
    let draw_id = doc.add_object(Stream::new(Dictionary::new(), draw));
    contents.push(Object::Reference(draw_id));

    page_dict_mut(doc, page_id)?.set("Contents", Object::Array(contents));
    Ok(())
}

fn page_dict_mut(doc: &mut Document, page_id: ObjectId) -> Result<&mut Dictionary> {
    doc.get_object_mut(page_id)
        .and_then(|o| o.as_dict_mut())
        .map_err(|_| StampError::DecodeError("page is not a dictionary".to_string()))
}

/// First page's `MediaBox`, which may be inherited from the page tree
fn media_box(doc: &Document, page_id: ObjectId) -> Result<PageBox> {
    let mut current = Some(page_id);
    let mut depth = 0;

    while let Some(id) = current {
        if depth > MAX_TREE_DEPTH {
            break;
        }
        depth += 1;

        let dict = doc
            .get_object(id)
            .and_then(|o| o.as_dict())
            .map_err(|_| StampError::DecodeError("page is not a dictionary".to_string()))?;

        if let Some(page_box) = parse_rect(doc, dict.get(b"MediaBox").ok()) {
            return Ok(page_box);
        }

        current = dict.get(b"Parent").and_then(|p| p.as_reference()).ok();
    }

    Err(StampError::DecodeError(
        "first page has no usable MediaBox".to_string(),
    ))
}

fn parse_rect(doc: &Document, raw: Option<&Object>) -> Option<PageBox> {
    let resolved = match raw? {
        Object::Reference(id) => doc.get_object(*id).ok()?,
        other => other,
    };
    let arr = resolved.as_array().ok()?;
    if arr.len() != 4 {
        return None;
    }

    let llx = obj_to_f64(&arr[0])?;
    let lly = obj_to_f64(&arr[1])?;
    let urx = obj_to_f64(&arr[2])?;
    let ury = obj_to_f64(&arr[3])?;

    let page_box = PageBox {
        x: llx.min(urx),
        y: lly.min(ury),
        width: (urx - llx).abs(),
        height: (ury - lly).abs(),
    };
    if page_box.width > 0.0 && page_box.height > 0.0 {
        Some(page_box)
    } else {
        None
    }
}

fn obj_to_f64(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(f) => Some(f64::from(*f)),
        _ => None,
    }
}

/// Content-stream number: at most four decimals, no trailing zeros
fn fmt_num(value: f64) -> String {
    let s = format!("{:.4}", value);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" || s.is_empty() {
        "0".to_string()
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn create_test_pdf(page_count: usize) -> Vec<u8> {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();

        let mut kids = Vec::new();
        for n in 0..page_count {
            let content = format!("BT /F1 12 Tf 72 720 Td (Page {}) Tj ET", n + 1);
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
                "Contents" => content_id,
            });
            kids.push(Object::Reference(page_id));
        }

        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => page_count as i64,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).unwrap();
        buffer
    }

    fn signature_png(rgba: [u8; 4]) -> SignatureImage {
        let mut out = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut out, 2, 2);
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder.write_header().unwrap();
            writer.write_image_data(&rgba.repeat(4)).unwrap();
        }
        SignatureImage::from_png(out).unwrap()
    }

    fn rect() -> TargetRect {
        TargetRect {
            x: 100.0,
            y: 594.0,
            width: 255.0,
            height: 198.0,
        }
    }

    fn first_page(doc: &Document) -> ObjectId {
        *doc.get_pages().get(&1).unwrap()
    }

    #[test]
    fn test_native_size_is_first_page_media_box() {
        let pdf = create_test_pdf(1);
        let loaded = PdfCompositor.load(&pdf).unwrap();
        assert_eq!(loaded.native_size(), Size::new(612.0, 792.0));
        assert_eq!(loaded.page_count(), 1);
    }

    #[test]
    fn test_passthrough_returns_source() {
        let pdf = create_test_pdf(2);
        assert_eq!(composite_pdf(&pdf, None, None).unwrap(), pdf);
        let sig = signature_png([0, 0, 0, 255]);
        assert_eq!(composite_pdf(&pdf, Some(&sig), None).unwrap(), pdf);
    }

    #[test]
    fn test_embeds_image_on_first_page() {
        let pdf = create_test_pdf(1);
        let sig = signature_png([0, 0, 0, 128]);
        let out = composite_pdf(&pdf, Some(&sig), Some(rect())).unwrap();
        assert!(out.starts_with(b"%PDF-"));

        let doc = Document::load_mem(&out).unwrap();
        let page_id = first_page(&doc);
        let content = String::from_utf8(doc.get_page_content(page_id).unwrap()).unwrap();
        assert!(content.starts_with("q\n"), "content: {}", content);
        assert!(content.contains("(Page 1) Tj"));
        assert!(content.contains("Q\nq 255 0 0 198 100 594 cm /SigStamp0 Do Q"));

        let page = doc.get_object(page_id).unwrap().as_dict().unwrap();
        let resources = page.get(b"Resources").unwrap().as_dict().unwrap();
        let xobjects = resources.get(b"XObject").unwrap().as_dict().unwrap();
        let image_id = xobjects.get(b"SigStamp0").unwrap().as_reference().unwrap();
        let image = doc.get_object(image_id).unwrap().as_stream().unwrap();
        assert_eq!(image.dict.get(b"Width").unwrap().as_i64().unwrap(), 2);
        assert_eq!(image.dict.get(b"Subtype").unwrap().as_name().unwrap(), b"Image");
        // Translucent ink carries a soft mask
        assert!(image.dict.has(b"SMask"));
    }

    #[test]
    fn test_opaque_signature_has_no_smask() {
        let pdf = create_test_pdf(1);
        let sig = signature_png([0, 0, 0, 255]);
        let out = composite_pdf(&pdf, Some(&sig), Some(rect())).unwrap();
        let doc = Document::load_mem(&out).unwrap();
        let page = doc.get_object(first_page(&doc)).unwrap().as_dict().unwrap();
        let xobjects = page
            .get(b"Resources")
            .unwrap()
            .as_dict()
            .unwrap()
            .get(b"XObject")
            .unwrap()
            .as_dict()
            .unwrap();
        let image_id = xobjects.get(b"SigStamp0").unwrap().as_reference().unwrap();
        let image = doc.get_object(image_id).unwrap().as_stream().unwrap();
        assert!(!image.dict.has(b"SMask"));
    }

    #[test]
    fn test_name_collision_picks_next_free() {
        let pdf = create_test_pdf(1);
        let sig = signature_png([0, 0, 0, 255]);
        let once = composite_pdf(&pdf, Some(&sig), Some(rect())).unwrap();
        let twice = composite_pdf(&once, Some(&sig), Some(rect())).unwrap();

        let doc = Document::load_mem(&twice).unwrap();
        let content = String::from_utf8(doc.get_page_content(first_page(&doc)).unwrap()).unwrap();
        assert!(content.contains("/SigStamp0 Do"));
        assert!(content.contains("/SigStamp1 Do"));
    }

    #[test]
    fn test_media_box_offset_is_applied() {
        let mut doc = Document::load_mem(&create_test_pdf(1)).unwrap();
        let page_id = first_page(&doc);
        doc.get_object_mut(page_id)
            .unwrap()
            .as_dict_mut()
            .unwrap()
            .set(
                "MediaBox",
                vec![10.into(), 20.into(), 622.into(), 812.into()],
            );
        let mut pdf = Vec::new();
        doc.save_to(&mut pdf).unwrap();

        let loaded = PdfCompositor.load(&pdf).unwrap();
        assert_eq!(loaded.native_size(), Size::new(612.0, 792.0));

        let sig = signature_png([0, 0, 0, 255]);
        let target = TargetRect {
            x: 0.0,
            y: 0.0,
            width: 50.0,
            height: 25.0,
        };
        let out = loaded.composite(Some((&sig, target))).unwrap();
        let doc = Document::load_mem(&out).unwrap();
        let content = String::from_utf8(doc.get_page_content(first_page(&doc)).unwrap()).unwrap();
        assert!(content.contains("q 50 0 0 25 10 20 cm /SigStamp0 Do Q"), "content: {}", content);
    }

    #[test]
    fn test_inherited_media_box_and_resources() {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![Object::Reference(page_id)],
                "Count" => 1,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
                "Resources" => dictionary! {
                    "Font" => dictionary! { "F1" => font_id },
                },
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        let mut pdf = Vec::new();
        doc.save_to(&mut pdf).unwrap();

        let loaded = PdfCompositor.load(&pdf).unwrap();
        assert_eq!(loaded.native_size(), Size::new(595.0, 842.0));

        let sig = signature_png([0, 0, 0, 255]);
        let out = loaded.composite(Some((&sig, rect()))).unwrap();
        let doc = Document::load_mem(&out).unwrap();

        // Page now has its own resources: inherited font plus the signature
        let page = doc.get_object(page_id).unwrap().as_dict().unwrap();
        let resources = page.get(b"Resources").unwrap().as_dict().unwrap();
        assert!(resources.get(b"Font").unwrap().as_dict().unwrap().has(b"F1"));
        assert!(resources.get(b"XObject").unwrap().as_dict().unwrap().has(b"SigStamp0"));

        // The page tree node is unchanged
        let pages = doc.get_object(pages_id).unwrap().as_dict().unwrap();
        let inherited = pages.get(b"Resources").unwrap().as_dict().unwrap();
        assert!(!inherited.has(b"XObject"));

        // No prior content, so no q/Q wrapper
        let content = String::from_utf8(doc.get_page_content(page_id).unwrap()).unwrap();
        assert_eq!(content, "q 255 0 0 198 100 594 cm /SigStamp0 Do Q\n");
    }

    #[test]
    fn test_invalid_pdf_is_decode_error() {
        let err = composite_pdf(b"%PDF-1.7 but not really", None, None).unwrap_err();
        assert!(matches!(err, StampError::DecodeError(_)));
    }

    #[test]
    fn test_non_png_signature_is_unsupported() {
        let pdf = create_test_pdf(1);
        let jpeg = SignatureImage::from_bytes(vec![0xFF, 0xD8, 0xFF, 0xE0, 0, 0]).unwrap();
        let err = composite_pdf(&pdf, Some(&jpeg), Some(rect())).unwrap_err();
        assert!(matches!(err, StampError::UnsupportedImageFormat(_)));
    }

    #[test]
    fn test_truncated_png_is_unsupported() {
        let pdf = create_test_pdf(1);
        let sig = signature_png([0, 0, 0, 255]);
        let truncated = SignatureImage::from_bytes(sig.as_bytes()[..20].to_vec()).unwrap();
        let err = composite_pdf(&pdf, Some(&truncated), Some(rect())).unwrap_err();
        assert!(matches!(err, StampError::UnsupportedImageFormat(_)));
    }

    #[test]
    fn test_negative_size_is_degenerate() {
        let pdf = create_test_pdf(1);
        let sig = signature_png([0, 0, 0, 255]);
        let flipped = [
            TargetRect {
                width: -255.0,
                ..rect()
            },
            TargetRect {
                height: -198.0,
                ..rect()
            },
        ];
        for target in flipped {
            let err = composite_pdf(&pdf, Some(&sig), Some(target)).unwrap_err();
            assert!(matches!(err, StampError::DegenerateLayout(_)), "{:?}", target);
        }
    }

    #[test]
    fn test_non_finite_rect_is_degenerate() {
        let pdf = create_test_pdf(1);
        let sig = signature_png([0, 0, 0, 255]);
        let target = TargetRect {
            y: f64::INFINITY,
            ..rect()
        };
        let err = composite_pdf(&pdf, Some(&sig), Some(target)).unwrap_err();
        assert!(matches!(err, StampError::DegenerateLayout(_)));
    }

    #[test]
    fn test_output_is_deterministic() {
        let pdf = create_test_pdf(2);
        let sig = signature_png([10, 20, 30, 200]);
        let a = composite_pdf(&pdf, Some(&sig), Some(rect())).unwrap();
        let b = composite_pdf(&pdf, Some(&sig), Some(rect())).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_fmt_num() {
        assert_eq!(fmt_num(255.0), "255");
        assert_eq!(fmt_num(254.99999999), "255");
        assert_eq!(fmt_num(0.5), "0.5");
        assert_eq!(fmt_num(-0.00001), "0");
        assert_eq!(fmt_num(12.34567), "12.3457");
    }
}
