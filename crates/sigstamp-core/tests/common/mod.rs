//! Fixture builders shared by the integration tests

#![allow(dead_code)]

use image::{ImageFormat, Rgba, RgbaImage};
use lopdf::{dictionary, Object, Stream};
use sigstamp_core::SignatureImage;
use std::io::Cursor;
use std::sync::Once;

static TRACING: Once = Once::new();

/// Route `tracing` output through the test harness's captured writer
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::DEBUG)
            .try_init();
    });
}

pub fn png(image: &RgbaImage) -> Vec<u8> {
    let mut out = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
        .unwrap();
    out
}

/// Opaque white page of the given pixel size
pub fn paper(width: u32, height: u32) -> Vec<u8> {
    png(&RgbaImage::from_pixel(
        width,
        height,
        Rgba([255, 255, 255, 255]),
    ))
}

/// Solid ink block, as a signature
pub fn ink_signature(width: u32, height: u32, color: [u8; 4]) -> SignatureImage {
    SignatureImage::from_png(png(&RgbaImage::from_pixel(width, height, Rgba(color)))).unwrap()
}

/// US Letter PDF where page `n` draws the text "Page n"
pub fn letter_pdf(page_count: usize) -> Vec<u8> {
    let mut doc = lopdf::Document::with_version("1.7");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids = Vec::new();
    for n in 1..=page_count {
        let content = format!("BT /F1 24 Tf 72 700 Td (Page {}) Tj ET\n", n);
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        kids.push(Object::Reference(page_id));
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count as i64,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}
