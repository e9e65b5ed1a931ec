//! Test fixtures: real PNG/JPEG blobs built with `image`, plus non-image payloads.

use axum_test::multipart::{MultipartForm, Part};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, RgbImage};
use rand::Rng;
use std::io::Cursor;

pub const COPY_THRESHOLD_BYTES: usize = 2_000_000;

/// Random RGB noise; compresses poorly, which keeps encoded sizes predictable.
pub fn noise(width: u32, height: u32) -> DynamicImage {
    let mut rng = rand::rng();
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |_, _| {
        image::Rgb([rng.random(), rng.random(), rng.random()])
    }))
}

pub fn create_test_png(width: u32, height: u32) -> Vec<u8> {
    let mut buffer = Vec::new();
    noise(width, height)
        .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
        .expect("Failed to encode PNG");
    buffer
}

/// A PNG padded with trailing zeros to exactly `size` bytes.
pub fn create_png_of_size(size: usize) -> Vec<u8> {
    let mut png = create_test_png(64, 64);
    assert!(png.len() <= size);
    png.resize(size, 0);
    png
}

/// A maximum-quality noisy JPEG larger than the copy threshold, with its dimensions.
pub fn create_large_jpeg() -> (Vec<u8>, (u32, u32)) {
    let mut side = 1000;
    loop {
        let mut buffer = Vec::new();
        JpegEncoder::new_with_quality(&mut buffer, 100)
            .encode_image(&noise(side, side).to_rgb8())
            .expect("Failed to encode JPEG");
        if buffer.len() > COPY_THRESHOLD_BYTES {
            return (buffer, (side, side));
        }
        side += 250;
    }
}

pub fn create_test_pdf() -> Vec<u8> {
    b"%PDF-1.4\n1 0 obj\n<< /Type /Catalog >>\nendobj\ntrailer\n<< /Root 1 0 R >>\n%%EOF\n"
        .to_vec()
}

pub fn create_test_mp4() -> Vec<u8> {
    let mut data = vec![0x00, 0x00, 0x00, 0x18];
    data.extend_from_slice(b"ftypmp42");
    data.extend_from_slice(&[0u8; 12]);
    data
}

/// Multipart form with a single `file` part.
pub fn file_form(data: Vec<u8>, filename: &str, content_type: &str) -> MultipartForm {
    let part = Part::bytes(bytes::Bytes::from(data))
        .file_name(filename.to_string())
        .mime_type(content_type.to_string());
    MultipartForm::new().add_part("file", part)
}
