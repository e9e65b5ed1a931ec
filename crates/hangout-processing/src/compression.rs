use anyhow::{Context, Result};
use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageReader};
use std::io::Cursor;

/// Files at or below this many bytes are copied verbatim instead of re-encoded.
/// Decimal, not binary.
pub const SIZE_THRESHOLD_BYTES: u64 = 2_000_000;

/// JPEG quality for re-encoded images (0-100).
pub const JPEG_QUALITY: u8 = 60;

/// Decode an image from raw bytes. The format is guessed from the content.
pub fn decode(data: &[u8]) -> Result<DynamicImage> {
    let reader = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .context("Failed to read image header")?;
    let format = reader.format();
    reader
        .decode()
        .with_context(|| format!("Failed to decode image (detected format: {:?})", format))
}

/// Encode to baseline JPEG at [`JPEG_QUALITY`]. Alpha is dropped.
pub fn encode_jpeg(img: &DynamicImage) -> Result<Bytes> {
    let rgb_img = img.to_rgb8();
    let mut buffer = Vec::new();

    JpegEncoder::new_with_quality(&mut buffer, JPEG_QUALITY)
        .encode_image(&rgb_img)
        .context("Failed to encode JPEG")?;

    Ok(Bytes::from(buffer))
}

/// Decode then re-encode as JPEG. CPU-bound; callers run it on the blocking pool.
pub fn recompress(data: &[u8]) -> Result<(Bytes, (u32, u32))> {
    let img = decode(data)?;
    let dimensions = (img.width(), img.height());
    let encoded = encode_jpeg(&img)?;

    tracing::debug!(
        width = dimensions.0,
        height = dimensions.1,
        input_bytes = data.len(),
        output_bytes = encoded.len(),
        quality = JPEG_QUALITY,
        "Image re-encoded as JPEG"
    );

    Ok((encoded, dimensions))
}
