//! JPEG data-URI codec — the wire form of every face image.
//!
//! Images travel as `data:image/jpeg;base64,<bytes>` strings. Encoding
//! always uses JPEG at maximum quality with unwrapped standard base64.

use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use std::path::Path;

/// Prefix prepended to every encoded image.
pub const DATA_URI_PREFIX: &str = "data:image/jpeg;base64,";

const JPEG_QUALITY: u8 = 100;

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("empty image payload")]
    Empty,
}

/// Encode an image as a JPEG data URI.
///
/// Alpha is dropped (JPEG has no alpha channel) by converting to RGB8 first.
pub fn encode_data_uri(img: &DynamicImage) -> Result<String, CodecError> {
    let jpeg = encode_jpeg(img)?;
    let mut out = String::with_capacity(DATA_URI_PREFIX.len() + jpeg.len() * 4 / 3 + 4);
    out.push_str(DATA_URI_PREFIX);
    base64::engine::general_purpose::STANDARD.encode_string(&jpeg, &mut out);
    tracing::debug!(
        width = img.width(),
        height = img.height(),
        jpeg_bytes = jpeg.len(),
        "encoded face image"
    );
    Ok(out)
}

/// Encode an image to raw JPEG bytes at maximum quality.
pub fn encode_jpeg(img: &DynamicImage) -> Result<Vec<u8>, CodecError> {
    let rgb = img.to_rgb8();
    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, JPEG_QUALITY).encode_image(&rgb)?;
    Ok(buf)
}

/// Strip the data-URI header, returning only the base64 payload.
///
/// Everything up to and including the first comma is removed; a string
/// without a comma is assumed to be a bare payload already.
pub fn strip_data_uri(data: &str) -> &str {
    match data.split_once(',') {
        Some((_, payload)) => payload,
        None => data,
    }
}

/// Decode a data URI (or bare base64 payload) to the raw image bytes.
pub fn decode_data_uri(data: &str) -> Result<Vec<u8>, CodecError> {
    let payload: String = strip_data_uri(data)
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    if payload.is_empty() {
        return Err(CodecError::Empty);
    }
    Ok(base64::engine::general_purpose::STANDARD.decode(payload)?)
}

/// Decode a data URI into an image, guessing the format from its bytes.
pub fn decode_image(data: &str) -> Result<DynamicImage, CodecError> {
    let bytes = decode_data_uri(data)?;
    Ok(image::load_from_memory(&bytes)?)
}

/// Load an image from disk; stands in for the camera capture step.
pub fn load_image(path: &Path) -> Result<DynamicImage, CodecError> {
    Ok(image::open(path)?)
}

/// True if `bytes` starts with the JPEG SOI marker.
pub fn is_jpeg(bytes: &[u8]) -> bool {
    bytes.starts_with(&[0xFF, 0xD8])
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};

    fn gradient(width: u32, height: u32) -> DynamicImage {
        let img = RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x * 8) as u8, (y * 8) as u8, 128])
        });
        DynamicImage::ImageRgb8(img)
    }

    #[test]
    fn test_encode_has_prefix() {
        let uri = encode_data_uri(&gradient(16, 16)).unwrap();
        assert!(uri.starts_with(DATA_URI_PREFIX));
        assert!(!uri.contains('\n'));
    }

    #[test]
    fn test_decoded_payload_is_valid_jpeg() {
        let uri = encode_data_uri(&gradient(24, 12)).unwrap();
        let bytes = decode_data_uri(&uri).unwrap();
        assert!(is_jpeg(&bytes));

        let img = image::load_from_memory_with_format(&bytes, image::ImageFormat::Jpeg).unwrap();
        assert_eq!((img.width(), img.height()), (24, 12));
    }

    #[test]
    fn test_encode_drops_alpha() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(8, 8, Rgba([10, 20, 30, 40])));
        let uri = encode_data_uri(&img).unwrap();
        assert!(is_jpeg(&decode_data_uri(&uri).unwrap()));
    }

    #[test]
    fn test_strip_data_uri() {
        assert_eq!(strip_data_uri("data:image/jpeg;base64,QUJD"), "QUJD");
        assert_eq!(strip_data_uri("QUJD"), "QUJD");
    }

    #[test]
    fn test_decode_tolerates_line_breaks() {
        let bytes = decode_data_uri("data:image/jpeg;base64,QUJD\nREVG").unwrap();
        assert_eq!(bytes, b"ABCDEF");
    }

    #[test]
    fn test_decode_rejects_empty_and_garbage() {
        assert!(matches!(decode_data_uri("data:image/jpeg;base64,"), Err(CodecError::Empty)));
        assert!(matches!(decode_data_uri("!!!"), Err(CodecError::Base64(_))));
    }

    #[test]
    fn test_decode_image_roundtrip_dimensions() {
        let uri = encode_data_uri(&gradient(10, 20)).unwrap();
        let img = decode_image(&uri).unwrap();
        assert_eq!((img.width(), img.height()), (10, 20));
    }
}
