//! Image decoding with content-based format detection.
//!
//! Uploaded bytes are decoded in full before they are sent to the vision
//! model, so a corrupt or non-image buffer fails locally instead of costing
//! a remote call.

use image::{DynamicImage, GenericImageView, ImageFormat};
use std::io::Cursor;

use crate::error::{ServiceError, ServiceResult};

/// Formats the vision model accepts as inline data without conversion.
const INLINE_FORMATS: [ImageFormat; 3] = [ImageFormat::Png, ImageFormat::Jpeg, ImageFormat::WebP];

/// Result of decoding an image buffer.
#[derive(Debug, Clone, Copy)]
pub struct DecodedImage {
    /// Detected image format
    pub format: ImageFormat,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
}

/// A decoded image and the payload to upload for it.
#[derive(Debug, Clone)]
pub struct PreparedImage {
    pub decoded: DecodedImage,
    /// Bytes to send, encoded as `upload_format`
    pub bytes: Vec<u8>,
    pub upload_format: ImageFormat,
}

/// Decode an in-memory image on the blocking pool and prepare its upload.
///
/// PNG, JPEG and WebP uploads are the original bytes. Any other decodable
/// format (BMP, GIF, TIFF, ...) is re-encoded as PNG.
pub async fn prepare_image(bytes: Vec<u8>) -> ServiceResult<PreparedImage> {
    tokio::task::spawn_blocking(move || prepare_sync(bytes))
        .await
        .map_err(|e| ServiceError::Decode {
            message: format!("Task join error: {e}"),
        })?
}

fn prepare_sync(bytes: Vec<u8>) -> ServiceResult<PreparedImage> {
    let (decoded, image) = decode_bytes_sync(&bytes)?;
    if INLINE_FORMATS.contains(&decoded.format) {
        return Ok(PreparedImage {
            decoded,
            bytes,
            upload_format: decoded.format,
        });
    }

    let mut buffer = Cursor::new(Vec::new());
    image
        .write_to(&mut buffer, ImageFormat::Png)
        .map_err(|e| ServiceError::Encode {
            message: e.to_string(),
        })?;
    tracing::debug!(
        from = %format_to_string(decoded.format),
        "Re-encoded image as PNG for upload"
    );
    Ok(PreparedImage {
        decoded,
        bytes: buffer.into_inner(),
        upload_format: ImageFormat::Png,
    })
}

/// Synchronous decode from bytes (runs in spawn_blocking).
fn decode_bytes_sync(bytes: &[u8]) -> ServiceResult<(DecodedImage, DynamicImage)> {
    let reader = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| ServiceError::Decode {
            message: format!("Cannot detect image format: {e}"),
        })?;
    let format = reader.format().ok_or(ServiceError::UnsupportedFormat)?;
    let image = reader.decode().map_err(|e| ServiceError::Decode {
        message: e.to_string(),
    })?;

    let (width, height) = image.dimensions();
    let decoded = DecodedImage {
        format,
        width,
        height,
    };
    Ok((decoded, image))
}

/// Convert an ImageFormat to a string representation.
pub fn format_to_string(format: ImageFormat) -> String {
    match format {
        ImageFormat::Jpeg => "jpeg".to_string(),
        ImageFormat::Png => "png".to_string(),
        ImageFormat::WebP => "webp".to_string(),
        ImageFormat::Gif => "gif".to_string(),
        ImageFormat::Tiff => "tiff".to_string(),
        ImageFormat::Bmp => "bmp".to_string(),
        ImageFormat::Avif => "avif".to_string(),
        _ => "unknown".to_string(),
    }
}
