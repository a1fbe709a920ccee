//! Still-image PNG encoding.

use crate::frame::Frame;
use crate::result::{RevelarError, RevelarResult};

/// Encode a frame as PNG bytes.
///
/// # Errors
///
/// Returns an error if the PNG encoder rejects the frame.
pub fn encode_png(frame: &Frame) -> RevelarResult<Vec<u8>> {
    let mut output = Vec::new();

    {
        let mut encoder = png::Encoder::new(&mut output, frame.width(), frame.height());
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);

        let mut writer = encoder
            .write_header()
            .map_err(|e| RevelarError::ImageProcessing {
                message: format!("failed to write PNG header: {e}"),
            })?;

        writer
            .write_image_data(frame.rgba())
            .map_err(|e| RevelarError::ImageProcessing {
                message: format!("failed to write PNG data: {e}"),
            })?;
    }

    Ok(output)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_produces_valid_png() {
        let frame = Frame::from_rgba(vec![255, 0, 0, 255], 1, 1).unwrap();
        let png_data = encode_png(&frame).unwrap();
        assert_eq!(&png_data[0..8], &[137, 80, 78, 71, 13, 10, 26, 10]);
    }

    #[test]
    fn test_encode_round_trips_pixels() {
        let frame = Frame::from_rgba(vec![1, 2, 3, 4, 5, 6, 7, 8], 2, 1).unwrap();
        let png_data = encode_png(&frame).unwrap();
        let decoded = Frame::from_png_bytes(&png_data).unwrap();
        assert_eq!(decoded, frame);
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let frame = Frame::from_rgba(vec![128; 4 * 9], 3, 3).unwrap();
        assert_eq!(encode_png(&frame).unwrap(), encode_png(&frame).unwrap());
    }
}
