//! Resizing of processed output to the frame size.
//!
//! The editor already renders at the frame size, but a submitted crop may come
//! from any client, so the stored output is normalised before it is accepted.

use image::imageops::FilterType;

use super::{decode_image_no_orientation, DecodeError, DecodedImage};

/// Resample an image to exact dimensions with Lanczos3.
///
/// # Errors
///
/// Returns `DecodeError::InvalidFormat` for a zero target dimension and
/// `DecodeError::CorruptedFile` if the pixel buffer does not match the
/// declared size.
pub fn resize(image: &DecodedImage, width: u32, height: u32) -> Result<DecodedImage, DecodeError> {
    if width == 0 || height == 0 {
        return Err(DecodeError::InvalidFormat);
    }

    if image.width == width && image.height == height {
        return Ok(image.clone());
    }

    let rgb_image = image
        .to_rgb_image()
        .ok_or_else(|| DecodeError::CorruptedFile("Failed to create RgbImage".to_string()))?;

    let resized = image::imageops::resize(&rgb_image, width, height, FilterType::Lanczos3);

    Ok(DecodedImage::from_rgb_image(resized))
}

/// Decode processed output and bring it to exactly `width` x `height`.
///
/// Output that already matches the frame is returned as decoded; anything
/// else is resampled. Alpha is discarded.
pub fn normalize_to_frame(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> Result<DecodedImage, DecodeError> {
    let decoded = decode_image_no_orientation(bytes)?;
    if decoded.width != width || decoded.height != height {
        tracing::debug!(
            from_width = decoded.width,
            from_height = decoded.height,
            width,
            height,
            "resampling processed output to frame size"
        );
    }
    resize(&decoded, width, height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::codecs::png::PngEncoder;
    use image::{ExtendedColorType, ImageEncoder};

    fn create_test_image(width: u32, height: u32) -> DecodedImage {
        // Create a simple gradient image for testing
        let mut pixels = Vec::with_capacity((width * height * 3) as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.push(((x * 255) / width.max(1)) as u8); // R
                pixels.push(((y * 255) / height.max(1)) as u8); // G
                pixels.push(128); // B
            }
        }
        DecodedImage::new(width, height, pixels)
    }

    fn png_bytes(img: &DecodedImage) -> Vec<u8> {
        let mut out = Vec::new();
        PngEncoder::new(&mut out)
            .write_image(&img.pixels, img.width, img.height, ExtendedColorType::Rgb8)
            .unwrap();
        out
    }

    #[test]
    fn test_resize_basic() {
        let img = create_test_image(100, 50);
        let resized = resize(&img, 50, 25).unwrap();

        assert_eq!(resized.width, 50);
        assert_eq!(resized.height, 25);
        assert_eq!(resized.pixels.len(), 50 * 25 * 3);
    }

    #[test]
    fn test_resize_same_dimensions() {
        let img = create_test_image(100, 50);
        let resized = resize(&img, 100, 50).unwrap();

        assert_eq!(resized, img);
    }

    #[test]
    fn test_resize_zero_dimensions_error() {
        let img = create_test_image(100, 50);

        assert!(resize(&img, 0, 50).is_err());
        assert!(resize(&img, 50, 0).is_err());
    }

    #[test]
    fn test_normalize_matching_size_is_lossless() {
        let img = create_test_image(60, 45);
        let normalized = normalize_to_frame(&png_bytes(&img), 60, 45).unwrap();

        assert_eq!(normalized, img);
    }

    #[test]
    fn test_normalize_resamples_mismatched_size() {
        let img = create_test_image(120, 90);
        let normalized = normalize_to_frame(&png_bytes(&img), 600, 448).unwrap();

        assert_eq!(normalized.width, 600);
        assert_eq!(normalized.height, 448);
        assert_eq!(normalized.pixels.len(), 600 * 448 * 3);
    }

    #[test]
    fn test_normalize_rejects_garbage() {
        assert!(normalize_to_frame(b"not an image", 10, 10).is_err());
    }
}
