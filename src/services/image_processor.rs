// src/services/image_processor.rs
use crate::errors::GlossyError;
use image::{GenericImageView, ImageFormat};

pub struct ImageProcessor;

impl ImageProcessor {
    pub fn new() -> Self {
        Self
    }

    pub fn validate_image(&self, data: &[u8]) -> Result<(u32, u32), GlossyError> {
        let img = image::load_from_memory(data)
            .map_err(|e| GlossyError::ImageProcessing(format!("invalid image format: {e}")))?;

        let (width, height) = img.dimensions();

        if width > 4096 || height > 4096 {
            return Err(GlossyError::ImageProcessing(
                "image dimensions exceed 4096x4096".to_string(),
            ));
        }

        Ok((width, height))
    }

    /// Downscale to fit within `max_size` before dispatching to the backend;
    /// re-encodes as PNG only when a resize actually happens.
    pub fn resize_if_needed(&self, data: &[u8], max_size: u32) -> Result<Vec<u8>, GlossyError> {
        let img = image::load_from_memory(data)
            .map_err(|e| GlossyError::ImageProcessing(format!("failed to load image: {e}")))?;

        let (width, height) = img.dimensions();

        if width <= max_size && height <= max_size {
            return Ok(data.to_vec());
        }

        let ratio = (max_size as f32 / width.max(height) as f32).min(1.0);
        let new_width = (width as f32 * ratio) as u32;
        let new_height = (height as f32 * ratio) as u32;

        let resized = img.resize(new_width, new_height, image::imageops::FilterType::Lanczos3);

        let mut output = Vec::new();
        resized
            .write_to(&mut std::io::Cursor::new(&mut output), ImageFormat::Png)
            .map_err(|e| {
                GlossyError::ImageProcessing(format!("failed to encode resized image: {e}"))
            })?;

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, Rgba, RgbaImage};

    fn png_of_size(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba([120, 40, 200, 255]));
        let mut bytes = Vec::new();
        DynamicImage::ImageRgba8(img)
            .write_to(&mut std::io::Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn valid_png_passes_validation() {
        let processor = ImageProcessor::new();
        let (w, h) = processor.validate_image(&png_of_size(32, 16)).unwrap();
        assert_eq!((w, h), (32, 16));
    }

    #[test]
    fn garbage_bytes_fail_validation() {
        let processor = ImageProcessor::new();
        assert!(processor.validate_image(b"definitely not a png").is_err());
    }

    #[test]
    fn small_images_pass_through_untouched() {
        let processor = ImageProcessor::new();
        let png = png_of_size(64, 64);
        let out = processor.resize_if_needed(&png, 128).unwrap();
        assert_eq!(out, png);
    }

    #[test]
    fn oversized_images_are_downscaled() {
        let processor = ImageProcessor::new();
        let png = png_of_size(256, 128);
        let out = processor.resize_if_needed(&png, 64).unwrap();
        let resized = image::load_from_memory(&out).unwrap();
        assert!(resized.dimensions().0 <= 64);
        assert!(resized.dimensions().1 <= 64);
    }
}
