// src/services/compositor.rs
//
// Bakes the preview-time cosmetic adjustments into pixel data for export.
// Everything here is a pure function of the input bytes and the options:
// color scalars and hue rotation use the standard filter-effects color
// matrices, named filters are fixed recipes of those primitives (see
// `filter_recipe`), and textures are deterministic coordinate-hash overlays.
// Same input + same options always yields byte-identical output.

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage, imageops};
use serde::{Deserialize, Serialize};

use crate::errors::GlossyError;
use crate::models::{ColorAdjustments, ImageFilter, TextureEffect};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ExportOptions {
    #[serde(default)]
    pub filter: ImageFilter,
    #[serde(default)]
    pub texture: TextureEffect,
    #[serde(default)]
    pub adjustments: ColorAdjustments,
}

impl ExportOptions {
    pub fn is_identity(&self) -> bool {
        self.filter == ImageFilter::None
            && self.texture == TextureEffect::None
            && self.adjustments.is_identity()
    }
}

/// One primitive pixel transform. Named filters decompose into sequences of
/// these; the decomposition is the documented contract for each filter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterStep {
    Brightness(f32),
    Contrast(f32),
    Saturate(f32),
    HueRotate(f32),
    Sepia(f32),
    Grayscale(f32),
    Invert,
    Sharpen,
}

/// Fixed recipe for each named filter.
pub fn filter_recipe(filter: ImageFilter) -> &'static [FilterStep] {
    use FilterStep::*;
    match filter {
        ImageFilter::None => &[],
        ImageFilter::Sepia => &[Sepia(1.0)],
        ImageFilter::Grayscale => &[Grayscale(1.0)],
        ImageFilter::Invert => &[Invert],
        ImageFilter::Vintage => &[Sepia(0.5), Contrast(1.2), Brightness(0.9), Saturate(0.85)],
        ImageFilter::Glow => &[Brightness(1.1), Saturate(1.15), Contrast(0.95)],
        ImageFilter::Sharpen => &[Sharpen],
        ImageFilter::NightMode => &[
            Brightness(0.8),
            Saturate(0.7),
            HueRotate(-20.0),
            Contrast(1.05),
        ],
        ImageFilter::Noir => &[Grayscale(1.0), Contrast(1.3), Brightness(0.9)],
        ImageFilter::Cool => &[HueRotate(-10.0), Saturate(1.1), Brightness(1.05)],
    }
}

pub struct Compositor;

impl Compositor {
    pub fn new() -> Self {
        Self
    }

    /// Produce an export-ready PNG with the selected adjustments baked in.
    /// The identity option set returns the input unchanged, byte-for-byte.
    pub fn export(&self, png: &[u8], options: &ExportOptions) -> Result<Vec<u8>, GlossyError> {
        if options.is_identity() {
            return Ok(png.to_vec());
        }

        let img = image::load_from_memory(png)
            .map_err(|e| GlossyError::ImageProcessing(format!("failed to load image: {e}")))?
            .to_rgba8();

        let img = apply_adjustments(img, &options.adjustments.clamped());
        let img = apply_filter(img, options.filter);
        let img = apply_texture(img, options.texture);

        let mut output = Vec::new();
        DynamicImage::ImageRgba8(img)
            .write_to(&mut std::io::Cursor::new(&mut output), ImageFormat::Png)
            .map_err(|e| GlossyError::ImageProcessing(format!("failed to encode image: {e}")))?;
        Ok(output)
    }
}

/// Slider adjustments as primitive steps: scalar multipliers where 100 is
/// ×1.0, hue as a degree rotation.
pub fn apply_adjustments(img: RgbaImage, adjustments: &ColorAdjustments) -> RgbaImage {
    let mut img = img;
    if adjustments.brightness != 100 {
        img = apply_step(img, FilterStep::Brightness(adjustments.brightness as f32 / 100.0));
    }
    if adjustments.contrast != 100 {
        img = apply_step(img, FilterStep::Contrast(adjustments.contrast as f32 / 100.0));
    }
    if adjustments.saturation != 100 {
        img = apply_step(img, FilterStep::Saturate(adjustments.saturation as f32 / 100.0));
    }
    if adjustments.hue != 0 {
        img = apply_step(img, FilterStep::HueRotate(adjustments.hue as f32));
    }
    img
}

pub fn apply_filter(img: RgbaImage, filter: ImageFilter) -> RgbaImage {
    filter_recipe(filter)
        .iter()
        .fold(img, |img, step| apply_step(img, *step))
}

pub fn apply_step(img: RgbaImage, step: FilterStep) -> RgbaImage {
    match step {
        FilterStep::Brightness(amount) => map_channels(img, |c| c * amount),
        FilterStep::Contrast(amount) => map_channels(img, move |c| (c - 0.5) * amount + 0.5),
        FilterStep::Saturate(amount) => apply_matrix(img, saturate_matrix(amount)),
        FilterStep::HueRotate(degrees) => apply_matrix(img, hue_rotate_matrix(degrees)),
        FilterStep::Sepia(amount) => apply_matrix(img, sepia_matrix(amount)),
        FilterStep::Grayscale(amount) => apply_matrix(img, grayscale_matrix(amount)),
        FilterStep::Invert => map_channels(img, |c| 1.0 - c),
        FilterStep::Sharpen => {
            let kernel = [0.0, -1.0, 0.0, -1.0, 5.0, -1.0, 0.0, -1.0, 0.0];
            imageops::filter3x3(&img, &kernel)
        }
    }
}

fn clamp_channel(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Apply a per-channel function to RGB, leaving alpha untouched.
fn map_channels<F: Fn(f32) -> f32>(mut img: RgbaImage, f: F) -> RgbaImage {
    for pixel in img.pixels_mut() {
        let Rgba([r, g, b, a]) = *pixel;
        *pixel = Rgba([
            clamp_channel(f(r as f32 / 255.0)),
            clamp_channel(f(g as f32 / 255.0)),
            clamp_channel(f(b as f32 / 255.0)),
            a,
        ]);
    }
    img
}

/// Apply a 3x3 color matrix to RGB, leaving alpha untouched.
fn apply_matrix(mut img: RgbaImage, m: [[f32; 3]; 3]) -> RgbaImage {
    for pixel in img.pixels_mut() {
        let Rgba([r, g, b, a]) = *pixel;
        let (r, g, b) = (r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0);
        *pixel = Rgba([
            clamp_channel(m[0][0] * r + m[0][1] * g + m[0][2] * b),
            clamp_channel(m[1][0] * r + m[1][1] * g + m[1][2] * b),
            clamp_channel(m[2][0] * r + m[2][1] * g + m[2][2] * b),
            a,
        ]);
    }
    img
}

fn saturate_matrix(s: f32) -> [[f32; 3]; 3] {
    [
        [0.2126 + 0.7874 * s, 0.7152 - 0.7152 * s, 0.0722 - 0.0722 * s],
        [0.2126 - 0.2126 * s, 0.7152 + 0.2848 * s, 0.0722 - 0.0722 * s],
        [0.2126 - 0.2126 * s, 0.7152 - 0.7152 * s, 0.0722 + 0.9278 * s],
    ]
}

fn grayscale_matrix(amount: f32) -> [[f32; 3]; 3] {
    saturate_matrix(1.0 - amount.clamp(0.0, 1.0))
}

fn sepia_matrix(amount: f32) -> [[f32; 3]; 3] {
    let a = amount.clamp(0.0, 1.0);
    let lerp = |full: f32, identity: f32| identity + (full - identity) * a;
    [
        [lerp(0.393, 1.0), lerp(0.769, 0.0), lerp(0.189, 0.0)],
        [lerp(0.349, 0.0), lerp(0.686, 1.0), lerp(0.168, 0.0)],
        [lerp(0.272, 0.0), lerp(0.534, 0.0), lerp(0.131, 1.0)],
    ]
}

fn hue_rotate_matrix(degrees: f32) -> [[f32; 3]; 3] {
    let rad = degrees.to_radians();
    let (sin, cos) = rad.sin_cos();
    [
        [
            0.213 + cos * 0.787 - sin * 0.213,
            0.715 - cos * 0.715 - sin * 0.715,
            0.072 - cos * 0.072 + sin * 0.928,
        ],
        [
            0.213 - cos * 0.213 + sin * 0.143,
            0.715 + cos * 0.285 + sin * 0.140,
            0.072 - cos * 0.072 - sin * 0.283,
        ],
        [
            0.213 - cos * 0.213 - sin * 0.787,
            0.715 - cos * 0.715 + sin * 0.715,
            0.072 + cos * 0.928 + sin * 0.072,
        ],
    ]
}

/// Deterministic per-pixel noise in [-1, 1] from the pixel coordinates. No
/// RNG state, so two exports of the same image agree exactly.
fn coordinate_noise(x: u32, y: u32, seed: u32) -> f32 {
    let mut h = x
        .wrapping_mul(0x9E37_79B9)
        .wrapping_add(y.wrapping_mul(0x85EB_CA6B))
        .wrapping_add(seed);
    h ^= h >> 16;
    h = h.wrapping_mul(0x7FEB_352D);
    h ^= h >> 15;
    (h & 0xFFFF) as f32 / 32767.5 - 1.0
}

pub fn apply_texture(img: RgbaImage, texture: TextureEffect) -> RgbaImage {
    match texture {
        TextureEffect::None => img,
        TextureEffect::Smooth => {
            let k = 1.0 / 9.0;
            imageops::filter3x3(&img, &[k, k, k, k, k, k, k, k, k])
        }
        TextureEffect::Grainy => overlay_noise(img, 0.08, 1),
        TextureEffect::Rough => overlay_noise(img, 0.15, 2),
        TextureEffect::Canvas => overlay_weave(img),
    }
}

fn overlay_noise(mut img: RgbaImage, amplitude: f32, scale: u32) -> RgbaImage {
    for (x, y, pixel) in img.enumerate_pixels_mut() {
        let n = coordinate_noise(x / scale, y / scale, 0x5EED) * amplitude;
        let Rgba([r, g, b, a]) = *pixel;
        *pixel = Rgba([
            clamp_channel(r as f32 / 255.0 + n),
            clamp_channel(g as f32 / 255.0 + n),
            clamp_channel(b as f32 / 255.0 + n),
            a,
        ]);
    }
    img
}

/// Multiplicative thread pattern approximating a canvas weave.
fn overlay_weave(mut img: RgbaImage) -> RgbaImage {
    for (x, y, pixel) in img.enumerate_pixels_mut() {
        let thread = if (x / 3 + y / 3) % 2 == 0 { 0.96 } else { 1.0 };
        let ridge = if x % 3 == 0 || y % 3 == 0 { 0.98 } else { 1.0 };
        let factor = thread * ridge;
        let Rgba([r, g, b, a]) = *pixel;
        *pixel = Rgba([
            clamp_channel(r as f32 / 255.0 * factor),
            clamp_channel(g as f32 / 255.0 * factor),
            clamp_channel(b as f32 / 255.0 * factor),
            a,
        ]);
    }
    img
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_image() -> RgbaImage {
        RgbaImage::from_fn(8, 8, |x, y| {
            Rgba([(x * 31) as u8, (y * 29) as u8, ((x + y) * 17) as u8, 255])
        })
    }

    fn sample_png() -> Vec<u8> {
        let mut bytes = Vec::new();
        DynamicImage::ImageRgba8(sample_image())
            .write_to(&mut std::io::Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn identity_options_return_input_byte_for_byte() {
        let png = sample_png();
        let out = Compositor::new().export(&png, &ExportOptions::default()).unwrap();
        assert_eq!(out, png);
    }

    #[test]
    fn export_is_deterministic() {
        let png = sample_png();
        let options = ExportOptions {
            filter: ImageFilter::Vintage,
            texture: TextureEffect::Grainy,
            adjustments: ColorAdjustments {
                brightness: 110,
                contrast: 95,
                saturation: 120,
                hue: 30,
            },
        };
        let compositor = Compositor::new();
        let first = compositor.export(&png, &options).unwrap();
        let second = compositor.export(&png, &options).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn vintage_equals_its_documented_decomposition() {
        let direct = apply_filter(sample_image(), ImageFilter::Vintage);

        let mut manual = sample_image();
        manual = apply_step(manual, FilterStep::Sepia(0.5));
        manual = apply_step(manual, FilterStep::Contrast(1.2));
        manual = apply_step(manual, FilterStep::Brightness(0.9));
        manual = apply_step(manual, FilterStep::Saturate(0.85));

        assert_eq!(direct.as_raw(), manual.as_raw());
    }

    #[test]
    fn identity_primitives_leave_pixels_unchanged() {
        let img = sample_image();
        let brightened = apply_step(img.clone(), FilterStep::Brightness(1.0));
        assert_eq!(img.as_raw(), brightened.as_raw());

        let saturated = apply_step(img.clone(), FilterStep::Saturate(1.0));
        assert_eq!(img.as_raw(), saturated.as_raw());
    }

    #[test]
    fn grayscale_produces_equal_channels() {
        let gray = apply_step(sample_image(), FilterStep::Grayscale(1.0));
        for pixel in gray.pixels() {
            let Rgba([r, g, b, _]) = *pixel;
            assert_eq!(r, g);
            assert_eq!(g, b);
        }
    }

    #[test]
    fn invert_is_an_involution() {
        let img = sample_image();
        let twice = apply_step(
            apply_step(img.clone(), FilterStep::Invert),
            FilterStep::Invert,
        );
        assert_eq!(img.as_raw(), twice.as_raw());
    }

    #[test]
    fn adjustments_preserve_alpha() {
        let mut img = sample_image();
        img.put_pixel(0, 0, Rgba([200, 100, 50, 128]));
        let adjusted = apply_adjustments(
            img,
            &ColorAdjustments {
                brightness: 150,
                contrast: 80,
                saturation: 130,
                hue: -45,
            },
        );
        assert_eq!(adjusted.get_pixel(0, 0).0[3], 128);
    }

    #[test]
    fn textures_change_pixel_data() {
        let img = sample_image();
        for texture in [
            TextureEffect::Rough,
            TextureEffect::Grainy,
            TextureEffect::Canvas,
        ] {
            let textured = apply_texture(img.clone(), texture);
            assert_ne!(img.as_raw(), textured.as_raw(), "{texture}");
        }
    }
}
