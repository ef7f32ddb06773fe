// src/models.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::errors::GlossyError;

/// Lighting style inserted into prompts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lighting {
    Studio,
    Natural,
    GoldenHour,
    BlueHour,
    Cinematic,
    Dramatic,
}

impl fmt::Display for Lighting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let phrase = match self {
            Lighting::Studio => "studio lighting",
            Lighting::Natural => "natural lighting",
            Lighting::GoldenHour => "golden hour lighting",
            Lighting::BlueHour => "blue hour lighting",
            Lighting::Cinematic => "cinematic lighting",
            Lighting::Dramatic => "dramatic lighting",
        };
        f.write_str(phrase)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraAngle {
    FrontView,
    SideView,
    Angle45,
    TopView,
    BirdsEyeView,
    LowAngle,
    HighAngle,
    WideShot,
    CloseUp,
    MacroShot,
    DutchAngle,
}

impl fmt::Display for CameraAngle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let phrase = match self {
            CameraAngle::FrontView => "front view",
            CameraAngle::SideView => "side view",
            CameraAngle::Angle45 => "45-degree angle",
            CameraAngle::TopView => "top view",
            CameraAngle::BirdsEyeView => "bird's eye view",
            CameraAngle::LowAngle => "low angle shot",
            CameraAngle::HighAngle => "high angle shot",
            CameraAngle::WideShot => "wide shot",
            CameraAngle::CloseUp => "close-up shot",
            CameraAngle::MacroShot => "macro shot",
            CameraAngle::DutchAngle => "dutch angle shot",
        };
        f.write_str(phrase)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubjectType {
    Fruit,
    Vegetable,
    Sandwich,
    Juice,
    Pie,
    BakedGoods,
}

impl fmt::Display for SubjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let phrase = match self {
            SubjectType::Fruit => "fruit",
            SubjectType::Vegetable => "vegetable",
            SubjectType::Sandwich => "sandwich",
            SubjectType::Juice => "juice",
            SubjectType::Pie => "pie",
            SubjectType::BakedGoods => "baked goods",
        };
        f.write_str(phrase)
    }
}

/// Aspect ratios supported by the generation backend. The string form is what
/// both the prompt text and the Imagen `aspectRatio` parameter expect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AspectRatio {
    Square,
    Vertical,
    Horizontal,
}

impl AspectRatio {
    pub fn as_ratio(&self) -> &'static str {
        match self {
            AspectRatio::Square => "1:1",
            AspectRatio::Vertical => "3:4",
            AspectRatio::Horizontal => "4:3",
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ratio())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ImageFilter {
    #[default]
    None,
    Sepia,
    Grayscale,
    Invert,
    Vintage,
    Glow,
    Sharpen,
    NightMode,
    Noir,
    Cool,
}

impl fmt::Display for ImageFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let phrase = match self {
            ImageFilter::None => "none",
            ImageFilter::Sepia => "sepia tone",
            ImageFilter::Grayscale => "grayscale",
            ImageFilter::Invert => "invert colors",
            ImageFilter::Vintage => "vintage",
            ImageFilter::Glow => "soft glow",
            ImageFilter::Sharpen => "sharpen",
            ImageFilter::NightMode => "night mode",
            ImageFilter::Noir => "noir",
            ImageFilter::Cool => "cool tone",
        };
        f.write_str(phrase)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TextureEffect {
    #[default]
    None,
    Rough,
    Smooth,
    Grainy,
    Canvas,
}

impl fmt::Display for TextureEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let phrase = match self {
            TextureEffect::None => "none",
            TextureEffect::Rough => "rough",
            TextureEffect::Smooth => "smooth",
            TextureEffect::Grainy => "grainy",
            TextureEffect::Canvas => "canvas",
        };
        f.write_str(phrase)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OutputQuality {
    #[default]
    Standard,
    HighPrint,
}

/// Bounded color sliders. 100 is identity for the three scalars, 0 degrees for
/// hue. Values outside the UI range are clamped rather than rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorAdjustments {
    pub brightness: u16,
    pub contrast: u16,
    pub saturation: u16,
    pub hue: i16,
}

impl Default for ColorAdjustments {
    fn default() -> Self {
        Self {
            brightness: 100,
            contrast: 100,
            saturation: 100,
            hue: 0,
        }
    }
}

impl ColorAdjustments {
    pub fn is_identity(&self) -> bool {
        self.brightness == 100 && self.contrast == 100 && self.saturation == 100 && self.hue == 0
    }

    pub fn clamped(&self) -> Self {
        Self {
            brightness: self.brightness.min(200),
            contrast: self.contrast.min(200),
            saturation: self.saturation.min(200),
            hue: self.hue.clamp(-180, 180),
        }
    }
}

/// The full set of user-selectable generation parameters. Mirrors what the
/// control panel edits and what gets persisted between sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Configuration {
    pub lighting: Lighting,
    pub camera_angle: CameraAngle,
    pub subject_type: SubjectType,
    #[serde(default)]
    pub subject_variety: String,
    pub aspect_ratio: AspectRatio,
    #[serde(default)]
    pub background_description: String,
    #[serde(default)]
    pub transparent_background: bool,
    #[serde(default)]
    pub output_quality: OutputQuality,
    #[serde(default)]
    pub filter: ImageFilter,
    #[serde(default)]
    pub texture: TextureEffect,
    #[serde(default)]
    pub color_adjustments: ColorAdjustments,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            lighting: Lighting::Studio,
            camera_angle: CameraAngle::FrontView,
            subject_type: SubjectType::Fruit,
            subject_variety: String::new(),
            aspect_ratio: AspectRatio::Square,
            background_description: "a clean, professional white background".to_string(),
            transparent_background: false,
            output_quality: OutputQuality::Standard,
            filter: ImageFilter::None,
            texture: TextureEffect::None,
            color_adjustments: ColorAdjustments::default(),
        }
    }
}

impl Configuration {
    /// Exactly one of {background description, transparent background} must be
    /// active when a generation is requested.
    pub fn validate_background(&self) -> Result<(), GlossyError> {
        if !self.transparent_background && self.background_description.trim().is_empty() {
            return Err(GlossyError::Validation(
                "either a background description or a transparent background is required"
                    .to_string(),
            ));
        }
        Ok(())
    }
}

/// The five operations the orchestrator exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Transform,
    Generate,
    Upscale,
    Describe,
    Translate,
}

impl OperationKind {
    pub const ALL: [OperationKind; 5] = [
        OperationKind::Transform,
        OperationKind::Generate,
        OperationKind::Upscale,
        OperationKind::Describe,
        OperationKind::Translate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Transform => "transform",
            OperationKind::Generate => "generate",
            OperationKind::Upscale => "upscale",
            OperationKind::Describe => "describe",
            OperationKind::Translate => "translate",
        }
    }

    pub(crate) fn index(&self) -> usize {
        match self {
            OperationKind::Transform => 0,
            OperationKind::Generate => 1,
            OperationKind::Upscale => 2,
            OperationKind::Describe => 3,
            OperationKind::Translate => 4,
        }
    }
}

/// What a successful operation yields: image bytes for the image operations,
/// text for describe and translate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GenerationResult {
    Image { bytes: Vec<u8>, mime_type: String },
    Text { value: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageUpload {
    pub id: Uuid,
    pub session_id: Uuid,
    pub filename: String,
    pub content_type: String,
    pub size: usize,
    pub data: Vec<u8>,
    pub uploaded_at: DateTime<Utc>,
}

/// A stored generation result, addressable for follow-up operations
/// (upscale, describe, export).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedImage {
    pub id: Uuid,
    pub source_id: Option<Uuid>,
    pub operation: OperationKind,
    pub mime_type: String,
    pub data: Vec<u8>,
    pub prompt_used: String,
    pub created_at: DateTime<Utc>,
}
