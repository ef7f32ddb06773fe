// src/prompts.rs
//
// Prompt compiler: pure functions turning a configuration and an operation
// into the instruction text sent to the generation backend.

use crate::models::{Configuration, ImageFilter, OutputQuality, TextureEffect};

/// Instruction text for editing an uploaded image. When a transparent
/// background is requested the background description is ignored entirely;
/// otherwise the description is quoted verbatim and the text never mentions
/// transparency.
pub fn transform_prompt(config: &Configuration, subject: &str) -> String {
    let background_instruction = if config.transparent_background {
        "- Background: Remove the existing background and replace it with a fully transparent one.\n\
         - Format: The final output MUST be a high-resolution PNG image with a transparent background."
            .to_string()
    } else {
        format!(
            "- Background: Place the subject on a new background described as: '{}'.\n\
             - Format: The final output should be a high-resolution, professional-looking photorealistic image.",
            config.background_description
        )
    };

    format!(
        "You are an expert photo editor AI. Your task is to edit and enhance an image to create \
         a professional, high-resolution, and photorealistic result.\n\
         The main subject is a '{subject}'. Generate a highly variable, high-resolution, and \
         natural-looking image of this subject.\n\
         Apply the following specific transformations creatively and avoid making a simple copy \
         of the original. Innovate on the composition.\n\n\
         - Lighting: Re-light the scene with a '{lighting}' style.\n\
         - Camera Angle: Adjust the perspective to a '{angle}' shot.\n\
         - Composition: Creatively frame the shot with a '{ratio}' aspect ratio in mind.\n\
         {background_instruction}\n\n\
         Ensure the final image looks highly natural, with realistic textures and details. \
         Optimize the image for professional use. Do not add any text or watermarks.",
        lighting = config.lighting,
        angle = config.camera_angle,
        ratio = config.aspect_ratio,
    )
}

/// Instruction text for synthesizing an image with no input image.
pub fn generation_prompt(config: &Configuration, subject: &str) -> String {
    let background_instruction = if config.transparent_background {
        "The image must have a fully transparent background.".to_string()
    } else {
        format!(
            "The subject should be placed on a background described as: '{}'.",
            config.background_description
        )
    };

    format!(
        "Generate a single, highly creative, and professional photorealistic image of a \
         '{subject}', synthesized entirely from scratch. There is no reference image; the image \
         should be crafted de novo with high artistic skill and innovation.\n\n\
         - Style: Photorealistic, high-resolution, with natural-looking textures and details.\n\
         - Lighting: The scene must be lit with a '{lighting}' style.\n\
         - Camera Angle: Use a '{angle}' perspective.\n\
         - Composition: The composition should be well-framed, keeping a '{ratio}' aspect ratio in mind.\n\
         - Background: {background_instruction}\n\
         - Output Format: The final image must be a high-resolution PNG.\n\n\
         Do not include any text, watermarks, or borders. The focus should be solely on the \
         subject, presented in an artistic and professional manner.",
        lighting = config.lighting,
        angle = config.camera_angle,
        ratio = config.aspect_ratio,
    )
}

/// Instruction text for the upscale operation. The resize target depends on
/// the output quality; filter and texture clauses appear only when selected.
pub fn upscale_prompt(
    filter: ImageFilter,
    texture: TextureEffect,
    quality: OutputQuality,
) -> String {
    let quality_instruction = match quality {
        OutputQuality::HighPrint => {
            "Your task is to take the provided image and upscale it to double its current pixel \
             dimensions. The target is to achieve a resolution suitable for high-quality printing \
             at 600 DPI.\n\
             - Enhance details, sharpen edges, and remove any compression artifacts meticulously.\n\
             - Ensure the result is an extremely crisp, clean, and detailed high-resolution \
             version of the original."
        }
        OutputQuality::Standard => {
            "Your task is to take the provided image and double its pixel dimensions, targeting \
             the maximum possible quality for web use.\n\
             - Enhance details, sharpen edges, and remove any compression artifacts.\n\
             - Ensure the result is a crisp, clean, high-resolution version of the original."
        }
    };

    let mut prompt = format!(
        "You are an expert AI image upscaler and editor.\n{quality_instruction}\n"
    );
    if filter != ImageFilter::None {
        prompt.push_str(&format!(
            "- Apply the following visual filter to the image: '{filter}'.\n"
        ));
    }
    if texture != TextureEffect::None {
        prompt.push_str(&format!(
            "- Apply a subtle, photorealistic '{texture}' texture effect to the entire image. \
             This should be integrated naturally.\n"
        ));
    }
    prompt.push_str(
        "- Do not add, remove, or change any other content, elements, or colors in the image, \
         other than applying the requested filter and/or texture.\n\
         - The output MUST be a high-resolution PNG image.",
    );
    prompt
}

/// Fixed instruction requesting a concise Arabic alt-text for an image. Other
/// target languages go through the translate operation.
pub fn describe_prompt() -> String {
    "Act as an expert in SEO, web accessibility, and food photography analysis.\n\
     Your task is to generate a highly descriptive, professional, and evocative alt-text for \
     the provided image, in Arabic. The description should be rich in detail but concise, not \
     exceeding 500 characters.\n\n\
     Analyze the image deeply, focusing on the following aspects:\n\
     1. Main Subject: Identify the food item with precision, its state, quantity, and notable features.\n\
     2. Composition and Framing: Describe the arrangement of the subject within the frame and the shot type.\n\
     3. Color Palette: Describe the dominant colors and their interplay against the background tones.\n\
     4. Lighting and Shadows: Characterize the lighting and any highlights that suggest texture.\n\
     5. Background and Texture: Describe the setting, surfaces, and any secondary elements.\n\
     6. Overall Mood and Atmosphere: Convey the overall feeling of the image.\n\n\
     Combine these observations into a fluent, natural-sounding sentence or two that paints a \
     vivid picture for the user."
        .to_string()
}

/// Instruction for translating an alt-text. The reply must be the bare
/// translation, with no commentary and no quotation wrapping.
pub fn translate_prompt(text: &str, target_language: &str) -> String {
    format!(
        "You are an expert translator specializing in technical and descriptive content for the web.\n\
         Translate the following 'alt text' into professional, high-quality {target_language}.\n\
         Maintain a descriptive and professional tone. Do not add any extra explanations, \
         quotation marks, or introductory phrases.\n\
         Your response should ONLY be the translated text.\n\n\
         Text: \"{text}\""
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AspectRatio, CameraAngle, Lighting, SubjectType};

    fn base_config() -> Configuration {
        Configuration {
            lighting: Lighting::GoldenHour,
            camera_angle: CameraAngle::CloseUp,
            subject_type: SubjectType::Fruit,
            subject_variety: "Florida Orange".to_string(),
            aspect_ratio: AspectRatio::Square,
            background_description: "on a marble countertop".to_string(),
            transparent_background: false,
            ..Configuration::default()
        }
    }

    #[test]
    fn transform_prompt_carries_all_parameters() {
        let prompt = transform_prompt(&base_config(), "Florida Orange");
        assert!(prompt.contains("golden hour"));
        assert!(prompt.contains("close-up"));
        assert!(prompt.contains("Florida Orange"));
        assert!(prompt.contains("marble countertop"));
        assert!(prompt.contains("1:1"));
        assert!(!prompt.contains("transparent"));
    }

    #[test]
    fn transparent_transform_drops_background_description() {
        let config = Configuration {
            transparent_background: true,
            ..base_config()
        };
        let prompt = transform_prompt(&config, "Florida Orange");
        assert!(prompt.contains("transparent"));
        assert!(!prompt.contains("marble countertop"));
    }

    #[test]
    fn transform_prompt_forbids_watermarks() {
        let prompt = transform_prompt(&base_config(), "Florida Orange");
        assert!(prompt.contains("Do not add any text or watermarks"));
    }

    #[test]
    fn generation_prompt_mentions_de_novo_synthesis() {
        let prompt = generation_prompt(&base_config(), "Florida Orange");
        assert!(prompt.contains("from scratch"));
        assert!(prompt.contains("marble countertop"));
        assert!(!prompt.contains("transparent"));
    }

    #[test]
    fn transparent_generation_drops_background_description() {
        let config = Configuration {
            transparent_background: true,
            ..base_config()
        };
        let prompt = generation_prompt(&config, "Florida Orange");
        assert!(prompt.contains("transparent"));
        assert!(!prompt.contains("marble countertop"));
    }

    #[test]
    fn high_print_upscale_names_a_dpi_target() {
        let prompt = upscale_prompt(
            ImageFilter::None,
            TextureEffect::None,
            OutputQuality::HighPrint,
        );
        assert!(prompt.contains("600 DPI"));
    }

    #[test]
    fn standard_upscale_never_mentions_dpi() {
        let prompt = upscale_prompt(
            ImageFilter::None,
            TextureEffect::None,
            OutputQuality::Standard,
        );
        assert!(!prompt.contains("DPI"));
    }

    #[test]
    fn filter_clause_present_only_when_selected() {
        let without = upscale_prompt(
            ImageFilter::None,
            TextureEffect::None,
            OutputQuality::Standard,
        );
        assert!(!without.contains("visual filter"));

        let with = upscale_prompt(
            ImageFilter::Sepia,
            TextureEffect::None,
            OutputQuality::Standard,
        );
        assert_eq!(with.matches("visual filter").count(), 1);
        assert!(with.contains("sepia tone"));
    }

    #[test]
    fn texture_clause_present_only_when_selected() {
        let without = upscale_prompt(
            ImageFilter::None,
            TextureEffect::None,
            OutputQuality::Standard,
        );
        assert!(!without.contains("texture effect"));

        let with = upscale_prompt(
            ImageFilter::None,
            TextureEffect::Grainy,
            OutputQuality::Standard,
        );
        assert!(with.contains("'grainy' texture effect"));
    }

    #[test]
    fn describe_prompt_bounds_caption_length() {
        let prompt = describe_prompt();
        assert!(prompt.contains("500 characters"));
        assert!(prompt.contains("Arabic"));
    }

    #[test]
    fn translate_prompt_forbids_commentary() {
        let prompt = translate_prompt("برتقالة ناضجة", "French");
        assert!(prompt.contains("French"));
        assert!(prompt.contains("برتقالة ناضجة"));
        assert!(prompt.contains("ONLY be the translated text"));
    }
}
