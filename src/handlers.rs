// src/handlers.rs
use crate::{
    AppState, catalog,
    errors::GlossyError,
    models::*,
    prompts,
    services::compositor::ExportOptions,
    services::orchestrator::PNG_MIME,
};
use actix_multipart::Multipart;
use actix_web::{Error, HttpResponse, web};
use futures_util::TryStreamExt;
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct UpscaleRequest {
    #[serde(default)]
    pub filter: ImageFilter,
    #[serde(default)]
    pub texture: TextureEffect,
    #[serde(default)]
    pub output_quality: OutputQuality,
}

#[derive(Debug, Deserialize)]
pub struct TranslateRequest {
    pub text: String,
    pub target_language: String,
}

fn stored_image(
    result: &GenerationResult,
    source_id: Option<Uuid>,
    operation: OperationKind,
    prompt: String,
) -> Option<GeneratedImage> {
    match result {
        GenerationResult::Image { bytes, mime_type } => Some(GeneratedImage {
            id: Uuid::new_v4(),
            source_id,
            operation,
            mime_type: mime_type.clone(),
            data: bytes.clone(),
            prompt_used: prompt,
            created_at: chrono::Utc::now(),
        }),
        GenerationResult::Text { .. } => None,
    }
}

fn image_response(stored: GeneratedImage) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(stored.mime_type.clone())
        .insert_header(("x-image-id", stored.id.to_string()))
        .body(stored.data)
}

pub async fn upload_images(
    mut payload: Multipart,
    data: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let session_id = Uuid::new_v4();
    let mut uploaded_images = Vec::new();

    while let Some(mut field) = payload.try_next().await? {
        let content_disposition = field.content_disposition();
        let filename = content_disposition
            .get_filename()
            .ok_or_else(|| GlossyError::Validation("no filename provided".to_string()))?
            .to_string();

        let content_type = field
            .content_type()
            .map(|ct| ct.to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string());

        let mut image_data = Vec::new();
        while let Some(chunk) = field.try_next().await? {
            image_data.extend_from_slice(&chunk);
        }

        data.image_processor.validate_image(&image_data)?;
        let processed_data = data.image_processor.resize_if_needed(&image_data, 2048)?;

        let image_upload = ImageUpload {
            id: Uuid::new_v4(),
            session_id,
            filename,
            content_type,
            size: processed_data.len(),
            data: processed_data,
            uploaded_at: chrono::Utc::now(),
        };

        data.store.store_upload(&image_upload).await?;
        uploaded_images.push(image_upload.id);
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "session_id": session_id,
        "uploaded_images": uploaded_images,
        "count": uploaded_images.len()
    })))
}

/// Edit an uploaded image per the posted configuration.
pub async fn transform_image(
    path: web::Path<Uuid>,
    data: web::Data<AppState>,
    config: web::Json<Configuration>,
) -> Result<HttpResponse, Error> {
    let image_id = path.into_inner();
    let upload = data.store.get_upload(&image_id).await?;

    let result = data
        .orchestrator
        .transform(&upload.data, &upload.content_type, &config)
        .await?;

    let subject = catalog::resolve_variety(config.subject_type, &config.subject_variety);
    let prompt = prompts::transform_prompt(&config, &subject);
    let stored = stored_image(&result, Some(image_id), OperationKind::Transform, prompt)
        .ok_or_else(|| GlossyError::NoOutput("expected an image result".to_string()))?;
    data.store.store_generated(&stored).await?;

    Ok(image_response(stored))
}

/// Synthesize an image from the posted configuration alone.
pub async fn generate_image(
    data: web::Data<AppState>,
    config: web::Json<Configuration>,
) -> Result<HttpResponse, Error> {
    let result = data.orchestrator.generate(&config).await?;

    let subject = catalog::resolve_variety(config.subject_type, &config.subject_variety);
    let prompt = prompts::generation_prompt(&config, &subject);
    let stored = stored_image(&result, None, OperationKind::Generate, prompt)
        .ok_or_else(|| GlossyError::NoOutput("expected an image result".to_string()))?;
    data.store.store_generated(&stored).await?;

    Ok(image_response(stored))
}

pub async fn upscale_image(
    path: web::Path<Uuid>,
    data: web::Data<AppState>,
    request: web::Json<UpscaleRequest>,
) -> Result<HttpResponse, Error> {
    let image_id = path.into_inner();
    let (bytes, mime) = data.store.get_any_image(&image_id).await?;

    let result = data
        .orchestrator
        .upscale(
            &bytes,
            &mime,
            request.filter,
            request.texture,
            request.output_quality,
        )
        .await?;

    let prompt = prompts::upscale_prompt(request.filter, request.texture, request.output_quality);
    let stored = stored_image(&result, Some(image_id), OperationKind::Upscale, prompt)
        .ok_or_else(|| GlossyError::NoOutput("expected an image result".to_string()))?;
    data.store.store_generated(&stored).await?;

    Ok(image_response(stored))
}

pub async fn describe_image(
    path: web::Path<Uuid>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let image_id = path.into_inner();
    let (bytes, mime) = data.store.get_any_image(&image_id).await?;

    let result = data.orchestrator.describe(&bytes, &mime).await?;
    match result {
        GenerationResult::Text { value } => {
            Ok(HttpResponse::Ok().json(serde_json::json!({ "text": value })))
        }
        GenerationResult::Image { .. } => {
            Err(GlossyError::NoOutput("expected a text result".to_string()).into())
        }
    }
}

pub async fn translate_text(
    data: web::Data<AppState>,
    request: web::Json<TranslateRequest>,
) -> Result<HttpResponse, Error> {
    let result = data
        .orchestrator
        .translate(&request.text, &request.target_language)
        .await?;
    match result {
        GenerationResult::Text { value } => {
            Ok(HttpResponse::Ok().json(serde_json::json!({ "text": value })))
        }
        GenerationResult::Image { .. } => {
            Err(GlossyError::NoOutput("expected a text result".to_string()).into())
        }
    }
}

/// Bake the posted filter/texture/color adjustments into a stored image and
/// return the export-ready PNG. Purely local; no remote call.
pub async fn export_image(
    path: web::Path<Uuid>,
    data: web::Data<AppState>,
    options: web::Json<ExportOptions>,
) -> Result<HttpResponse, Error> {
    let image_id = path.into_inner();
    let (bytes, _) = data.store.get_any_image(&image_id).await?;

    let exported = data.compositor.export(&bytes, &options)?;
    Ok(HttpResponse::Ok().content_type(PNG_MIME).body(exported))
}

pub async fn get_settings(data: web::Data<AppState>) -> Result<HttpResponse, Error> {
    let config = data
        .store
        .load_settings()
        .await?
        .unwrap_or_default();
    Ok(HttpResponse::Ok().json(config))
}

pub async fn put_settings(
    data: web::Data<AppState>,
    config: web::Json<Configuration>,
) -> Result<HttpResponse, Error> {
    data.store.save_settings(&config).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "saved": true })))
}

pub async fn list_varieties(path: web::Path<SubjectType>) -> Result<HttpResponse, Error> {
    let subject = path.into_inner();
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "subject_type": subject,
        "varieties": catalog::varieties(subject)
    })))
}

pub async fn list_backgrounds() -> Result<HttpResponse, Error> {
    let options: Vec<_> = catalog::BACKGROUND_OPTIONS
        .iter()
        .map(|option| {
            serde_json::json!({
                "label": option.label,
                "prompt": option.prompt
            })
        })
        .collect();
    Ok(HttpResponse::Ok().json(options))
}
