// src/main.rs
use actix_web::{App, HttpResponse, HttpServer, middleware, web};
use log::info;
use std::sync::Arc;

mod catalog;
mod errors;
mod handlers;
mod models;
mod prompts;
mod services;

use crate::handlers::{
    describe_image, export_image, generate_image, get_settings, list_backgrounds, list_varieties,
    put_settings, transform_image, translate_text, upload_images, upscale_image,
};
use crate::services::{Compositor, GeminiClient, ImageProcessor, Orchestrator, StudioStore};

#[derive(Clone)]
pub struct AppState {
    store: Arc<StudioStore>,
    orchestrator: Arc<Orchestrator>,
    compositor: Arc<Compositor>,
    image_processor: Arc<ImageProcessor>,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    info!("Starting Glossy studio service...");

    let redis_url =
        std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string());
    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let api_key = std::env::var("GEMINI_API_KEY").expect("GEMINI_API_KEY must be set");

    let store = Arc::new(StudioStore::new(&redis_url).await.unwrap());
    let backend = Arc::new(GeminiClient::new(api_key));
    let orchestrator = Arc::new(Orchestrator::new(backend));

    let app_state = AppState {
        store,
        orchestrator,
        compositor: Arc::new(Compositor::new()),
        image_processor: Arc::new(ImageProcessor::new()),
    };

    info!("Starting HTTP server on {bind_addr}");

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .wrap(middleware::Logger::default())
            .service(
                web::scope("/api/v1")
                    .route("/upload", web::post().to(upload_images))
                    .route("/transform/{image_id}", web::post().to(transform_image))
                    .route("/generate", web::post().to(generate_image))
                    .route("/upscale/{image_id}", web::post().to(upscale_image))
                    .route("/describe/{image_id}", web::post().to(describe_image))
                    .route("/translate", web::post().to(translate_text))
                    .route("/export/{image_id}", web::post().to(export_image))
                    .route("/settings", web::get().to(get_settings))
                    .route("/settings", web::put().to(put_settings))
                    .route(
                        "/catalog/varieties/{subject_type}",
                        web::get().to(list_varieties),
                    )
                    .route("/catalog/backgrounds", web::get().to(list_backgrounds)),
            )
            .route("/health", web::get().to(health_check))
    })
    .bind(bind_addr)?
    .run()
    .await
}

async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "glossy",
        "version": "0.1.0"
    }))
}
