// src/services/mod.rs
pub mod classifier;
pub mod compositor;
pub mod gemini;
pub mod image_processor;
pub mod orchestrator;
pub mod store;

pub use compositor::Compositor;
pub use gemini::GeminiClient;
pub use image_processor::ImageProcessor;
pub use orchestrator::Orchestrator;
pub use store::StudioStore;
