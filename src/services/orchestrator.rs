// src/services/orchestrator.rs
//
// Owns the single remote call behind each of the five operations. Validates
// inputs before dispatch, enforces at-most-one-in-flight per operation kind,
// and normalizes backend replies into GenerationResult. Raw backend errors
// never escape: everything goes through the classifier.

use log::info;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::catalog;
use crate::errors::GlossyError;
use crate::models::{
    Configuration, GenerationResult, ImageFilter, OperationKind, OutputQuality, TextureEffect,
};
use crate::prompts;
use crate::services::classifier;
use crate::services::gemini::{BackendReply, GenerativeBackend};

pub const PNG_MIME: &str = "image/png";

pub struct Orchestrator {
    backend: Arc<dyn GenerativeBackend>,
    in_flight: [AtomicBool; 5],
}

/// Clears the per-kind in-flight flag when the operation settles, success or
/// failure.
struct FlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

impl Orchestrator {
    pub fn new(backend: Arc<dyn GenerativeBackend>) -> Self {
        Self {
            backend,
            in_flight: Default::default(),
        }
    }

    /// Claim the in-flight slot for an operation kind. A second call of the
    /// same kind is rejected immediately rather than queued; the first call
    /// keeps running.
    fn begin(&self, kind: OperationKind) -> Result<FlightGuard<'_>, GlossyError> {
        let flag = &self.in_flight[kind.index()];
        if flag.swap(true, Ordering::AcqRel) {
            return Err(GlossyError::Busy(kind.as_str()));
        }
        Ok(FlightGuard { flag })
    }

    fn require_image(image: &[u8], operation: OperationKind) -> Result<(), GlossyError> {
        if image.is_empty() {
            return Err(GlossyError::Validation(format!(
                "a source image is required for {}",
                operation.as_str()
            )));
        }
        Ok(())
    }

    /// A structurally valid edit reply must contain image bytes; text-only
    /// replies mean the model answered with commentary instead of an image.
    fn expect_image(reply: BackendReply) -> Result<GenerationResult, GlossyError> {
        match reply.image {
            Some(bytes) => Ok(GenerationResult::Image {
                bytes,
                mime_type: PNG_MIME.to_string(),
            }),
            None => Err(GlossyError::NoOutput(
                reply
                    .text
                    .unwrap_or_else(|| "the model returned neither image nor text".to_string()),
            )),
        }
    }

    pub async fn transform(
        &self,
        image: &[u8],
        mime: &str,
        config: &Configuration,
    ) -> Result<GenerationResult, GlossyError> {
        let _guard = self.begin(OperationKind::Transform)?;
        Self::require_image(image, OperationKind::Transform)?;
        config.validate_background()?;

        let subject = catalog::resolve_variety(config.subject_type, &config.subject_variety);
        let prompt = prompts::transform_prompt(config, &subject);
        info!("transforming image ({} bytes) of '{subject}'", image.len());

        let reply = self
            .backend
            .edit_image(&prompt, image, mime)
            .await
            .map_err(|e| classifier::classify(&e))?;
        Self::expect_image(reply)
    }

    pub async fn generate(&self, config: &Configuration) -> Result<GenerationResult, GlossyError> {
        let _guard = self.begin(OperationKind::Generate)?;
        config.validate_background()?;

        let subject = catalog::resolve_variety(config.subject_type, &config.subject_variety);
        let prompt = prompts::generation_prompt(config, &subject);
        info!("generating '{subject}' from scratch at {}", config.aspect_ratio);

        let reply = self
            .backend
            .generate_image(&prompt, config.aspect_ratio)
            .await
            .map_err(|e| classifier::classify(&e))?;
        Self::expect_image(reply)
    }

    pub async fn upscale(
        &self,
        image: &[u8],
        mime: &str,
        filter: ImageFilter,
        texture: TextureEffect,
        quality: OutputQuality,
    ) -> Result<GenerationResult, GlossyError> {
        let _guard = self.begin(OperationKind::Upscale)?;
        Self::require_image(image, OperationKind::Upscale)?;

        let prompt = prompts::upscale_prompt(filter, texture, quality);
        info!("upscaling image ({} bytes), quality {quality:?}", image.len());

        let reply = self
            .backend
            .edit_image(&prompt, image, mime)
            .await
            .map_err(|e| classifier::classify(&e))?;
        Self::expect_image(reply)
    }

    pub async fn describe(
        &self,
        image: &[u8],
        mime: &str,
    ) -> Result<GenerationResult, GlossyError> {
        let _guard = self.begin(OperationKind::Describe)?;
        Self::require_image(image, OperationKind::Describe)?;

        let prompt = prompts::describe_prompt();
        let text = self
            .backend
            .generate_text(&prompt, Some((image, mime)))
            .await
            .map_err(|e| classifier::classify(&e))?;
        if text.is_empty() {
            return Err(GlossyError::NoOutput(
                "the model returned an empty description".to_string(),
            ));
        }
        Ok(GenerationResult::Text { value: text })
    }

    pub async fn translate(
        &self,
        text: &str,
        target_language: &str,
    ) -> Result<GenerationResult, GlossyError> {
        let _guard = self.begin(OperationKind::Translate)?;
        if text.trim().is_empty() {
            return Err(GlossyError::Validation(
                "text to translate must not be empty".to_string(),
            ));
        }
        if target_language.trim().is_empty() {
            return Err(GlossyError::Validation(
                "a target language is required".to_string(),
            ));
        }

        let prompt = prompts::translate_prompt(text, target_language);
        let translated = self
            .backend
            .generate_text(&prompt, None)
            .await
            .map_err(|e| classifier::classify(&e))?;
        if translated.is_empty() {
            return Err(GlossyError::NoOutput(
                "the model returned an empty translation".to_string(),
            ));
        }
        Ok(GenerationResult::Text { value: translated })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AspectRatio;
    use crate::services::gemini::BackendError;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::Notify;

    /// Scriptable backend: counts calls, optionally blocks until released,
    /// and returns a fixed reply or error.
    struct MockBackend {
        calls: AtomicUsize,
        reply: Box<dyn Fn() -> Result<BackendReply, BackendError> + Send + Sync>,
        started: Option<Arc<Notify>>,
        release: Option<Arc<Notify>>,
    }

    impl MockBackend {
        fn image(bytes: &[u8]) -> Self {
            let bytes = bytes.to_vec();
            Self {
                calls: AtomicUsize::new(0),
                reply: Box::new(move || {
                    Ok(BackendReply {
                        image: Some(bytes.clone()),
                        text: None,
                    })
                }),
                started: None,
                release: None,
            }
        }

        fn failing(message: &str) -> Self {
            let message = message.to_string();
            Self {
                calls: AtomicUsize::new(0),
                reply: Box::new(move || Err(BackendError::Provider(message.clone()))),
                started: None,
                release: None,
            }
        }

        fn empty() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                reply: Box::new(|| Ok(BackendReply::default())),
                started: None,
                release: None,
            }
        }

        fn blocking(bytes: &[u8], started: Arc<Notify>, release: Arc<Notify>) -> Self {
            let mut mock = Self::image(bytes);
            mock.started = Some(started);
            mock.release = Some(release);
            mock
        }

        async fn respond(&self) -> Result<BackendReply, BackendError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(started) = &self.started {
                started.notify_one();
            }
            if let Some(release) = &self.release {
                release.notified().await;
            }
            (self.reply)()
        }
    }

    #[async_trait]
    impl GenerativeBackend for MockBackend {
        async fn edit_image(
            &self,
            _prompt: &str,
            _image: &[u8],
            _mime: &str,
        ) -> Result<BackendReply, BackendError> {
            self.respond().await
        }

        async fn generate_image(
            &self,
            _prompt: &str,
            _aspect_ratio: AspectRatio,
        ) -> Result<BackendReply, BackendError> {
            self.respond().await
        }

        async fn generate_text(
            &self,
            _prompt: &str,
            _image: Option<(&[u8], &str)>,
        ) -> Result<String, BackendError> {
            let reply = self.respond().await?;
            Ok(reply.text.unwrap_or_default())
        }
    }

    fn orchestrator_with(mock: MockBackend) -> (Orchestrator, Arc<MockBackend>) {
        let backend = Arc::new(mock);
        (Orchestrator::new(backend.clone()), backend)
    }

    #[tokio::test]
    async fn transform_returns_image_bytes() {
        let (orchestrator, _) = orchestrator_with(MockBackend::image(b"png"));
        let result = orchestrator
            .transform(b"input", PNG_MIME, &Configuration::default())
            .await
            .unwrap();
        match result {
            GenerationResult::Image { bytes, mime_type } => {
                assert_eq!(bytes, b"png");
                assert_eq!(mime_type, PNG_MIME);
            }
            other => panic!("expected image, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_source_image_fails_before_any_remote_call() {
        let (orchestrator, backend) = orchestrator_with(MockBackend::image(b"png"));
        let err = orchestrator
            .transform(b"", PNG_MIME, &Configuration::default())
            .await
            .unwrap_err();
        assert!(matches!(err, GlossyError::Validation(_)));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn invalid_background_fails_before_any_remote_call() {
        let (orchestrator, backend) = orchestrator_with(MockBackend::image(b"png"));
        let config = Configuration {
            background_description: String::new(),
            transparent_background: false,
            ..Configuration::default()
        };
        let err = orchestrator.generate(&config).await.unwrap_err();
        assert!(matches!(err, GlossyError::Validation(_)));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn empty_translate_text_is_rejected() {
        let (orchestrator, backend) = orchestrator_with(MockBackend::empty());
        let err = orchestrator.translate("   ", "French").await.unwrap_err();
        assert!(matches!(err, GlossyError::Validation(_)));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn text_only_reply_surfaces_no_output() {
        let (orchestrator, _) = orchestrator_with(MockBackend::empty());
        let err = orchestrator
            .transform(b"input", PNG_MIME, &Configuration::default())
            .await
            .unwrap_err();
        assert!(matches!(err, GlossyError::NoOutput(_)));
    }

    #[tokio::test]
    async fn quota_failure_is_classified() {
        let (orchestrator, _) =
            orchestrator_with(MockBackend::failing("Quota exceeded for this project"));
        let err = orchestrator
            .transform(b"input", PNG_MIME, &Configuration::default())
            .await
            .unwrap_err();
        assert!(matches!(err, GlossyError::QuotaExceeded(_)));
    }

    #[tokio::test]
    async fn second_concurrent_call_of_same_kind_is_rejected() {
        let started = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let (orchestrator, _) = orchestrator_with(MockBackend::blocking(
            b"png",
            started.clone(),
            release.clone(),
        ));
        let orchestrator = Arc::new(orchestrator);

        let first = {
            let orchestrator = orchestrator.clone();
            tokio::spawn(async move {
                orchestrator
                    .transform(b"input", PNG_MIME, &Configuration::default())
                    .await
            })
        };

        // Wait until the first call has reached the backend.
        started.notified().await;

        let err = orchestrator
            .transform(b"input", PNG_MIME, &Configuration::default())
            .await
            .unwrap_err();
        assert!(matches!(err, GlossyError::Busy("transform")));

        // The first call was not cancelled and still completes.
        release.notify_one();
        let result = first.await.unwrap().unwrap();
        assert!(matches!(result, GenerationResult::Image { .. }));
    }

    #[tokio::test]
    async fn distinct_kinds_may_run_concurrently() {
        let started = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let (orchestrator, _) = orchestrator_with(MockBackend::blocking(
            b"png",
            started.clone(),
            release.clone(),
        ));
        let orchestrator = Arc::new(orchestrator);

        let transform = {
            let orchestrator = orchestrator.clone();
            tokio::spawn(async move {
                orchestrator
                    .transform(b"input", PNG_MIME, &Configuration::default())
                    .await
            })
        };
        started.notified().await;

        // An upscale is a different kind; it claims its own slot and blocks
        // on the shared mock, which proves it got past the in-flight check.
        let upscale = {
            let orchestrator = orchestrator.clone();
            tokio::spawn(async move {
                orchestrator
                    .upscale(
                        b"input",
                        PNG_MIME,
                        ImageFilter::None,
                        TextureEffect::None,
                        OutputQuality::Standard,
                    )
                    .await
            })
        };
        started.notified().await;

        release.notify_one();
        release.notify_one();
        assert!(transform.await.unwrap().is_ok());
        assert!(upscale.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn in_flight_slot_is_released_after_failure() {
        let (orchestrator, _) = orchestrator_with(MockBackend::failing("internal error"));
        let err = orchestrator
            .transform(b"input", PNG_MIME, &Configuration::default())
            .await
            .unwrap_err();
        assert!(matches!(err, GlossyError::ServiceUnavailable(_)));

        // The flag was cleared; the next call reaches the backend again.
        let err = orchestrator
            .transform(b"input", PNG_MIME, &Configuration::default())
            .await
            .unwrap_err();
        assert!(matches!(err, GlossyError::ServiceUnavailable(_)));
    }
}
