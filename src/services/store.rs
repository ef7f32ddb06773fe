// src/services/store.rs
use crate::errors::GlossyError;
use crate::models::{Configuration, GeneratedImage, ImageUpload};
use redis::{AsyncCommands, Client};
use uuid::Uuid;

const IMAGE_TTL_SECS: usize = 86400;
const SETTINGS_KEY: &str = "settings:configuration";

/// Redis-backed store for uploaded images, generation results, and the
/// persisted configuration. The core pipeline never touches this directly;
/// handlers load inputs here and pass bytes down.
pub struct StudioStore {
    client: Client,
}

impl StudioStore {
    pub async fn new(redis_url: &str) -> Result<Self, GlossyError> {
        let client = Client::open(redis_url).map_err(|e| GlossyError::Storage(e.to_string()))?;

        // Test connection
        let mut conn = client
            .get_async_connection()
            .await
            .map_err(|e| GlossyError::Storage(e.to_string()))?;

        redis::cmd("PING")
            .query_async::<_, String>(&mut conn)
            .await
            .map_err(|e| GlossyError::Storage(e.to_string()))?;

        Ok(Self { client })
    }

    async fn connection(&self) -> Result<redis::aio::Connection, GlossyError> {
        self.client
            .get_async_connection()
            .await
            .map_err(|e| GlossyError::Storage(e.to_string()))
    }

    pub async fn store_upload(&self, image: &ImageUpload) -> Result<(), GlossyError> {
        let mut conn = self.connection().await?;

        let key = format!("upload:{}", image.id);
        let value =
            serde_json::to_string(image).map_err(|e| GlossyError::Serialization(e.to_string()))?;

        // Uploads expire after 24 hours
        conn.set_ex::<_, _, ()>(&key, value, IMAGE_TTL_SECS)
            .await
            .map_err(|e| GlossyError::Storage(e.to_string()))?;

        let session_key = format!("session:{}:uploads", image.session_id);
        conn.sadd::<_, _, ()>(&session_key, image.id.to_string())
            .await
            .map_err(|e| GlossyError::Storage(e.to_string()))?;

        Ok(())
    }

    pub async fn get_upload(&self, image_id: &Uuid) -> Result<ImageUpload, GlossyError> {
        let mut conn = self.connection().await?;

        let key = format!("upload:{}", image_id);
        let value: String = conn
            .get(&key)
            .await
            .map_err(|e| GlossyError::Storage(format!("image not found: {e}")))?;

        serde_json::from_str(&value).map_err(|e| GlossyError::Serialization(e.to_string()))
    }

    pub async fn store_generated(&self, image: &GeneratedImage) -> Result<(), GlossyError> {
        let mut conn = self.connection().await?;

        let key = format!("generated:{}", image.id);
        let value =
            serde_json::to_string(image).map_err(|e| GlossyError::Serialization(e.to_string()))?;

        conn.set_ex::<_, _, ()>(&key, value, IMAGE_TTL_SECS)
            .await
            .map_err(|e| GlossyError::Storage(e.to_string()))?;

        Ok(())
    }

    pub async fn get_generated(&self, image_id: &Uuid) -> Result<GeneratedImage, GlossyError> {
        let mut conn = self.connection().await?;

        let key = format!("generated:{}", image_id);
        let value: String = conn
            .get(&key)
            .await
            .map_err(|e| GlossyError::Storage(format!("generated image not found: {e}")))?;

        serde_json::from_str(&value).map_err(|e| GlossyError::Serialization(e.to_string()))
    }

    /// Resolve an id against generated results first, then raw uploads, so
    /// follow-up operations work on either.
    pub async fn get_any_image(&self, id: &Uuid) -> Result<(Vec<u8>, String), GlossyError> {
        if let Ok(generated) = self.get_generated(id).await {
            return Ok((generated.data, generated.mime_type));
        }
        let upload = self.get_upload(id).await?;
        Ok((upload.data, upload.content_type))
    }

    pub async fn save_settings(&self, config: &Configuration) -> Result<(), GlossyError> {
        let mut conn = self.connection().await?;
        let value =
            serde_json::to_string(config).map_err(|e| GlossyError::Serialization(e.to_string()))?;
        conn.set::<_, _, ()>(SETTINGS_KEY, value)
            .await
            .map_err(|e| GlossyError::Storage(e.to_string()))?;
        Ok(())
    }

    pub async fn load_settings(&self) -> Result<Option<Configuration>, GlossyError> {
        let mut conn = self.connection().await?;
        let value: Option<String> = conn
            .get(SETTINGS_KEY)
            .await
            .map_err(|e| GlossyError::Storage(e.to_string()))?;

        match value {
            Some(json) => serde_json::from_str(&json)
                .map(Some)
                .map_err(|e| GlossyError::Serialization(e.to_string())),
            None => Ok(None),
        }
    }
}
