//! Port definitions (traits) for external dependencies
//!
//! These traits define the boundaries between the domain and external systems.
//! Adapters implement these traits to connect to real infrastructure.

use async_trait::async_trait;
use thiserror::Error;
use time::OffsetDateTime;

use crate::model::{
    AssetEntity, ContentEntity, DeliveryRecord, Rendition, SharePost, UploadSession, UploadStatus,
};

/// Error type for content source operations
#[derive(Debug, Error)]
pub enum ContentSourceError {
    #[error("API error: {0}")]
    Api(String),
    #[error("Authentication failed: {0}")]
    Auth(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Port for reading entities from the content hub
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Load a content entity with all properties and the named relations.
    /// Returns `Ok(None)` when the entity does not exist.
    async fn get_content(
        &self,
        id: i64,
        relations: &[&str],
    ) -> Result<Option<ContentEntity>, ContentSourceError>;

    /// Load an asset entity with its renditions
    async fn get_asset(&self, id: i64) -> Result<Option<AssetEntity>, ContentSourceError>;

    /// Read the full content of a rendition into memory
    async fn read_rendition(&self, rendition: &Rendition) -> Result<Vec<u8>, ContentSourceError>;
}

/// Error type for publisher operations
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("API error: {0}")]
    Api(String),
    #[error("Rate limited")]
    RateLimited,
    #[error("Authentication failed: {0}")]
    Auth(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Result of a successful publish operation
#[derive(Debug, Clone, Default)]
pub struct PublishResult {
    /// Platform-specific post ID, if the platform returned one
    pub id: Option<String>,
}

/// Port for the target social platform's publishing API
#[async_trait]
pub trait SocialPublisher: Send + Sync {
    /// Reserve an upload slot for one image
    async fn register_upload(&self) -> Result<UploadSession, PublishError>;

    /// Send image bytes to the upload slot.
    ///
    /// Transport failures are errors; any HTTP answer is returned as a status.
    async fn upload_image(
        &self,
        session: &UploadSession,
        bytes: Vec<u8>,
    ) -> Result<UploadStatus, PublishError>;

    /// Create a post
    async fn create_post(&self, post: &SharePost) -> Result<PublishResult, PublishError>;

    /// URN of the member posts are authored as
    fn author_urn(&self) -> &str;

    /// Get the platform name (e.g., "linkedin")
    fn platform(&self) -> &'static str;
}

/// Error type for delivery log operations
#[derive(Debug, Error)]
pub enum DeliveryLogError {
    #[error("Database error: {0}")]
    Database(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Port for remembering which queue messages were already handled
#[async_trait]
pub trait DeliveryLog: Send + Sync {
    /// Check if a message id has been delivered before
    async fn is_delivered(&self, message_id: &str) -> Result<bool, DeliveryLogError>;

    /// Record a handled delivery
    async fn record(&self, record: &DeliveryRecord) -> Result<(), DeliveryLogError>;
}

/// Port for time/clock operations (enables deterministic testing)
pub trait Clock: Send + Sync {
    /// Get the current time
    fn now(&self) -> OffsetDateTime;
}

/// Real clock implementation
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

#[async_trait]
impl<S: ContentSource + ?Sized> ContentSource for &S {
    async fn get_content(
        &self,
        id: i64,
        relations: &[&str],
    ) -> Result<Option<ContentEntity>, ContentSourceError> {
        (*self).get_content(id, relations).await
    }

    async fn get_asset(&self, id: i64) -> Result<Option<AssetEntity>, ContentSourceError> {
        (*self).get_asset(id).await
    }

    async fn read_rendition(&self, rendition: &Rendition) -> Result<Vec<u8>, ContentSourceError> {
        (*self).read_rendition(rendition).await
    }
}

#[async_trait]
impl<P: SocialPublisher + ?Sized> SocialPublisher for &P {
    async fn register_upload(&self) -> Result<UploadSession, PublishError> {
        (*self).register_upload().await
    }

    async fn upload_image(
        &self,
        session: &UploadSession,
        bytes: Vec<u8>,
    ) -> Result<UploadStatus, PublishError> {
        (*self).upload_image(session, bytes).await
    }

    async fn create_post(&self, post: &SharePost) -> Result<PublishResult, PublishError> {
        (*self).create_post(post).await
    }

    fn author_urn(&self) -> &str {
        (*self).author_urn()
    }

    fn platform(&self) -> &'static str {
        (*self).platform()
    }
}
