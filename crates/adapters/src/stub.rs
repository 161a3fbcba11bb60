//! Stub adapters for testing and offline runs

use async_trait::async_trait;
use linkedin_connector_domain::{
    AssetEntity, ContentEntity, ContentSource, ContentSourceError, PublishError, PublishResult,
    Rendition, SharePost, SocialPublisher, UploadSession, UploadStatus,
};
use std::collections::HashMap;
use std::sync::Mutex;

/// Content source serving predefined entities
#[derive(Default)]
pub struct StubContentSource {
    contents: HashMap<i64, ContentEntity>,
    assets: HashMap<i64, AssetEntity>,
    blobs: HashMap<String, Vec<u8>>,
}

impl StubContentSource {
    /// Create an empty stub
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_content(mut self, entity: ContentEntity) -> Self {
        self.contents.insert(entity.id, entity);
        self
    }

    pub fn with_asset(mut self, asset: AssetEntity) -> Self {
        self.assets.insert(asset.id, asset);
        self
    }

    /// Serve `bytes` for any rendition pointing at `href`
    pub fn with_blob(mut self, href: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.blobs.insert(href.into(), bytes);
        self
    }
}

#[async_trait]
impl ContentSource for StubContentSource {
    async fn get_content(
        &self,
        id: i64,
        _relations: &[&str],
    ) -> Result<Option<ContentEntity>, ContentSourceError> {
        Ok(self.contents.get(&id).cloned())
    }

    async fn get_asset(&self, id: i64) -> Result<Option<AssetEntity>, ContentSourceError> {
        Ok(self.assets.get(&id).cloned())
    }

    async fn read_rendition(&self, rendition: &Rendition) -> Result<Vec<u8>, ContentSourceError> {
        self.blobs
            .get(&rendition.href)
            .cloned()
            .ok_or_else(|| ContentSourceError::Api(format!("No blob at {}", rendition.href)))
    }
}

/// A call made against the stub publisher
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublisherCall {
    RegisterUpload,
    UploadImage { upload_url: String, size: usize },
    CreatePost(SharePost),
}

/// Publisher that records calls instead of talking to a platform
pub struct StubPublisher {
    author_urn: String,
    asset_urn: String,
    upload_status: u16,
    fail_create: bool,
    calls: Mutex<Vec<PublisherCall>>,
}

impl StubPublisher {
    pub fn new(author_urn: impl Into<String>) -> Self {
        Self {
            author_urn: author_urn.into(),
            asset_urn: "urn:li:digitalmediaAsset:stub".to_string(),
            upload_status: 201,
            fail_create: false,
            calls: Mutex::new(vec![]),
        }
    }

    /// Answer uploads with the given HTTP status
    pub fn with_upload_status(mut self, status: u16) -> Self {
        self.upload_status = status;
        self
    }

    /// Make every post creation fail
    pub fn failing(mut self) -> Self {
        self.fail_create = true;
        self
    }

    /// Get all calls in order
    pub fn calls(&self) -> Vec<PublisherCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Get all posts that were created
    pub fn posts(&self) -> Vec<SharePost> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                PublisherCall::CreatePost(post) => Some(post),
                _ => None,
            })
            .collect()
    }

    fn push(&self, call: PublisherCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl SocialPublisher for StubPublisher {
    async fn register_upload(&self) -> Result<UploadSession, PublishError> {
        self.push(PublisherCall::RegisterUpload);
        Ok(UploadSession {
            upload_url: "https://upload.stub/1".to_string(),
            asset_urn: self.asset_urn.clone(),
        })
    }

    async fn upload_image(
        &self,
        session: &UploadSession,
        bytes: Vec<u8>,
    ) -> Result<UploadStatus, PublishError> {
        self.push(PublisherCall::UploadImage {
            upload_url: session.upload_url.clone(),
            size: bytes.len(),
        });
        Ok(UploadStatus {
            status: self.upload_status,
            body: String::new(),
        })
    }

    async fn create_post(&self, post: &SharePost) -> Result<PublishResult, PublishError> {
        if self.fail_create {
            return Err(PublishError::Api("Stub configured to fail".to_string()));
        }

        self.push(PublisherCall::CreatePost(post.clone()));
        Ok(PublishResult {
            id: Some(format!("urn:li:share:stub-{}", self.posts().len())),
        })
    }

    fn author_urn(&self) -> &str {
        &self.author_urn
    }

    fn platform(&self) -> &'static str {
        "stub"
    }
}
