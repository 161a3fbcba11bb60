//! Post publishing use case

use crate::{
    model::{SelectedImage, SharePost},
    ports::{ContentSource, ContentSourceError, PublishError, PublishResult, SocialPublisher},
};

/// Errors from the publish protocol. All of them abort the invocation.
#[derive(Debug, thiserror::Error)]
pub enum PostPublishError {
    #[error("Failed to register image upload: {0}")]
    RegisterUpload(PublishError),
    #[error("Failed to read rendition '{rendition}' of asset {asset_id}: {error}")]
    ReadRendition {
        asset_id: i64,
        rendition: String,
        error: ContentSourceError,
    },
    #[error("Failed to upload image: {0}")]
    Upload(PublishError),
    #[error("Failed to create post: {0}")]
    CreatePost(PublishError),
}

/// Result of the image publish protocol
#[derive(Debug, Clone)]
pub struct ImagePublishResult {
    pub post: PublishResult,
    /// URN of the registered asset referenced by the post
    pub asset_urn: String,
    /// Whether the upload answered `201 Created`
    pub uploaded: bool,
}

/// Use case for publishing a post with or without an image
pub struct PostPublisher<P, S> {
    publisher: P,
    source: S,
}

impl<P: SocialPublisher, S: ContentSource> PostPublisher<P, S> {
    pub fn new(publisher: P, source: S) -> Self {
        Self { publisher, source }
    }

    /// Create a text-only post whose commentary is the title
    pub async fn publish_text(&self, title: &str) -> Result<PublishResult, PostPublishError> {
        let post = SharePost::text(self.publisher.author_urn(), title);

        tracing::info!(platform = self.publisher.platform(), "Creating post without image");

        let result = self
            .publisher
            .create_post(&post)
            .await
            .map_err(PostPublishError::CreatePost)?;

        tracing::info!(post_id = ?result.id, "Post created");
        Ok(result)
    }

    /// Register an upload, send the rendition bytes, then create a post
    /// referencing the registered asset.
    ///
    /// An upload that answers anything but `201 Created` is logged and the
    /// post is still created.
    pub async fn publish_image(
        &self,
        title: &str,
        image: &SelectedImage,
    ) -> Result<ImagePublishResult, PostPublishError> {
        let session = self
            .publisher
            .register_upload()
            .await
            .map_err(PostPublishError::RegisterUpload)?;

        tracing::info!(
            upload_url = %session.upload_url,
            asset = %session.asset_urn,
            "Registered image upload"
        );

        let bytes = self
            .source
            .read_rendition(&image.rendition)
            .await
            .map_err(|error| PostPublishError::ReadRendition {
                asset_id: image.asset_id,
                rendition: image.rendition.name.clone(),
                error,
            })?;

        tracing::debug!(
            asset_id = image.asset_id,
            size = bytes.len(),
            "Read rendition content"
        );

        let status = self
            .publisher
            .upload_image(&session, bytes)
            .await
            .map_err(PostPublishError::Upload)?;

        let uploaded = status.is_created();
        if uploaded {
            tracing::info!(upload_url = %session.upload_url, "Image uploaded");
        } else {
            tracing::warn!(
                upload_url = %session.upload_url,
                status = status.status,
                body = %status.body,
                "Image upload did not return 201 Created, creating post anyway"
            );
        }

        let post = SharePost::with_image(self.publisher.author_urn(), title, &session.asset_urn);
        let result = self
            .publisher
            .create_post(&post)
            .await
            .map_err(PostPublishError::CreatePost)?;

        tracing::info!(post_id = ?result.id, asset = %session.asset_urn, "Post with image created");

        Ok(ImagePublishResult {
            post: result,
            asset_urn: session.asset_urn,
            uploaded,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        AssetEntity, ContentEntity, PREVIEW_RENDITION, Rendition, UploadSession, UploadStatus,
    };
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct FakeSource {
        bytes: Vec<u8>,
        fail: bool,
    }

    #[async_trait]
    impl ContentSource for FakeSource {
        async fn get_content(
            &self,
            _id: i64,
            _relations: &[&str],
        ) -> Result<Option<ContentEntity>, ContentSourceError> {
            Ok(None)
        }

        async fn get_asset(&self, _id: i64) -> Result<Option<AssetEntity>, ContentSourceError> {
            Ok(None)
        }

        async fn read_rendition(
            &self,
            _rendition: &Rendition,
        ) -> Result<Vec<u8>, ContentSourceError> {
            if self.fail {
                return Err(ContentSourceError::Api("gone".to_string()));
            }
            Ok(self.bytes.clone())
        }
    }

    #[derive(Default)]
    struct FakePublisher {
        upload_status: u16,
        fail_register: bool,
        fail_upload: bool,
        fail_create: bool,
        uploads: Mutex<Vec<Vec<u8>>>,
        posts: Mutex<Vec<SharePost>>,
    }

    #[async_trait]
    impl SocialPublisher for FakePublisher {
        async fn register_upload(&self) -> Result<UploadSession, PublishError> {
            if self.fail_register {
                return Err(PublishError::Api("register refused".to_string()));
            }
            Ok(UploadSession {
                upload_url: "https://upload.example/1".to_string(),
                asset_urn: "urn:li:digitalmediaAsset:123".to_string(),
            })
        }

        async fn upload_image(
            &self,
            _session: &UploadSession,
            bytes: Vec<u8>,
        ) -> Result<UploadStatus, PublishError> {
            if self.fail_upload {
                return Err(PublishError::Network("connection reset".to_string()));
            }
            self.uploads.lock().unwrap().push(bytes);
            Ok(UploadStatus {
                status: self.upload_status,
                body: String::new(),
            })
        }

        async fn create_post(&self, post: &SharePost) -> Result<PublishResult, PublishError> {
            if self.fail_create {
                return Err(PublishError::Api("500".to_string()));
            }
            self.posts.lock().unwrap().push(post.clone());
            Ok(PublishResult {
                id: Some("urn:li:share:1".to_string()),
            })
        }

        fn author_urn(&self) -> &str {
            "urn:li:person:me"
        }

        fn platform(&self) -> &'static str {
            "fake"
        }
    }

    fn image() -> SelectedImage {
        SelectedImage {
            asset_id: 5,
            rendition: Rendition {
                name: PREVIEW_RENDITION.to_string(),
                href: "https://hub/5/preview".to_string(),
            },
        }
    }

    fn source() -> FakeSource {
        FakeSource {
            bytes: vec![0xFF, 0xD8, 0xFF],
            fail: false,
        }
    }

    #[tokio::test]
    async fn test_publish_text_uses_title_as_commentary() {
        let publisher = FakePublisher::default();
        let source = source();
        let usecase = PostPublisher::new(&publisher, &source);

        let result = usecase.publish_text("Example Post").await.unwrap();

        assert_eq!(result.id.as_deref(), Some("urn:li:share:1"));
        let posts = publisher.posts.lock().unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].commentary, "Example Post");
        assert_eq!(posts[0].author_urn, "urn:li:person:me");
        assert!(posts[0].media.is_none());
    }

    #[tokio::test]
    async fn test_publish_text_create_failure_aborts() {
        let publisher = FakePublisher {
            fail_create: true,
            ..Default::default()
        };
        let source = source();
        let usecase = PostPublisher::new(&publisher, &source);

        let result = usecase.publish_text("Example Post").await;

        assert!(matches!(result, Err(PostPublishError::CreatePost(_))));
    }

    #[tokio::test]
    async fn test_publish_image_references_registered_asset() {
        let publisher = FakePublisher {
            upload_status: 201,
            ..Default::default()
        };
        let source = source();
        let usecase = PostPublisher::new(&publisher, &source);

        let result = usecase.publish_image("Example Post", &image()).await.unwrap();

        assert!(result.uploaded);
        assert_eq!(result.asset_urn, "urn:li:digitalmediaAsset:123");
        assert_eq!(
            *publisher.uploads.lock().unwrap(),
            vec![vec![0xFF, 0xD8, 0xFF]]
        );
        let posts = publisher.posts.lock().unwrap();
        let media = posts[0].media.as_ref().unwrap();
        assert_eq!(media.asset_urn, "urn:li:digitalmediaAsset:123");
        assert_eq!(media.title, "Example Post");
    }

    #[tokio::test]
    async fn test_failed_upload_status_still_creates_post() {
        let publisher = FakePublisher {
            upload_status: 400,
            ..Default::default()
        };
        let source = source();
        let usecase = PostPublisher::new(&publisher, &source);

        let result = usecase.publish_image("Example Post", &image()).await.unwrap();

        assert!(!result.uploaded);
        assert_eq!(publisher.posts.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_register_failure_aborts_before_upload() {
        let publisher = FakePublisher {
            fail_register: true,
            ..Default::default()
        };
        let source = source();
        let usecase = PostPublisher::new(&publisher, &source);

        let result = usecase.publish_image("Example Post", &image()).await;

        assert!(matches!(result, Err(PostPublishError::RegisterUpload(_))));
        assert!(publisher.uploads.lock().unwrap().is_empty());
        assert!(publisher.posts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rendition_read_failure_aborts() {
        let publisher = FakePublisher {
            upload_status: 201,
            ..Default::default()
        };
        let source = FakeSource {
            bytes: vec![],
            fail: true,
        };
        let usecase = PostPublisher::new(&publisher, &source);

        let result = usecase.publish_image("Example Post", &image()).await;

        assert!(matches!(
            result,
            Err(PostPublishError::ReadRendition { asset_id: 5, .. })
        ));
        assert!(publisher.posts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_publish_image_create_failure_aborts() {
        let publisher = FakePublisher {
            upload_status: 201,
            fail_create: true,
            ..Default::default()
        };
        let source = source();
        let usecase = PostPublisher::new(&publisher, &source);

        let result = usecase.publish_image("Example Post", &image()).await;

        assert!(matches!(result, Err(PostPublishError::CreatePost(_))));
    }

    #[tokio::test]
    async fn test_upload_transport_failure_aborts_without_post() {
        let publisher = FakePublisher {
            fail_upload: true,
            ..Default::default()
        };
        let source = source();
        let usecase = PostPublisher::new(&publisher, &source);

        let result = usecase.publish_image("Example Post", &image()).await;

        assert!(matches!(
            result,
            Err(PostPublishError::Upload(PublishError::Network(_)))
        ));
        assert!(publisher.posts.lock().unwrap().is_empty());
    }
}
