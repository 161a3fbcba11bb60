//! LinkedIn API adapter for publishing UGC posts

mod ugc;

use async_trait::async_trait;
use linkedin_connector_domain::{
    PublishError, PublishResult, SharePost, SocialPublisher, UploadSession, UploadStatus,
};
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use ugc::{RegisterUploadRequest, RegisterUploadResponse, UgcPostRequest, UgcPostResponse};

pub const DEFAULT_BASE_URL: &str = "https://api.linkedin.com";

/// LinkedIn publisher using the assets and UGC post APIs
pub struct LinkedInPublisher {
    client: Client,
    token: SecretString,
    base_url: String,
    author_urn: String,
    enabled: bool,
}

impl LinkedInPublisher {
    pub fn new(token: SecretString, person_id: &str) -> Self {
        Self::with_base_url(
            token,
            person_id,
            DEFAULT_BASE_URL.to_string(),
            Duration::from_secs(30),
        )
    }

    pub fn with_base_url(
        token: SecretString,
        person_id: &str,
        base_url: String,
        timeout: Duration,
    ) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            token,
            base_url: base_url.trim_end_matches('/').to_string(),
            author_urn: person_urn(person_id),
            enabled: true,
        }
    }

    /// Create a disabled publisher (for dry-run)
    pub fn disabled() -> Self {
        Self {
            client: Client::new(),
            token: SecretString::new("".into()),
            base_url: String::new(),
            author_urn: String::new(),
            enabled: false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn ensure_enabled(&self) -> Result<(), PublishError> {
        if self.enabled {
            Ok(())
        } else {
            Err(PublishError::Api("Publisher is disabled".to_string()))
        }
    }

    async fn error_for_status(response: Response, action: &str) -> PublishError {
        let status = response.status();

        if status == 401 {
            return PublishError::Auth("Invalid access token".to_string());
        }

        if status == 429 {
            return PublishError::RateLimited;
        }

        let body = response.text().await.unwrap_or_default();
        PublishError::Api(format!("Failed to {} ({}): {}", action, status, body))
    }
}

/// Accepts a bare member id or a full URN
pub fn person_urn(person_id: &str) -> String {
    let person_id = person_id.trim();
    if person_id.starts_with("urn:li:") {
        person_id.to_string()
    } else {
        format!("urn:li:person:{}", person_id)
    }
}

#[async_trait]
impl SocialPublisher for LinkedInPublisher {
    async fn register_upload(&self) -> Result<UploadSession, PublishError> {
        self.ensure_enabled()?;

        let url = format!("{}/v2/assets?action=registerUpload", self.base_url);
        let request = RegisterUploadRequest::feedshare_image(&self.author_urn);

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.token.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| PublishError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::error_for_status(response, "register upload").await);
        }

        let register: RegisterUploadResponse = response
            .json()
            .await
            .map_err(|e| PublishError::InvalidResponse(e.to_string()))?;

        let upload_url = register
            .value
            .upload_mechanism
            .media_upload_http_request
            .and_then(|mechanism| mechanism.upload_url)
            .ok_or_else(|| PublishError::InvalidResponse("Missing uploadUrl".to_string()))?;

        let asset_urn = register
            .value
            .asset
            .ok_or_else(|| PublishError::InvalidResponse("Missing asset".to_string()))?;

        Ok(UploadSession {
            upload_url,
            asset_urn,
        })
    }

    async fn upload_image(
        &self,
        session: &UploadSession,
        bytes: Vec<u8>,
    ) -> Result<UploadStatus, PublishError> {
        self.ensure_enabled()?;

        let response = self
            .client
            .post(&session.upload_url)
            .bearer_auth(self.token.expose_secret())
            .header("Content-Type", "application/octet-stream")
            .body(bytes)
            .send()
            .await
            .map_err(|e| PublishError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();

        Ok(UploadStatus { status, body })
    }

    async fn create_post(&self, post: &SharePost) -> Result<PublishResult, PublishError> {
        self.ensure_enabled()?;

        let url = format!("{}/v2/ugcPosts", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.token.expose_secret())
            .header("X-Restli-Protocol-Version", "2.0.0")
            .json(&UgcPostRequest::from(post))
            .send()
            .await
            .map_err(|e| PublishError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::error_for_status(response, "create post").await);
        }

        let header_id = response
            .headers()
            .get("x-restli-id")
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        // The id is also echoed in the body; an empty body is fine
        let body_id = response
            .json::<UgcPostResponse>()
            .await
            .ok()
            .and_then(|body| body.id);

        Ok(PublishResult {
            id: header_id.or(body_id),
        })
    }

    fn author_urn(&self) -> &str {
        &self.author_urn
    }

    fn platform(&self) -> &'static str {
        "linkedin"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_bytes, body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn publisher(server: &MockServer) -> LinkedInPublisher {
        LinkedInPublisher::with_base_url(
            SecretString::new("li-token".into()),
            "abc123",
            server.uri(),
            Duration::from_secs(5),
        )
    }

    #[tokio::test]
    async fn test_register_upload_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v2/assets"))
            .and(query_param("action", "registerUpload"))
            .and(header("Authorization", "Bearer li-token"))
            .and(header("Content-Type", "application/json"))
            .and(body_json(serde_json::json!({
                "registerUploadRequest": {
                    "owner": "urn:li:person:abc123",
                    "recipes": ["urn:li:digitalmediaRecipe:feedshare-image"],
                    "serviceRelationships": [{
                        "identifier": "urn:li:userGeneratedContent",
                        "relationshipType": "OWNER"
                    }],
                    "supportedUploadMechanism": ["SYNCHRONOUS_UPLOAD"]
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "value": {
                    "uploadMechanism": {
                        "com.linkedin.digitalmedia.uploading.MediaUploadHttpRequest": {
                            "headers": {},
                            "uploadUrl": "https://api.linkedin.com/mediaUpload/C5522AQ/feedshare-uploadedImage/0"
                        }
                    },
                    "mediaArtifact": "urn:li:digitalmediaMediaArtifact:(urn:li:digitalmediaAsset:123,urn:li:digitalmediaMediaArtifactClass:feedshare-uploadedImage)",
                    "asset": "urn:li:digitalmediaAsset:123"
                }
            })))
            .mount(&mock_server)
            .await;

        let session = publisher(&mock_server).register_upload().await.unwrap();

        assert_eq!(session.asset_urn, "urn:li:digitalmediaAsset:123");
        assert_eq!(
            session.upload_url,
            "https://api.linkedin.com/mediaUpload/C5522AQ/feedshare-uploadedImage/0"
        );
    }

    #[tokio::test]
    async fn test_register_upload_missing_url() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v2/assets"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "value": { "asset": "urn:li:digitalmediaAsset:123" }
            })))
            .mount(&mock_server)
            .await;

        let result = publisher(&mock_server).register_upload().await;

        assert!(matches!(result, Err(PublishError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn test_register_upload_unauthorized() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v2/assets"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&mock_server)
            .await;

        let result = publisher(&mock_server).register_upload().await;

        assert!(matches!(result, Err(PublishError::Auth(_))));
    }

    #[tokio::test]
    async fn test_upload_image_sends_raw_bytes() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/mediaUpload/1"))
            .and(header("Authorization", "Bearer li-token"))
            .and(body_bytes(vec![1u8, 2, 3]))
            .respond_with(ResponseTemplate::new(201))
            .mount(&mock_server)
            .await;

        let session = UploadSession {
            upload_url: format!("{}/mediaUpload/1", mock_server.uri()),
            asset_urn: "urn:li:digitalmediaAsset:123".to_string(),
        };

        let status = publisher(&mock_server)
            .upload_image(&session, vec![1, 2, 3])
            .await
            .unwrap();

        assert!(status.is_created());
    }

    #[tokio::test]
    async fn test_upload_image_non_created_is_not_an_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/mediaUpload/1"))
            .respond_with(ResponseTemplate::new(400).set_body_string("bad image"))
            .mount(&mock_server)
            .await;

        let session = UploadSession {
            upload_url: format!("{}/mediaUpload/1", mock_server.uri()),
            asset_urn: "urn:li:digitalmediaAsset:123".to_string(),
        };

        let status = publisher(&mock_server)
            .upload_image(&session, vec![1, 2, 3])
            .await
            .unwrap();

        assert!(!status.is_created());
        assert_eq!(status.status, 400);
        assert_eq!(status.body, "bad image");
    }

    #[tokio::test]
    async fn test_create_text_post() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v2/ugcPosts"))
            .and(header("X-Restli-Protocol-Version", "2.0.0"))
            .and(body_json(serde_json::json!({
                "author": "urn:li:person:abc123",
                "lifecycleState": "PUBLISHED",
                "specificContent": {
                    "com.linkedin.ugc.ShareContent": {
                        "shareCommentary": { "attributes": [], "text": "Example Post" },
                        "shareMediaCategory": "NONE"
                    }
                },
                "visibility": { "com.linkedin.ugc.MemberNetworkVisibility": "PUBLIC" }
            })))
            .respond_with(
                ResponseTemplate::new(201)
                    .insert_header("x-restli-id", "urn:li:share:6844785523593134080")
                    .set_body_json(serde_json::json!({ "id": "urn:li:share:6844785523593134080" })),
            )
            .mount(&mock_server)
            .await;

        let publisher = publisher(&mock_server);
        let post = SharePost::text(publisher.author_urn(), "Example Post");

        let result = publisher.create_post(&post).await.unwrap();

        assert_eq!(result.id.as_deref(), Some("urn:li:share:6844785523593134080"));
    }

    #[tokio::test]
    async fn test_create_post_reads_id_from_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v2/ugcPosts"))
            .respond_with(
                ResponseTemplate::new(201)
                    .set_body_json(serde_json::json!({ "id": "urn:li:share:1" })),
            )
            .mount(&mock_server)
            .await;

        let publisher = publisher(&mock_server);
        let post = SharePost::text(publisher.author_urn(), "Example Post");

        let result = publisher.create_post(&post).await.unwrap();

        assert_eq!(result.id.as_deref(), Some("urn:li:share:1"));
    }

    #[tokio::test]
    async fn test_create_post_failure() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v2/ugcPosts"))
            .respond_with(ResponseTemplate::new(422).set_body_string("duplicate post"))
            .mount(&mock_server)
            .await;

        let publisher = publisher(&mock_server);
        let post = SharePost::text(publisher.author_urn(), "Example Post");

        let result = publisher.create_post(&post).await;

        match result {
            Err(PublishError::Api(message)) => assert!(message.contains("duplicate post")),
            other => panic!("expected API error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_create_post_rate_limited() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v2/ugcPosts"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&mock_server)
            .await;

        let publisher = publisher(&mock_server);
        let post = SharePost::text(publisher.author_urn(), "Example Post");

        let result = publisher.create_post(&post).await;

        assert!(matches!(result, Err(PublishError::RateLimited)));
    }

    #[tokio::test]
    async fn test_disabled_publisher() {
        let publisher = LinkedInPublisher::disabled();

        assert!(!publisher.is_enabled());

        let result = publisher
            .create_post(&SharePost::text("urn:li:person:x", "Example Post"))
            .await;
        assert!(result.is_err());
    }

    #[test]
    fn test_person_urn() {
        assert_eq!(person_urn("abc123"), "urn:li:person:abc123");
        assert_eq!(person_urn("urn:li:person:abc123"), "urn:li:person:abc123");
        assert_eq!(
            person_urn("urn:li:organization:42"),
            "urn:li:organization:42"
        );
    }
}
