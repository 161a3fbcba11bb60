//! Wire types for the LinkedIn assets and UGC post APIs

use linkedin_connector_domain::SharePost;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const FEEDSHARE_IMAGE_RECIPE: &str = "urn:li:digitalmediaRecipe:feedshare-image";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RegisterUploadRequest {
    register_upload_request: RegisterUploadBody,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RegisterUploadBody {
    owner: String,
    recipes: Vec<&'static str>,
    service_relationships: Vec<ServiceRelationship>,
    supported_upload_mechanism: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ServiceRelationship {
    identifier: &'static str,
    relationship_type: &'static str,
}

impl RegisterUploadRequest {
    /// Single feed-share image owned by `owner`, uploaded synchronously
    pub(crate) fn feedshare_image(owner: &str) -> Self {
        Self {
            register_upload_request: RegisterUploadBody {
                owner: owner.to_string(),
                recipes: vec![FEEDSHARE_IMAGE_RECIPE],
                service_relationships: vec![ServiceRelationship {
                    identifier: "urn:li:userGeneratedContent",
                    relationship_type: "OWNER",
                }],
                supported_upload_mechanism: vec!["SYNCHRONOUS_UPLOAD"],
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct RegisterUploadResponse {
    pub(crate) value: RegisterUploadValue,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RegisterUploadValue {
    #[serde(default)]
    pub(crate) upload_mechanism: UploadMechanism,
    pub(crate) asset: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct UploadMechanism {
    #[serde(rename = "com.linkedin.digitalmedia.uploading.MediaUploadHttpRequest")]
    pub(crate) media_upload_http_request: Option<MediaUploadHttpRequest>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MediaUploadHttpRequest {
    pub(crate) upload_url: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UgcPostRequest<'a> {
    author: &'a str,
    lifecycle_state: &'static str,
    specific_content: SpecificContent<'a>,
    visibility: Visibility,
}

#[derive(Debug, Serialize)]
struct SpecificContent<'a> {
    #[serde(rename = "com.linkedin.ugc.ShareContent")]
    share_content: ShareContent<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ShareContent<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    media: Option<Vec<UgcMedia<'a>>>,
    share_commentary: AttributedText<'a>,
    share_media_category: &'static str,
}

#[derive(Debug, Serialize)]
struct UgcMedia<'a> {
    media: &'a str,
    status: &'static str,
    title: AttributedText<'a>,
}

#[derive(Debug, Serialize)]
struct AttributedText<'a> {
    attributes: Vec<Value>,
    text: &'a str,
}

impl<'a> AttributedText<'a> {
    fn plain(text: &'a str) -> Self {
        Self {
            attributes: Vec::new(),
            text,
        }
    }
}

#[derive(Debug, Serialize)]
struct Visibility {
    #[serde(rename = "com.linkedin.ugc.MemberNetworkVisibility")]
    member_network_visibility: &'static str,
}

impl<'a> From<&'a SharePost> for UgcPostRequest<'a> {
    fn from(post: &'a SharePost) -> Self {
        let (media, category) = match &post.media {
            Some(media) => (
                Some(vec![UgcMedia {
                    media: &media.asset_urn,
                    status: "READY",
                    title: AttributedText::plain(&media.title),
                }]),
                "IMAGE",
            ),
            None => (None, "NONE"),
        };

        Self {
            author: &post.author_urn,
            lifecycle_state: "PUBLISHED",
            specific_content: SpecificContent {
                share_content: ShareContent {
                    media,
                    share_commentary: AttributedText::plain(&post.commentary),
                    share_media_category: category,
                },
            },
            visibility: Visibility {
                member_network_visibility: "PUBLIC",
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct UgcPostResponse {
    pub(crate) id: Option<String>,
}
