//! Domain models and value objects

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use time::OffsetDateTime;
use uuid::Uuid;

/// Relation from CMP content to its candidate images
pub const LINKED_ASSET_RELATION: &str = "CmpContentToLinkedAsset";
/// Relation from CMP content to its preferred image (at most one)
pub const MASTER_LINKED_ASSET_RELATION: &str = "CmpContentToMasterLinkedAsset";
/// Property holding the content title
pub const TITLE_PROPERTY: &str = "Content.Name";
pub const PREVIEW_RENDITION: &str = "preview";
pub const ORIGINAL_RENDITION: &str = "original";

/// Queue notification referencing a content entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerMessage {
    /// Numeric id of the content entity that was saved
    pub target_id: i64,
    /// Broker-assigned message id, used for duplicate detection
    pub message_id: Option<String>,
}

/// Error type for trigger envelope parsing
#[derive(Debug, thiserror::Error)]
pub enum TriggerError {
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Missing field: {0}")]
    MissingField(&'static str),
    #[error("Invalid TargetId: {0}")]
    InvalidTargetId(String),
}

impl TriggerMessage {
    pub fn new(target_id: i64) -> Self {
        Self {
            target_id,
            message_id: None,
        }
    }

    pub fn with_message_id(mut self, message_id: impl Into<String>) -> Self {
        self.message_id = Some(message_id.into());
        self
    }

    /// Parse the raw queue payload
    pub fn from_json(raw: &str) -> Result<Self, TriggerError> {
        let value: Value = serde_json::from_str(raw)?;
        Self::from_value(&value)
    }

    /// Parse an already decoded `{"saveEntityMessage": {"TargetId": ...}}` envelope.
    ///
    /// `TargetId` is accepted as a JSON number or a numeric string.
    pub fn from_value(value: &Value) -> Result<Self, TriggerError> {
        let message = value
            .get("saveEntityMessage")
            .ok_or(TriggerError::MissingField("saveEntityMessage"))?;

        let target = message
            .get("TargetId")
            .ok_or(TriggerError::MissingField("saveEntityMessage.TargetId"))?;

        let target_id = match target {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
        .ok_or_else(|| TriggerError::InvalidTargetId(target.to_string()))?;

        Ok(Self::new(target_id))
    }
}

/// A content entity as loaded from the content hub
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentEntity {
    pub id: i64,
    /// Property values keyed by property name
    #[serde(default)]
    pub properties: HashMap<String, Value>,
    /// Related entity ids keyed by relation name, in platform order
    #[serde(default)]
    pub relations: HashMap<String, Vec<i64>>,
}

impl ContentEntity {
    pub fn new(id: i64) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    pub fn with_relation(mut self, name: impl Into<String>, ids: Vec<i64>) -> Self {
        self.relations.insert(name.into(), ids);
        self
    }

    /// Get a string property, if set
    pub fn property_str(&self, name: &str) -> Option<&str> {
        self.properties.get(name).and_then(Value::as_str)
    }

    pub fn title(&self) -> Option<&str> {
        self.property_str(TITLE_PROPERTY)
    }

    /// Ids of a relation; empty when the relation was not loaded or has no members
    pub fn relation_ids(&self, name: &str) -> &[i64] {
        self.relations.get(name).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// A media asset entity with its renditions
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssetEntity {
    pub id: i64,
    /// Rendition items keyed by rendition name
    #[serde(default)]
    pub renditions: HashMap<String, Vec<Rendition>>,
}

impl AssetEntity {
    pub fn new(id: i64) -> Self {
        Self {
            id,
            renditions: HashMap::new(),
        }
    }

    pub fn with_rendition(mut self, name: &str, href: impl Into<String>) -> Self {
        self.renditions
            .entry(name.to_string())
            .or_default()
            .push(Rendition {
                name: name.to_string(),
                href: href.into(),
            });
        self
    }

    /// First item of the named rendition
    pub fn rendition(&self, name: &str) -> Option<&Rendition> {
        self.renditions.get(name).and_then(|items| items.first())
    }
}

/// A downloadable variant of an asset's file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rendition {
    pub name: String,
    pub href: String,
}

/// The rendition chosen for publication
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedImage {
    pub asset_id: i64,
    pub rendition: Rendition,
}

/// Upload slot handed out by the target platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadSession {
    pub upload_url: String,
    pub asset_urn: String,
}

/// HTTP answer to a binary upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadStatus {
    pub status: u16,
    pub body: String,
}

impl UploadStatus {
    pub fn is_created(&self) -> bool {
        self.status == 201
    }
}

/// Platform-neutral post creation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharePost {
    /// Author URN, e.g. `urn:li:person:abc`
    pub author_urn: String,
    /// Commentary text shown with the post
    pub commentary: String,
    pub media: Option<ShareMedia>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareMedia {
    pub asset_urn: String,
    pub title: String,
}

impl SharePost {
    /// Text-only post
    pub fn text(author_urn: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            author_urn: author_urn.into(),
            commentary: title.into(),
            media: None,
        }
    }

    /// Post carrying one uploaded image; the title doubles as media title and commentary
    pub fn with_image(
        author_urn: impl Into<String>,
        title: impl Into<String>,
        asset_urn: impl Into<String>,
    ) -> Self {
        let title = title.into();
        Self {
            author_urn: author_urn.into(),
            commentary: title.clone(),
            media: Some(ShareMedia {
                asset_urn: asset_urn.into(),
                title,
            }),
        }
    }
}

/// What was attached to a published post
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PublishedMedia {
    /// Content had no linked assets
    Text,
    /// Image registered and referenced by the post
    Image { asset_urn: String, uploaded: bool },
    /// Linked assets exist but none had a usable rendition
    Missing { asset_id: i64 },
}

/// Image a dry run would have attached
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlannedImage {
    /// Content has no linked assets
    NoLinkedAssets,
    Selected { asset_id: i64, rendition: Rendition },
    /// Chosen asset has no usable rendition; a text post would be created
    Unavailable { asset_id: i64 },
}

/// Result of handling one trigger message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum InvocationOutcome {
    /// Content entity does not exist; nothing was posted
    NotFound { target_id: i64 },
    /// Message was already delivered earlier
    Duplicate { message_id: String },
    /// Content resolved but publishing was skipped
    DryRun {
        target_id: i64,
        title: String,
        image: PlannedImage,
    },
    Published {
        target_id: i64,
        post_id: Option<String>,
        media: PublishedMedia,
    },
}

/// Record of a handled delivery (for idempotency)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryRecord {
    pub id: Uuid,
    /// Queue message id
    pub message_id: String,
    /// Content entity id
    pub target_id: i64,
    /// Created post id, when the platform returned one
    pub post_id: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub published_at: OffsetDateTime,
}
