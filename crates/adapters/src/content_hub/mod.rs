//! Content hub REST adapter

mod auth;

pub use auth::PasswordGrant;

use async_trait::async_trait;
use auth::TokenProvider;
use linkedin_connector_domain::{
    AssetEntity, ContentEntity, ContentSource, ContentSourceError, Rendition,
};
use reqwest::{Client, Response, StatusCode};
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

/// Content source backed by the content hub REST API.
///
/// Built once at startup and shared across invocations; the access token is
/// acquired on the first request.
pub struct ContentHubSource {
    client: Client,
    base_url: String,
    tokens: TokenProvider,
}

impl ContentHubSource {
    pub fn new(base_url: impl Into<String>, grant: PasswordGrant) -> Self {
        Self::with_timeout(base_url, grant, Duration::from_secs(30))
    }

    pub fn with_timeout(
        base_url: impl Into<String>,
        grant: PasswordGrant,
        timeout: Duration,
    ) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            tokens: TokenProvider::new(grant),
        }
    }

    /// GET a URL with bearer auth; `Ok(None)` on 404
    async fn get(&self, url: &str) -> Result<Option<Response>, ContentSourceError> {
        let token = self.tokens.token(&self.client, &self.base_url).await?;

        let response = self
            .client
            .get(url)
            .bearer_auth(token.expose_secret())
            .send()
            .await
            .map_err(|e| ContentSourceError::Network(e.to_string()))?;

        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ContentSourceError::Auth(format!(
                "Content hub rejected credentials for {}",
                url
            )));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ContentSourceError::Api(format!(
                "GET {} failed with {}: {}",
                url, status, body
            )));
        }

        Ok(Some(response))
    }

    async fn get_entity(&self, id: i64) -> Result<Option<EntityResource>, ContentSourceError> {
        let url = format!("{}/api/entities/{}", self.base_url, id);

        let Some(response) = self.get(&url).await? else {
            return Ok(None);
        };

        let entity = response
            .json()
            .await
            .map_err(|e| ContentSourceError::InvalidResponse(e.to_string()))?;

        Ok(Some(entity))
    }

    async fn get_relation_ids(
        &self,
        id: i64,
        relation: &str,
    ) -> Result<Vec<i64>, ContentSourceError> {
        let url = format!(
            "{}/api/entities/{}/relations/{}",
            self.base_url, id, relation
        );

        let Some(response) = self.get(&url).await? else {
            tracing::debug!(entity_id = id, relation = %relation, "Relation not defined");
            return Ok(vec![]);
        };

        let resource: RelationResource = response
            .json()
            .await
            .map_err(|e| ContentSourceError::InvalidResponse(e.to_string()))?;

        resource.ids()
    }
}

#[derive(Deserialize)]
struct Link {
    href: String,
}

#[derive(Deserialize)]
struct EntityResource {
    id: i64,
    #[serde(default)]
    properties: HashMap<String, Value>,
    #[serde(default)]
    renditions: HashMap<String, Vec<Link>>,
}

/// Relation payload; which fields are set depends on the relation's cardinality and role
#[derive(Deserialize, Default)]
struct RelationResource {
    #[serde(default)]
    children: Vec<Link>,
    #[serde(default)]
    parents: Vec<Link>,
    child: Option<Link>,
    parent: Option<Link>,
}

impl RelationResource {
    fn ids(&self) -> Result<Vec<i64>, ContentSourceError> {
        self.children
            .iter()
            .chain(self.parents.iter())
            .chain(self.child.iter())
            .chain(self.parent.iter())
            .map(|link| {
                entity_id_from_href(&link.href).ok_or_else(|| {
                    ContentSourceError::InvalidResponse(format!(
                        "Cannot read entity id from {}",
                        link.href
                    ))
                })
            })
            .collect()
    }
}

/// Entity links end with the numeric id, e.g. `https://hub/api/entities/1234`
fn entity_id_from_href(href: &str) -> Option<i64> {
    href.split(['?', '#'])
        .next()?
        .trim_end_matches('/')
        .rsplit('/')
        .next()?
        .parse()
        .ok()
}

#[async_trait]
impl ContentSource for ContentHubSource {
    async fn get_content(
        &self,
        id: i64,
        relations: &[&str],
    ) -> Result<Option<ContentEntity>, ContentSourceError> {
        let Some(resource) = self.get_entity(id).await? else {
            return Ok(None);
        };

        let mut entity = ContentEntity {
            id: resource.id,
            properties: resource.properties,
            relations: HashMap::new(),
        };

        for relation in relations {
            let ids = self.get_relation_ids(id, relation).await?;
            tracing::debug!(entity_id = id, relation = %relation, ids = ?ids, "Loaded relation");
            entity.relations.insert(relation.to_string(), ids);
        }

        Ok(Some(entity))
    }

    async fn get_asset(&self, id: i64) -> Result<Option<AssetEntity>, ContentSourceError> {
        let Some(resource) = self.get_entity(id).await? else {
            return Ok(None);
        };

        let renditions = resource
            .renditions
            .into_iter()
            .map(|(name, links)| {
                let items = links
                    .into_iter()
                    .map(|link| Rendition {
                        name: name.clone(),
                        href: link.href,
                    })
                    .collect();
                (name, items)
            })
            .collect();

        Ok(Some(AssetEntity {
            id: resource.id,
            renditions,
        }))
    }

    async fn read_rendition(&self, rendition: &Rendition) -> Result<Vec<u8>, ContentSourceError> {
        let Some(response) = self.get(&rendition.href).await? else {
            return Err(ContentSourceError::Api(format!(
                "Rendition '{}' not found at {}",
                rendition.name, rendition.href
            )));
        };

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ContentSourceError::Network(e.to_string()))?;

        Ok(bytes.to_vec())
    }
}
