//! Content resolution use case

use crate::{
    model::{
        AssetEntity, ContentEntity, LINKED_ASSET_RELATION, MASTER_LINKED_ASSET_RELATION,
        ORIGINAL_RENDITION, PREVIEW_RENDITION, PlannedImage, Rendition, SelectedImage,
    },
    ports::{ContentSource, ContentSourceError},
};

/// Image decision for a content entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageResolution {
    /// The linked-assets relation is empty
    NoLinkedAssets,
    /// A rendition was found on the chosen asset
    Selected(SelectedImage),
    /// The chosen asset is gone or has neither a preview nor an original rendition
    Unavailable { asset_id: i64 },
}

impl From<&ImageResolution> for PlannedImage {
    fn from(resolution: &ImageResolution) -> Self {
        match resolution {
            ImageResolution::NoLinkedAssets => PlannedImage::NoLinkedAssets,
            ImageResolution::Selected(image) => PlannedImage::Selected {
                asset_id: image.asset_id,
                rendition: image.rendition.clone(),
            },
            ImageResolution::Unavailable { asset_id } => PlannedImage::Unavailable {
                asset_id: *asset_id,
            },
        }
    }
}

/// Resolved content ready for publishing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub content_id: i64,
    pub title: String,
    pub image: ImageResolution,
}

/// Errors from content resolution
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("Failed to load content {id}: {error}")]
    Content { id: i64, error: ContentSourceError },
    #[error("Failed to load asset {id}: {error}")]
    Asset { id: i64, error: ContentSourceError },
}

/// Use case for loading content and choosing its image
pub struct ContentResolver<S> {
    source: S,
}

impl<S: ContentSource> ContentResolver<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Load a content entity and pick the rendition to publish.
    ///
    /// Returns `Ok(None)` when the entity does not exist.
    pub async fn resolve(&self, content_id: i64) -> Result<Option<Resolution>, ResolveError> {
        let entity = self
            .source
            .get_content(
                content_id,
                &[LINKED_ASSET_RELATION, MASTER_LINKED_ASSET_RELATION],
            )
            .await
            .map_err(|error| ResolveError::Content {
                id: content_id,
                error,
            })?;

        let Some(entity) = entity else {
            tracing::info!(content_id, "Content entity not found, nothing to publish");
            return Ok(None);
        };

        let title = match entity.title() {
            Some(title) => title.to_string(),
            None => {
                tracing::warn!(content_id, "Content entity has no title");
                String::new()
            }
        };

        let image = self.resolve_image(&entity).await?;

        Ok(Some(Resolution {
            content_id: entity.id,
            title,
            image,
        }))
    }

    async fn resolve_image(&self, entity: &ContentEntity) -> Result<ImageResolution, ResolveError> {
        let Some(asset_id) = select_asset_id(entity) else {
            tracing::info!(content_id = entity.id, "No assets selected with content");
            return Ok(ImageResolution::NoLinkedAssets);
        };

        let asset = self
            .source
            .get_asset(asset_id)
            .await
            .map_err(|error| ResolveError::Asset {
                id: asset_id,
                error,
            })?;

        let Some(asset) = asset else {
            tracing::warn!(content_id = entity.id, asset_id, "Selected asset not found");
            return Ok(ImageResolution::Unavailable { asset_id });
        };

        match select_rendition(&asset) {
            Some(rendition) => {
                tracing::debug!(
                    content_id = entity.id,
                    asset_id,
                    rendition = %rendition.name,
                    "Selected rendition"
                );
                Ok(ImageResolution::Selected(SelectedImage {
                    asset_id,
                    rendition: rendition.clone(),
                }))
            }
            None => {
                tracing::warn!(
                    content_id = entity.id,
                    asset_id,
                    "Asset has neither a preview nor an original rendition"
                );
                Ok(ImageResolution::Unavailable { asset_id })
            }
        }
    }
}

/// Pick the asset to publish: the master asset when set, otherwise the first
/// linked asset in platform order. `None` when nothing is linked.
pub fn select_asset_id(entity: &ContentEntity) -> Option<i64> {
    let linked = entity.relation_ids(LINKED_ASSET_RELATION);
    if linked.is_empty() {
        return None;
    }

    match entity.relation_ids(MASTER_LINKED_ASSET_RELATION).first() {
        Some(&master_id) => Some(master_id),
        None => {
            tracing::info!(
                content_id = entity.id,
                "No master asset selected, using first linked asset"
            );
            linked.first().copied()
        }
    }
}

/// Preview rendition, falling back to the original
pub fn select_rendition(asset: &AssetEntity) -> Option<&Rendition> {
    asset
        .rendition(PREVIEW_RENDITION)
        .or_else(|| asset.rendition(ORIGINAL_RENDITION))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TITLE_PROPERTY;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeContentSource {
        contents: HashMap<i64, ContentEntity>,
        assets: HashMap<i64, AssetEntity>,
        asset_requests: Mutex<Vec<i64>>,
        fail_content: bool,
    }

    #[async_trait]
    impl ContentSource for FakeContentSource {
        async fn get_content(
            &self,
            id: i64,
            _relations: &[&str],
        ) -> Result<Option<ContentEntity>, ContentSourceError> {
            if self.fail_content {
                return Err(ContentSourceError::Network("connection reset".to_string()));
            }
            Ok(self.contents.get(&id).cloned())
        }

        async fn get_asset(&self, id: i64) -> Result<Option<AssetEntity>, ContentSourceError> {
            self.asset_requests.lock().unwrap().push(id);
            Ok(self.assets.get(&id).cloned())
        }

        async fn read_rendition(
            &self,
            _rendition: &Rendition,
        ) -> Result<Vec<u8>, ContentSourceError> {
            Ok(vec![])
        }
    }

    fn content(linked: Vec<i64>, master: Vec<i64>) -> ContentEntity {
        ContentEntity::new(100)
            .with_property(TITLE_PROPERTY, "Example Post")
            .with_relation(LINKED_ASSET_RELATION, linked)
            .with_relation(MASTER_LINKED_ASSET_RELATION, master)
    }

    fn source_with(entity: ContentEntity, assets: Vec<AssetEntity>) -> FakeContentSource {
        FakeContentSource {
            contents: HashMap::from([(entity.id, entity)]),
            assets: assets.into_iter().map(|a| (a.id, a)).collect(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_missing_entity_resolves_to_none() {
        let resolver = ContentResolver::new(FakeContentSource::default());

        let result = resolver.resolve(404).await.unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_no_linked_assets_means_no_image() {
        let source = source_with(content(vec![], vec![]), vec![]);
        let resolver = ContentResolver::new(&source);

        let resolution = resolver.resolve(100).await.unwrap().unwrap();

        assert_eq!(resolution.title, "Example Post");
        assert_eq!(resolution.image, ImageResolution::NoLinkedAssets);
        assert!(source.asset_requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_master_asset_preferred_with_preview() {
        let source = source_with(
            content(vec![1, 2], vec![2]),
            vec![
                AssetEntity::new(1).with_rendition(PREVIEW_RENDITION, "https://hub/1/preview"),
                AssetEntity::new(2)
                    .with_rendition(ORIGINAL_RENDITION, "https://hub/2/original")
                    .with_rendition(PREVIEW_RENDITION, "https://hub/2/preview"),
            ],
        );
        let resolver = ContentResolver::new(&source);

        let resolution = resolver.resolve(100).await.unwrap().unwrap();

        match resolution.image {
            ImageResolution::Selected(image) => {
                assert_eq!(image.asset_id, 2);
                assert_eq!(image.rendition.name, PREVIEW_RENDITION);
                assert_eq!(image.rendition.href, "https://hub/2/preview");
            }
            other => panic!("expected selected image, got {:?}", other),
        }
        assert_eq!(*source.asset_requests.lock().unwrap(), vec![2]);
    }

    #[tokio::test]
    async fn test_first_linked_asset_used_without_master() {
        let source = source_with(
            content(vec![9, 3, 5], vec![]),
            vec![
                AssetEntity::new(3).with_rendition(PREVIEW_RENDITION, "https://hub/3/preview"),
                AssetEntity::new(9).with_rendition(PREVIEW_RENDITION, "https://hub/9/preview"),
            ],
        );
        let resolver = ContentResolver::new(&source);

        let resolution = resolver.resolve(100).await.unwrap().unwrap();

        match resolution.image {
            ImageResolution::Selected(image) => assert_eq!(image.asset_id, 9),
            other => panic!("expected selected image, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_falls_back_to_original_rendition() {
        let source = source_with(
            content(vec![7], vec![]),
            vec![AssetEntity::new(7).with_rendition(ORIGINAL_RENDITION, "https://hub/7/original")],
        );
        let resolver = ContentResolver::new(&source);

        let resolution = resolver.resolve(100).await.unwrap().unwrap();

        match resolution.image {
            ImageResolution::Selected(image) => {
                assert_eq!(image.rendition.name, ORIGINAL_RENDITION);
            }
            other => panic!("expected selected image, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_asset_without_usable_rendition_is_unavailable() {
        let source = source_with(
            content(vec![7], vec![]),
            vec![AssetEntity::new(7).with_rendition("thumbnail", "https://hub/7/thumb")],
        );
        let resolver = ContentResolver::new(&source);

        let resolution = resolver.resolve(100).await.unwrap().unwrap();

        assert_eq!(
            resolution.image,
            ImageResolution::Unavailable { asset_id: 7 }
        );
    }

    #[tokio::test]
    async fn test_missing_asset_is_unavailable() {
        let source = source_with(content(vec![7], vec![]), vec![]);
        let resolver = ContentResolver::new(&source);

        let resolution = resolver.resolve(100).await.unwrap().unwrap();

        assert_eq!(
            resolution.image,
            ImageResolution::Unavailable { asset_id: 7 }
        );
    }

    #[tokio::test]
    async fn test_source_failure_is_propagated() {
        let source = FakeContentSource {
            fail_content: true,
            ..Default::default()
        };
        let resolver = ContentResolver::new(&source);

        let result = resolver.resolve(100).await;

        assert!(matches!(result, Err(ResolveError::Content { id: 100, .. })));
    }

    #[test]
    fn test_master_without_linked_assets_is_ignored() {
        let entity = content(vec![], vec![4]);

        assert_eq!(select_asset_id(&entity), None);
    }

    #[tokio::test]
    async fn test_missing_title_becomes_empty() {
        let source = source_with(ContentEntity::new(100), vec![]);
        let resolver = ContentResolver::new(&source);

        let resolution = resolver.resolve(100).await.unwrap().unwrap();

        assert_eq!(resolution.title, "");
        assert_eq!(resolution.image, ImageResolution::NoLinkedAssets);
    }
}
