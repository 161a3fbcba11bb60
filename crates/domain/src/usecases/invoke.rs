//! Invocation use case - orchestrates resolving content and publishing it

use std::sync::Arc;
use uuid::Uuid;

use crate::{
    model::{DeliveryRecord, InvocationOutcome, PlannedImage, PublishedMedia, TriggerMessage},
    ports::{Clock, ContentSource, DeliveryLog, PublishResult, SocialPublisher},
    usecases::{
        publish::{PostPublishError, PostPublisher},
        resolve::{ContentResolver, ImageResolution, ResolveError},
    },
};

/// Configuration for the invocation handler
#[derive(Debug, Clone, Default)]
pub struct InvocationConfig {
    /// Resolve content but don't publish
    pub dry_run: bool,
}

/// Errors that fail an invocation
#[derive(Debug, thiserror::Error)]
pub enum InvocationError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    Publish(#[from] PostPublishError),
}

/// Handles one trigger message end to end
pub struct InvocationHandler<S, P, L, Cl>
where
    S: ContentSource + ?Sized,
    P: SocialPublisher + ?Sized,
    L: DeliveryLog + ?Sized,
    Cl: Clock + ?Sized,
{
    content_source: Arc<S>,
    publisher: Arc<P>,
    delivery_log: Option<Arc<L>>,
    clock: Arc<Cl>,
    config: InvocationConfig,
}

impl<S, P, L, Cl> InvocationHandler<S, P, L, Cl>
where
    S: ContentSource + ?Sized,
    P: SocialPublisher + ?Sized,
    L: DeliveryLog + ?Sized,
    Cl: Clock + ?Sized,
{
    pub fn new(
        content_source: Arc<S>,
        publisher: Arc<P>,
        clock: Arc<Cl>,
        config: InvocationConfig,
    ) -> Self {
        Self {
            content_source,
            publisher,
            delivery_log: None,
            clock,
            config,
        }
    }

    /// Skip messages whose id was already recorded in the log
    pub fn with_delivery_log(mut self, delivery_log: Arc<L>) -> Self {
        self.delivery_log = Some(delivery_log);
        self
    }

    /// Handle a trigger message. Fatal errors are logged before being returned.
    pub async fn handle(
        &self,
        trigger: &TriggerMessage,
    ) -> Result<InvocationOutcome, InvocationError> {
        let result = self.run(trigger).await;

        if let Err(ref e) = result {
            tracing::error!(target_id = trigger.target_id, error = %e, "Invocation failed");
            tracing::error!(target_id = trigger.target_id, error = ?e, "Invocation failure detail");
        }

        result
    }

    async fn run(&self, trigger: &TriggerMessage) -> Result<InvocationOutcome, InvocationError> {
        tracing::info!(
            target_id = trigger.target_id,
            message_id = ?trigger.message_id,
            "Handling trigger message"
        );

        if let Some(message_id) = trigger.message_id.as_deref() {
            if self.is_duplicate(message_id).await {
                tracing::info!(message_id = %message_id, "Message already delivered, skipping");
                return Ok(InvocationOutcome::Duplicate {
                    message_id: message_id.to_string(),
                });
            }
        }

        let resolver = ContentResolver::new(self.content_source.as_ref());
        let Some(resolution) = resolver.resolve(trigger.target_id).await? else {
            return Ok(InvocationOutcome::NotFound {
                target_id: trigger.target_id,
            });
        };

        if self.config.dry_run {
            let image = PlannedImage::from(&resolution.image);
            tracing::info!(
                target_id = trigger.target_id,
                title = %resolution.title,
                image = ?image,
                "[DRY RUN] Would publish"
            );
            return Ok(InvocationOutcome::DryRun {
                target_id: trigger.target_id,
                title: resolution.title,
                image,
            });
        }

        let publisher = PostPublisher::new(self.publisher.as_ref(), self.content_source.as_ref());

        let (post, media) = match &resolution.image {
            ImageResolution::NoLinkedAssets => {
                let post = publisher.publish_text(&resolution.title).await?;
                (post, PublishedMedia::Text)
            }
            ImageResolution::Selected(image) => {
                let result = publisher.publish_image(&resolution.title, image).await?;
                (
                    result.post,
                    PublishedMedia::Image {
                        asset_urn: result.asset_urn,
                        uploaded: result.uploaded,
                    },
                )
            }
            ImageResolution::Unavailable { asset_id } => {
                tracing::warn!(
                    target_id = trigger.target_id,
                    asset_id = *asset_id,
                    "No usable rendition, publishing without image"
                );
                let post = publisher.publish_text(&resolution.title).await?;
                (
                    post,
                    PublishedMedia::Missing {
                        asset_id: *asset_id,
                    },
                )
            }
        };

        self.record_delivery(trigger, &post).await;

        Ok(InvocationOutcome::Published {
            target_id: trigger.target_id,
            post_id: post.id,
            media,
        })
    }

    async fn is_duplicate(&self, message_id: &str) -> bool {
        let Some(log) = &self.delivery_log else {
            return false;
        };

        match log.is_delivered(message_id).await {
            Ok(delivered) => delivered,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to check delivery log, continuing");
                false
            }
        }
    }

    async fn record_delivery(&self, trigger: &TriggerMessage, post: &PublishResult) {
        let (Some(log), Some(message_id)) = (&self.delivery_log, &trigger.message_id) else {
            return;
        };

        let record = DeliveryRecord {
            id: Uuid::new_v4(),
            message_id: message_id.clone(),
            target_id: trigger.target_id,
            post_id: post.id.clone(),
            published_at: self.clock.now(),
        };

        if let Err(e) = log.record(&record).await {
            tracing::error!(error = %e, "Failed to record delivery");
        }
    }
}
