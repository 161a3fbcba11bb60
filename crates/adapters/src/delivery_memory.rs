//! In-memory delivery log for testing and single-process deployments

use async_trait::async_trait;
use linkedin_connector_domain::{DeliveryLog, DeliveryLogError, DeliveryRecord};
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory delivery log implementation
pub struct InMemoryDeliveryLog {
    deliveries: RwLock<HashMap<String, DeliveryRecord>>,
}

impl InMemoryDeliveryLog {
    pub fn new() -> Self {
        Self {
            deliveries: RwLock::new(HashMap::new()),
        }
    }

    /// Get the delivery recorded for a message id
    pub fn get(&self, message_id: &str) -> Option<DeliveryRecord> {
        self.deliveries
            .read()
            .ok()
            .and_then(|deliveries| deliveries.get(message_id).cloned())
    }
}

impl Default for InMemoryDeliveryLog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DeliveryLog for InMemoryDeliveryLog {
    async fn is_delivered(&self, message_id: &str) -> Result<bool, DeliveryLogError> {
        let deliveries = self
            .deliveries
            .read()
            .map_err(|e| DeliveryLogError::Database(e.to_string()))?;
        Ok(deliveries.contains_key(message_id))
    }

    async fn record(&self, record: &DeliveryRecord) -> Result<(), DeliveryLogError> {
        let mut deliveries = self
            .deliveries
            .write()
            .map_err(|e| DeliveryLogError::Database(e.to_string()))?;
        deliveries.insert(record.message_id.clone(), record.clone());
        Ok(())
    }
}
