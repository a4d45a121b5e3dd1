//! # Notification Service
//!
//! REST-only notification access: list, unread, mark-as-read. Push delivery
//! and device registration are out of scope; this service only consumes what
//! the backend already recorded.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::api::{endpoints, ApiClient};
use crate::error::{ClientError, ClientResult};

/// A recorded notification, from `GET /api/notificaciones`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub titulo: Option<String>,
    #[serde(default)]
    pub mensaje: Option<String>,
    #[serde(default)]
    pub leida: bool,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

pub struct NotificationService {
    api: Arc<ApiClient>,
}

impl NotificationService {
    pub fn new(api: Arc<ApiClient>) -> Self {
        NotificationService { api }
    }

    /// Every notification for the current user, newest first (server order).
    pub async fn list(&self) -> ClientResult<Vec<Notification>> {
        let value = self.api.notifications().await?;
        decode(endpoints::NOTIFICATIONS, value)
    }

    /// Notifications not yet marked as read.
    pub async fn unread(&self) -> ClientResult<Vec<Notification>> {
        let value = self.api.unread_notifications().await?;
        decode(endpoints::UNREAD_NOTIFICATIONS, value)
    }

    pub async fn mark_read(&self, notification_id: &str) -> ClientResult<()> {
        self.api.mark_notification_read(notification_id).await?;
        debug!(notification = notification_id, "Notification marked read");
        Ok(())
    }
}

fn decode(endpoint: &str, value: serde_json::Value) -> ClientResult<Vec<Notification>> {
    serde_json::from_value(value).map_err(|err| ClientError::Malformed {
        endpoint: endpoint.to_string(),
        reason: err.to_string(),
    })
}
