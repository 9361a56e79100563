//! Records held by the external content store.
//!
//! Field names on the wire follow the store's camelCase convention with
//! `_id` / `_createdDate` system fields. Every display field is optional in
//! the store, so the Rust types keep them optional and the pages decide on
//! fallbacks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{
    ModerationStatus, NotificationId, Price, ProductId, SubmissionId, SubmissionStatus,
};

/// A record type stored in a named content-store collection.
pub trait Record: serde::de::DeserializeOwned + Serialize + Send {
    /// Collection the record lives in.
    const COLLECTION: &'static str;
}

/// A jewelry product listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: ProductId,
    #[serde(rename = "_createdDate", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "productName", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "mainProductImage", default, skip_serializing_if = "Option::is_none")]
    pub main_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Price>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(rename = "threeDModelUrl", default, skip_serializing_if = "Option::is_none")]
    pub model_3d_url: Option<String>,
    #[serde(rename = "moderationStatus", default, skip_serializing_if = "Option::is_none")]
    pub moderation_status: Option<ModerationStatus>,
    #[serde(rename = "isVipItem", default)]
    pub is_vip: bool,
    #[serde(rename = "isVisibleToWholesalers", default)]
    pub visible_to_wholesalers: bool,
    #[serde(rename = "isVisibleToRetailers", default)]
    pub visible_to_retailers: bool,
    #[serde(rename = "isVisibleToPublic", default)]
    pub visible_to_public: bool,
}

impl Record for Product {
    const COLLECTION: &'static str = "jewelryproducts";
}

impl Product {
    /// Name used for display and name sorting; missing names sort as empty.
    #[must_use]
    pub fn name_or_empty(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }

    /// Creation time used for newest-first ordering; missing means the epoch.
    #[must_use]
    pub fn created_or_epoch(&self) -> DateTime<Utc> {
        self.created_at.unwrap_or(DateTime::UNIX_EPOCH)
    }
}

/// A message sent through the contact form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactSubmission {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<SubmissionId>,
    pub sender_name: String,
    pub sender_email: String,
    pub subject: String,
    pub message_content: String,
    pub submission_date: DateTime<Utc>,
    #[serde(default)]
    pub status: SubmissionStatus,
}

impl Record for ContactSubmission {
    const COLLECTION: &'static str = "contactsubmissions";
}

/// A notice shown on the member dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    #[serde(rename = "_id")]
    pub id: NotificationId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub target_role: Option<String>,
    #[serde(default)]
    pub is_read: bool,
}

impl Record for Notification {
    const COLLECTION: &'static str = "notifications";
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_product_from_store_json() {
        let json = serde_json::json!({
            "_id": "p1",
            "_createdDate": "2024-03-01T10:00:00Z",
            "productName": "Diamond Ring",
            "price": 1250.5,
            "sku": "JWL-1",
            "moderationStatus": "approved",
            "isVipItem": true,
            "isVisibleToPublic": true
        });
        let product: Product = serde_json::from_value(json).unwrap();
        assert_eq!(product.id.as_str(), "p1");
        assert_eq!(product.name_or_empty(), "Diamond Ring");
        assert_eq!(product.moderation_status, Some(ModerationStatus::Approved));
        assert!(product.is_vip);
        assert!(product.visible_to_public);
        assert!(!product.visible_to_retailers);
        assert_eq!(Price::label(product.price), "$1,250.50");
    }

    #[test]
    fn test_product_sparse_record_uses_defaults() {
        let product: Product = serde_json::from_value(serde_json::json!({ "_id": "bare" })).unwrap();
        assert_eq!(product.name, None);
        assert_eq!(product.price, None);
        assert_eq!(product.created_or_epoch(), DateTime::UNIX_EPOCH);
        assert!(!product.visible_to_public);
    }

    #[test]
    fn test_contact_submission_wire_names() {
        let submission = ContactSubmission {
            id: None,
            sender_name: "Ada".to_string(),
            sender_email: "ada@example.com".to_string(),
            subject: "General Inquiry".to_string(),
            message_content: "Hello".to_string(),
            submission_date: DateTime::UNIX_EPOCH,
            status: SubmissionStatus::Pending,
        };
        let value = serde_json::to_value(&submission).unwrap();
        assert_eq!(value["senderName"], "Ada");
        assert_eq!(value["messageContent"], "Hello");
        assert_eq!(value["status"], "pending");
        assert!(value.get("_id").is_none());
    }
}
