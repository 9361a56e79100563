//! Member-only pages: profile, dashboard and the back-office placeholders.
//!
//! Every handler here starts with [`MemberSession::require`]; anonymous
//! visitors are sent to the sign-in prompt with the page's message.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Local, Timelike, Utc};
use gemline_core::access::messages;
use gemline_core::ModerationStatus;
use gemline_core::entities::{Notification, Product, Record};
use tracing::instrument;

use crate::filters;
use crate::middleware::{GateRejection, MemberSession};
use crate::models::CurrentMember;
use crate::state::AppState;

/// Rows shown in each dashboard list.
const RECENT_LIMIT: usize = 5;

fn format_date(date: Option<DateTime<Utc>>) -> String {
    date.map_or_else(|| "N/A".to_string(), |d| d.format("%B %-d, %Y").to_string())
}

// =============================================================================
// Profile
// =============================================================================

/// Profile page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/profile.html")]
pub struct ProfileTemplate {
    pub member: Option<CurrentMember>,
    pub display_name: String,
    pub initial: char,
    pub photo_url: Option<String>,
    pub email: String,
    pub email_verified: bool,
    pub member_since: String,
    pub last_login: String,
    pub role_title: &'static str,
}

impl From<CurrentMember> for ProfileTemplate {
    fn from(member: CurrentMember) -> Self {
        Self {
            display_name: member.display_name().to_string(),
            initial: member.initial(),
            photo_url: member.photo_url.clone(),
            email: member.email.clone().unwrap_or_else(|| "N/A".to_string()),
            email_verified: member.email_verified,
            member_since: format_date(member.member_since),
            last_login: format_date(member.last_login),
            role_title: member.role.title(),
            member: Some(member),
        }
    }
}

/// Display the member's profile.
#[instrument(skip(session))]
pub async fn profile(session: MemberSession) -> Result<ProfileTemplate, GateRejection> {
    let member = session.require(messages::PROFILE, "/profile")?;
    Ok(ProfileTemplate::from(member))
}

// =============================================================================
// Dashboard
// =============================================================================

/// Time-of-day greeting for a local hour.
#[must_use]
pub const fn greeting(hour: u32) -> &'static str {
    match hour {
        0..12 => "Good morning",
        12..18 => "Good afternoon",
        _ => "Good evening",
    }
}

/// Row in the recent products list.
#[derive(Debug, Clone)]
pub struct RecentProduct {
    pub id: String,
    pub name: String,
    pub sku: String,
    pub price: String,
    pub status: &'static str,
    pub approved: bool,
}

impl From<&Product> for RecentProduct {
    fn from(product: &Product) -> Self {
        let status = product.moderation_status.unwrap_or_default();
        Self {
            id: product.id.to_string(),
            name: product
                .name
                .clone()
                .unwrap_or_else(|| "Untitled Product".to_string()),
            sku: product
                .sku
                .clone()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "N/A".to_string()),
            price: product
                .price
                .map_or_else(|| "Price not set".to_string(), |p| p.to_string()),
            status: status.as_str(),
            approved: status == ModerationStatus::Approved,
        }
    }
}

/// Row in the notifications list.
#[derive(Debug, Clone)]
pub struct NotificationRow {
    pub title: String,
    pub content: String,
    pub date: String,
    pub is_read: bool,
}

impl From<&Notification> for NotificationRow {
    fn from(notification: &Notification) -> Self {
        Self {
            title: notification
                .title
                .clone()
                .unwrap_or_else(|| "Notification".to_string()),
            content: notification.content.clone().unwrap_or_default(),
            date: format_date(notification.timestamp),
            is_read: notification.is_read,
        }
    }
}

/// Summary numbers and lists shown on the dashboard.
#[derive(Debug, Clone, Default)]
pub struct DashboardData {
    pub total_products: usize,
    pub pending_products: usize,
    pub recent_products: Vec<RecentProduct>,
    pub notifications: Vec<NotificationRow>,
    pub unread_notifications: usize,
}

impl DashboardData {
    /// Build the dashboard from every product and notification.
    #[must_use]
    pub fn build(mut products: Vec<Product>, mut notifications: Vec<Notification>) -> Self {
        let pending_products = products
            .iter()
            .filter(|p| p.moderation_status == Some(ModerationStatus::Pending))
            .count();
        let unread_notifications = notifications.iter().filter(|n| !n.is_read).count();

        products.sort_by_key(|p| std::cmp::Reverse(p.created_or_epoch()));
        notifications.sort_by_key(|n| std::cmp::Reverse(n.timestamp));

        Self {
            total_products: products.len(),
            pending_products,
            recent_products: products
                .iter()
                .take(RECENT_LIMIT)
                .map(RecentProduct::from)
                .collect(),
            notifications: notifications
                .iter()
                .take(RECENT_LIMIT)
                .map(NotificationRow::from)
                .collect(),
            unread_notifications,
        }
    }
}

/// Dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "account/dashboard.html")]
pub struct DashboardTemplate {
    pub member: Option<CurrentMember>,
    pub greeting: &'static str,
    pub display_name: String,
    pub role_title: &'static str,
    pub data: DashboardData,
}

/// Display the member dashboard.
///
/// Each collection is fetched on its own; a failed fetch leaves that part
/// of the dashboard empty.
#[instrument(skip(state, session))]
pub async fn dashboard(
    State(state): State<AppState>,
    session: MemberSession,
) -> Result<DashboardTemplate, GateRejection> {
    let member = session.require(messages::DASHBOARD, "/dashboard")?;

    let (products, notifications) = tokio::join!(
        state.content().all::<Product>(),
        state.content().all::<Notification>(),
    );
    let products = products.unwrap_or_else(|e| {
        tracing::error!(collection = Product::COLLECTION, error = %e, "Failed to fetch products");
        Vec::new()
    });
    let notifications = notifications.unwrap_or_else(|e| {
        tracing::error!(
            collection = Notification::COLLECTION,
            error = %e,
            "Failed to fetch notifications"
        );
        Vec::new()
    });

    Ok(DashboardTemplate {
        greeting: greeting(Local::now().hour()),
        display_name: member.display_name().to_string(),
        role_title: member.role.title(),
        data: DashboardData::build(products, notifications),
        member: Some(member),
    })
}

// =============================================================================
// Placeholders
// =============================================================================

/// "Coming soon" page for back-office sections not built yet.
#[derive(Template, WebTemplate)]
#[template(path = "placeholder.html")]
pub struct PlaceholderTemplate {
    pub member: Option<CurrentMember>,
    pub title: &'static str,
    pub text: &'static str,
}

fn placeholder(
    session: MemberSession,
    message: &str,
    path: &str,
    title: &'static str,
    text: &'static str,
) -> Response {
    match session.require(message, path) {
        Ok(member) => PlaceholderTemplate {
            member: Some(member),
            title,
            text,
        }
        .into_response(),
        Err(rejection) => rejection.into_response(),
    }
}

pub async fn analytics(session: MemberSession) -> Response {
    placeholder(
        session,
        messages::ANALYTICS,
        "/analytics",
        "Analytics",
        "Sales and engagement analytics are coming soon.",
    )
}

pub async fn notifications(session: MemberSession) -> Response {
    placeholder(
        session,
        messages::NOTIFICATIONS,
        "/notifications",
        "Notifications",
        "A full notification center is coming soon.",
    )
}

pub async fn moderation(session: MemberSession) -> Response {
    placeholder(
        session,
        messages::MODERATION,
        "/moderation",
        "Moderation",
        "Content moderation tools are coming soon.",
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use gemline_core::Price;
    use rust_decimal::Decimal;

    use super::*;

    fn product(id: &str, day: u32, status: Option<ModerationStatus>) -> Product {
        Product {
            id: id.into(),
            name: Some(format!("Piece {id}")),
            created_at: Some(Utc.with_ymd_and_hms(2024, 5, day, 9, 0, 0).unwrap()),
            moderation_status: status,
            ..Product::default()
        }
    }

    fn notification(id: &str, day: u32, is_read: bool) -> Notification {
        Notification {
            id: id.into(),
            title: Some(format!("Notice {id}")),
            content: None,
            timestamp: Some(Utc.with_ymd_and_hms(2024, 5, day, 9, 0, 0).unwrap()),
            target_role: None,
            is_read,
        }
    }

    #[test]
    fn test_greeting_by_hour() {
        assert_eq!(greeting(0), "Good morning");
        assert_eq!(greeting(11), "Good morning");
        assert_eq!(greeting(12), "Good afternoon");
        assert_eq!(greeting(17), "Good afternoon");
        assert_eq!(greeting(18), "Good evening");
        assert_eq!(greeting(23), "Good evening");
    }

    #[test]
    fn test_dashboard_counts_and_orders() {
        let products = (1..=7)
            .map(|day| {
                let status = match day {
                    1 => None,
                    d if d % 2 == 0 => Some(ModerationStatus::Approved),
                    _ => Some(ModerationStatus::Pending),
                };
                product(&format!("p{day}"), day, status)
            })
            .collect();
        let notifications = vec![
            notification("n1", 3, true),
            notification("n2", 9, false),
            notification("n3", 1, false),
        ];

        let data = DashboardData::build(products, notifications);

        assert_eq!(data.total_products, 7);
        // Only an explicit pending status counts.
        assert_eq!(data.pending_products, 3);
        let ids: Vec<_> = data.recent_products.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["p7", "p6", "p5", "p4", "p3"]);
        let titles: Vec<_> = data.notifications.iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, vec!["Notice n2", "Notice n1", "Notice n3"]);
        assert_eq!(data.unread_notifications, 2);
    }

    #[test]
    fn test_dashboard_ignores_missing_status() {
        let data = DashboardData::build(vec![product("p1", 1, None)], vec![]);
        assert_eq!(data.total_products, 1);
        assert_eq!(data.pending_products, 0);
    }

    #[test]
    fn test_recent_product_fallbacks() {
        let row = RecentProduct::from(&Product {
            id: "x".into(),
            ..Product::default()
        });
        assert_eq!(row.sku, "N/A");
        assert_eq!(row.price, "Price not set");
        assert_eq!(row.status, "pending");

        let priced = RecentProduct::from(&Product {
            id: "y".into(),
            price: Some(Price::new(Decimal::from(1250))),
            ..Product::default()
        });
        assert_eq!(priced.price, "$1,250.00");
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date(None), "N/A");
        assert_eq!(
            format_date(Some(Utc.with_ymd_and_hms(2024, 1, 5, 0, 0, 0).unwrap())),
            "January 5, 2024"
        );
    }
}
