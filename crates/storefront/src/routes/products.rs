//! Product detail and image comparison route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use gemline_core::compare::{CompareAction, ImageCompare, Verdict};
use gemline_core::entities::Product;
use gemline_core::{ModerationStatus, Price};
use serde::Deserialize;
use tracing::instrument;
use url::form_urlencoded;

use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::middleware::MemberSession;
use crate::models::CurrentMember;
use crate::state::AppState;

/// Image shown for products without a main image.
pub const FALLBACK_IMAGE: &str = "/static/images/placeholder.svg";
/// Title shown for products without a name.
pub const UNTITLED_PRODUCT: &str = "Untitled Product";
/// Card text for products without a description.
pub const NO_DESCRIPTION: &str = "No description available.";

// =============================================================================
// Views
// =============================================================================

/// Product card display data for templates.
#[derive(Debug, Clone)]
pub struct ProductCardView {
    pub id: String,
    pub name: String,
    pub sku: Option<String>,
    pub description: String,
    pub image_url: String,
    pub price: String,
    pub show_vip: bool,
    /// Moderation status label, when the record has one.
    pub moderation: Option<String>,
    pub approved: bool,
    pub visible_to_public: bool,
    pub visible_to_retailers: bool,
    pub visible_to_wholesalers: bool,
}

impl ProductCardView {
    /// Card for `product`; the VIP badge is drawn only when `show_vip_badge`
    /// is set and the product is a VIP item.
    #[must_use]
    pub fn new(product: &Product, show_vip_badge: bool) -> Self {
        Self {
            id: product.id.to_string(),
            name: display_name(product),
            sku: product.sku.clone().filter(|s| !s.is_empty()),
            description: product
                .description
                .clone()
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| NO_DESCRIPTION.to_string()),
            image_url: image_url(product),
            price: Price::label(product.price),
            show_vip: show_vip_badge && product.is_vip,
            moderation: product.moderation_status.map(|s| s.to_string()),
            approved: product.moderation_status == Some(ModerationStatus::Approved),
            visible_to_public: product.visible_to_public,
            visible_to_retailers: product.visible_to_retailers,
            visible_to_wholesalers: product.visible_to_wholesalers,
        }
    }
}

fn display_name(product: &Product) -> String {
    product
        .name
        .clone()
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| UNTITLED_PRODUCT.to_string())
}

fn image_url(product: &Product) -> String {
    product
        .main_image
        .clone()
        .filter(|u| !u.is_empty())
        .unwrap_or_else(|| FALLBACK_IMAGE.to_string())
}

/// Product detail display data.
#[derive(Debug, Clone)]
pub struct ProductDetailView {
    pub id: String,
    pub name: String,
    pub sku: Option<String>,
    pub description: String,
    pub image_url: String,
    pub price: String,
    pub is_vip: bool,
    pub approved: bool,
    /// Moderation status label; records without one read "pending".
    pub status: String,
    pub model_url: Option<String>,
    /// Audience tiers the product is visible to.
    pub audiences: Vec<&'static str>,
}

impl From<&Product> for ProductDetailView {
    fn from(product: &Product) -> Self {
        let audiences = [
            (product.visible_to_public, "Public"),
            (product.visible_to_retailers, "Retailers"),
            (product.visible_to_wholesalers, "Wholesalers"),
        ]
        .into_iter()
        .filter_map(|(visible, label)| visible.then_some(label))
        .collect();

        Self {
            id: product.id.to_string(),
            name: display_name(product),
            sku: product.sku.clone().filter(|s| !s.is_empty()),
            description: product
                .description
                .clone()
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| "No description available for this product.".to_string()),
            image_url: image_url(product),
            price: Price::label(product.price),
            is_vip: product.is_vip,
            approved: product.moderation_status == Some(ModerationStatus::Approved),
            status: product
                .moderation_status
                .unwrap_or_default()
                .to_string(),
            model_url: product.model_3d_url.clone().filter(|u| !u.is_empty()),
            audiences,
        }
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub member: Option<CurrentMember>,
    pub product: ProductDetailView,
}

/// Product not found page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/not_found.html")]
pub struct ProductNotFoundTemplate {
    pub member: Option<CurrentMember>,
}

/// Image comparison page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/compare.html")]
pub struct CompareTemplate {
    pub member: Option<CurrentMember>,
    pub product: ProductDetailView,
    pub widget: CompareView,
}

/// Rendered state of the comparison widget.
#[derive(Debug, Clone)]
pub struct CompareView {
    pub state: ImageCompare,
    pub original_url: String,
    pub enhanced_url: String,
    pub actions_enabled: bool,
    /// Query string carrying the current state.
    pub state_query: String,
    pub verdict: Option<&'static str>,
}

impl CompareView {
    /// Link that applies `action` to the current state.
    #[must_use]
    pub fn action_href(&self, action: &str) -> String {
        format!("?{}&action={action}", self.state_query)
    }

    #[must_use]
    pub fn position_label(&self) -> String {
        format!("{:.0}", self.state.position)
    }

    #[must_use]
    pub fn zoom_label(&self) -> String {
        format!("{}%", self.state.zoom_percent())
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the product detail page.
///
/// Unknown IDs render the not-found page with a 404.
#[instrument(skip(state, session))]
pub async fn show(
    State(state): State<AppState>,
    session: MemberSession,
    Path(id): Path<String>,
) -> Result<Response> {
    let member = session.member().cloned();

    match state.content().by_id::<Product>(&id).await {
        Ok(product) => {
            add_breadcrumb("catalog", "Viewed product", Some(&[("product_id", id.as_str())]));
            Ok(ProductShowTemplate {
                member,
                product: ProductDetailView::from(&product),
            }
            .into_response())
        }
        Err(e) if e.is_not_found() => Ok(not_found(member)),
        Err(e) => Err(e.into()),
    }
}

fn not_found(member: Option<CurrentMember>) -> Response {
    (StatusCode::NOT_FOUND, ProductNotFoundTemplate { member }).into_response()
}

/// Comparison widget state carried in the query string.
#[derive(Debug, Default, Deserialize)]
pub struct CompareQuery {
    pub position: Option<f64>,
    pub zoom: Option<f64>,
    pub original: Option<bool>,
    pub enhanced: Option<bool>,
    /// Pointer offset inside the widget, with `width`, for drags.
    pub x: Option<f64>,
    pub width: Option<f64>,
    pub action: Option<CompareAction>,
    /// Render approve and reject buttons.
    #[serde(default)]
    pub actions: bool,
}

impl CompareQuery {
    fn widget_state(&self) -> ImageCompare {
        let defaults = ImageCompare::default();
        ImageCompare {
            position: self.position.unwrap_or(defaults.position),
            zoom: self.zoom.unwrap_or(defaults.zoom),
            show_original: self.original.unwrap_or(defaults.show_original),
            show_enhanced: self.enhanced.unwrap_or(defaults.show_enhanced),
        }
        .normalized()
    }
}

/// Query string for a widget state.
fn state_query(state: &ImageCompare, actions: bool) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());
    query
        .append_pair("position", &format!("{:.1}", state.position))
        .append_pair("zoom", &state.zoom.to_string())
        .append_pair("original", &state.show_original.to_string())
        .append_pair("enhanced", &state.show_enhanced.to_string());
    if actions {
        query.append_pair("actions", "true");
    }
    query.finish()
}

/// Apply the requested drag or button press and build the widget view.
fn apply_compare(query: &CompareQuery, original_url: String, enhanced_url: String) -> CompareView {
    let mut state = query.widget_state();

    if let (Some(x), Some(width)) = (query.x, query.width) {
        state.drag_to(x, width);
    }

    let verdict = query
        .action
        .and_then(|action| state.press(action, query.actions))
        .map(|verdict| match verdict {
            Verdict::Approve => "Approved",
            Verdict::Reject => "Rejected",
        });

    CompareView {
        state_query: state_query(&state, query.actions),
        state,
        original_url,
        enhanced_url,
        actions_enabled: query.actions,
        verdict,
    }
}

/// Display the before/after image comparison for a product.
///
/// Product records carry a single main image, so both layers show it until
/// an enhanced rendition exists in the store. The widget reports
/// approve/reject presses but does not change the product.
#[instrument(skip(state, session, query))]
pub async fn compare(
    State(state): State<AppState>,
    session: MemberSession,
    Path(id): Path<String>,
    Query(query): Query<CompareQuery>,
) -> Result<Response> {
    let member = session.member().cloned();

    let product = match state.content().by_id::<Product>(&id).await {
        Ok(product) => product,
        Err(e) if e.is_not_found() => return Ok(not_found(member)),
        Err(e) => return Err(e.into()),
    };

    let view = ProductDetailView::from(&product);
    let widget = apply_compare(&query, view.image_url.clone(), view.image_url.clone());

    if let Some(verdict) = widget.verdict {
        tracing::info!(product_id = %id, verdict, "Comparison verdict");
    }

    Ok(CompareTemplate {
        member,
        product: view,
        widget,
    }
    .into_response())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn product() -> Product {
        Product {
            id: "ring-1".into(),
            name: Some("Aurora Ring".to_string()),
            price: Some(Price::new(Decimal::new(125_000, 2))),
            is_vip: true,
            visible_to_public: true,
            visible_to_wholesalers: true,
            moderation_status: Some(ModerationStatus::Approved),
            ..Product::default()
        }
    }

    #[test]
    fn test_card_fallbacks() {
        let card = ProductCardView::new(&Product::default(), true);
        assert_eq!(card.name, UNTITLED_PRODUCT);
        assert_eq!(card.description, NO_DESCRIPTION);
        assert_eq!(card.image_url, FALLBACK_IMAGE);
        assert_eq!(card.price, "Price on request");
        assert!(!card.show_vip);
        assert!(card.moderation.is_none());
    }

    #[test]
    fn test_card_vip_badge_only_when_requested() {
        assert!(ProductCardView::new(&product(), true).show_vip);
        assert!(!ProductCardView::new(&product(), false).show_vip);
    }

    #[test]
    fn test_detail_view() {
        let view = ProductDetailView::from(&product());
        assert_eq!(view.price, "$1,250.00");
        assert!(view.approved);
        assert_eq!(view.status, "approved");
        assert_eq!(view.audiences, vec!["Public", "Wholesalers"]);
        assert!(view.model_url.is_none());

        let pending = ProductDetailView::from(&Product::default());
        assert_eq!(pending.status, "pending");
        assert!(pending.audiences.is_empty());
    }

    #[test]
    fn test_compare_zoom_and_reset() {
        let query = CompareQuery {
            zoom: Some(3.0),
            action: Some(CompareAction::ZoomIn),
            ..CompareQuery::default()
        };
        let view = apply_compare(&query, "a".to_string(), "b".to_string());
        assert!((view.state.zoom - 3.0).abs() < f64::EPSILON);
        assert_eq!(view.zoom_label(), "300%");

        let query = CompareQuery {
            position: Some(12.0),
            original: Some(false),
            action: Some(CompareAction::Reset),
            ..CompareQuery::default()
        };
        let view = apply_compare(&query, "a".to_string(), "b".to_string());
        assert_eq!(view.state, ImageCompare::default());
    }

    #[test]
    fn test_compare_off_step_zoom_from_query() {
        let query = CompareQuery {
            zoom: Some(1.1),
            action: Some(CompareAction::ZoomIn),
            ..CompareQuery::default()
        };
        let view = apply_compare(&query, "a".to_string(), "b".to_string());
        assert!((view.state.zoom - 1.25).abs() < f64::EPSILON);
        assert_eq!(view.zoom_label(), "125%");
        assert!(view.state_query.contains("zoom=1.25"));
    }

    #[test]
    fn test_compare_drag_clamps() {
        let query = CompareQuery {
            x: Some(500.0),
            width: Some(400.0),
            ..CompareQuery::default()
        };
        let view = apply_compare(&query, "a".to_string(), "b".to_string());
        assert!((view.state.position - 100.0).abs() < f64::EPSILON);
        assert_eq!(view.position_label(), "100");
    }

    #[test]
    fn test_compare_verdict_requires_actions() {
        let mut query = CompareQuery {
            action: Some(CompareAction::Approve),
            ..CompareQuery::default()
        };
        assert!(apply_compare(&query, "a".to_string(), "b".to_string()).verdict.is_none());

        query.actions = true;
        let view = apply_compare(&query, "a".to_string(), "b".to_string());
        assert_eq!(view.verdict, Some("Approved"));
        assert!(view.state_query.ends_with("actions=true"));
        assert!(view.action_href("zoom-in").ends_with("&action=zoom-in"));
    }
}
