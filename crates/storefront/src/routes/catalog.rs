//! Catalog route handlers.
//!
//! Every request re-runs the whole pipeline on a fresh fetch: visibility for
//! the viewer, then search, price range and sort. The page state travels in
//! the query string, so a reload or shared link shows the same view.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect},
};
use gemline_core::catalog::{self, CatalogQuery, DEFAULT_MAX_PRICE, PriceRange, SortKey, Viewer};
use gemline_core::entities::{Product, Record};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;
use url::form_urlencoded;

use crate::filters;
use crate::middleware::MemberSession;
use crate::models::CurrentMember;
use crate::routes::products::ProductCardView;
use crate::state::AppState;

/// Grid or list layout of the result cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Grid,
    List,
}

impl ViewMode {
    fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("list") => Self::List,
            _ => Self::Grid,
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Grid => "grid",
            Self::List => "list",
        }
    }
}

/// Raw catalog query parameters.
///
/// Everything arrives as text so a half-filled form never fails the request;
/// unparseable values fall back to their defaults.
#[derive(Debug, Default, Deserialize)]
pub struct CatalogParams {
    pub search: Option<String>,
    pub sort: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub view: Option<String>,
    pub filters: Option<String>,
}

/// Parsed page state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CatalogState {
    pub query: CatalogQuery,
    pub view: ViewMode,
    pub filters_open: bool,
}

fn parse_price(raw: Option<&str>, default: Decimal) -> Decimal {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<Decimal>().ok())
        .unwrap_or(default)
}

impl From<&CatalogParams> for CatalogState {
    fn from(params: &CatalogParams) -> Self {
        let query = CatalogQuery {
            search: params.search.clone().unwrap_or_default(),
            sort: params
                .sort
                .as_deref()
                .and_then(|s| s.parse::<SortKey>().ok())
                .unwrap_or_default(),
            price: PriceRange {
                min: parse_price(params.min_price.as_deref(), Decimal::ZERO),
                max: parse_price(params.max_price.as_deref(), DEFAULT_MAX_PRICE),
            },
        };

        Self {
            query,
            view: ViewMode::parse(params.view.as_deref()),
            filters_open: matches!(params.filters.as_deref(), Some("1" | "true" | "on")),
        }
    }
}

impl CatalogState {
    /// Query string for this state, with optional overrides.
    fn href(&self, view: ViewMode, filters_open: bool) -> String {
        let mut query = form_urlencoded::Serializer::new(String::new());
        if !self.query.search.is_empty() {
            query.append_pair("search", &self.query.search);
        }
        query.append_pair("sort", self.query.sort.as_str());
        if self.query.price != PriceRange::default() {
            query
                .append_pair("min_price", &self.query.price.min.to_string())
                .append_pair("max_price", &self.query.price.max.to_string());
        }
        query.append_pair("view", view.as_str());
        if filters_open {
            query.append_pair("filters", "1");
        }
        format!("/catalog?{}", query.finish())
    }

    fn price_filtered(&self) -> bool {
        self.query.price.min > Decimal::ZERO || self.query.price.max < DEFAULT_MAX_PRICE
    }
}

/// One entry of the sort menu.
#[derive(Debug, Clone)]
pub struct SortOption {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

/// Catalog page template.
#[derive(Template, WebTemplate)]
#[template(path = "catalog.html")]
pub struct CatalogTemplate {
    pub member: Option<CurrentMember>,
    pub products: Vec<ProductCardView>,
    /// Products visible to this viewer before search and price filters.
    pub visible_count: usize,
    pub search: String,
    pub sort_options: Vec<SortOption>,
    pub sort: &'static str,
    pub min_price: String,
    pub max_price: String,
    pub list_view: bool,
    pub filters_open: bool,
    pub price_filtered: bool,
    pub grid_href: String,
    pub list_href: String,
    pub filters_href: String,
    pub clear_href: String,
}

/// Run the catalog pipeline for `viewer` and build the page.
fn render(
    products: Vec<Product>,
    viewer: Viewer,
    state: &CatalogState,
    member: Option<CurrentMember>,
) -> CatalogTemplate {
    let visible = catalog::filter_visible(products, viewer);
    let cards = state
        .query
        .apply(&visible)
        .into_iter()
        .map(|product| ProductCardView::new(product, product.is_vip))
        .collect();

    CatalogTemplate {
        member,
        products: cards,
        visible_count: visible.len(),
        search: state.query.search.clone(),
        sort_options: SortKey::ALL
            .into_iter()
            .map(|key| SortOption {
                value: key.as_str(),
                label: key.label(),
                selected: key == state.query.sort,
            })
            .collect(),
        sort: state.query.sort.as_str(),
        min_price: state.query.price.min.to_string(),
        max_price: state.query.price.max.to_string(),
        list_view: state.view == ViewMode::List,
        filters_open: state.filters_open,
        price_filtered: state.price_filtered(),
        grid_href: state.href(ViewMode::Grid, state.filters_open),
        list_href: state.href(ViewMode::List, state.filters_open),
        filters_href: state.href(state.view, !state.filters_open),
        clear_href: format!("/catalog/clear?view={}", state.view.as_str()),
    }
}

/// Display the catalog.
///
/// A failed fetch shows an empty catalog; the error is only logged.
#[instrument(skip(state, session))]
pub async fn index(
    State(state): State<AppState>,
    session: MemberSession,
    Query(params): Query<CatalogParams>,
) -> impl IntoResponse {
    let page = CatalogState::from(&params);
    let viewer = Viewer::from_signed_in(session.is_signed_in());

    let products = state.content().all::<Product>().await.unwrap_or_else(|e| {
        tracing::error!(collection = Product::COLLECTION, error = %e, "Failed to fetch products");
        Vec::new()
    });

    render(products, viewer, &page, session.member().cloned())
}

/// View mode kept across a clear.
#[derive(Debug, Deserialize)]
pub struct ClearParams {
    pub view: Option<String>,
}

/// Clear search, price range and sort, keeping the view mode.
pub async fn clear(Query(params): Query<ClearParams>) -> Redirect {
    let mut page = CatalogState {
        view: ViewMode::parse(params.view.as_deref()),
        ..CatalogState::default()
    };
    page.query.clear();
    Redirect::to(&page.href(page.view, false))
}
