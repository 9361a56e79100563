//! Catalog inspection commands.
//!
//! Runs the same visibility, search, price and sort pipeline as the catalog
//! page and logs one line per product.

use gemline_core::catalog::{CatalogQuery, PriceRange, SortKey, Viewer, filter_visible};
use gemline_core::entities::Product;
use gemline_storefront::config::{ConfigError, ContentStoreConfig};
use gemline_storefront::content_store::{self, ContentStoreError};
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::info;

/// Errors from catalog commands.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Content store error: {0}")]
    ContentStore(#[from] ContentStoreError),
}

/// Options of `catalog list`.
#[derive(Debug, Clone)]
pub struct ListArgs {
    pub search: String,
    pub sort: SortKey,
    pub min: Decimal,
    pub max: Decimal,
    pub member: bool,
}

impl ListArgs {
    fn viewer(&self) -> Viewer {
        Viewer::from_signed_in(self.member)
    }

    fn query(&self) -> CatalogQuery {
        CatalogQuery {
            search: self.search.clone(),
            sort: self.sort,
            price: PriceRange {
                min: self.min,
                max: self.max,
            },
        }
    }
}

/// One output line for a product.
fn describe(product: &Product) -> String {
    let name = product.name.as_deref().unwrap_or("Untitled Product");
    let sku = product.sku.as_deref().filter(|s| !s.is_empty()).unwrap_or("-");
    let price = product
        .price
        .map_or_else(|| "Price not set".to_string(), |p| p.to_string());
    let vip = if product.is_vip { " [VIP]" } else { "" };
    format!("{name} | {sku} | {price}{vip}")
}

/// Products `args` selects, in display order.
#[must_use]
pub fn select(products: Vec<Product>, args: &ListArgs) -> Vec<Product> {
    let visible = filter_visible(products, args.viewer());
    args.query().apply(&visible).into_iter().cloned().collect()
}

/// List the catalog.
///
/// Uses the bundled sample catalog when no content store is configured.
///
/// # Errors
///
/// Returns an error if the store settings are invalid or the fetch fails.
pub async fn list(args: &ListArgs) -> Result<(), CatalogError> {
    dotenvy::dotenv().ok();

    let config = ContentStoreConfig::from_env()?;
    let store = content_store::connect(&config)?;
    let products = store.all::<Product>().await?;
    let total = products.len();

    let selected = select(products, args);
    for product in &selected {
        info!("{}", describe(product));
    }
    info!(
        shown = selected.len(),
        total,
        sort = %args.sort,
        "Catalog listed"
    );

    Ok(())
}
