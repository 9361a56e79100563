//! Catalog visibility, search, price filter and sort pipeline.
//!
//! The catalog page renders the full product set through two stages:
//!
//! 1. [`filter_visible`] drops products the viewer may not see.
//! 2. [`CatalogQuery::apply`] narrows the visible set by search term and
//!    price range, then orders it by the selected [`SortKey`].
//!
//! Both stages recompute from their input every time; there is no memoized
//! state between renders.
//!
//! # Example
//!
//! ```
//! use gemline_core::catalog::{CatalogQuery, SortKey, Viewer, filter_visible};
//! use gemline_core::entities::Product;
//!
//! let products: Vec<Product> = Vec::new();
//! let visible = filter_visible(products, Viewer::Anonymous);
//! let query = CatalogQuery { search: "ring".into(), sort: SortKey::PriceLow, ..Default::default() };
//! assert!(query.apply(&visible).is_empty());
//! ```

use core::cmp::Ordering;
use core::fmt;
use core::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::entities::Product;
use crate::types::Price;

/// Default upper bound of the price filter, in dollars.
pub const DEFAULT_MAX_PRICE: Decimal = Decimal::from_parts(10_000, 0, 0, false, 0);

/// Who is looking at the catalog.
///
/// Visibility depends only on whether the viewer is signed in, not on the
/// member's marketplace role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Viewer {
    Anonymous,
    Member,
}

impl Viewer {
    /// Viewer for an optional signed-in member.
    #[must_use]
    pub const fn from_signed_in(signed_in: bool) -> Self {
        if signed_in { Self::Member } else { Self::Anonymous }
    }
}

/// Whether `viewer` may see `product`.
///
/// Anonymous viewers see public products only. Members see anything visible
/// to at least one audience.
#[must_use]
pub const fn is_visible_to(product: &Product, viewer: Viewer) -> bool {
    match viewer {
        Viewer::Anonymous => product.visible_to_public,
        Viewer::Member => {
            product.visible_to_public
                || product.visible_to_retailers
                || product.visible_to_wholesalers
        }
    }
}

/// Keep only the products `viewer` may see, preserving order.
#[must_use]
pub fn filter_visible(products: Vec<Product>, viewer: Viewer) -> Vec<Product> {
    products
        .into_iter()
        .filter(|p| is_visible_to(p, viewer))
        .collect()
}

/// Catalog ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SortKey {
    /// Name, ascending.
    #[serde(rename = "name")]
    Name,
    /// Price, cheapest first.
    #[serde(rename = "price-low")]
    PriceLow,
    /// Price, most expensive first.
    #[serde(rename = "price-high")]
    PriceHigh,
    /// Creation time, most recent first.
    #[default]
    #[serde(rename = "newest")]
    Newest,
}

impl SortKey {
    /// All sort keys in the order they appear in the sort menu.
    pub const ALL: [Self; 4] = [Self::Newest, Self::Name, Self::PriceLow, Self::PriceHigh];

    /// Query-string value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::PriceLow => "price-low",
            Self::PriceHigh => "price-high",
            Self::Newest => "newest",
        }
    }

    /// Menu label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Name => "Name A-Z",
            Self::PriceLow => "Price: Low to High",
            Self::PriceHigh => "Price: High to Low",
            Self::Newest => "Newest First",
        }
    }

    fn compare(self, a: &Product, b: &Product) -> Ordering {
        match self {
            Self::Name => compare_names(a.name_or_empty(), b.name_or_empty()),
            Self::PriceLow => Price::effective(a.price).cmp(&Price::effective(b.price)),
            Self::PriceHigh => Price::effective(b.price).cmp(&Price::effective(a.price)),
            Self::Newest => b.created_or_epoch().cmp(&a.created_or_epoch()),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| format!("invalid sort key: {s}"))
    }
}

/// Name ordering that ignores case first, then breaks ties by exact text.
fn compare_names(a: &str, b: &str) -> Ordering {
    let folded = a
        .chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase));
    folded.then_with(|| a.cmp(b))
}

/// Inclusive price bounds in dollars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: Decimal,
    pub max: Decimal,
}

impl Default for PriceRange {
    fn default() -> Self {
        Self {
            min: Decimal::ZERO,
            max: DEFAULT_MAX_PRICE,
        }
    }
}

impl PriceRange {
    /// Whether `price` (missing counts as zero) lies within the bounds.
    ///
    /// An inverted range (`min > max`) contains nothing.
    #[must_use]
    pub fn contains(&self, price: Option<Price>) -> bool {
        let amount = Price::effective(price);
        self.min <= amount && amount <= self.max
    }
}

/// Search, price and sort settings of the catalog page.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CatalogQuery {
    pub search: String,
    pub sort: SortKey,
    pub price: PriceRange,
}

impl CatalogQuery {
    /// Reset search, price range and sort to their defaults.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Whether any setting differs from the defaults.
    #[must_use]
    pub fn is_filtered(&self) -> bool {
        *self != Self::default()
    }

    /// Whether `product` passes the search term and price range.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        matches_search(product, &self.search) && self.price.contains(product.price)
    }

    /// Filter and order `products`.
    ///
    /// The sort is stable, so products with equal keys keep their source order.
    #[must_use]
    pub fn apply<'a>(&self, products: &'a [Product]) -> Vec<&'a Product> {
        let mut result: Vec<&Product> = products.iter().filter(|p| self.matches(p)).collect();
        result.sort_by(|a, b| self.sort.compare(a, b));
        result
    }
}

/// Case-insensitive substring match on name, description and SKU.
///
/// An empty term matches every product.
#[must_use]
pub fn matches_search(product: &Product, term: &str) -> bool {
    if term.is_empty() {
        return true;
    }
    let needle = term.to_lowercase();
    [&product.name, &product.description, &product.sku]
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(&needle))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{DateTime, TimeZone, Utc};

    use super::*;
    use crate::types::ProductId;

    fn product(id: &str, name: &str, price: Option<i64>) -> Product {
        Product {
            id: ProductId::new(id),
            name: Some(name.to_string()),
            price: price.map(|p| Price::new(Decimal::from(p))),
            visible_to_public: true,
            ..Default::default()
        }
    }

    fn created(mut p: Product, secs: i64) -> Product {
        p.created_at = Some(Utc.timestamp_opt(secs, 0).unwrap());
        p
    }

    fn ids(products: &[&Product]) -> Vec<String> {
        products.iter().map(|p| p.id.to_string()).collect()
    }

    #[test]
    fn test_anonymous_sees_only_public() {
        let mut retail_only = product("r", "Retail Ring", Some(10));
        retail_only.visible_to_public = false;
        retail_only.visible_to_retailers = true;
        let public = product("p", "Public Ring", Some(10));

        let visible = filter_visible(vec![retail_only.clone(), public.clone()], Viewer::Anonymous);
        assert_eq!(visible, vec![public.clone()]);

        let visible = filter_visible(vec![retail_only.clone(), public.clone()], Viewer::Member);
        assert_eq!(visible, vec![retail_only, public]);
    }

    #[test]
    fn test_member_does_not_see_hidden_product() {
        let mut hidden = product("h", "Hidden", None);
        hidden.visible_to_public = false;
        assert!(!is_visible_to(&hidden, Viewer::Member));
        hidden.visible_to_wholesalers = true;
        assert!(is_visible_to(&hidden, Viewer::Member));
        assert!(!is_visible_to(&hidden, Viewer::Anonymous));
    }

    #[test]
    fn test_search_matches_name_case_insensitively() {
        let products = vec![
            product("1", "Diamond Ring", Some(100)),
            product("2", "Gold Chain", Some(100)),
        ];
        let query = CatalogQuery {
            search: "ring".to_string(),
            ..Default::default()
        };
        assert_eq!(ids(&query.apply(&products)), vec!["1"]);
    }

    #[test]
    fn test_search_matches_description_and_sku() {
        let mut by_desc = product("d", "Pendant", None);
        by_desc.description = Some("Sterling SILVER heart".to_string());
        let mut by_sku = product("s", "Bangle", None);
        by_sku.sku = Some("JWL-777-SILV".to_string());
        let other = product("o", "Brooch", None);
        let products = vec![by_desc, by_sku, other];

        let query = CatalogQuery {
            search: "Silv".to_string(),
            sort: SortKey::Name,
            ..Default::default()
        };
        assert_eq!(ids(&query.apply(&products)), vec!["s", "d"]);
    }

    #[test]
    fn test_price_range_inclusive_and_missing_is_zero() {
        let products = vec![
            product("free", "Sample", None),
            product("lo", "Low", Some(50)),
            product("hi", "High", Some(200)),
        ];
        let query = CatalogQuery {
            price: PriceRange {
                min: Decimal::from(50),
                max: Decimal::from(200),
            },
            sort: SortKey::PriceLow,
            ..Default::default()
        };
        assert_eq!(ids(&query.apply(&products)), vec!["lo", "hi"]);

        let query = CatalogQuery {
            price: PriceRange {
                min: Decimal::ZERO,
                max: Decimal::ZERO,
            },
            ..Default::default()
        };
        assert_eq!(ids(&query.apply(&products)), vec!["free"]);
    }

    #[test]
    fn test_default_range_excludes_above_ten_thousand() {
        let products = vec![product("cheap", "A", Some(10_000)), product("dear", "B", Some(10_001))];
        assert_eq!(ids(&CatalogQuery::default().apply(&products)), vec!["cheap"]);
    }

    #[test]
    fn test_inverted_range_is_empty() {
        let products = vec![product("a", "A", Some(100))];
        let query = CatalogQuery {
            price: PriceRange {
                min: Decimal::from(500),
                max: Decimal::from(10),
            },
            ..Default::default()
        };
        assert!(query.apply(&products).is_empty());
    }

    #[test]
    fn test_sort_price_low() {
        let products = vec![
            product("a", "A", Some(100)),
            product("b", "B", Some(50)),
            product("c", "C", Some(200)),
        ];
        let query = CatalogQuery {
            sort: SortKey::PriceLow,
            ..Default::default()
        };
        let prices: Vec<_> = query
            .apply(&products)
            .iter()
            .map(|p| Price::effective(p.price))
            .collect();
        assert_eq!(prices, vec![Decimal::from(50), Decimal::from(100), Decimal::from(200)]);
    }

    #[test]
    fn test_price_high_reverses_price_low_without_ties() {
        let products = vec![
            product("a", "A", Some(3)),
            product("b", "B", Some(1)),
            product("c", "C", Some(4)),
            product("d", "D", Some(2)),
        ];
        let low = CatalogQuery {
            sort: SortKey::PriceLow,
            ..Default::default()
        };
        let high = CatalogQuery {
            sort: SortKey::PriceHigh,
            ..Default::default()
        };
        let mut ascending = ids(&low.apply(&products));
        ascending.reverse();
        assert_eq!(ascending, ids(&high.apply(&products)));
    }

    #[test]
    fn test_sort_newest_missing_timestamp_last() {
        let products = vec![
            product("undated", "U", None),
            created(product("old", "O", None), 1_000),
            created(product("new", "N", None), 2_000),
        ];
        let ordered = CatalogQuery::default().apply(&products);
        assert_eq!(ids(&ordered), vec!["new", "old", "undated"]);
        assert_eq!(ordered.last().unwrap().created_or_epoch(), DateTime::UNIX_EPOCH);
    }

    #[test]
    fn test_sort_name_ignores_case_and_is_stable() {
        let products = vec![
            product("1", "emerald", None),
            product("2", "Amethyst", None),
            product("3", "Emerald", None),
            product("4", "amethyst", None),
            product("5", "Emerald", None),
        ];
        let query = CatalogQuery {
            sort: SortKey::Name,
            ..Default::default()
        };
        assert_eq!(ids(&query.apply(&products)), vec!["2", "4", "3", "5", "1"]);
    }

    #[test]
    fn test_clear_restores_newest_first_unfiltered() {
        let products = vec![
            created(product("a", "Alpha", Some(20_000)), 10),
            created(product("b", "Beta", Some(5)), 30),
            created(product("c", "Gamma", Some(70)), 20),
        ];
        let mut query = CatalogQuery {
            search: "alp".to_string(),
            sort: SortKey::Name,
            price: PriceRange {
                min: Decimal::from(1),
                max: Decimal::from(100_000),
            },
        };
        assert!(query.is_filtered());
        query.clear();
        assert!(!query.is_filtered());
        assert_eq!(query.sort, SortKey::Newest);
        assert_eq!(query.price, PriceRange::default());
        assert_eq!(ids(&query.apply(&products)), vec!["b", "c"]);
    }

    #[test]
    fn test_sort_key_parse() {
        assert_eq!("price-low".parse::<SortKey>().unwrap(), SortKey::PriceLow);
        assert_eq!("newest".parse::<SortKey>().unwrap(), SortKey::Newest);
        assert!("cheapest".parse::<SortKey>().is_err());
        assert_eq!(DEFAULT_MAX_PRICE, Decimal::from(10_000));
    }
}
