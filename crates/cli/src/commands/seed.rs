//! Seed the content store with products from a YAML file.
//!
//! Each entry is checked with the same rules as the upload form before
//! anything is written. A file with any invalid entry is rejected whole.
//!
//! # File Format
//!
//! ```yaml
//! - name: Aurora Diamond Ring
//!   sku: JWL-100001-AURA
//!   description: Brilliant-cut diamond on a platinum band.
//!   price: 2450
//!   is_vip: true
//!   image: https://cdn.gemline.io/aurora.jpg
//! - name: Trade Gold Chain
//!   sku: JWL-100002-CHN1
//!   description: 18k gold rope chain sold by the dozen.
//!   price: 180.50
//!   visible_to_public: false
//!   visible_to_wholesalers: true
//! ```
//!
//! # Environment Variables
//!
//! - `CONTENT_STORE_URL` - Content store base URL (required)
//! - `CONTENT_STORE_API_KEY` - Content store bearer key (required)

use std::path::Path;

use gemline_core::entities::Record;
use gemline_core::upload::{ProductDraft, ProductSubmission, UploadError};
use gemline_storefront::config::{ConfigError, ContentStoreConfig};
use gemline_storefront::content_store::{self, ContentStoreError};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{error, info};

/// Errors that can occur while seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    /// Content store settings are missing or invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Seeding needs a remote store; the in-memory one is lost on exit.
    #[error("CONTENT_STORE_URL not set")]
    NoRemoteStore,

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// One or more entries failed validation.
    #[error("{0} validation errors found")]
    Invalid(usize),

    #[error("Content store error: {0}")]
    ContentStore(#[from] ContentStoreError),

    #[error("Failed to encode record: {0}")]
    Encode(#[from] serde_json::Error),
}

const fn default_true() -> bool {
    true
}

/// One product entry in the seed file.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedProduct {
    pub name: String,
    pub sku: String,
    pub description: String,
    pub price: Decimal,
    #[serde(default)]
    pub is_vip: bool,
    #[serde(default = "default_true")]
    pub visible_to_public: bool,
    #[serde(default = "default_true")]
    pub visible_to_retailers: bool,
    #[serde(default)]
    pub visible_to_wholesalers: bool,
    /// Main product image URL.
    #[serde(default)]
    pub image: Option<String>,
}

impl SeedProduct {
    fn draft(&self) -> ProductDraft {
        ProductDraft {
            name: self.name.clone(),
            sku: self.sku.clone(),
            description: self.description.clone(),
            price: self.price.to_string(),
            is_vip: self.is_vip,
            visible_to_public: self.visible_to_public,
            visible_to_retailers: self.visible_to_retailers,
            visible_to_wholesalers: self.visible_to_wholesalers,
        }
    }

    /// Validate the entry and build the record to create.
    ///
    /// # Errors
    ///
    /// Returns the upload-form error for the first invalid field.
    pub fn validate(&self) -> Result<ProductSubmission, UploadError> {
        self.draft().validate()
    }
}

/// A validated entry ready to be created.
#[derive(Debug, Clone)]
pub struct SeedRecord {
    pub submission: ProductSubmission,
    pub image: Option<String>,
}

impl SeedRecord {
    /// Store representation, with the image URL merged in.
    fn to_value(&self) -> Result<Value, serde_json::Error> {
        let mut value = serde_json::to_value(&self.submission)?;
        if let (Value::Object(map), Some(image)) = (&mut value, &self.image) {
            map.insert("mainProductImage".to_string(), Value::String(image.clone()));
        }
        Ok(value)
    }
}

/// Parse and validate every entry of a seed file.
///
/// Returns the records, or one message per invalid entry.
///
/// # Errors
///
/// Returns `SeedError::Yaml` if the file is not a list of products.
pub fn parse_products(content: &str) -> Result<Result<Vec<SeedRecord>, Vec<String>>, SeedError> {
    let entries: Vec<SeedProduct> = serde_yaml::from_str(content)?;

    let mut records = Vec::with_capacity(entries.len());
    let mut errors = Vec::new();
    for (index, entry) in entries.iter().enumerate() {
        match entry.validate() {
            Ok(submission) => records.push(SeedRecord {
                submission,
                image: entry.image.clone().filter(|url| !url.trim().is_empty()),
            }),
            Err(e) => errors.push(format!("entry {} ({}): {e}", index + 1, entry.sku)),
        }
    }

    Ok(if errors.is_empty() {
        Ok(records)
    } else {
        Err(errors)
    })
}

/// Seed products from a YAML file.
///
/// # Errors
///
/// Returns an error if the store is not configured, the file cannot be read
/// or fails validation, or the store rejects a request.
pub async fn products(file_path: &str) -> Result<(), SeedError> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = ContentStoreConfig::from_env()?;
    if config.url.is_none() {
        return Err(SeedError::NoRemoteStore);
    }

    let path = Path::new(file_path);
    if !path.exists() {
        return Err(SeedError::FileNotFound(file_path.to_string()));
    }

    info!(path = %file_path, "Loading products from file");

    // Read and validate before touching the store
    let content = tokio::fs::read_to_string(path).await?;
    let records = match parse_products(&content)? {
        Ok(records) => records,
        Err(errors) => {
            error!("Validation failed:");
            for err in &errors {
                error!("  - {err}");
            }
            return Err(SeedError::Invalid(errors.len()));
        }
    };

    info!(products = records.len(), "Products validated");

    let store = content_store::connect(&config)?;

    let mut created = 0usize;
    let mut failed = Vec::new();
    for record in &records {
        let value = record.to_value()?;
        match store.create(ProductSubmission::COLLECTION, value).await {
            Ok(_) => created += 1,
            Err(e) => failed.push((record.submission.sku.clone(), e)),
        }
    }

    info!("Seeding complete!");
    info!("  Products created: {created}");

    if !failed.is_empty() {
        error!("  Errors: {}", failed.len());
        for (sku, err) in &failed {
            error!("    - {sku}: {err}");
        }
    }

    Ok(())
}
