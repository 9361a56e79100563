//! Product upload form validation.
//!
//! The upload page collects product metadata, up to [`MAX_IMAGES`] images
//! and at most one 3D model. Validation happens here, before anything is
//! sent to the content store. File contents are not inspected beyond their
//! declared type and name.

use core::str::FromStr;

use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::entities::Record;
use crate::types::{ModerationStatus, Price};

/// Maximum number of images kept per product.
pub const MAX_IMAGES: usize = 10;

/// Accepted 3D model file extensions, lowercase.
pub const MODEL_EXTENSIONS: [&str; 3] = ["glb", "gltf", "obj"];

/// Reasons an upload is refused.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum UploadError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("price must be a non-negative number")]
    InvalidPrice,
    #[error("at least one product image is required")]
    NoImages,
    #[error("only one 3D model can be attached")]
    TooManyModels,
    #[error("unsupported 3D model file: {0}")]
    UnsupportedModel(String),
}

/// A file part received with the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub size: usize,
}

impl UploadedFile {
    /// Whether the declared content type is an image type.
    #[must_use]
    pub fn is_image(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.starts_with("image/"))
    }

    /// Whether the file name carries an accepted 3D model extension.
    #[must_use]
    pub fn is_model(&self) -> bool {
        self.file_name
            .rsplit_once('.')
            .is_some_and(|(_, ext)| MODEL_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
    }
}

/// Result of taking image files into the form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageIntake {
    pub kept: Vec<UploadedFile>,
    /// Files skipped because they are not images.
    pub rejected: usize,
    /// Images skipped because the form already held [`MAX_IMAGES`].
    pub dropped: usize,
}

impl ImageIntake {
    /// Keep the image files in arrival order, up to [`MAX_IMAGES`].
    #[must_use]
    pub fn collect(files: impl IntoIterator<Item = UploadedFile>) -> Self {
        let mut intake = Self::default();
        for file in files {
            if !file.is_image() {
                intake.rejected += 1;
            } else if intake.kept.len() >= MAX_IMAGES {
                intake.dropped += 1;
            } else {
                intake.kept.push(file);
            }
        }
        intake
    }
}

/// Text fields of a product submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductDraft {
    pub name: String,
    pub sku: String,
    pub description: String,
    /// Price as typed by the user.
    pub price: String,
    pub is_vip: bool,
    pub visible_to_public: bool,
    pub visible_to_retailers: bool,
    pub visible_to_wholesalers: bool,
}

impl ProductDraft {
    /// A blank draft with the form's default audience: public and retailers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            visible_to_public: true,
            visible_to_retailers: true,
            ..Self::default()
        }
    }

    /// Check the text fields and build the record to store.
    ///
    /// # Errors
    ///
    /// Returns the first missing required field, or [`UploadError::InvalidPrice`]
    /// when the price does not parse or is negative.
    pub fn validate(&self) -> Result<ProductSubmission, UploadError> {
        let name = required(&self.name, "product name")?;
        let sku = required(&self.sku, "SKU")?;
        let description = required(&self.description, "description")?;
        let price = required(&self.price, "price")?;
        let price = Decimal::from_str(price).map_err(|_| UploadError::InvalidPrice)?;
        if price < Decimal::ZERO {
            return Err(UploadError::InvalidPrice);
        }

        Ok(ProductSubmission {
            name: name.to_string(),
            sku: sku.to_string(),
            description: description.to_string(),
            price: Price::new(price),
            is_vip: self.is_vip,
            visible_to_public: self.visible_to_public,
            visible_to_retailers: self.visible_to_retailers,
            visible_to_wholesalers: self.visible_to_wholesalers,
            moderation_status: ModerationStatus::Pending,
            three_d_model_name: None,
            image_count: 0,
        })
    }
}

fn required<'a>(value: &'a str, field: &'static str) -> Result<&'a str, UploadError> {
    let value = value.trim();
    if value.is_empty() {
        Err(UploadError::MissingField(field))
    } else {
        Ok(value)
    }
}

/// The complete upload form: text fields plus files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadForm {
    pub draft: ProductDraft,
    pub images: Vec<UploadedFile>,
    pub models: Vec<UploadedFile>,
}

impl UploadForm {
    /// Validate the whole form.
    ///
    /// # Errors
    ///
    /// Returns an [`UploadError`] describing the first problem found.
    pub fn validate(&self) -> Result<ProductSubmission, UploadError> {
        let mut submission = self.draft.validate()?;
        if self.images.is_empty() {
            return Err(UploadError::NoImages);
        }
        let model = match self.models.as_slice() {
            [] => None,
            [model] if model.is_model() => Some(model.file_name.clone()),
            [model] => return Err(UploadError::UnsupportedModel(model.file_name.clone())),
            _ => return Err(UploadError::TooManyModels),
        };
        submission.image_count = self.images.len().min(MAX_IMAGES);
        submission.three_d_model_name = model;
        Ok(submission)
    }
}

/// Product record created by an accepted upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSubmission {
    #[serde(rename = "productName")]
    pub name: String,
    pub sku: String,
    pub description: String,
    pub price: Price,
    #[serde(rename = "isVipItem")]
    pub is_vip: bool,
    #[serde(rename = "isVisibleToPublic")]
    pub visible_to_public: bool,
    #[serde(rename = "isVisibleToRetailers")]
    pub visible_to_retailers: bool,
    #[serde(rename = "isVisibleToWholesalers")]
    pub visible_to_wholesalers: bool,
    #[serde(rename = "moderationStatus")]
    pub moderation_status: ModerationStatus,
    /// Name of the attached model file; the file itself is not stored.
    #[serde(rename = "threeDModelName", default, skip_serializing_if = "Option::is_none")]
    pub three_d_model_name: Option<String>,
    #[serde(rename = "imageCount", default)]
    pub image_count: usize,
}

impl Record for ProductSubmission {
    const COLLECTION: &'static str = crate::entities::Product::COLLECTION;
}

/// Generate a product SKU like `JWL-123456-AB12`.
///
/// The middle part is the last six digits of `now_millis`; the suffix is
/// four random base-36 characters in upper case.
#[must_use]
pub fn generate_sku<R: Rng + ?Sized>(now_millis: i64, rng: &mut R) -> String {
    let stamp = now_millis.rem_euclid(1_000_000);
    let suffix: String = (0..4)
        .filter_map(|_| char::from_digit(rng.random_range(0..36), 36))
        .map(|c| c.to_ascii_uppercase())
        .collect();
    format!("JWL-{stamp:06}-{suffix}")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn image(name: &str) -> UploadedFile {
        UploadedFile {
            file_name: name.to_string(),
            content_type: Some("image/jpeg".to_string()),
            size: 1024,
        }
    }

    fn file(name: &str, content_type: &str) -> UploadedFile {
        UploadedFile {
            file_name: name.to_string(),
            content_type: Some(content_type.to_string()),
            size: 2048,
        }
    }

    fn draft() -> ProductDraft {
        ProductDraft {
            name: "Sapphire Pendant".to_string(),
            sku: "JWL-000001-AAAA".to_string(),
            description: "Blue sapphire on a silver chain".to_string(),
            price: "349.99".to_string(),
            ..ProductDraft::new()
        }
    }

    #[test]
    fn test_draft_defaults_to_public_and_retailers() {
        let draft = ProductDraft::new();
        assert!(draft.visible_to_public);
        assert!(draft.visible_to_retailers);
        assert!(!draft.visible_to_wholesalers);
        assert!(!draft.is_vip);
    }

    #[test]
    fn test_missing_fields_are_named() {
        let mut d = draft();
        d.name = "  ".to_string();
        assert_eq!(d.validate(), Err(UploadError::MissingField("product name")));

        let mut d = draft();
        d.sku = String::new();
        assert_eq!(d.validate(), Err(UploadError::MissingField("SKU")));

        let mut d = draft();
        d.price = String::new();
        assert_eq!(d.validate(), Err(UploadError::MissingField("price")));
    }

    #[test]
    fn test_price_must_be_non_negative_number() {
        let mut d = draft();
        d.price = "-1".to_string();
        assert_eq!(d.validate(), Err(UploadError::InvalidPrice));
        d.price = "twelve".to_string();
        assert_eq!(d.validate(), Err(UploadError::InvalidPrice));
        d.price = "0".to_string();
        assert!(d.validate().is_ok());
    }

    #[test]
    fn test_valid_form_is_pending() {
        let form = UploadForm {
            draft: draft(),
            images: vec![image("front.jpg"), image("side.jpg")],
            models: vec![file("pendant.GLB", "model/gltf-binary")],
        };
        let submission = form.validate().unwrap();
        assert_eq!(submission.moderation_status, ModerationStatus::Pending);
        assert_eq!(submission.image_count, 2);
        assert_eq!(submission.three_d_model_name.as_deref(), Some("pendant.GLB"));

        let json = serde_json::to_value(&submission).unwrap();
        assert_eq!(json["productName"], "Sapphire Pendant");
        assert_eq!(json["moderationStatus"], "pending");
        assert_eq!(json["isVisibleToWholesalers"], false);
    }

    #[test]
    fn test_form_requires_an_image() {
        let form = UploadForm {
            draft: draft(),
            ..UploadForm::default()
        };
        assert_eq!(form.validate(), Err(UploadError::NoImages));
    }

    #[test]
    fn test_model_rules() {
        let mut form = UploadForm {
            draft: draft(),
            images: vec![image("a.png")],
            models: vec![file("ring.stl", "model/stl")],
        };
        assert_eq!(
            form.validate(),
            Err(UploadError::UnsupportedModel("ring.stl".to_string()))
        );
        form.models = vec![file("a.obj", "text/plain"), file("b.obj", "text/plain")];
        assert_eq!(form.validate(), Err(UploadError::TooManyModels));
    }

    #[test]
    fn test_intake_caps_images_and_skips_other_types() {
        let mut files: Vec<UploadedFile> = (0..12).map(|i| image(&format!("{i}.jpg"))).collect();
        files.insert(3, file("notes.pdf", "application/pdf"));
        let intake = ImageIntake::collect(files);
        assert_eq!(intake.kept.len(), MAX_IMAGES);
        assert_eq!(intake.rejected, 1);
        assert_eq!(intake.dropped, 2);
        assert_eq!(intake.kept[0].file_name, "0.jpg");
        assert_eq!(intake.kept[9].file_name, "9.jpg");
    }

    #[test]
    fn test_generate_sku_shape() {
        let mut rng = StdRng::seed_from_u64(7);
        let sku = generate_sku(1_717_171_234_567, &mut rng);
        assert!(sku.starts_with("JWL-234567-"));
        let suffix = sku.rsplit('-').next().unwrap();
        assert_eq!(suffix.len(), 4);
        assert!(suffix.chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));

        let sku = generate_sku(42, &mut rng);
        assert!(sku.starts_with("JWL-000042-"));
    }
}
