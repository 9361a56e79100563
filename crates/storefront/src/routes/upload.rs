//! Product upload route handlers.
//!
//! The form posts as `multipart/form-data`. File parts are read to learn
//! their size and then discarded; only the product metadata is stored.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{
        Multipart, State,
        multipart::{Field, MultipartError},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use gemline_core::access::messages;
use gemline_core::upload::{
    ImageIntake, MAX_IMAGES, MODEL_EXTENSIONS, ProductDraft, UploadForm, UploadedFile,
    generate_sku,
};
use tracing::instrument;

use crate::error::add_breadcrumb;
use crate::filters;
use crate::middleware::MemberSession;
use crate::models::CurrentMember;
use crate::state::AppState;

/// Request body limit for the upload form.
pub const UPLOAD_BODY_LIMIT: usize = 64 * 1024 * 1024;

const UPLOAD_PATH: &str = "/upload";

/// Which button submitted the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum UploadAction {
    #[default]
    Submit,
    GenerateSku,
}

/// Upload form template.
#[derive(Template, WebTemplate)]
#[template(path = "upload.html")]
pub struct UploadTemplate {
    pub member: Option<CurrentMember>,
    pub draft: ProductDraft,
    pub notices: Vec<String>,
    pub error: Option<String>,
    pub success: Option<String>,
    pub max_images: usize,
    pub model_extensions: String,
}

impl UploadTemplate {
    fn new(member: CurrentMember, draft: ProductDraft) -> Self {
        Self {
            member: Some(member),
            draft,
            notices: Vec::new(),
            error: None,
            success: None,
            max_images: MAX_IMAGES,
            model_extensions: MODEL_EXTENSIONS
                .iter()
                .map(|ext| format!(".{ext}"))
                .collect::<Vec<_>>()
                .join(","),
        }
    }
}

/// Notices for files that were not taken into the form.
fn intake_notices(intake: &ImageIntake) -> Vec<String> {
    let mut notices = Vec::new();
    if intake.rejected > 0 {
        notices.push(format!(
            "{} file(s) skipped: only image files are accepted.",
            intake.rejected
        ));
    }
    if intake.dropped > 0 {
        notices.push(format!(
            "Maximum {MAX_IMAGES} images allowed; {} extra image(s) were not added.",
            intake.dropped
        ));
    }
    notices
}

/// Fields read from the multipart body.
#[derive(Debug, Default)]
struct ParsedUpload {
    action: UploadAction,
    draft: ProductDraft,
    images: Vec<UploadedFile>,
    models: Vec<UploadedFile>,
}

/// Record a file part's name, type and size without buffering its body.
async fn read_file(mut field: Field<'_>) -> Result<Option<UploadedFile>, MultipartError> {
    let file_name = field.file_name().unwrap_or_default().to_string();
    let content_type = field.content_type().map(String::from);
    let mut size = 0;
    while let Some(chunk) = field.chunk().await? {
        size += chunk.len();
    }
    // Browsers send an empty part for an untouched file input.
    if file_name.is_empty() && size == 0 {
        return Ok(None);
    }
    Ok(Some(UploadedFile {
        file_name,
        content_type,
        size,
    }))
}

async fn parse_multipart(mut multipart: Multipart) -> Result<ParsedUpload, MultipartError> {
    let mut parsed = ParsedUpload {
        draft: ProductDraft {
            visible_to_public: false,
            visible_to_retailers: false,
            ..ProductDraft::new()
        },
        ..ParsedUpload::default()
    };

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "images" => parsed.images.extend(read_file(field).await?),
            "model" => parsed.models.extend(read_file(field).await?),
            _ => {
                let value = field.text().await?;
                let draft = &mut parsed.draft;
                match name.as_str() {
                    "name" => draft.name = value,
                    "sku" => draft.sku = value,
                    "description" => draft.description = value,
                    "price" => draft.price = value,
                    "is_vip" => draft.is_vip = true,
                    "visible_to_public" => draft.visible_to_public = true,
                    "visible_to_retailers" => draft.visible_to_retailers = true,
                    "visible_to_wholesalers" => draft.visible_to_wholesalers = true,
                    "action" if value == "generate-sku" => {
                        parsed.action = UploadAction::GenerateSku;
                    }
                    _ => {}
                }
            }
        }
    }

    Ok(parsed)
}

/// Display the upload form.
#[instrument(skip(session))]
pub async fn show(session: MemberSession) -> Response {
    match session.require(messages::UPLOAD, UPLOAD_PATH) {
        Ok(member) => UploadTemplate::new(member, ProductDraft::new()).into_response(),
        Err(rejection) => rejection.into_response(),
    }
}

/// Handle an upload form submission.
#[instrument(skip_all)]
pub async fn submit(
    State(state): State<AppState>,
    session: MemberSession,
    multipart: Multipart,
) -> Response {
    let member = match session.require(messages::UPLOAD, UPLOAD_PATH) {
        Ok(member) => member,
        Err(rejection) => return rejection.into_response(),
    };

    let parsed = match parse_multipart(multipart).await {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::warn!(error = %e, "Malformed upload body");
            let mut page = UploadTemplate::new(member, ProductDraft::new());
            page.error = Some("The upload could not be read. Please try again.".to_string());
            return (StatusCode::BAD_REQUEST, page).into_response();
        }
    };

    if parsed.action == UploadAction::GenerateSku {
        let mut draft = parsed.draft;
        draft.sku = generate_sku(Utc::now().timestamp_millis(), &mut rand::rng());
        let mut page = UploadTemplate::new(member, draft);
        if !parsed.images.is_empty() || !parsed.models.is_empty() {
            page.notices.push(
                "Files are not kept between steps; attach them again before submitting."
                    .to_string(),
            );
        }
        return page.into_response();
    }

    let intake = ImageIntake::collect(parsed.images);
    let notices = intake_notices(&intake);
    let form = UploadForm {
        draft: parsed.draft,
        images: intake.kept,
        models: parsed.models,
    };

    let submission = match form.validate() {
        Ok(submission) => submission,
        Err(e) => {
            let mut page = UploadTemplate::new(member, form.draft);
            page.notices = notices;
            page.error = Some(capitalize(&e.to_string()));
            return (StatusCode::BAD_REQUEST, page).into_response();
        }
    };

    match state.content().insert(&submission).await {
        Ok(_) => {
            add_breadcrumb(
                "upload",
                "Submitted product",
                Some(&[("sku", submission.sku.as_str())]),
            );
            tracing::info!(
                sku = %submission.sku,
                images = submission.image_count,
                "Product submitted for moderation"
            );
            let mut page = UploadTemplate::new(member, ProductDraft::new());
            page.notices = notices;
            page.success = Some(format!(
                "{} was submitted and is pending approval.",
                submission.name
            ));
            page.into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to store product submission");
            let mut page = UploadTemplate::new(member, form.draft);
            page.notices = notices;
            page.error = Some("Upload failed. Please try again.".to_string());
            (StatusCode::BAD_GATEWAY, page).into_response()
        }
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}
