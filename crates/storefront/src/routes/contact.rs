//! Contact form route handlers.
//!
//! Submissions are written to the `contactsubmissions` collection and never
//! read back by the storefront.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use gemline_core::entities::ContactSubmission;
use gemline_core::{Email, EmailError, SubmissionStatus};
use serde::Deserialize;
use thiserror::Error;
use tracing::instrument;

use crate::error::add_breadcrumb;
use crate::filters;
use crate::middleware::MemberSession;
use crate::models::CurrentMember;
use crate::state::AppState;

/// Subject used when the sender leaves it blank.
pub const DEFAULT_SUBJECT: &str = "General Inquiry";

/// Contact form data.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub message: String,
}

/// Why a contact form was refused before submission.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContactError {
    #[error("Please fill in all required fields.")]
    MissingFields,
    #[error("Please enter a valid email address: {0}")]
    InvalidEmail(#[from] EmailError),
}

impl ContactForm {
    /// Validate the form and build the record to store.
    ///
    /// # Errors
    ///
    /// Returns an error if name, email or message is blank, or the email does
    /// not parse.
    pub fn validate(&self) -> Result<ContactSubmission, ContactError> {
        let name = self.name.trim();
        let message = self.message.trim();
        if name.is_empty() || self.email.trim().is_empty() || message.is_empty() {
            return Err(ContactError::MissingFields);
        }
        let email = Email::parse(&self.email)?;
        let subject = match self.subject.trim() {
            "" => DEFAULT_SUBJECT,
            subject => subject,
        };

        Ok(ContactSubmission {
            id: None,
            sender_name: name.to_string(),
            sender_email: email.into_inner(),
            subject: subject.to_string(),
            message_content: message.to_string(),
            submission_date: Utc::now(),
            status: SubmissionStatus::Pending,
        })
    }
}

/// Toast-style notice above the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: &'static str,
    pub text: String,
    pub success: bool,
}

impl Notice {
    fn sent() -> Self {
        Self {
            title: "Message Sent!",
            text: "Thank you for contacting us. We'll get back to you soon.".to_string(),
            success: true,
        }
    }

    fn invalid(error: &ContactError) -> Self {
        Self {
            title: "Missing Information",
            text: error.to_string(),
            success: false,
        }
    }

    fn failed() -> Self {
        Self {
            title: "Error",
            text: "There was a problem sending your message. Please try again.".to_string(),
            success: false,
        }
    }
}

/// Contact page template.
#[derive(Template, WebTemplate)]
#[template(path = "contact.html")]
pub struct ContactTemplate {
    pub member: Option<CurrentMember>,
    pub form: ContactForm,
    pub notice: Option<Notice>,
}

/// Display the contact form.
#[instrument(skip(session))]
pub async fn show(session: MemberSession) -> impl IntoResponse {
    let member = session.member().cloned();
    // Prefill the sender from the signed-in member.
    let form = ContactForm {
        name: member
            .as_ref()
            .map(|m| m.display_name().to_string())
            .unwrap_or_default(),
        email: member
            .as_ref()
            .and_then(|m| m.email.clone())
            .unwrap_or_default(),
        ..ContactForm::default()
    };

    ContactTemplate {
        member,
        form,
        notice: None,
    }
}

/// Handle a contact form submission.
#[instrument(skip(state, session, form))]
pub async fn submit(
    State(state): State<AppState>,
    session: MemberSession,
    Form(form): Form<ContactForm>,
) -> Response {
    let member = session.member().cloned();

    let submission = match form.validate() {
        Ok(submission) => submission,
        Err(e) => {
            tracing::debug!(error = %e, "Rejected contact form");
            let page = ContactTemplate {
                member,
                notice: Some(Notice::invalid(&e)),
                form,
            };
            return (StatusCode::BAD_REQUEST, page).into_response();
        }
    };

    match state.content().insert(&submission).await {
        Ok(_) => {
            add_breadcrumb(
                "contact",
                "Sent contact message",
                Some(&[("subject", submission.subject.as_str())]),
            );
            tracing::info!(subject = %submission.subject, "Contact submission stored");
            ContactTemplate {
                member,
                form: ContactForm::default(),
                notice: Some(Notice::sent()),
            }
            .into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to store contact submission");
            ContactTemplate {
                member,
                form,
                notice: Some(Notice::failed()),
            }
            .into_response()
        }
    }
}
