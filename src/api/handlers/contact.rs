//! Contact form submission.

use axum::{Form, Json, http::StatusCode};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;
use validator::Validate;

use crate::api::doc::CONTACT_TAG;
use crate::api::dto::{ContactForm, ContactResponse, ContactSubmission};
use crate::state::AppState;

pub fn contact_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(submit_contact))
}

/// POST /contact - Validate a contact form submission
///
/// Nothing is persisted or sent; the accepted data is echoed back.
#[utoipa::path(
    post,
    path = "/contact",
    tag = CONTACT_TAG,
    request_body(content = ContactForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Submission accepted", body = ContactResponse),
        (status = 422, description = "One or more fields are invalid", body = ContactResponse)
    )
)]
pub async fn submit_contact(Form(form): Form<ContactForm>) -> (StatusCode, Json<ContactResponse>) {
    if let Err(errors) = form.validate() {
        tracing::debug!(fields = errors.field_errors().len(), "Contact form rejected");
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ContactResponse::rejected(&errors)),
        );
    }

    let submission = ContactSubmission::from(form);
    tracing::info!(email = %submission.email, "Contact form submitted");
    (StatusCode::OK, Json(ContactResponse::accepted(submission)))
}
