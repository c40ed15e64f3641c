// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Contact-form submissions ("contatos").
//!
//! Anyone may submit a contact, subject to the admission limiter. Staff
//! (admin or user role) read them and move them through their statuses.

use crate::error::{AppError, Result};
use crate::middleware::{limit_public_writes, require_auth, AuthUser};
use crate::models::contact::format_phone;
use crate::models::{ApiResponse, Contact, ContactStatus, Offering, Page, Role};
use crate::routes::extract::{ListQuery, ValidJson};
use crate::time_utils::now_rfc3339;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    routing::{get, post, put},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use validator::{Validate, ValidationError};

const STAFF: &[Role] = &[Role::Admin, Role::User];

pub fn routes(state: &Arc<AppState>) -> Router<Arc<AppState>> {
    let required = || middleware::from_fn_with_state(state.clone(), require_auth);

    Router::new()
        .route(
            "/api/v1/contatos",
            post(create_contact)
                .route_layer(middleware::from_fn_with_state(
                    state.clone(),
                    limit_public_writes,
                ))
                .merge(get(list_contacts).route_layer(required())),
        )
        .route("/api/v1/contatos/{id}", get(get_contact).route_layer(required()))
        .route(
            "/api/v1/contatos/{id}/status",
            put(update_contact_status).route_layer(required()),
        )
}

/// Brazilian phone: optional +55, two-digit area code, 8 or 9 digit number.
fn validate_phone(phone: &str) -> std::result::Result<(), ValidationError> {
    let allowed = phone
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '(' | ')' | '+' | '-'));
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    let local = if digits.len() > 11 {
        digits.strip_prefix("55").unwrap_or(&digits)
    } else {
        &digits
    };

    if allowed && matches!(local.len(), 10 | 11) && !local.starts_with('0') {
        Ok(())
    } else {
        Err(ValidationError::new("phone")
            .with_message("must be a Brazilian phone number like (11) 99999-9999".into()))
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateContactRequest {
    #[serde(rename = "nome")]
    #[validate(length(min = 2, max = 100, message = "must be between 2 and 100 characters"))]
    pub name: String,
    #[validate(
        email(message = "must be a valid email address"),
        length(max = 255, message = "must be at most 255 characters")
    )]
    pub email: String,
    #[serde(rename = "telefone")]
    #[validate(custom(function = "validate_phone"))]
    pub phone: String,
    #[serde(rename = "empresa")]
    #[validate(length(max = 100, message = "must be at most 100 characters"))]
    pub company: Option<String>,
    #[serde(rename = "servico_id")]
    #[validate(range(min = 1, message = "must be a positive ID"))]
    pub offering_id: u64,
    #[serde(rename = "mensagem")]
    #[validate(length(min = 10, max = 1000, message = "must be between 10 and 1000 characters"))]
    pub message: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateStatusRequest {
    pub status: ContactStatus,
}

/// Offering name attached to contact responses.
#[derive(Debug, Clone, Serialize)]
pub struct OfferingRef {
    pub id: u64,
    #[serde(rename = "nome")]
    pub name: String,
}

/// Contact plus the offering it refers to, when that still exists.
#[derive(Debug, Serialize)]
pub struct ContactView {
    #[serde(flatten)]
    pub contact: Contact,
    #[serde(rename = "servico")]
    pub offering: Option<OfferingRef>,
}

impl ContactView {
    fn new(contact: Contact, offering: Option<&Offering>) -> Self {
        Self {
            contact,
            offering: offering.map(|o| OfferingRef {
                id: o.id,
                name: o.name.clone(),
            }),
        }
    }
}

async fn view(state: &AppState, contact: Contact) -> Result<ContactView> {
    let offering = state.db.get::<Offering>(contact.offering_id).await?;
    Ok(ContactView::new(contact, offering.as_ref()))
}

async fn create_contact(
    State(state): State<Arc<AppState>>,
    ValidJson(body): ValidJson<CreateContactRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ContactView>>)> {
    let offering = state
        .db
        .get::<Offering>(body.offering_id)
        .await?
        .filter(|o| o.active)
        .ok_or_else(|| AppError::BadRequest("Offering not found or inactive".to_string()))?;

    let now = now_rfc3339();
    let contact = state
        .db
        .insert(|id| Contact {
            id,
            name: body.name.trim().to_string(),
            email: body.email.trim().to_string(),
            phone: format_phone(&body.phone),
            company: body.company.filter(|c| !c.trim().is_empty()),
            offering_id: offering.id,
            message: body.message.trim().to_string(),
            status: ContactStatus::New,
            created_at: now.clone(),
            updated_at: now,
        })
        .await?;

    tracing::info!(
        contact_id = contact.id,
        offering_id = offering.id,
        "Contact received"
    );
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            "Contact sent. We will get back to you soon.",
            ContactView::new(contact, Some(&offering)),
        )),
    ))
}

async fn list_contacts(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<Page<ContactView>>>> {
    user.require_role(STAFF)?;

    let offerings: HashMap<u64, Offering> = state
        .db
        .list::<Offering>()
        .await?
        .into_iter()
        .map(|o| (o.id, o))
        .collect();

    let mut contacts: Vec<Contact> = state
        .db
        .list::<Contact>()
        .await?
        .into_iter()
        .filter(|c| query.matches([Some(c.name.as_str()), Some(c.email.as_str())]))
        .collect();
    // Newest first
    contacts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

    let views = contacts
        .into_iter()
        .map(|c| {
            let offering = offerings.get(&c.offering_id);
            ContactView::new(c, offering)
        })
        .collect();

    Ok(Json(ApiResponse::new(query.page(views))))
}

async fn get_contact(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<u64>,
) -> Result<Json<ApiResponse<ContactView>>> {
    user.require_role(STAFF)?;

    let contact = state
        .db
        .get::<Contact>(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Contact {} not found", id)))?;

    Ok(Json(ApiResponse::new(view(&state, contact).await?)))
}

async fn update_contact_status(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<u64>,
    ValidJson(body): ValidJson<UpdateStatusRequest>,
) -> Result<Json<ApiResponse<ContactView>>> {
    user.require_role(STAFF)?;

    let mut contact = state
        .db
        .get::<Contact>(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Contact {} not found", id)))?;

    let previous = contact.status;
    contact.status = body.status;
    contact.updated_at = now_rfc3339();
    state.db.put(&contact).await?;

    tracing::info!(
        contact_id = id,
        user_id = user.id,
        from = ?previous,
        to = ?contact.status,
        "Contact status updated"
    );
    Ok(Json(ApiResponse::with_message(
        "Status updated",
        view(&state, contact).await?,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_phone() {
        for ok in [
            "(11) 99999-9999",
            "11999999999",
            "+5511999999999",
            "+55 (11) 3333-4444",
            "1133334444",
        ] {
            assert!(validate_phone(ok).is_ok(), "{ok} should be accepted");
        }
        for bad in ["12345", "(01) 99999-9999", "11 9999a-9999", "+55 11 99999-99999"] {
            assert!(validate_phone(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_contact_view_shape() {
        let contact = Contact {
            id: 7,
            name: "Ana".to_string(),
            email: "a@b.com".to_string(),
            phone: "(11) 99999-9999".to_string(),
            company: None,
            offering_id: 3,
            message: "Preciso de ajuda com impostos".to_string(),
            status: ContactStatus::New,
            created_at: "2026-01-01T00:00:00Z".to_string(),
            updated_at: "2026-01-01T00:00:00Z".to_string(),
        };
        let view = ContactView {
            contact,
            offering: Some(OfferingRef {
                id: 3,
                name: "Abertura de empresa".to_string(),
            }),
        };

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["status"], "novo");
        assert_eq!(json["servico_id"], 3);
        assert_eq!(json["servico"]["nome"], "Abertura de empresa");
    }
}
