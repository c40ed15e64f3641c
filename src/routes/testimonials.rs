// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Customer testimonials: public submission and listing, admin moderation.

use crate::error::{AppError, Result};
use crate::middleware::{limit_public_writes, require_auth, AuthUser};
use crate::models::testimonial::sanitize_message;
use crate::models::{ApiResponse, Page, Role, Testimonial};
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
use serde::Deserialize;
use std::sync::Arc;
use validator::{Validate, ValidationError};

pub fn routes(state: &Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/v1/testimonials",
            get(list_testimonials).merge(post(create_testimonial).route_layer(
                middleware::from_fn_with_state(state.clone(), limit_public_writes),
            )),
        )
        .route(
            "/api/v1/testimonials/{id}",
            get(get_testimonial).merge(
                put(update_testimonial)
                    .delete(delete_testimonial)
                    .route_layer(middleware::from_fn_with_state(state.clone(), require_auth)),
            ),
        )
}

/// Photos are linked, never uploaded, so only web URLs make sense.
fn validate_photo_scheme(url: &str) -> std::result::Result<(), ValidationError> {
    if url.starts_with("https://") || url.starts_with("http://") {
        Ok(())
    } else {
        Err(ValidationError::new("url").with_message("must be a valid http(s) URL".into()))
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTestimonialRequest {
    #[validate(length(min = 2, max = 100, message = "must be between 2 and 100 characters"))]
    pub name: String,
    #[validate(length(max = 100, message = "must be at most 100 characters"))]
    pub company: Option<String>,
    #[validate(length(min = 10, max = 1000, message = "must be between 10 and 1000 characters"))]
    pub message: String,
    #[validate(range(min = 1, max = 5, message = "must be between 1 and 5"))]
    pub rating: u8,
    #[validate(
        url(message = "must be a valid http(s) URL"),
        custom(function = "validate_photo_scheme")
    )]
    pub photo: Option<String>,
}

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTestimonialRequest {
    #[validate(length(min = 2, max = 100, message = "must be between 2 and 100 characters"))]
    pub name: Option<String>,
    #[validate(length(max = 100, message = "must be at most 100 characters"))]
    pub company: Option<String>,
    #[validate(length(min = 10, max = 1000, message = "must be between 10 and 1000 characters"))]
    pub message: Option<String>,
    #[validate(range(min = 1, max = 5, message = "must be between 1 and 5"))]
    pub rating: Option<u8>,
    #[validate(
        url(message = "must be a valid http(s) URL"),
        custom(function = "validate_photo_scheme")
    )]
    pub photo: Option<String>,
}

fn not_found(id: u64) -> AppError {
    AppError::NotFound(format!("Testimonial {} not found", id))
}

async fn create_testimonial(
    State(state): State<Arc<AppState>>,
    ValidJson(body): ValidJson<CreateTestimonialRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Testimonial>>)> {
    let now = now_rfc3339();
    let testimonial = state
        .db
        .insert(|id| Testimonial {
            id,
            name: body.name.trim().to_string(),
            company: body.company.filter(|c| !c.trim().is_empty()),
            message: sanitize_message(&body.message),
            rating: body.rating,
            photo: body.photo,
            created_at: now.clone(),
            updated_at: now,
        })
        .await?;

    tracing::info!(
        testimonial_id = testimonial.id,
        rating = testimonial.rating,
        "Testimonial submitted"
    );
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message("Testimonial created", testimonial)),
    ))
}

async fn list_testimonials(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<Page<Testimonial>>>> {
    let mut testimonials: Vec<Testimonial> = state
        .db
        .list::<Testimonial>()
        .await?
        .into_iter()
        .filter(|t| {
            query.matches([
                Some(t.name.as_str()),
                t.company.as_deref(),
                Some(t.message.as_str()),
            ])
        })
        .collect();
    testimonials.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

    Ok(Json(ApiResponse::new(query.page(testimonials))))
}

async fn get_testimonial(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<ApiResponse<Testimonial>>> {
    let testimonial = state
        .db
        .get::<Testimonial>(id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(ApiResponse::new(testimonial)))
}

async fn update_testimonial(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<u64>,
    ValidJson(body): ValidJson<UpdateTestimonialRequest>,
) -> Result<Json<ApiResponse<Testimonial>>> {
    user.require_role(&[Role::Admin])?;

    let mut testimonial = state
        .db
        .get::<Testimonial>(id)
        .await?
        .ok_or_else(|| not_found(id))?;

    if let Some(name) = body.name {
        testimonial.name = name.trim().to_string();
    }
    if let Some(company) = body.company {
        testimonial.company = Some(company).filter(|c| !c.trim().is_empty());
    }
    if let Some(message) = body.message {
        testimonial.message = sanitize_message(&message);
    }
    if let Some(rating) = body.rating {
        testimonial.rating = rating;
    }
    if body.photo.is_some() {
        testimonial.photo = body.photo;
    }
    testimonial.updated_at = now_rfc3339();
    state.db.put(&testimonial).await?;

    tracing::info!(testimonial_id = id, user_id = user.id, "Testimonial updated");
    Ok(Json(ApiResponse::with_message(
        "Testimonial updated",
        testimonial,
    )))
}

async fn delete_testimonial(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<u64>,
) -> Result<Json<ApiResponse<Testimonial>>> {
    user.require_role(&[Role::Admin])?;

    let testimonial = state
        .db
        .get::<Testimonial>(id)
        .await?
        .ok_or_else(|| not_found(id))?;
    state.db.delete::<Testimonial>(id).await?;

    tracing::info!(testimonial_id = id, user_id = user.id, "Testimonial deleted");
    Ok(Json(ApiResponse::with_message(
        "Testimonial deleted",
        testimonial,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_photo_must_be_web_url() {
        let request = |photo: &str| CreateTestimonialRequest {
            name: "Carlos".to_string(),
            company: None,
            message: "Atendimento excelente e rápido".to_string(),
            rating: 5,
            photo: Some(photo.to_string()),
        };

        for ok in ["https://cdn.example.com/a.jpg", "http://example.com"] {
            assert!(request(ok).validate().is_ok(), "{ok} should be accepted");
        }
        for bad in [
            "ftp://example.com/a.jpg",
            "https://",
            "https://exa mple.com",
            "http://:::",
            "not a url",
        ] {
            let errors = request(bad).validate().unwrap_err();
            assert!(
                errors.field_errors().contains_key("photo"),
                "{bad} should be rejected"
            );
        }

        let update = UpdateTestimonialRequest {
            name: None,
            company: None,
            message: None,
            rating: None,
            photo: Some("http://:::".to_string()),
        };
        assert!(update.validate().is_err());
    }

    #[test]
    fn test_rating_bounds() {
        let request = |rating| CreateTestimonialRequest {
            name: "Carlos".to_string(),
            company: None,
            message: "Atendimento excelente e rápido".to_string(),
            rating,
            photo: None,
        };
        assert!(request(1).validate().is_ok());
        assert!(request(5).validate().is_ok());
        assert!(request(0).validate().is_err());
        assert!(request(6).validate().is_err());
    }
}
