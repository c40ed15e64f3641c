// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Service catalogue ("servicos").
//!
//! Reads are public and only see active offerings unless the caller is an
//! admin. Writes are admin-only.

use crate::error::{AppError, Result};
use crate::middleware::auth::{optional_auth, require_auth, AuthUser, MaybeAuthUser};
use crate::models::{ApiResponse, Offering, Page, Role};
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
    let optional = || middleware::from_fn_with_state(state.clone(), optional_auth);
    let required = || middleware::from_fn_with_state(state.clone(), require_auth);

    Router::new()
        .route(
            "/api/v1/servicos",
            get(list_offerings)
                .route_layer(optional())
                .merge(post(create_offering).route_layer(required())),
        )
        .route(
            "/api/v1/servicos/{id}",
            get(get_offering)
                .route_layer(optional())
                .merge(put(update_offering).delete(delete_offering).route_layer(required())),
        )
}

/// Prices are positive with at most two decimal places.
fn validate_price(price: f64) -> std::result::Result<(), ValidationError> {
    let cents = price * 100.0;
    if price > 0.0 && (cents - cents.round()).abs() < 1e-6 {
        Ok(())
    } else {
        Err(ValidationError::new("price")
            .with_message("must be positive with at most 2 decimal places".into()))
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateOfferingRequest {
    #[serde(rename = "nome")]
    #[validate(length(min = 2, max = 100, message = "must be between 2 and 100 characters"))]
    pub name: String,
    #[serde(rename = "descricao")]
    #[validate(length(max = 500, message = "must be at most 500 characters"))]
    pub description: Option<String>,
    #[serde(rename = "preco")]
    #[validate(custom(function = "validate_price"))]
    pub price: Option<f64>,
    #[serde(rename = "ativo", default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateOfferingRequest {
    #[serde(rename = "nome")]
    #[validate(length(min = 2, max = 100, message = "must be between 2 and 100 characters"))]
    pub name: Option<String>,
    #[serde(rename = "descricao")]
    #[validate(length(max = 500, message = "must be at most 500 characters"))]
    pub description: Option<String>,
    #[serde(rename = "preco")]
    #[validate(custom(function = "validate_price"))]
    pub price: Option<f64>,
    #[serde(rename = "ativo")]
    pub active: Option<bool>,
}

fn is_admin(caller: &MaybeAuthUser) -> bool {
    caller.0.as_ref().is_some_and(|user| user.role == Role::Admin)
}

async fn list_offerings(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<MaybeAuthUser>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<Page<Offering>>>> {
    let show_inactive = is_admin(&caller);

    let mut offerings: Vec<Offering> = state
        .db
        .list::<Offering>()
        .await?
        .into_iter()
        .filter(|o| show_inactive || o.active)
        .filter(|o| query.matches([Some(o.name.as_str()), o.description.as_deref()]))
        .collect();
    offerings.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));

    Ok(Json(ApiResponse::new(query.page(offerings))))
}

async fn get_offering(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<MaybeAuthUser>,
    Path(id): Path<u64>,
) -> Result<Json<ApiResponse<Offering>>> {
    let offering = state
        .db
        .get::<Offering>(id)
        .await?
        .filter(|o| o.active || is_admin(&caller))
        .ok_or_else(|| AppError::NotFound(format!("Offering {} not found", id)))?;

    Ok(Json(ApiResponse::new(offering)))
}

async fn create_offering(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    ValidJson(body): ValidJson<CreateOfferingRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Offering>>)> {
    user.require_role(&[Role::Admin])?;

    let now = now_rfc3339();
    let offering = state
        .db
        .insert(|id| Offering {
            id,
            name: body.name.trim().to_string(),
            description: body.description,
            price: body.price,
            active: body.active,
            created_at: now.clone(),
            updated_at: now,
        })
        .await?;

    tracing::info!(offering_id = offering.id, user_id = user.id, "Offering created");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message("Offering created", offering)),
    ))
}

async fn update_offering(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<u64>,
    ValidJson(body): ValidJson<UpdateOfferingRequest>,
) -> Result<Json<ApiResponse<Offering>>> {
    user.require_role(&[Role::Admin])?;

    let mut offering = state
        .db
        .get::<Offering>(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Offering {} not found", id)))?;

    if let Some(name) = body.name {
        offering.name = name.trim().to_string();
    }
    if body.description.is_some() {
        offering.description = body.description;
    }
    if body.price.is_some() {
        offering.price = body.price;
    }
    if let Some(active) = body.active {
        offering.active = active;
    }
    offering.updated_at = now_rfc3339();
    state.db.put(&offering).await?;

    tracing::info!(offering_id = id, user_id = user.id, "Offering updated");
    Ok(Json(ApiResponse::with_message("Offering updated", offering)))
}

async fn delete_offering(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<u64>,
) -> Result<Json<ApiResponse<Offering>>> {
    user.require_role(&[Role::Admin])?;

    let offering = state
        .db
        .get::<Offering>(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Offering {} not found", id)))?;
    state.db.delete::<Offering>(id).await?;

    tracing::info!(offering_id = id, user_id = user.id, "Offering deleted");
    Ok(Json(ApiResponse::with_message("Offering deleted", offering)))
}
