// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Internal task board for staff.
//!
//! Every route requires a signed-in user; viewers may read but not write.

use crate::error::{AppError, Result};
use crate::middleware::{require_auth, AuthUser};
use crate::models::{ApiResponse, Page, Role, Task};
use crate::routes::extract::{ListQuery, ValidJson};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    routing::get,
    Extension, Json, Router,
};
use chrono::DateTime;
use serde::Deserialize;
use std::sync::Arc;
use validator::{Validate, ValidationError};

const WRITERS: &[Role] = &[Role::Admin, Role::User];

pub fn routes(state: &Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/tasks", get(list_tasks).post(create_task))
        .route(
            "/tasks/{id}",
            get(get_task).put(update_task).delete(delete_task),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth))
}

fn validate_due_date(due_date: &str) -> std::result::Result<(), ValidationError> {
    DateTime::parse_from_rfc3339(due_date)
        .map(|_| ())
        .map_err(|_| {
            ValidationError::new("datetime").with_message("must be an RFC3339 date-time".into())
        })
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    #[validate(length(min = 1, message = "is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "is required"))]
    pub slug: String,
    pub description: String,
    #[serde(default)]
    pub completed: bool,
    #[validate(custom(function = "validate_due_date"))]
    pub due_date: String,
}

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    #[validate(length(min = 1, message = "is required"))]
    pub name: Option<String>,
    #[validate(length(min = 1, message = "is required"))]
    pub slug: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
    #[validate(custom(function = "validate_due_date"))]
    pub due_date: Option<String>,
}

fn not_found(id: u64) -> AppError {
    AppError::NotFound(format!("Task {} not found", id))
}

async fn list_tasks(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<Page<Task>>>> {
    let mut tasks: Vec<Task> = state
        .db
        .list::<Task>()
        .await?
        .into_iter()
        .filter(|t| {
            query.matches([
                Some(t.name.as_str()),
                Some(t.slug.as_str()),
                Some(t.description.as_str()),
            ])
        })
        .collect();
    tasks.sort_by(|a, b| b.id.cmp(&a.id));

    Ok(Json(ApiResponse::new(query.page(tasks))))
}

async fn get_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<ApiResponse<Task>>> {
    let task = state.db.get::<Task>(id).await?.ok_or_else(|| not_found(id))?;
    Ok(Json(ApiResponse::new(task)))
}

async fn create_task(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    ValidJson(body): ValidJson<CreateTaskRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Task>>)> {
    user.require_role(WRITERS)?;

    let task = state
        .db
        .insert(|id| Task {
            id,
            name: body.name,
            slug: body.slug,
            description: body.description,
            completed: body.completed,
            due_date: body.due_date,
        })
        .await?;

    tracing::info!(task_id = task.id, user_id = user.id, "Task created");
    Ok((StatusCode::CREATED, Json(ApiResponse::new(task))))
}

async fn update_task(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<u64>,
    ValidJson(body): ValidJson<UpdateTaskRequest>,
) -> Result<Json<ApiResponse<Task>>> {
    user.require_role(WRITERS)?;

    let mut task = state.db.get::<Task>(id).await?.ok_or_else(|| not_found(id))?;
    if let Some(name) = body.name {
        task.name = name;
    }
    if let Some(slug) = body.slug {
        task.slug = slug;
    }
    if let Some(description) = body.description {
        task.description = description;
    }
    if let Some(completed) = body.completed {
        task.completed = completed;
    }
    if let Some(due_date) = body.due_date {
        task.due_date = due_date;
    }
    state.db.put(&task).await?;

    tracing::info!(task_id = id, user_id = user.id, "Task updated");
    Ok(Json(ApiResponse::new(task)))
}

async fn delete_task(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<u64>,
) -> Result<Json<ApiResponse<Task>>> {
    user.require_role(WRITERS)?;

    let task = state.db.get::<Task>(id).await?.ok_or_else(|| not_found(id))?;
    state.db.delete::<Task>(id).await?;

    tracing::info!(task_id = id, user_id = user.id, "Task deleted");
    Ok(Json(ApiResponse::with_message("Task deleted", task)))
}
