// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Request extractors and query types shared by the route modules.

use crate::error::AppError;
use crate::models::Page;
use axum::{
    extract::{FromRequest, Request},
    Json,
};
use serde::{de::DeserializeOwned, Deserialize};
use validator::Validate;

/// JSON body that has been deserialized and passed its `validator` rules.
///
/// Malformed JSON and rule violations both surface as 400 responses.
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
        value.validate()?;
        Ok(ValidJson(value))
    }
}

const MAX_PER_PAGE: u32 = 100;

fn default_page() -> u32 {
    1
}
fn default_per_page() -> u32 {
    20
}

/// Pagination and free-text search for list endpoints.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Page number (1-indexed)
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
    /// Case-insensitive substring matched against each resource's search fields
    pub search: Option<String>,
}

impl ListQuery {
    /// True when no search term is given or any field contains it.
    pub fn matches<'a>(&self, fields: impl IntoIterator<Item = Option<&'a str>>) -> bool {
        let Some(term) = self.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) else {
            return true;
        };
        let term = term.to_lowercase();
        fields
            .into_iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(&term))
    }

    /// Slice a filtered, sorted list into the requested page.
    pub fn page<T>(&self, items: Vec<T>) -> Page<T> {
        Page::paginate(items, self.page, self.per_page.clamp(1, MAX_PER_PAGE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(search: Option<&str>) -> ListQuery {
        ListQuery {
            page: 1,
            per_page: 500,
            search: search.map(str::to_string),
        }
    }

    #[test]
    fn test_matches() {
        assert!(query(None).matches([Some("anything")]));
        assert!(query(Some("  ")).matches([None]));
        assert!(query(Some("fiscal")).matches([Some("Consultoria Fiscal"), None]));
        assert!(query(Some("FISCAL")).matches([None, Some("planejamento fiscal")]));
        assert!(!query(Some("folha")).matches([Some("Consultoria Fiscal"), None]));
    }

    #[test]
    fn test_per_page_is_capped() {
        let page = query(None).page((0..250).collect::<Vec<u32>>());
        assert_eq!(page.per_page, MAX_PER_PAGE);
        assert_eq!(page.items.len(), 100);
    }
}
