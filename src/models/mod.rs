// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod contact;
pub mod offering;
pub mod task;
pub mod testimonial;
pub mod user;

pub use contact::{Contact, ContactStatus};
pub use offering::Offering;
pub use task::Task;
pub use testimonial::Testimonial;
pub use user::{Role, User, UserResponse};

use serde::{Deserialize, Serialize};

/// Successful response envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data,
        }
    }

    pub fn with_message(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data,
        }
    }
}

/// One page of a list endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub per_page: u32,
    pub total: usize,
    pub total_pages: u32,
    pub has_next: bool,
    pub has_prev: bool,
}

impl<T> Page<T> {
    /// Slice an already filtered and sorted list into the requested page.
    ///
    /// `page` is 1-indexed; zero is treated as the first page.
    pub fn paginate(all: Vec<T>, page: u32, per_page: u32) -> Self {
        let page = page.max(1);
        let per_page = per_page.max(1);
        let total = all.len();
        let total_pages = total.div_ceil(per_page as usize) as u32;
        let start = (page as usize - 1).saturating_mul(per_page as usize);

        let items = all
            .into_iter()
            .skip(start)
            .take(per_page as usize)
            .collect();

        Self {
            items,
            page,
            per_page,
            total,
            total_pages,
            has_next: page < total_pages,
            has_prev: page > 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paginate() {
        let page = Page::paginate((1..=25).collect::<Vec<u32>>(), 2, 10);
        assert_eq!(page.items, (11..=20).collect::<Vec<u32>>());
        assert_eq!(page.total, 25);
        assert_eq!(page.total_pages, 3);
        assert!(page.has_next);
        assert!(page.has_prev);

        let last = Page::paginate((1..=25).collect::<Vec<u32>>(), 3, 10);
        assert_eq!(last.items, vec![21, 22, 23, 24, 25]);
        assert!(!last.has_next);

        let beyond = Page::paginate(vec![1u32, 2], 5, 10);
        assert!(beyond.items.is_empty());
        assert_eq!(beyond.total_pages, 1);
    }
}
