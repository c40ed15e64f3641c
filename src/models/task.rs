// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Internal task tracked by staff.

use serde::{Deserialize, Serialize};

/// Task stored in the `tasks` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: u64,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub completed: bool,
    /// RFC3339 due date
    pub due_date: String,
}
