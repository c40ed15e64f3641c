// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Service offering ("servico") listed on the public site.

use serde::{Deserialize, Serialize};

/// Offering stored in the `servicos` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Offering {
    pub id: u64,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "descricao")]
    pub description: Option<String>,
    /// Price in BRL, two decimal places
    #[serde(rename = "preco")]
    pub price: Option<f64>,
    /// Only active offerings are shown publicly or accept contacts
    #[serde(rename = "ativo")]
    pub active: bool,
    pub created_at: String,
    pub updated_at: String,
}
