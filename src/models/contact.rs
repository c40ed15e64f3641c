// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Contact-form submission ("contato").

use serde::{Deserialize, Serialize};

/// Processing state of a contact request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContactStatus {
    #[default]
    #[serde(rename = "novo")]
    New,
    #[serde(rename = "em_andamento")]
    InProgress,
    #[serde(rename = "respondido")]
    Answered,
    #[serde(rename = "finalizado")]
    Closed,
}

/// Contact stored in the `contatos` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contact {
    pub id: u64,
    #[serde(rename = "nome")]
    pub name: String,
    pub email: String,
    /// Normalized by [`format_phone`] on creation
    #[serde(rename = "telefone")]
    pub phone: String,
    #[serde(rename = "empresa")]
    pub company: Option<String>,
    /// Offering the visitor asked about
    #[serde(rename = "servico_id")]
    pub offering_id: u64,
    #[serde(rename = "mensagem")]
    pub message: String,
    pub status: ContactStatus,
    pub created_at: String,
    pub updated_at: String,
}

/// Normalize a Brazilian phone number to `(XX) XXXXX-XXXX` or `(XX) XXXX-XXXX`.
///
/// A leading `55` country code is dropped only when more than 11 digits are
/// present, so numbers in area code 55 keep their DDD. Anything that doesn't
/// reduce to 10 or 11 digits is returned unchanged.
pub fn format_phone(raw: &str) -> String {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    let local = if digits.len() > 11 {
        digits.strip_prefix("55").unwrap_or(&digits)
    } else {
        &digits
    };

    match local.len() {
        11 => format!("({}) {}-{}", &local[..2], &local[2..7], &local[7..]),
        10 => format!("({}) {}-{}", &local[..2], &local[2..6], &local[6..]),
        _ => raw.to_string(),
    }
}
