// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Request body validation tests.

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use contabil_api::models::Role;
use serde_json::json;

mod common;
use common::{create_test_app, login_as, request, seed_offering, send};

#[tokio::test]
async fn test_register_rejects_weak_password() {
    let (app, _) = create_test_app();

    let (status, _, body) = send(
        &app,
        request(
            Method::POST,
            "/api/v1/auth/register",
            Some(json!({ "nome": "Ana", "email": "a@b.com", "senha": "alllowercase1" })),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Invalid request data");
    let errors = body["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].as_str().unwrap().starts_with("senha:"));
}

#[tokio::test]
async fn test_register_reports_every_bad_field() {
    let (app, _) = create_test_app();

    let (status, _, body) = send(
        &app,
        request(
            Method::POST,
            "/api/v1/auth/register",
            Some(json!({ "nome": "A", "email": "not-an-email", "senha": "short" })),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let errors: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e.as_str().unwrap())
        .collect();
    assert!(errors.iter().any(|e| e.starts_with("email:")));
    assert!(errors.iter().any(|e| e.starts_with("nome:")));
    assert!(errors.iter().any(|e| e.starts_with("senha:")));
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let (app, _) = create_test_app();

    let (status, _, body) = send(
        &app,
        Request::builder()
            .method(Method::POST)
            .uri("/api/v1/auth/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"email\": "))
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_contact_requires_active_offering() {
    let (app, state) = create_test_app();
    let inactive = seed_offering(&state, "Serviço antigo", false).await;

    for offering_id in [inactive.id, 999_999] {
        let (status, _, body) = send(
            &app,
            request(
                Method::POST,
                "/api/v1/contatos",
                Some(json!({
                    "nome": "Maria Lima",
                    "email": "maria@empresa.com.br",
                    "telefone": "(11) 99999-8888",
                    "servico_id": offering_id,
                    "mensagem": "Gostaria de um orçamento."
                })),
                None,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }
}

#[tokio::test]
async fn test_contact_rejects_bad_phone_and_short_message() {
    let (app, state) = create_test_app();
    let offering = seed_offering(&state, "Abertura de empresa", true).await;

    let (status, _, body) = send(
        &app,
        request(
            Method::POST,
            "/api/v1/contatos",
            Some(json!({
                "nome": "Maria Lima",
                "email": "maria@empresa.com.br",
                "telefone": "12345",
                "servico_id": offering.id,
                "mensagem": "Oi"
            })),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let errors = body["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 2);
}

#[tokio::test]
async fn test_testimonial_rating_out_of_range() {
    let (app, _) = create_test_app();

    let (status, _, body) = send(
        &app,
        request(
            Method::POST,
            "/api/v1/testimonials",
            Some(json!({
                "name": "Carlos",
                "message": "Atendimento excelente e rápido",
                "rating": 6
            })),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"][0].as_str().unwrap().starts_with("rating:"));
}

#[tokio::test]
async fn test_contact_status_must_be_known() {
    let (app, state) = create_test_app();
    let token = login_as(&app, &state, "staff@b.com", Role::User).await;

    let (status, _, _) = send(
        &app,
        request(
            Method::PUT,
            "/api/v1/contatos/1/status",
            Some(json!({ "status": "arquivado" })),
            Some(&token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_offering_price_precision() {
    let (app, state) = create_test_app();
    let token = login_as(&app, &state, "admin@b.com", Role::Admin).await;

    let (status, _, _) = send(
        &app,
        request(
            Method::POST,
            "/api/v1/servicos",
            Some(json!({ "nome": "Consultoria", "preco": 10.005 })),
            Some(&token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
