//! # Integration Tests for tallerplus-api
//!
//! Drives the full router in-process: login, bearer enforcement, client
//! CRUD with validation and uniqueness, search and pagination, health
//! checks, and the OpenAPI document.

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use tallerplus_api::state::{AppConfig, AppState};

const ADMIN_EMAIL: &str = "admin@tallerplus.com";
const ADMIN_PASSWORD: &str = "Admin123";

struct TestApp {
    router: axum::Router,
    state: AppState,
    admin_id: i64,
}

impl TestApp {
    /// Fresh in-memory database with the default admin user.
    async fn new() -> Self {
        let pool = tallerplus_api::db::connect_in_memory().await.unwrap();
        let admin_id =
            tallerplus_api::services::auth::create_user(&pool, ADMIN_EMAIL, ADMIN_PASSWORD)
                .await
                .unwrap();
        let state = AppState::new(&AppConfig::default(), pool);
        Self {
            router: tallerplus_api::app(state.clone()),
            state,
            admin_id,
        }
    }

    fn token(&self) -> String {
        self.state.tokens.issue(self.admin_id).unwrap()
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, value)
    }

    async fn authed(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let token = self.token();
        self.send(method, uri, Some(&token), body).await
    }

    async fn create(&self, body: Value) -> Value {
        let (status, created) = self.authed(Method::POST, "/clients", Some(body)).await;
        assert_eq!(status, StatusCode::CREATED, "{created}");
        created
    }
}

// -- Login --------------------------------------------------------------------

#[tokio::test]
async fn login_returns_token_that_opens_clients() {
    let app = TestApp::new().await;

    let (status, body) = app
        .send(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({"email": ADMIN_EMAIL, "password": ADMIN_PASSWORD})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["email"], ADMIN_EMAIL);
    assert_eq!(body["user"]["id"], app.admin_id);

    let token = body["access_token"].as_str().unwrap();
    let (status, _) = app.send(Method::GET, "/clients", Some(token), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn login_with_wrong_password_is_401() {
    let app = TestApp::new().await;

    let (status, body) = app
        .send(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({"email": ADMIN_EMAIL, "password": "wrong"})),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "INVALID_CREDENTIALS");
    assert_eq!(body["message"], "Credenciales inválidas");
}

#[tokio::test]
async fn login_with_unknown_email_is_401() {
    let app = TestApp::new().await;

    let (status, body) = app
        .send(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({"email": "nadie@tallerplus.com", "password": ADMIN_PASSWORD})),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn login_with_malformed_body_is_400() {
    let app = TestApp::new().await;

    let (status, body) = app
        .send(Method::POST, "/auth/login", None, Some(json!({"email": ADMIN_EMAIL})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
}

// -- Bearer enforcement -------------------------------------------------------

#[tokio::test]
async fn clients_require_token() {
    let app = TestApp::new().await;

    let (status, body) = app.send(Method::GET, "/clients", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");
    assert_eq!(body["message"], "missing authorization header");

    let (status, _) = app
        .send(Method::POST, "/clients", None, Some(json!({"nombre": "Ana"})))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn expired_token_is_rejected() {
    let app = TestApp::new().await;
    let stale = app
        .state
        .tokens
        .issue_at(app.admin_id, Utc::now() - Duration::hours(9))
        .unwrap();

    let (status, body) = app.send(Method::GET, "/clients", Some(&stale), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "token expired");
}

#[tokio::test]
async fn token_signed_with_other_secret_is_rejected() {
    let app = TestApp::new().await;
    let forged = tallerplus_api::auth::TokenKeys::new(b"another-secret")
        .issue(app.admin_id)
        .unwrap();

    let (status, _) = app.send(Method::GET, "/clients", Some(&forged), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// -- Create -------------------------------------------------------------------

#[tokio::test]
async fn create_then_duplicate_document() {
    let app = TestApp::new().await;
    let ana = json!({
        "nombre": "Ana",
        "documento": "123",
        "telefono": "",
        "email": "ana@x.com"
    });

    let created = app.create(ana.clone()).await;
    assert!(created["id"].as_i64().unwrap() > 0);
    assert_eq!(created["nombre"], "Ana");
    assert_eq!(created["documento"], "123");
    assert_eq!(created["telefono"], Value::Null);
    assert_eq!(created["email"], "ana@x.com");
    assert!(created["created_at"].is_string());

    let (status, body) = app.authed(Method::POST, "/clients", Some(ana)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "DUPLICATE_DOCUMENT");
    assert_eq!(body["message"], "Documento ya registrado");
}

#[tokio::test]
async fn create_reports_rules_in_order() {
    let app = TestApp::new().await;

    let cases = [
        (json!({"nombre": "   ", "email": "bad"}), "MISSING_NAME"),
        (json!({"nombre": "Ana", "email": "bad"}), "MISSING_IDENTIFIER"),
        (json!({"nombre": "Ana", "telefono": "300", "email": "bad"}), "INVALID_EMAIL"),
    ];
    for (body, code) in cases {
        let (status, err) = app.authed(Method::POST, "/clients", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(err["code"], code);
    }

    let (_, page) = app.authed(Method::GET, "/clients", None).await;
    assert_eq!(page["total"], 0);
}

#[tokio::test]
async fn create_rejects_duplicate_phone() {
    let app = TestApp::new().await;
    app.create(json!({"nombre": "Luis", "telefono": "3001112233"}))
        .await;

    let (status, body) = app
        .authed(
            Method::POST,
            "/clients",
            Some(json!({"nombre": "Otro", "telefono": " 3001112233 "})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "DUPLICATE_PHONE");
    assert_eq!(body["message"], "Teléfono ya registrado");
}

#[tokio::test]
async fn create_with_wrong_field_type_is_400() {
    let app = TestApp::new().await;

    let (status, body) = app
        .authed(Method::POST, "/clients", Some(json!({"nombre": 42})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
}

// -- Read ---------------------------------------------------------------------

#[tokio::test]
async fn get_returns_client_or_404() {
    let app = TestApp::new().await;
    let created = app
        .create(json!({"nombre": "Ana", "documento": "123", "direccion": "Calle 1"}))
        .await;
    let id = created["id"].as_i64().unwrap();

    let (status, body) = app
        .authed(Method::GET, &format!("/clients/{id}"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, created);

    let (status, body) = app.authed(Method::GET, "/clients/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");

    for uri in ["/clients/abc", "/clients/1.5", "/clients/99999999999999999999"] {
        let (status, body) = app.authed(Method::GET, uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        assert_eq!(body["code"], "NOT_FOUND");
    }
    let (status, _) = app
        .authed(Method::PUT, "/clients/abc", Some(json!({"nombre": "X"})))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.authed(Method::DELETE, "/clients/abc", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_is_newest_first_with_full_total() {
    let app = TestApp::new().await;
    for i in 1..=3 {
        app.create(json!({"nombre": format!("Cliente {i}"), "documento": format!("D{i}")}))
            .await;
    }

    let (status, page) = app
        .authed(Method::GET, "/clients?page_size=2", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 3);
    assert_eq!(page["page"], 1);
    assert_eq!(page["page_size"], 2);
    let names: Vec<&str> = page["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["nombre"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Cliente 3", "Cliente 2"]);

    let (_, page) = app
        .authed(Method::GET, "/clients?page=2&page_size=2", None)
        .await;
    assert_eq!(page["items"].as_array().unwrap().len(), 1);
    assert_eq!(page["items"][0]["nombre"], "Cliente 1");
}

#[tokio::test]
async fn list_search_is_case_insensitive() {
    let app = TestApp::new().await;
    app.create(json!({"nombre": "Ana Garcia", "documento": "100"}))
        .await;
    app.create(json!({"nombre": "Luis Pérez", "telefono": "3001112233"}))
        .await;
    app.create(json!({"nombre": "MARIA GARCIA", "documento": "200"}))
        .await;

    let (status, page) = app
        .authed(Method::GET, "/clients?search=garcia", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 2);
    let names: Vec<&str> = page["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["nombre"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["MARIA GARCIA", "Ana Garcia"]);

    let (_, page) = app
        .authed(Method::GET, "/clients?search=1112", None)
        .await;
    assert_eq!(page["total"], 1);
    assert_eq!(page["items"][0]["nombre"], "Luis Pérez");
}

#[tokio::test]
async fn list_rejects_bad_paging() {
    let app = TestApp::new().await;

    for uri in ["/clients?page=0", "/clients?page_size=0", "/clients?page=abc"] {
        let (status, body) = app.authed(Method::GET, uri, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["code"], "BAD_REQUEST");
    }

    let (status, page) = app
        .authed(Method::GET, "/clients?page_size=1000", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["page_size"], 100);
}

// -- Update -------------------------------------------------------------------

#[tokio::test]
async fn update_merges_and_excludes_self() {
    let app = TestApp::new().await;
    let created = app
        .create(json!({
            "nombre": "Ana",
            "documento": "123",
            "telefono": "300",
            "email": "ana@x.com"
        }))
        .await;
    let id = created["id"].as_i64().unwrap();

    let (status, updated) = app
        .authed(
            Method::PUT,
            &format!("/clients/{id}"),
            Some(json!({"nombre": "Ana María", "documento": "123", "email": null})),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{updated}");
    assert_eq!(updated["nombre"], "Ana María");
    assert_eq!(updated["documento"], "123");
    assert_eq!(updated["telefono"], "300");
    assert_eq!(updated["email"], "ana@x.com");
    assert_eq!(updated["created_at"], created["created_at"]);
}

#[tokio::test]
async fn update_with_empty_string_clears_field() {
    let app = TestApp::new().await;
    let created = app
        .create(json!({"nombre": "Ana", "documento": "123", "telefono": "300"}))
        .await;
    let id = created["id"].as_i64().unwrap();

    let (status, updated) = app
        .authed(Method::PUT, &format!("/clients/{id}"), Some(json!({"documento": ""})))
        .await;
    assert_eq!(status, StatusCode::OK, "{updated}");
    assert!(updated["documento"].is_null());
    assert_eq!(updated["telefono"], "300");

    let (status, stored) = app
        .authed(Method::GET, &format!("/clients/{id}"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(stored["documento"].is_null());
    assert_eq!(stored["nombre"], "Ana");

    // The cleared document is free for another client.
    app.create(json!({"nombre": "Luis", "documento": "123"})).await;
}

#[tokio::test]
async fn update_to_other_clients_document_fails_and_changes_nothing() {
    let app = TestApp::new().await;
    app.create(json!({"nombre": "Ana", "documento": "123"})).await;
    let luis = app.create(json!({"nombre": "Luis", "documento": "456"})).await;
    let id = luis["id"].as_i64().unwrap();

    let (status, body) = app
        .authed(
            Method::PUT,
            &format!("/clients/{id}"),
            Some(json!({"nombre": "Luis Nuevo", "documento": "123"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "DUPLICATE_DOCUMENT");

    let (_, stored) = app
        .authed(Method::GET, &format!("/clients/{id}"), None)
        .await;
    assert_eq!(stored, luis);
}

#[tokio::test]
async fn update_with_blank_name_fails() {
    let app = TestApp::new().await;
    let ana = app.create(json!({"nombre": "Ana", "documento": "123"})).await;
    let id = ana["id"].as_i64().unwrap();

    let (status, body) = app
        .authed(Method::PUT, &format!("/clients/{id}"), Some(json!({"nombre": "  "})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "MISSING_NAME");
    assert_eq!(body["message"], "El nombre es obligatorio");
}

#[tokio::test]
async fn update_missing_client_is_404() {
    let app = TestApp::new().await;

    let (status, _) = app
        .authed(Method::PUT, "/clients/999", Some(json!({"nombre": "X"})))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// -- Delete -------------------------------------------------------------------

#[tokio::test]
async fn delete_returns_204_then_404() {
    let app = TestApp::new().await;
    let ana = app.create(json!({"nombre": "Ana", "documento": "123"})).await;
    let id = ana["id"].as_i64().unwrap();

    let (status, body) = app
        .authed(Method::DELETE, &format!("/clients/{id}"), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, _) = app
        .authed(Method::GET, &format!("/clients/{id}"), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_missing_client_is_404_and_store_unchanged() {
    let app = TestApp::new().await;
    app.create(json!({"nombre": "Ana", "documento": "123"})).await;

    let (status, body) = app.authed(Method::DELETE, "/clients/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");

    let (_, page) = app.authed(Method::GET, "/clients", None).await;
    assert_eq!(page["total"], 1);
}

// -- Ambient surface ----------------------------------------------------------

#[tokio::test]
async fn health_checks_report_liveness_and_readiness() {
    let app = TestApp::new().await;

    let (status, body) = app.send(Method::GET, "/health/liveness", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("ok".into()));

    let (status, body) = app.send(Method::GET, "/health/readiness", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("ready".into()));
}

#[tokio::test]
async fn openapi_is_public() {
    let app = TestApp::new().await;

    let (status, body) = app.send(Method::GET, "/openapi.json", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/clients/{id}"].is_object());
}

#[tokio::test]
async fn metrics_is_404_without_recorder() {
    let app = TestApp::new().await;

    let (status, _) = app.send(Method::GET, "/metrics", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
