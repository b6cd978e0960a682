//! # Bearer Token Authentication
//!
//! Access tokens are HS256 JWTs issued by `POST /auth/login`:
//!
//! ```text
//! Authorization: Bearer <header>.<claims>.<signature>
//! claims = { "sub": "<user id>", "iat": <issued>, "exp": <issued + 8h> }
//! ```
//!
//! There is no refresh and no revocation list; expiry is the only way a
//! token stops working. Verification uses zero leeway so the 8-hour window
//! is exact.
//!
//! ## AuthenticatedUser
//!
//! [`auth_middleware`] verifies the token and injects an [`AuthenticatedUser`]
//! into the request extensions. Handlers extract it via the
//! `FromRequestParts` impl.

use std::sync::Arc;

use axum::extract::Request;
use axum::http::header;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Fixed lifetime of an access token.
pub const TOKEN_TTL_HOURS: i64 = 8;

// ── Claims ──────────────────────────────────────────────────────────────────

/// JWT claims carried by an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id, as a decimal string.
    pub sub: String,
    /// Issued-at, seconds since the Unix epoch.
    pub iat: i64,
    /// Expiry, seconds since the Unix epoch.
    pub exp: i64,
}

// ── AuthenticatedUser ───────────────────────────────────────────────────────

/// Identity of the authenticated caller, available to all route handlers
/// behind [`auth_middleware`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: i64,
}

/// Extracts the identity that the auth middleware injected into extensions.
/// Returns 401 if no identity is present (middleware didn't run or failed).
impl<S: Send + Sync> axum::extract::FromRequestParts<S> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .copied()
            .ok_or_else(|| AppError::Unauthorized("no authenticated user in request context".into()))
    }
}

// ── Token Keys ──────────────────────────────────────────────────────────────

struct KeyMaterial {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

/// Signing and verification keys for access tokens.
///
/// Injected into request extensions for [`auth_middleware`]. Custom `Debug`
/// never prints key material.
#[derive(Clone)]
pub struct TokenKeys {
    inner: Arc<KeyMaterial>,
}

impl std::fmt::Debug for TokenKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenKeys")
            .field("algorithm", &"HS256")
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

impl TokenKeys {
    /// Derive HS256 keys from a shared secret.
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);
        Self {
            inner: Arc::new(KeyMaterial {
                encoding: EncodingKey::from_secret(secret),
                decoding: DecodingKey::from_secret(secret),
                validation,
            }),
        }
    }

    /// Issue a token for `user_id`, valid for [`TOKEN_TTL_HOURS`] from now.
    pub fn issue(&self, user_id: i64) -> Result<String, jsonwebtoken::errors::Error> {
        self.issue_at(user_id, Utc::now())
    }

    /// Issue a token as if the current time were `issued_at`.
    pub fn issue_at(
        &self,
        user_id: i64,
        issued_at: DateTime<Utc>,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let claims = Claims {
            sub: user_id.to_string(),
            iat: issued_at.timestamp(),
            exp: (issued_at + Duration::hours(TOKEN_TTL_HOURS)).timestamp(),
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.inner.encoding)
    }

    /// Verify a token's signature and expiry and return the caller it names.
    ///
    /// Error strings are safe to return to the client; they never contain
    /// the token itself.
    pub fn verify(&self, token: &str) -> Result<AuthenticatedUser, String> {
        use jsonwebtoken::errors::ErrorKind;

        let data = jsonwebtoken::decode::<Claims>(token, &self.inner.decoding, &self.inner.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => "token expired".to_string(),
                ErrorKind::InvalidSignature => "invalid token signature".to_string(),
                _ => "invalid bearer token".to_string(),
            })?;

        let user_id = data
            .claims
            .sub
            .parse::<i64>()
            .map_err(|_| "invalid token subject".to_string())?;
        Ok(AuthenticatedUser { user_id })
    }
}

// ── Middleware ───────────────────────────────────────────────────────────────

/// Extract and verify the Bearer token from the Authorization header.
///
/// On success injects [`AuthenticatedUser`] into request extensions for
/// downstream handlers. Fails closed: if no [`TokenKeys`] extension is
/// configured every request is rejected.
pub async fn auth_middleware(mut request: Request, next: Next) -> Response {
    let Some(keys) = request.extensions().get::<TokenKeys>().cloned() else {
        tracing::error!("auth middleware mounted without TokenKeys extension");
        return AppError::Unauthorized("authentication is not configured".into()).into_response();
    };

    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    match auth_header {
        Some(header_value) if header_value.starts_with("Bearer ") => {
            let provided = header_value["Bearer ".len()..].trim();
            match keys.verify(provided) {
                Ok(user) => {
                    request.extensions_mut().insert(user);
                    next.run(request).await
                }
                Err(msg) => {
                    tracing::warn!(reason = %msg, "authentication failed: invalid bearer token");
                    AppError::Unauthorized(msg).into_response()
                }
            }
        }
        Some(_) => {
            tracing::warn!("authentication failed: non-Bearer authorization scheme");
            AppError::Unauthorized("authorization header must use Bearer scheme".into())
                .into_response()
        }
        None => {
            tracing::warn!("authentication failed: missing authorization header");
            AppError::Unauthorized("missing authorization header".into()).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::middleware::from_fn;
    use axum::routing::get;
    use axum::Router;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    const SECRET: &[u8] = b"test-secret-key";

    /// Minimal router that echoes the authenticated user id.
    fn test_app(keys: Option<TokenKeys>) -> Router {
        let router = Router::new()
            .route(
                "/whoami",
                get(|user: AuthenticatedUser| async move { user.user_id.to_string() }),
            )
            .layer(from_fn(auth_middleware));
        match keys {
            Some(keys) => router.layer(axum::Extension(keys)),
            None => router,
        }
    }

    async fn call(app: Router, authorization: Option<&str>) -> (StatusCode, String) {
        let mut builder = Request::builder().uri("/whoami");
        if let Some(value) = authorization {
            builder = builder.header("Authorization", value);
        }
        let response = app.oneshot(builder.body(Body::empty()).unwrap()).await.unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    // ── Token tests ──────────────────────────────────────────────

    #[test]
    fn issued_token_verifies() {
        let keys = TokenKeys::new(SECRET);
        let token = keys.issue(42).unwrap();
        assert_eq!(keys.verify(&token), Ok(AuthenticatedUser { user_id: 42 }));
    }

    #[test]
    fn token_lifetime_is_eight_hours() {
        let keys = TokenKeys::new(SECRET);
        let token = keys.issue(1).unwrap();
        let data = jsonwebtoken::decode::<Claims>(
            &token,
            &DecodingKey::from_secret(SECRET),
            &Validation::new(Algorithm::HS256),
        )
        .unwrap();
        assert_eq!(data.claims.exp - data.claims.iat, 8 * 3600);
        assert_eq!(data.claims.sub, "1");
    }

    #[test]
    fn expired_token_rejected() {
        let keys = TokenKeys::new(SECRET);
        let issued = Utc::now() - Duration::hours(TOKEN_TTL_HOURS) - Duration::seconds(5);
        let token = keys.issue_at(1, issued).unwrap();
        assert_eq!(keys.verify(&token), Err("token expired".to_string()));
    }

    #[test]
    fn token_near_end_of_window_still_valid() {
        let keys = TokenKeys::new(SECRET);
        let issued = Utc::now() - Duration::hours(TOKEN_TTL_HOURS) + Duration::minutes(1);
        let token = keys.issue_at(9, issued).unwrap();
        assert_eq!(keys.verify(&token), Ok(AuthenticatedUser { user_id: 9 }));
    }

    #[test]
    fn token_from_other_secret_rejected() {
        let token = TokenKeys::new(b"other-secret").issue(1).unwrap();
        let err = TokenKeys::new(SECRET).verify(&token).unwrap_err();
        assert_eq!(err, "invalid token signature");
    }

    #[test]
    fn garbage_token_rejected() {
        let keys = TokenKeys::new(SECRET);
        assert!(keys.verify("not-a-jwt").is_err());
        assert!(keys.verify("").is_err());
    }

    #[test]
    fn non_numeric_subject_rejected() {
        let claims = Claims {
            sub: "admin".into(),
            iat: Utc::now().timestamp(),
            exp: (Utc::now() + Duration::hours(1)).timestamp(),
        };
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();
        let err = TokenKeys::new(SECRET).verify(&token).unwrap_err();
        assert_eq!(err, "invalid token subject");
    }

    #[test]
    fn debug_redacts_keys() {
        let debug = format!("{:?}", TokenKeys::new(SECRET));
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("test-secret-key"));
    }

    // ── Middleware tests ─────────────────────────────────────────

    #[tokio::test]
    async fn valid_bearer_token_accepted() {
        let keys = TokenKeys::new(SECRET);
        let header = format!("Bearer {}", keys.issue(7).unwrap());
        let (status, body) = call(test_app(Some(keys)), Some(&header)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "7");
    }

    #[tokio::test]
    async fn missing_authorization_header_rejected() {
        let (status, body) = call(test_app(Some(TokenKeys::new(SECRET))), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let err: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(err["code"], "UNAUTHORIZED");
        assert!(err["message"].as_str().unwrap().contains("missing"));
    }

    #[tokio::test]
    async fn non_bearer_scheme_rejected() {
        let (status, body) = call(
            test_app(Some(TokenKeys::new(SECRET))),
            Some("Basic dXNlcjpwYXNz"),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains("Bearer scheme"));
    }

    #[tokio::test]
    async fn expired_bearer_token_rejected() {
        let keys = TokenKeys::new(SECRET);
        let token = keys
            .issue_at(7, Utc::now() - Duration::hours(TOKEN_TTL_HOURS + 1))
            .unwrap();
        let header = format!("Bearer {token}");
        let (status, body) = call(test_app(Some(keys)), Some(&header)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains("expired"));
    }

    #[tokio::test]
    async fn missing_keys_fail_closed() {
        let token = TokenKeys::new(SECRET).issue(7).unwrap();
        let header = format!("Bearer {token}");
        let (status, _) = call(test_app(None), Some(&header)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
