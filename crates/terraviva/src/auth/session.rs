use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::Redirect,
    Json, RequestPartsExt,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_cookies::{
    cookie::{Cookie, SameSite},
    Cookies,
};
use uuid::Uuid;

use super::AuthError;
use crate::domain::CrmUserView;

pub const SESSION_COOKIE: &str = "crm_session";
pub const SESSION_TTL_HOURS: i64 = 12;

/// Signing material for session tokens, installed as a request extension so
/// the extractors below can reach it without ambient state.
#[derive(Clone)]
pub struct SessionConfig {
    secret: String,
}

impl SessionConfig {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Random per-process secret for deployments without a configured one.
    /// Sessions signed with it do not survive a restart.
    pub fn generated() -> Self {
        Self {
            secret: Uuid::new_v4().to_string(),
        }
    }

    fn encoding_key(&self) -> EncodingKey {
        EncodingKey::from_secret(self.secret.as_bytes())
    }

    fn decoding_key(&self) -> DecodingKey {
        DecodingKey::from_secret(self.secret.as_bytes())
    }
}

/// Claims carried by the signed session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: i64,
    pub username: String,
    pub display_name: String,
    pub iat: i64,
    pub exp: i64,
}

impl SessionClaims {
    pub fn user(&self) -> CrmUserView {
        CrmUserView {
            id: self.sub,
            username: self.username.clone(),
            display_name: self.display_name.clone(),
        }
    }
}

pub fn issue_token(user: &CrmUserView, config: &SessionConfig) -> Result<String, AuthError> {
    let now = Utc::now();
    let claims = SessionClaims {
        sub: user.id,
        username: user.username.clone(),
        display_name: user.display_name.clone(),
        iat: now.timestamp(),
        exp: (now + Duration::hours(SESSION_TTL_HOURS)).timestamp(),
    };
    encode(&Header::default(), &claims, &config.encoding_key())
        .map_err(|err| AuthError::Sign(err.to_string()))
}

pub fn verify_token(token: &str, config: &SessionConfig) -> Result<SessionClaims, AuthError> {
    let claims = decode::<SessionClaims>(token, &config.decoding_key(), &Validation::default())
        .map_err(|_| AuthError::InvalidToken)?
        .claims;

    if claims.exp < Utc::now().timestamp() {
        return Err(AuthError::InvalidToken);
    }
    Ok(claims)
}

pub fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

pub fn removal_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .build()
}

async fn claims_from_parts(parts: &mut Parts) -> Result<SessionClaims, AuthError> {
    let config = parts
        .extensions
        .get::<SessionConfig>()
        .cloned()
        .ok_or(AuthError::MissingSession)?;
    let cookies = parts
        .extract::<Cookies>()
        .await
        .map_err(|_| AuthError::MissingSession)?;
    let token = cookies
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .ok_or(AuthError::MissingSession)?;
    verify_token(&token, &config)
}

/// Authenticated CRM session for page routes. Rejection redirects to the
/// login screen.
#[derive(Debug, Clone)]
pub struct CrmSession(pub SessionClaims);

#[async_trait]
impl<S> FromRequestParts<S> for CrmSession
where
    S: Send + Sync,
{
    type Rejection = Redirect;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        claims_from_parts(parts)
            .await
            .map(CrmSession)
            .map_err(|_| Redirect::to("/crm/login"))
    }
}

/// Authenticated CRM session for JSON endpoints. Rejection is a 401 with the
/// upload envelope shape.
#[derive(Debug, Clone)]
pub struct CrmApiSession(pub SessionClaims);

#[async_trait]
impl<S> FromRequestParts<S> for CrmApiSession
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<serde_json::Value>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        claims_from_parts(parts).await.map(CrmApiSession).map_err(|_| {
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "success": false, "error": "No autorizado" })),
            )
        })
    }
}

/// Session that may or may not be present; never rejects. Used by routes
/// that only change behavior for logged-in visitors.
pub struct OptionalSession(pub Option<SessionClaims>);

#[async_trait]
impl<S> FromRequestParts<S> for OptionalSession
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(OptionalSession(claims_from_parts(parts).await.ok()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> CrmUserView {
        CrmUserView {
            id: 7,
            username: "admin".to_string(),
            display_name: "Administrador Principal".to_string(),
        }
    }

    #[test]
    fn issue_then_verify_round_trips_claims() {
        let config = SessionConfig::new("unit-test-secret");
        let token = issue_token(&sample_user(), &config).expect("token issues");
        let claims = verify_token(&token, &config).expect("token verifies");

        assert_eq!(claims.sub, 7);
        assert_eq!(claims.username, "admin");
        assert_eq!(claims.user(), sample_user());
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let config = SessionConfig::new("unit-test-secret");
        let other = SessionConfig::new("some-other-secret");
        let token = issue_token(&sample_user(), &config).expect("token issues");

        assert!(matches!(
            verify_token(&token, &other),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn tampered_token_is_rejected() {
        let config = SessionConfig::new("unit-test-secret");
        let mut token = issue_token(&sample_user(), &config).expect("token issues");
        token.push('x');

        assert!(verify_token(&token, &config).is_err());
    }

    #[test]
    fn session_cookie_is_http_only_and_scoped_to_root() {
        let cookie = session_cookie("token".to_string());
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.http_only(), Some(true));
    }
}
