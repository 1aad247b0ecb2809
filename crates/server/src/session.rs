use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::cookie::CookieJar;
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use service::auth::service::decode_token;

use crate::errors::JsonApiError;

/// Cookie carrying the session token.
pub const AUTH_COOKIE: &str = "auth_token";

#[derive(Clone)]
pub struct ServerAuthConfig {
    pub jwt_secret: String,
}

#[derive(Clone)]
pub struct ServerState {
    pub db: DatabaseConnection,
    pub auth: ServerAuthConfig,
}

/// The authenticated caller, established from the session cookie.
///
/// Handlers that take this extractor are protected: a missing or invalid
/// token rejects with 401 before the handler body runs.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser(pub Uuid);

#[async_trait]
impl FromRequestParts<ServerState> for CurrentUser {
    type Rejection = JsonApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar
            .get(AUTH_COOKIE)
            .ok_or_else(|| JsonApiError::unauthorized("authentication required"))?;
        let uid = decode_token(&state.auth.jwt_secret, token.value())
            .map_err(|_| JsonApiError::unauthorized("invalid or expired session"))?;
        Ok(CurrentUser(uid))
    }
}
