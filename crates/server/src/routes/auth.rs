use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use sea_orm::EntityTrait;
use serde::Serialize;
use uuid::Uuid;

use models::user;
use service::auth::domain::{LoginInput, RegisterInput};
use service::auth::repo::seaorm::SeaOrmAuthRepository;
use service::auth::service::{AuthConfig, AuthService};

use crate::errors::JsonApiError;
use crate::session::{CurrentUser, ServerState, AUTH_COOKIE};

#[derive(Serialize)]
pub struct RegisterOutput {
    pub user_id: Uuid,
}

#[derive(Serialize)]
pub struct MeOutput {
    pub user_id: Uuid,
    pub email: String,
    pub name: String,
    pub image: Option<String>,
}

fn auth_service(state: &ServerState) -> AuthService<SeaOrmAuthRepository> {
    let repo = Arc::new(SeaOrmAuthRepository { db: state.db.clone() });
    AuthService::new(
        repo,
        AuthConfig {
            jwt_secret: Some(state.auth.jwt_secret.clone()),
            password_algorithm: "argon2".into(),
        },
    )
}

fn session_cookie(token: String) -> Cookie<'static> {
    let mut cookie = Cookie::new(AUTH_COOKIE, token);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_secure(false);
    cookie.set_same_site(SameSite::Lax);
    cookie
}

#[utoipa::path(post, path = "/auth/register", tag = "auth", request_body = crate::openapi::RegisterRequest, responses((status = 200, description = "Registered"), (status = 400, description = "Bad Request"), (status = 409, description = "Conflict")))]
pub async fn register(
    State(state): State<ServerState>,
    Json(input): Json<RegisterInput>,
) -> Result<Json<RegisterOutput>, JsonApiError> {
    let created = auth_service(&state).register(input).await?;
    Ok(Json(RegisterOutput { user_id: created.id }))
}

#[utoipa::path(post, path = "/auth/login", tag = "auth", request_body = crate::openapi::LoginRequest, responses((status = 200, description = "Logged in, session cookie set"), (status = 401, description = "Unauthorized")))]
pub async fn login(
    State(state): State<ServerState>,
    jar: CookieJar,
    Json(input): Json<LoginInput>,
) -> Result<(CookieJar, Json<MeOutput>), JsonApiError> {
    let session = auth_service(&state).login(input).await?;
    let user = session.user;
    let token = session.token.ok_or_else(|| {
        JsonApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "token generation failed")
    })?;
    let jar = jar.add(session_cookie(token));
    let me = MeOutput { user_id: user.id, email: user.email, name: user.name, image: user.image };
    Ok((jar, Json(me)))
}

pub async fn logout(jar: CookieJar) -> (CookieJar, StatusCode) {
    let jar = jar.remove(Cookie::from(AUTH_COOKIE));
    (jar, StatusCode::NO_CONTENT)
}

pub async fn me(
    State(state): State<ServerState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<MeOutput>, JsonApiError> {
    let found = user::Entity::find_by_id(user_id)
        .one(&state.db)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "user lookup failed");
            JsonApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
        })?
        .ok_or_else(|| JsonApiError::unauthorized("unknown user"))?;
    Ok(Json(MeOutput {
        user_id: found.id,
        email: found.email,
        name: found.name,
        image: found.image,
    }))
}
