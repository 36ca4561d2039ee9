use axum::{
    Json,
    extract::{Request, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use futures::future::BoxFuture;
use serde::Deserialize;
use serde_json::json;
use std::task::{Context, Poll};
use tower::{Layer, Service};
use tracing::{error, info, warn};

use crate::{error::ApiError, state::AppState};
use common::AuthenticatedUser;
use common::token::{hash_password, issue_token, verify_password, verify_token};
use data::user::{NewUser, ROLE_CUSTOMER};
use repos::user::UserRepo;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /auth/register. Always creates a customer; admins are provisioned
/// out of band.
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if body.name.trim().is_empty() || body.email.trim().is_empty() {
        return Err(ApiError::Validation("name and email are required".to_string()));
    }
    if body.password.len() < 8 {
        return Err(ApiError::Validation(
            "password must be at least 8 characters".to_string(),
        ));
    }

    let mut conn = state.repo.acquire().await?;

    if UserRepo::get_by_email(&mut *conn, &body.email).await?.is_some() {
        return Err(ApiError::Conflict("email already registered".to_string()));
    }

    let new_user = NewUser {
        name: body.name,
        email: body.email,
        password_hash: hash_password(&body.password)?,
        role: ROLE_CUSTOMER.to_string(),
    };

    let user_id = UserRepo::create(&mut *conn, new_user).await?;
    let user = UserRepo::get_by_id(&mut *conn, user_id)
        .await?
        .ok_or(ApiError::InternalFailure())?;

    info!("Registered user {}", user.id);
    Ok(Json(json!({ "message": "User registered", "user": user })))
}

/// POST /auth/login. Invalid email and invalid password are reported
/// identically.
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = state.repo.acquire().await?;

    let user = UserRepo::get_by_email(&mut *conn, &body.email)
        .await?
        .ok_or_else(|| ApiError::Validation("invalid credentials".to_string()))?;

    if !verify_password(&body.password, &user.password_hash) {
        warn!("Failed login attempt for user {}", user.id);
        return Err(ApiError::Validation("invalid credentials".to_string()));
    }

    let token = issue_token(
        &state.settings.auth.jwt_secret,
        user.id,
        &user.role,
        state.settings.auth.token_validity_in_minutes,
    )?;

    Ok(Json(json!({ "token": token, "user": user })))
}

#[derive(Clone, Copy)]
pub enum RequiredRole {
    Any,
    Admin,
}

fn extract_bearer<B>(request: &Request<B>) -> Option<String> {
    let auth_header = request.headers().get(header::AUTHORIZATION)?;
    let auth_value = auth_header.to_str().ok()?;
    auth_value.strip_prefix("Bearer ").map(|token| token.to_string())
}

fn reject(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(json!({
            "result": "failed",
            "error": message,
        })),
    )
        .into_response()
}

/// Bearer-token middleware. Verifies the JWT, reloads the user (a deleted
/// account invalidates outstanding tokens), checks the required role and
/// attaches an `AuthenticatedUser` extension for handlers downstream.
#[derive(Clone)]
pub struct AuthLayer {
    app_state: AppState,
    required_role: RequiredRole,
}

impl AuthLayer {
    pub fn new(app_state: AppState, required_role: RequiredRole) -> Self {
        Self {
            app_state,
            required_role,
        }
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthService {
            inner,
            app_state: self.app_state.clone(),
            required_role: self.required_role,
        }
    }
}

#[derive(Clone)]
pub struct AuthService<S> {
    inner: S,
    app_state: AppState,
    required_role: RequiredRole,
}

impl<S, B> Service<Request<B>> for AuthService<S>
where
    S: Service<Request<B>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request<B>) -> Self::Future {
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let required_role = self.required_role;
        let app_state = self.app_state.clone();

        Box::pin(async move {
            let token = match extract_bearer(&request) {
                Some(token) => token,
                None => {
                    return Ok(reject(StatusCode::UNAUTHORIZED, "missing bearer token"));
                }
            };

            let (user_id, _claims) =
                match verify_token(&app_state.settings.auth.jwt_secret, &token) {
                    Ok(decoded) => decoded,
                    Err(err) => {
                        warn!("Rejected bearer token: {}", err);
                        return Ok(reject(StatusCode::UNAUTHORIZED, "invalid or expired token"));
                    }
                };

            let mut conn = match app_state.repo.acquire().await {
                Ok(conn) => conn,
                Err(err) => {
                    error!("Failed to get database connection: {}", err);
                    return Ok(reject(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "internal server error",
                    ));
                }
            };

            let user = match UserRepo::get_by_id(&mut *conn, user_id).await {
                Ok(Some(user)) => user,
                Ok(None) => {
                    return Ok(reject(StatusCode::UNAUTHORIZED, "invalid or expired token"));
                }
                Err(err) => {
                    error!("Database error when retrieving user: {}", err);
                    return Ok(reject(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "internal server error",
                    ));
                }
            };

            if matches!(required_role, RequiredRole::Admin) && !user.is_admin() {
                return Ok(reject(StatusCode::FORBIDDEN, "admin access only"));
            }

            let is_admin = user.is_admin();
            let authenticated = AuthenticatedUser::new(user.id, user.email, is_admin);
            request.extensions_mut().insert(authenticated);
            inner.call(request).await
        })
    }
}
