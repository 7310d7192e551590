//! Authentication middleware
//!
//! Tokens are issued by the platform's auth provider; this service only
//! verifies them and extracts who is calling and in which role.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};
use shared::UserRole;
use uuid::Uuid;

use crate::error::AppError;
use crate::AppState;

/// Authenticated user information extracted from JWT
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: String,
    pub role: UserRole,
    /// Set for business owners
    pub business_id: Option<Uuid>,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// Admins manage every business; owners manage their own
    pub fn manages_business(&self, business_id: Uuid) -> bool {
        self.is_admin()
            || (self.role == UserRole::BusinessOwner && self.business_id == Some(business_id))
    }

    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::Forbidden("Administrator access required".to_string()))
        }
    }

    pub fn require_business(&self, business_id: Uuid) -> Result<(), AppError> {
        if self.manages_business(business_id) {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "You do not manage this business".to_string(),
            ))
        }
    }
}

/// JWT claims structure
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub role: String,
    pub business_id: Option<String>,
    pub exp: i64,
    pub iat: i64,
}

/// Validates the bearer token and stores an [`AuthUser`] in request extensions
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header.and_then(|h| h.strip_prefix("Bearer ")) {
        Some(token) => token,
        None => return unauthorized_response("Missing or invalid Authorization header"),
    };

    let claims = match decode_jwt(token, &state.config.jwt.secret) {
        Ok(claims) => claims,
        Err(msg) => return unauthorized_response(&msg),
    };

    let auth_user = match auth_user_from_claims(claims) {
        Ok(user) => user,
        Err(msg) => return unauthorized_response(msg),
    };

    request.extensions_mut().insert(auth_user);

    next.run(request).await
}

fn auth_user_from_claims(claims: Claims) -> Result<AuthUser, &'static str> {
    let user_id = Uuid::parse_str(&claims.sub).map_err(|_| "Invalid user ID in token")?;
    let role = UserRole::from_str(&claims.role).ok_or("Invalid role in token")?;
    let business_id = match claims.business_id.as_deref() {
        Some(id) => Some(Uuid::parse_str(id).map_err(|_| "Invalid business ID in token")?),
        None => None,
    };
    if role == UserRole::BusinessOwner && business_id.is_none() {
        return Err("Business owner token has no business");
    }

    Ok(AuthUser {
        user_id,
        email: claims.email,
        role,
        business_id,
    })
}

/// Decode and validate JWT token
fn decode_jwt(token: &str, secret: &str) -> Result<Claims, String> {
    use jsonwebtoken::{decode, DecodingKey, Validation};

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| format!("Invalid token: {}", e))
}

fn unauthorized_response(message: &str) -> Response {
    AppError::Unauthorized(message.to_string()).into_response()
}
