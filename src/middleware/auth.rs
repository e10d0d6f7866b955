use crate::models::auth::{Claims, ErrorResponse};
use crate::AppState;
use axum::{
    extract::{Extension, Request},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use std::sync::Arc;

pub fn issue_token(claims: &Claims, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(token_data.claims)
}

fn unauthorized(message: &str) -> (StatusCode, Json<ErrorResponse>) {
    (StatusCode::UNAUTHORIZED, Json(ErrorResponse::new(message)))
}

/// Verifies the `Authorization: Bearer <token>` header and stores the
/// decoded [`Claims`] in the request extensions.
pub async fn auth_middleware(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, impl IntoResponse> {
    let Some(secret) = state.settings().jwt_secret.as_deref() else {
        tracing::warn!("Admin request rejected: JWT_SECRET is not configured");
        return Err(unauthorized("Admin access is not configured"));
    };

    let auth_str = match headers.get(header::AUTHORIZATION) {
        Some(value) => match value.to_str() {
            Ok(s) => s,
            Err(_) => return Err(unauthorized("Invalid Authorization header format")),
        },
        None => return Err(unauthorized("Missing Authorization header")),
    };

    let Some(token) = auth_str.strip_prefix("Bearer ") else {
        return Err(unauthorized(
            "Invalid Authorization header format. Expected 'Bearer <token>'",
        ));
    };

    let claims = match verify_token(token.trim(), secret) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::warn!("JWT verification failed: {}", e);
            return Err(unauthorized("Invalid or expired token"));
        }
    };

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issued_token_verifies_with_same_secret() {
        let claims = Claims::staff("ops", chrono::Duration::hours(1)).unwrap();
        let token = issue_token(&claims, "secret-one").unwrap();

        let decoded = verify_token(&token, "secret-one").unwrap();
        assert_eq!(decoded.sub, "ops");
        assert!(decoded.is_admin());

        assert!(verify_token(&token, "secret-two").is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let claims = Claims::staff("ops", chrono::Duration::hours(-2)).unwrap();
        let token = issue_token(&claims, "secret").unwrap();
        assert!(verify_token(&token, "secret").is_err());
    }
}
