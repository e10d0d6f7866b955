use crate::models::auth::{Claims, ErrorResponse};
use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Json, Response},
};

/// Runs after [`super::auth::auth_middleware`]; lets staff and superusers through.
pub async fn admin_middleware(
    request: Request,
    next: Next,
) -> Result<Response, impl IntoResponse> {
    match request.extensions().get::<Claims>() {
        Some(claims) if claims.is_admin() => Ok(next.run(request).await),
        Some(claims) => {
            tracing::warn!(sub = %claims.sub, "Admin access denied");
            Err((
                StatusCode::FORBIDDEN,
                Json(ErrorResponse::new(
                    "Admin access required. You must be staff or superuser.",
                )),
            ))
        }
        None => Err((
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse::new("Authentication required for admin access.")),
        )),
    }
}
