use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};

use crate::config::Config;
use crate::error::AppError;

/// Bearer-key guard for the admin surface. The key comes from
/// configuration; both `Bearer <key>` and the bare key are accepted.
pub async fn admin_auth(
    State(config): State<Config>,
    req: Request<Body>,
    next: Next<Body>,
) -> Result<Response, AppError> {
    let auth_header = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok());

    match auth_header {
        Some(auth)
            if auth == format!("Bearer {}", config.admin_api_key)
                || auth == config.admin_api_key =>
        {
            Ok(next.run(req).await)
        }
        _ => Err(AppError::Unauthorized(
            "admin API key required".to_string(),
        )),
    }
}
