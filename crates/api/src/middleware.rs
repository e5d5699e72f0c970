use axum::{
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};

use campay_auth::{AuthContext, Role};
use campay_core::UserId;

/// Derive the caller identity from gateway headers.
///
/// JWT issuance/validation is the upstream gateway's job; by the time a
/// request reaches this service the identity headers are trusted. Requests
/// without a user id are rejected outright.
pub async fn context_middleware(
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let ctx = extract_context(req.headers())?;
    req.extensions_mut().insert(ctx);
    Ok(next.run(req).await)
}

fn extract_context(headers: &HeaderMap) -> Result<AuthContext, StatusCode> {
    let user_id = headers
        .get("x-user-id")
        .and_then(|v| v.to_str().ok())
        .ok_or(StatusCode::UNAUTHORIZED)?
        .parse::<UserId>()
        .map_err(|_| StatusCode::UNAUTHORIZED)?;

    let role = match headers.get("x-user-role").and_then(|v| v.to_str().ok()) {
        Some(raw) => raw.parse::<Role>().map_err(|_| StatusCode::UNAUTHORIZED)?,
        None => Role::Member,
    };

    Ok(AuthContext::new(user_id, role))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_user_id_is_unauthorized() {
        let headers = HeaderMap::new();
        assert_eq!(extract_context(&headers), Err(StatusCode::UNAUTHORIZED));
    }

    #[test]
    fn role_defaults_to_member() {
        let mut headers = HeaderMap::new();
        headers.insert("x-user-id", "42".parse().unwrap());
        let ctx = extract_context(&headers).unwrap();
        assert_eq!(ctx.user_id(), UserId::new(42));
        assert_eq!(ctx.role(), Role::Member);
    }

    #[test]
    fn admin_role_header_is_honored() {
        let mut headers = HeaderMap::new();
        headers.insert("x-user-id", "1".parse().unwrap());
        headers.insert("x-user-role", "admin".parse().unwrap());
        assert!(extract_context(&headers).unwrap().is_admin());
    }
}
