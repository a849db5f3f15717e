use axum::{
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::{
    AppState,
    error::AppError,
    models::CurrentUser,
    services::auth_service,
};

fn get_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    let raw = headers.get(header::COOKIE)?.to_str().ok()?;

    for part in raw.split(';') {
        let part = part.trim();
        let mut it = part.splitn(2, '=');
        let k = it.next()?.trim();
        let v = it.next()?.trim();
        if k == name {
            return Some(v.to_string());
        }
    }
    None
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
}

/// Puts `CurrentUser` into request extensions when a valid session is
/// presented (bearer header first, then cookie).
pub async fn inject_current_user(
    State(state): State<AppState>,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let token = bearer_token(req.headers())
        .or_else(|| get_cookie(req.headers(), &state.settings.jwt_cookie_name));

    if let Some(user_id) = token.and_then(|t| auth_service::verify_jwt(&state.settings, &t)) {
        match auth_service::find_user(&state, &user_id).await {
            Ok(Some(user)) => {
                req.extensions_mut().insert(CurrentUser::from(user));
            }
            Ok(None) => tracing::debug!(%user_id, "session for deleted user"),
            Err(e) => tracing::warn!(error = %e, "session lookup failed"),
        }
    }

    next.run(req).await
}

fn is_public_path(path: &str) -> bool {
    !path.starts_with("/api/")
        || path.starts_with("/api/auth/")
        || path.starts_with("/api/hardware/")
}

/// Owner API routes need a session; device and auth routes do not.
pub async fn require_auth(
    State(_state): State<AppState>,
    req: Request<axum::body::Body>,
    next: Next,
) -> Response {
    if is_public_path(req.uri().path()) {
        return next.run(req).await;
    }

    // inject_current_user already ran
    if req.extensions().get::<CurrentUser>().is_some() {
        return next.run(req).await;
    }

    AppError::auth_required().into_response()
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn cookie_is_found_among_others() {
        let mut h = HeaderMap::new();
        h.insert(header::COOKIE, HeaderValue::from_static("theme=dark; auth=abc.def; x=1"));
        assert_eq!(get_cookie(&h, "auth").as_deref(), Some("abc.def"));
        assert_eq!(get_cookie(&h, "missing"), None);
    }

    #[test]
    fn bearer_prefix_is_stripped() {
        let mut h = HeaderMap::new();
        h.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer tok"));
        assert_eq!(bearer_token(&h).as_deref(), Some("tok"));
    }

    #[test]
    fn device_and_auth_routes_are_public() {
        assert!(is_public_path("/api/hardware/dustbin-update"));
        assert!(is_public_path("/api/auth/login"));
        assert!(is_public_path("/health"));
        assert!(!is_public_path("/api/dustbins"));
        assert!(!is_public_path("/api/me"));
    }
}
