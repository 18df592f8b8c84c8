use axum::extract::Request;
use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;

use crate::domain::identity::models::AuthenticatedIdentity;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::router::AppState;

/// Middleware that resolves the bearer access token into an
/// [`AuthenticatedIdentity`] request extension.
///
/// Signature, expiry, token kind, revocation and the account's active flag
/// are all checked; every failure is the same 401.
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(req.headers())?
        .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".to_string()))?;

    let identity = resolve_identity(&state, token).await?;
    req.extensions_mut().insert(identity);

    Ok(next.run(req).await)
}

pub(crate) async fn resolve_identity(
    state: &AppState,
    token: &str,
) -> Result<AuthenticatedIdentity, ApiError> {
    state
        .session_service
        .authenticate(token)
        .await
        .map_err(ApiError::from)
}

/// Bearer token from the Authorization header, if one was sent.
///
/// # Errors
/// * `Unauthorized` - Header present but not `Bearer <token>`
pub(crate) fn bearer_token(headers: &HeaderMap) -> Result<Option<&str>, ApiError> {
    let Some(header) = headers.get(AUTHORIZATION) else {
        return Ok(None);
    };

    let value = header
        .to_str()
        .map_err(|_| ApiError::Unauthorized("Invalid Authorization header".to_string()))?;

    match value.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(Some(token.trim())),
        _ => Err(ApiError::Unauthorized(
            "Invalid Authorization header format. Expected: Bearer <token>".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn test_bearer_token_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), Ok(None));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(bearer_token(&headers), Ok(Some("abc.def.ghi")));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcg=="));
        assert!(matches!(
            bearer_token(&headers),
            Err(ApiError::Unauthorized(_))
        ));
    }
}
