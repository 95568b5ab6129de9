use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use critique_core::auth;
use critique_model::User;

use crate::errors::AppError;
use crate::infra::app_state::AppState;

/// Requires a valid bearer token and stores the resolved [`User`] in the
/// request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_bearer_token(&request)
        .ok_or_else(|| AppError::unauthorized("authentication required"))?;
    let user = resolve_token(&state, &token)
        .await?
        .ok_or_else(|| AppError::unauthorized("invalid or expired token"))?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

async fn resolve_token(
    state: &AppState,
    token: &str,
) -> Result<Option<User>, AppError> {
    let hash = auth::hash_access_token(token);
    Ok(state.repos.access_tokens.find_user(&hash).await?)
}

fn extract_bearer_token(request: &Request) -> Option<String> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?;
    auth_header
        .strip_prefix("Bearer ")
        .map(|token| token.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn request_with_auth(value: &str) -> Request {
        Request::builder()
            .header(header::AUTHORIZATION, value)
            .body(Body::empty())
            .unwrap()
    }

    #[test]
    fn bearer_prefix_is_required() {
        assert_eq!(
            extract_bearer_token(&request_with_auth("Bearer abc")).as_deref(),
            Some("abc")
        );
        assert_eq!(extract_bearer_token(&request_with_auth("Basic abc")), None);
        assert_eq!(
            extract_bearer_token(&Request::builder().body(Body::empty()).unwrap()),
            None
        );
    }
}
