use axum::http::StatusCode;
use axum::Extension;
use serde::Serialize;

use crate::domain::identity::models::AuthenticatedIdentity;
use crate::domain::identity::models::Role;
use crate::inbound::http::handlers::ApiSuccess;

/// Reaching this handler already proves the token is valid.
pub async fn check(
    Extension(caller): Extension<AuthenticatedIdentity>,
) -> ApiSuccess<CheckResponseData> {
    ApiSuccess::new(
        StatusCode::OK,
        CheckResponseData {
            authenticated: true,
            user_id: caller.user_id.to_string(),
            role: caller.role,
        },
    )
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckResponseData {
    pub authenticated: bool,
    pub user_id: String,
    pub role: Role,
}
