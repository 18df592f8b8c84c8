use std::collections::HashMap;

use axum::body::Body;
use axum::extract::Path;
use axum::extract::Query;
use axum::extract::Request;
use axum::extract::State;
use axum::middleware::Next;
use axum::response::Response;
use serde_json::Value;

use crate::domain::access::models::Policy;
use crate::domain::access::models::PolicySet;
use crate::domain::access::models::ResourceKind;
use crate::domain::access::models::ResourceRef;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::middleware::bearer_token;
use crate::inbound::http::middleware::resolve_identity;
use crate::inbound::http::router::AppState;

const MAX_GUARDED_BODY_BYTES: usize = 64 * 1024;

/// Per-route access declaration: the resource kind the route targets and
/// the policies that are each sufficient to reach the handler.
#[derive(Clone)]
pub struct PolicyGuard {
    state: AppState,
    kind: ResourceKind,
    policies: PolicySet,
}

/// Declare the policies for a route.
///
/// ```ignore
/// .route(
///     "/api/courses/:id",
///     patch(update_course).route_layer(middleware::from_fn_with_state(
///         require(&state, ResourceKind::Course, &[Policy::Own, Policy::Admin]),
///         enforce_policies,
///     )),
/// )
/// ```
pub fn require(state: &AppState, kind: ResourceKind, policies: &[Policy]) -> PolicyGuard {
    PolicyGuard {
        state: state.clone(),
        kind,
        policies: PolicySet::new(policies),
    }
}

/// Middleware enforcing a [`PolicyGuard`].
///
/// Authenticates when a bearer token is present (a bad token is 401 even
/// if a policy would not need it), extracts the resource id, and asks the
/// access resolver. On success the caller's identity, if any, is placed in
/// the request extensions.
pub async fn enforce_policies(
    State(guard): State<PolicyGuard>,
    path: Option<Path<HashMap<String, String>>>,
    query: Option<Query<HashMap<String, String>>>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let field = guard.kind.id_field();

    let caller = if guard.policies.is_public() {
        None
    } else {
        match bearer_token(req.headers())? {
            Some(token) => Some(resolve_identity(&guard.state, token).await?),
            None => None,
        }
    };

    let mut resource_id = path
        .as_ref()
        .and_then(|Path(params)| first_present(params, &["id", field]));

    let req = if resource_id.is_none() && !guard.policies.is_public() {
        let (parts, body) = req.into_parts();
        let bytes = axum::body::to_bytes(body, MAX_GUARDED_BODY_BYTES)
            .await
            .map_err(|e| ApiError::BadRequest(format!("Unreadable request body: {}", e)))?;

        resource_id = body_field(&bytes, field);
        Request::from_parts(parts, Body::from(bytes))
    } else {
        req
    };

    if resource_id.is_none() {
        resource_id = query
            .as_ref()
            .and_then(|Query(params)| first_present(params, &[field]));
    }

    let resource = resource_id.map(|id| ResourceRef::new(guard.kind, id));

    let grant = guard
        .state
        .access_resolver
        .resolve(caller.as_ref(), resource.as_ref(), &guard.policies)
        .await?;
    tracing::debug!(grant = ?grant, policies = %guard.policies, "Access granted");

    let mut req = req;
    if let Some(caller) = caller {
        req.extensions_mut().insert(caller);
    }

    Ok(next.run(req).await)
}

fn first_present(params: &HashMap<String, String>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| params.get(*key))
        .find(|value| !value.trim().is_empty())
        .cloned()
}

fn body_field(bytes: &[u8], field: &str) -> Option<String> {
    if bytes.is_empty() {
        return None;
    }

    match serde_json::from_slice::<Value>(bytes).ok()?.get(field)? {
        Value::String(value) if !value.trim().is_empty() => Some(value.clone()),
        Value::Number(value) => Some(value.to_string()),
        _ => None,
    }
}
