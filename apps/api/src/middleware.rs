use std::str::FromStr;

use axum::extract::{Extension, Request, State};
use axum::middleware::Next;
use axum::response::Response;
use orgauthz_core::{ActorId, ActorIdentity, AppError};
use orgauthz_domain::ModuleAction;
use tracing::debug;

use crate::error::ApiResult;
use crate::state::AppState;

/// `Module.action` permission a route group demands.
///
/// Attached as a request extension and checked by [`require_permission`].
#[derive(Debug, Clone, Copy)]
pub struct RequiredPermission(&'static str);

impl RequiredPermission {
    pub const fn new(permission: &'static str) -> Self {
        Self(permission)
    }
}

/// Resolves the authenticated actor from the trusted identity header.
pub async fn require_actor(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let raw_value = request
        .headers()
        .get(state.actor_id_header.as_str())
        .ok_or_else(|| AppError::Unauthorized("actor identity required".to_owned()))?
        .to_str()
        .map_err(|_| AppError::Unauthorized("actor identity header is not text".to_owned()))?;

    let actor_id = raw_value
        .trim()
        .parse::<i64>()
        .ok()
        .and_then(|value| ActorId::new(value).ok())
        .ok_or_else(|| {
            AppError::Unauthorized(format!("actor identity '{raw_value}' is invalid"))
        })?;

    request
        .extensions_mut()
        .insert(ActorIdentity::new(actor_id));
    Ok(next.run(request).await)
}

/// Denies the request unless the actor holds the route's permission.
///
/// A malformed permission string is a server misconfiguration and answers 500.
pub async fn require_permission(
    State(state): State<AppState>,
    Extension(required): Extension<RequiredPermission>,
    Extension(actor): Extension<ActorIdentity>,
    request: Request,
    next: Next,
) -> ApiResult<Response> {
    let permission = ModuleAction::from_str(required.0)?;
    state
        .authorization_service
        .require_permission(actor.actor_id(), &permission)
        .await
        .inspect_err(|error| {
            debug!(
                actor_id = %actor.actor_id(),
                permission = required.0,
                %error,
                "route permission check rejected request"
            );
        })?;

    Ok(next.run(request).await)
}
