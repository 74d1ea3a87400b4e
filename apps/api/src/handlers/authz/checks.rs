use super::*;

pub async fn effective_permissions_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorIdentity>,
) -> ApiResult<Json<EffectivePermissionsResponse>> {
    let actor_id = actor.actor_id();
    let is_administrator = state.authorization_service.is_administrator(actor_id).await?;
    let permissions = state
        .authorization_service
        .effective_permissions(actor_id)
        .await?
        .into_iter()
        .collect();

    Ok(Json(EffectivePermissionsResponse {
        actor_id: actor_id.as_i64(),
        is_administrator,
        permissions,
    }))
}

pub async fn check_permission_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorIdentity>,
    Json(payload): Json<CheckPermissionRequest>,
) -> ApiResult<Json<CheckPermissionResponse>> {
    // Caller-supplied strings are input, not route configuration.
    let permission = ModuleAction::from_str(payload.permission.as_str()).map_err(|error| {
        AppError::Validation(format!("invalid permission '{}': {error}", payload.permission))
    })?;

    let allowed = state
        .authorization_service
        .has_permission(
            actor.actor_id(),
            permission.module_name(),
            permission.action(),
        )
        .await?;

    Ok(Json(CheckPermissionResponse {
        permission: permission.to_string(),
        allowed,
    }))
}

pub async fn data_access_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorIdentity>,
    Json(payload): Json<DataAccessRequest>,
) -> ApiResult<Json<DataAccessResponse>> {
    let target = DataTarget {
        actor_id: payload.target_actor_id.map(ActorId::new).transpose()?,
        organization_id: payload.target_organization_id.map(OrganizationId::new),
    };

    let allowed = state
        .authorization_service
        .can_access_data(actor.actor_id(), payload.module.as_str(), &target)
        .await?;

    Ok(Json(DataAccessResponse {
        module: payload.module,
        allowed,
    }))
}
