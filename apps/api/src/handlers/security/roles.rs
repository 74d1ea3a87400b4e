use super::*;

pub async fn save_module_permission_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorIdentity>,
    Path(role_id): Path<i64>,
    Json(payload): Json<SaveModulePermissionRequest>,
) -> ApiResult<Json<ModulePermissionResponse>> {
    let permission = state
        .role_admin_service
        .save_module_permission(
            &actor,
            SaveModulePermissionInput {
                role_id: RoleId::new(role_id),
                module_name: payload.module,
                actions: payload.actions,
                scope: payload.scope,
                hierarchy: payload.hierarchy,
            },
        )
        .await?;

    Ok(Json(ModulePermissionResponse::from(permission)))
}

pub async fn delete_module_permission_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorIdentity>,
    Path((role_id, module_name)): Path<(i64, String)>,
) -> ApiResult<StatusCode> {
    state
        .role_admin_service
        .delete_module_permission(&actor, RoleId::new(role_id), module_name.as_str())
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn set_role_active_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorIdentity>,
    Path(role_id): Path<i64>,
    Json(payload): Json<SetRoleActiveRequest>,
) -> ApiResult<Json<RoleResponse>> {
    let role = state
        .role_admin_service
        .set_role_active(&actor, RoleId::new(role_id), payload.is_active)
        .await?;

    Ok(Json(RoleResponse::from(role)))
}

pub async fn delete_role_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorIdentity>,
    Path(role_id): Path<i64>,
) -> ApiResult<StatusCode> {
    state
        .role_admin_service
        .delete_role(&actor, RoleId::new(role_id))
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
