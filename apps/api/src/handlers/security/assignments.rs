use super::*;

pub async fn assign_role_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorIdentity>,
    Json(payload): Json<AssignRoleRequest>,
) -> ApiResult<Json<RoleAssignmentResponse>> {
    let assignment = state
        .role_admin_service
        .assign_role(
            &actor,
            AssignRoleInput {
                employee_id: ActorId::new(payload.employee_id)?,
                role_id: RoleId::new(payload.role_id),
                organization_id: payload.organization_id.map(OrganizationId::new),
                position_id: payload.position_id.map(PositionId::new),
            },
        )
        .await?;

    Ok(Json(RoleAssignmentResponse::from(assignment)))
}

pub async fn revoke_role_assignments_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorIdentity>,
    Path(employee_id): Path<i64>,
) -> ApiResult<Json<RevokedAssignmentsResponse>> {
    let revoked = state
        .role_admin_service
        .revoke_role_assignment(&actor, ActorId::new(employee_id)?)
        .await?;

    Ok(Json(RevokedAssignmentsResponse { revoked }))
}
