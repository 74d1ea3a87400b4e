use chrono::{DateTime, Utc};
use orgauthz_domain::{ActionFlags, DataScope, EmployeeRole, HierarchyAccess, ModulePermission, Role};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct EffectivePermissionsResponse {
    pub actor_id: i64,
    pub is_administrator: bool,
    pub permissions: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct CheckPermissionRequest {
    pub permission: String,
}

#[derive(Debug, Serialize)]
pub struct CheckPermissionResponse {
    pub permission: String,
    pub allowed: bool,
}

#[derive(Debug, Deserialize)]
pub struct DataAccessRequest {
    pub module: String,
    pub target_actor_id: Option<i64>,
    pub target_organization_id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct DataAccessResponse {
    pub module: String,
    pub allowed: bool,
}

#[derive(Debug, Deserialize)]
pub struct InvalidateCacheRequest {
    pub actor_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct AssignRoleRequest {
    pub employee_id: i64,
    pub role_id: i64,
    pub organization_id: Option<i64>,
    pub position_id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct RoleAssignmentResponse {
    pub assignment_id: i64,
    pub employee_id: i64,
    pub role_id: i64,
    pub organization_id: Option<i64>,
    pub position_id: Option<i64>,
    pub assigned_at: DateTime<Utc>,
}

impl From<EmployeeRole> for RoleAssignmentResponse {
    fn from(value: EmployeeRole) -> Self {
        Self {
            assignment_id: value.assignment_id().as_i64(),
            employee_id: value.employee_id().as_i64(),
            role_id: value.role_id().as_i64(),
            organization_id: value.organization_id().map(|id| id.as_i64()),
            position_id: value.position_id().map(|id| id.as_i64()),
            assigned_at: value.assigned_at(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RevokedAssignmentsResponse {
    pub revoked: u64,
}

#[derive(Debug, Deserialize)]
pub struct SaveModulePermissionRequest {
    pub module: String,
    #[serde(default)]
    pub actions: ActionFlags,
    pub scope: DataScope,
    #[serde(default)]
    pub hierarchy: HierarchyAccess,
}

#[derive(Debug, Serialize)]
pub struct ModulePermissionResponse {
    pub permission_id: i64,
    pub role_id: i64,
    pub module_id: i64,
    pub actions: ActionFlags,
    pub scope: DataScope,
    pub hierarchy: HierarchyAccess,
}

impl From<ModulePermission> for ModulePermissionResponse {
    fn from(value: ModulePermission) -> Self {
        Self {
            permission_id: value.permission_id().as_i64(),
            role_id: value.role_id().as_i64(),
            module_id: value.module_id().as_i64(),
            actions: value.actions(),
            scope: value.scope(),
            hierarchy: value.hierarchy(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SetRoleActiveRequest {
    pub is_active: bool,
}

#[derive(Debug, Serialize)]
pub struct RoleResponse {
    pub role_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub is_deleted: bool,
}

impl From<Role> for RoleResponse {
    fn from(value: Role) -> Self {
        let status = value.status();
        Self {
            role_id: value.role_id().as_i64(),
            name: value.name().to_owned(),
            description: value.description().map(str::to_owned),
            is_active: status.is_active,
            is_deleted: status.is_deleted,
        }
    }
}
