use async_trait::async_trait;

use orgauthz_core::{ActorId, AppResult};
use orgauthz_domain::{
    ActionFlags, DataScope, EmployeeRole, HierarchyAccess, ModulePermission, OrganizationId,
    PositionId, Role, RoleId,
};

/// Input payload for (re)assigning an employee's role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignRoleInput {
    /// Employee receiving the role.
    pub employee_id: ActorId,
    /// Role to assign.
    pub role_id: RoleId,
    /// Optional organization narrowing.
    pub organization_id: Option<OrganizationId>,
    /// Optional position narrowing.
    pub position_id: Option<PositionId>,
}

/// Input payload for saving a role's grant on one module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveModulePermissionInput {
    /// Owning role.
    pub role_id: RoleId,
    /// Target module name.
    pub module_name: String,
    /// CRUD flags.
    pub actions: ActionFlags,
    /// Data scope.
    pub scope: DataScope,
    /// Hierarchical access flags.
    pub hierarchy: HierarchyAccess,
}

/// Write port used by role administration.
#[async_trait]
pub trait RoleAdminRepository: Send + Sync {
    /// Deactivates the employee's active assignments and inserts the new one
    /// inside a single transaction.
    async fn replace_active_role_assignment(
        &self,
        input: AssignRoleInput,
    ) -> AppResult<EmployeeRole>;

    /// Deactivates every active assignment of an employee. Returns the number
    /// of rows changed.
    async fn deactivate_role_assignments(&self, employee_id: ActorId) -> AppResult<u64>;

    /// Inserts or replaces the single effective permission of a role on a module.
    async fn upsert_module_permission(
        &self,
        input: SaveModulePermissionInput,
    ) -> AppResult<ModulePermission>;

    /// Soft-deletes the role's permission on a module.
    async fn soft_delete_module_permission(
        &self,
        role_id: RoleId,
        module_name: &str,
    ) -> AppResult<()>;

    /// Switches a role on or off.
    async fn set_role_active(&self, role_id: RoleId, is_active: bool) -> AppResult<Role>;

    /// Soft-deletes a role.
    async fn soft_delete_role(&self, role_id: RoleId) -> AppResult<()>;

    /// Lists employees holding an active, non-deleted assignment of the role.
    async fn list_active_assignees(&self, role_id: RoleId) -> AppResult<Vec<ActorId>>;
}
