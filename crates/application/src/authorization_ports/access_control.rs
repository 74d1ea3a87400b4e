use async_trait::async_trait;

use orgauthz_core::{ActorId, AppResult};
use orgauthz_domain::{ActorRecord, EmployeeRole, Module, ModulePermission, Role, RoleId};

/// Read-only port over the actor, role, module, and permission records.
///
/// Implementations return raw rows including inactive and soft-deleted ones;
/// relevance filtering happens in [`crate::PermissionRepository`].
#[async_trait]
pub trait AccessControlRepository: Send + Sync {
    /// Finds the actor record (user joined to employee) for an identifier.
    async fn find_actor(&self, actor_id: ActorId) -> AppResult<Option<ActorRecord>>;

    /// Lists every role assignment row for an employee.
    async fn list_role_assignments(&self, employee_id: ActorId) -> AppResult<Vec<EmployeeRole>>;

    /// Finds a role by identifier.
    async fn find_role(&self, role_id: RoleId) -> AppResult<Option<Role>>;

    /// Lists every permission row owned by a role.
    async fn list_role_permissions(&self, role_id: RoleId) -> AppResult<Vec<ModulePermission>>;

    /// Lists every module.
    async fn list_modules(&self) -> AppResult<Vec<Module>>;
}
