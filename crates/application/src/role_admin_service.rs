use std::sync::Arc;

use orgauthz_core::{ActorId, ActorIdentity, AppResult};
use orgauthz_domain::{Action, EmployeeRole, ModuleAction, ModulePermission, Role, RoleId};
use tracing::info;

use crate::{AssignRoleInput, AuthorizationService, RoleAdminRepository, SaveModulePermissionInput};

#[cfg(test)]
mod tests;

/// Module whose grants gate role administration.
pub const ROLE_ADMIN_MODULE: &str = "Role";

/// Mutates roles, grants, and assignments, keeping cached permission sets
/// coherent with the records.
#[derive(Clone)]
pub struct RoleAdminService {
    authorization_service: AuthorizationService,
    repository: Arc<dyn RoleAdminRepository>,
}

impl RoleAdminService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        authorization_service: AuthorizationService,
        repository: Arc<dyn RoleAdminRepository>,
    ) -> Self {
        Self {
            authorization_service,
            repository,
        }
    }

    /// Replaces the employee's active role assignment.
    pub async fn assign_role(
        &self,
        actor: &ActorIdentity,
        input: AssignRoleInput,
    ) -> AppResult<EmployeeRole> {
        self.require_role_permission(actor, Action::Create).await?;

        let assignment = self
            .repository
            .replace_active_role_assignment(input)
            .await?;
        self.authorization_service
            .invalidate_cache(assignment.employee_id())
            .await?;

        info!(
            actor_id = %actor.actor_id(),
            employee_id = %assignment.employee_id(),
            role_id = %assignment.role_id(),
            "role assigned"
        );
        Ok(assignment)
    }

    /// Deactivates every active role assignment of an employee.
    pub async fn revoke_role_assignment(
        &self,
        actor: &ActorIdentity,
        employee_id: ActorId,
    ) -> AppResult<u64> {
        self.require_role_permission(actor, Action::Delete).await?;

        let revoked = self
            .repository
            .deactivate_role_assignments(employee_id)
            .await?;
        self.authorization_service
            .invalidate_cache(employee_id)
            .await?;

        info!(
            actor_id = %actor.actor_id(),
            employee_id = %employee_id,
            revoked,
            "role assignments revoked"
        );
        Ok(revoked)
    }

    /// Saves a role's grant on one module, replacing any earlier grant.
    pub async fn save_module_permission(
        &self,
        actor: &ActorIdentity,
        input: SaveModulePermissionInput,
    ) -> AppResult<ModulePermission> {
        self.require_role_permission(actor, Action::Edit).await?;

        let role_id = input.role_id;
        let module_name = input.module_name.clone();
        let permission = self.repository.upsert_module_permission(input).await?;
        let affected = self.invalidate_assignees(role_id).await?;

        info!(
            actor_id = %actor.actor_id(),
            role_id = %role_id,
            module = module_name.as_str(),
            affected,
            "module permission saved"
        );
        Ok(permission)
    }

    /// Soft-deletes a role's grant on one module.
    pub async fn delete_module_permission(
        &self,
        actor: &ActorIdentity,
        role_id: RoleId,
        module_name: &str,
    ) -> AppResult<()> {
        self.require_role_permission(actor, Action::Delete).await?;

        self.repository
            .soft_delete_module_permission(role_id, module_name)
            .await?;
        let affected = self.invalidate_assignees(role_id).await?;

        info!(
            actor_id = %actor.actor_id(),
            role_id = %role_id,
            module = module_name,
            affected,
            "module permission deleted"
        );
        Ok(())
    }

    /// Switches a role on or off.
    pub async fn set_role_active(
        &self,
        actor: &ActorIdentity,
        role_id: RoleId,
        is_active: bool,
    ) -> AppResult<Role> {
        self.require_role_permission(actor, Action::Edit).await?;

        let role = self.repository.set_role_active(role_id, is_active).await?;
        let affected = self.invalidate_assignees(role_id).await?;

        info!(
            actor_id = %actor.actor_id(),
            role_id = %role_id,
            is_active,
            affected,
            "role activation changed"
        );
        Ok(role)
    }

    /// Soft-deletes a role. Its holders lose every grant.
    pub async fn delete_role(&self, actor: &ActorIdentity, role_id: RoleId) -> AppResult<()> {
        self.require_role_permission(actor, Action::Delete).await?;

        self.repository.soft_delete_role(role_id).await?;
        let affected = self.invalidate_assignees(role_id).await?;

        info!(
            actor_id = %actor.actor_id(),
            role_id = %role_id,
            affected,
            "role deleted"
        );
        Ok(())
    }

    async fn require_role_permission(&self, actor: &ActorIdentity, action: Action) -> AppResult<()> {
        let permission = ModuleAction::new(ROLE_ADMIN_MODULE, action)?;
        self.authorization_service
            .require_permission(actor.actor_id(), &permission)
            .await
    }

    async fn invalidate_assignees(&self, role_id: RoleId) -> AppResult<usize> {
        let assignees = self.repository.list_active_assignees(role_id).await?;
        for employee_id in &assignees {
            self.authorization_service
                .invalidate_cache(*employee_id)
                .await?;
        }

        Ok(assignees.len())
    }
}
