use chrono::Utc;
use orgauthz_domain::{ModuleId, PermissionId, RoleAssignmentId};

use super::*;

impl InMemoryAccessControlStore {
    async fn require_live_role(&self, role_id: RoleId) -> AppResult<Role> {
        match self.roles.read().await.get(&role_id) {
            Some(role) if !role.status().is_deleted => Ok(role.clone()),
            _ => Err(AppError::NotFound(format!("role '{role_id}' was not found"))),
        }
    }

    async fn require_employee(&self, employee_id: ActorId) -> AppResult<()> {
        if self.actors.read().await.contains_key(&employee_id) {
            return Ok(());
        }

        Err(AppError::NotFound(format!(
            "employee '{employee_id}' was not found"
        )))
    }
}

#[async_trait]
impl RoleAdminRepository for InMemoryAccessControlStore {
    async fn replace_active_role_assignment(
        &self,
        input: AssignRoleInput,
    ) -> AppResult<EmployeeRole> {
        self.require_employee(input.employee_id).await?;
        self.require_live_role(input.role_id).await?;

        let assignment = EmployeeRole::new(
            RoleAssignmentId::new(self.next_record_id()),
            input.employee_id,
            input.role_id,
            input.organization_id,
            input.position_id,
            Utc::now(),
            RecordStatus::EFFECTIVE,
        );

        let mut assignments = self.role_assignments.write().await;
        for existing in assignments.iter_mut().filter(|existing| {
            existing.employee_id() == input.employee_id && existing.status().is_effective()
        }) {
            *existing = existing.clone().with_status(DEACTIVATED);
        }
        assignments.push(assignment.clone());

        Ok(assignment)
    }

    async fn deactivate_role_assignments(&self, employee_id: ActorId) -> AppResult<u64> {
        let mut assignments = self.role_assignments.write().await;
        let mut changed = 0;
        for existing in assignments.iter_mut().filter(|existing| {
            existing.employee_id() == employee_id && existing.status().is_effective()
        }) {
            *existing = existing.clone().with_status(DEACTIVATED);
            changed += 1;
        }

        Ok(changed)
    }

    async fn upsert_module_permission(
        &self,
        input: SaveModulePermissionInput,
    ) -> AppResult<ModulePermission> {
        self.require_live_role(input.role_id).await?;
        let module_id: ModuleId = self
            .module_by_name(input.module_name.as_str())
            .await?
            .module_id();

        let mut permissions = self.permissions.write().await;
        for existing in permissions.iter_mut().filter(|existing| {
            existing.role_id() == input.role_id
                && existing.module_id() == module_id
                && !existing.status().is_deleted
        }) {
            *existing = existing.clone().with_status(SOFT_DELETED);
        }

        let permission = ModulePermission::new(
            PermissionId::new(self.next_record_id()),
            input.role_id,
            module_id,
            input.actions,
            input.scope,
            input.hierarchy,
            RecordStatus::EFFECTIVE,
        );
        permissions.push(permission.clone());

        Ok(permission)
    }

    async fn soft_delete_module_permission(
        &self,
        role_id: RoleId,
        module_name: &str,
    ) -> AppResult<()> {
        let module_id = self.module_by_name(module_name).await?.module_id();

        let mut permissions = self.permissions.write().await;
        let mut deleted = false;
        for existing in permissions.iter_mut().filter(|existing| {
            existing.role_id() == role_id
                && existing.module_id() == module_id
                && !existing.status().is_deleted
        }) {
            *existing = existing.clone().with_status(SOFT_DELETED);
            deleted = true;
        }

        if !deleted {
            return Err(AppError::NotFound(format!(
                "role '{role_id}' has no permission on module '{module_name}'"
            )));
        }

        Ok(())
    }

    async fn set_role_active(&self, role_id: RoleId, is_active: bool) -> AppResult<Role> {
        let mut roles = self.roles.write().await;
        let Some(role) = roles
            .get_mut(&role_id)
            .filter(|role| !role.status().is_deleted)
        else {
            return Err(AppError::NotFound(format!("role '{role_id}' was not found")));
        };

        *role = role.clone().with_status(RecordStatus {
            is_active,
            is_deleted: false,
        });

        Ok(role.clone())
    }

    async fn soft_delete_role(&self, role_id: RoleId) -> AppResult<()> {
        let mut roles = self.roles.write().await;
        let Some(role) = roles
            .get_mut(&role_id)
            .filter(|role| !role.status().is_deleted)
        else {
            return Err(AppError::NotFound(format!("role '{role_id}' was not found")));
        };

        *role = role.clone().with_status(SOFT_DELETED);
        Ok(())
    }

    async fn list_active_assignees(&self, role_id: RoleId) -> AppResult<Vec<ActorId>> {
        let mut assignees: Vec<ActorId> = self
            .role_assignments
            .read()
            .await
            .iter()
            .filter(|assignment| {
                assignment.role_id() == role_id && assignment.status().is_effective()
            })
            .map(EmployeeRole::employee_id)
            .collect();
        assignees.sort();
        assignees.dedup();

        Ok(assignees)
    }
}
