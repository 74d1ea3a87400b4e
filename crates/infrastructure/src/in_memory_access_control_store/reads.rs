use super::*;

#[async_trait]
impl AccessControlRepository for InMemoryAccessControlStore {
    async fn find_actor(&self, actor_id: ActorId) -> AppResult<Option<ActorRecord>> {
        Ok(self.actors.read().await.get(&actor_id).copied())
    }

    async fn list_role_assignments(&self, employee_id: ActorId) -> AppResult<Vec<EmployeeRole>> {
        Ok(self
            .role_assignments
            .read()
            .await
            .iter()
            .filter(|assignment| assignment.employee_id() == employee_id)
            .cloned()
            .collect())
    }

    async fn find_role(&self, role_id: RoleId) -> AppResult<Option<Role>> {
        Ok(self.roles.read().await.get(&role_id).cloned())
    }

    async fn list_role_permissions(&self, role_id: RoleId) -> AppResult<Vec<ModulePermission>> {
        Ok(self
            .permissions
            .read()
            .await
            .iter()
            .filter(|permission| permission.role_id() == role_id)
            .cloned()
            .collect())
    }

    async fn list_modules(&self) -> AppResult<Vec<Module>> {
        Ok(self.modules.read().await.clone())
    }
}

#[async_trait]
impl HierarchyRepository for InMemoryAccessControlStore {
    async fn list_position_assignments(
        &self,
        employee_id: ActorId,
    ) -> AppResult<Vec<PositionAssignment>> {
        Ok(self
            .position_assignments
            .read()
            .await
            .get(&employee_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn find_position(&self, position_id: PositionId) -> AppResult<Option<Position>> {
        Ok(self.positions.read().await.get(position_id).copied())
    }

    async fn find_organization(
        &self,
        organization_id: OrganizationId,
    ) -> AppResult<Option<Organization>> {
        Ok(self
            .organizations
            .read()
            .await
            .get(organization_id)
            .copied())
    }
}
