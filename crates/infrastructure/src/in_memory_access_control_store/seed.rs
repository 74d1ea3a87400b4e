use super::*;

impl InMemoryAccessControlStore {
    /// Inserts or replaces an actor record.
    pub async fn save_actor(&self, actor: ActorRecord) {
        self.actors.write().await.insert(actor.actor_id, actor);
    }

    /// Inserts or replaces a module by identifier.
    pub async fn save_module(&self, module: Module) {
        self.bump_record_id(module.module_id().as_i64());
        let mut modules = self.modules.write().await;
        modules.retain(|existing| existing.module_id() != module.module_id());
        modules.push(module);
    }

    /// Inserts or replaces a role.
    pub async fn save_role(&self, role: Role) {
        self.bump_record_id(role.role_id().as_i64());
        self.roles.write().await.insert(role.role_id(), role);
    }

    /// Inserts or replaces a permission row by identifier.
    pub async fn save_permission(&self, permission: ModulePermission) {
        self.bump_record_id(permission.permission_id().as_i64());
        let mut permissions = self.permissions.write().await;
        permissions.retain(|existing| existing.permission_id() != permission.permission_id());
        permissions.push(permission);
    }

    /// Inserts or replaces a role assignment row by identifier.
    pub async fn save_role_assignment(&self, assignment: EmployeeRole) {
        self.bump_record_id(assignment.assignment_id().as_i64());
        let mut assignments = self.role_assignments.write().await;
        assignments.retain(|existing| existing.assignment_id() != assignment.assignment_id());
        assignments.push(assignment);
    }

    /// Inserts or replaces an organization node.
    pub async fn save_organization(&self, organization: Organization) {
        self.organizations.write().await.insert(organization);
    }

    /// Inserts or replaces a position node.
    pub async fn save_position(&self, position: Position) {
        self.positions.write().await.insert(position);
    }

    /// Appends a row to an employee's position history.
    pub async fn save_position_assignment(&self, assignment: PositionAssignment) {
        self.position_assignments
            .write()
            .await
            .entry(assignment.employee_id)
            .or_default()
            .push(assignment);
    }
}
