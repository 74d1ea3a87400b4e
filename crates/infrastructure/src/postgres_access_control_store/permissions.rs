use super::*;

pub(super) const PERMISSION_COLUMNS: &str = r#"
    id, role_id, module_id,
    can_create, can_view, can_edit, can_delete,
    data_scope,
    can_access_subordinates, can_access_parent_org, can_access_child_org,
    is_active, is_deleted
"#;

pub(super) const EMPLOYEE_ROLE_COLUMNS: &str = r#"
    id, employee_id, role_id, organization_id, position_id, assigned_at, is_active, is_deleted
"#;

#[async_trait]
impl AccessControlRepository for PostgresAccessControlStore {
    async fn find_actor(&self, actor_id: ActorId) -> AppResult<Option<ActorRecord>> {
        sqlx::query_as::<_, ActorRow>(
            r#"
            SELECT id, is_administrator
            FROM employees
            WHERE id = $1
            "#,
        )
        .bind(actor_id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load actor '{actor_id}': {error}")))?
        .map(ActorRecord::try_from)
        .transpose()
    }

    async fn list_role_assignments(&self, employee_id: ActorId) -> AppResult<Vec<EmployeeRole>> {
        let rows = sqlx::query_as::<_, EmployeeRoleRow>(&format!(
            "SELECT {EMPLOYEE_ROLE_COLUMNS} FROM employee_roles WHERE employee_id = $1"
        ))
        .bind(employee_id.as_i64())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to load role assignments for employee '{employee_id}': {error}"
            ))
        })?;

        rows.into_iter().map(EmployeeRole::try_from).collect()
    }

    async fn find_role(&self, role_id: RoleId) -> AppResult<Option<Role>> {
        sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT id, name, description, is_active, is_deleted
            FROM roles
            WHERE id = $1
            "#,
        )
        .bind(role_id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load role '{role_id}': {error}")))?
        .map(Role::try_from)
        .transpose()
    }

    async fn list_role_permissions(&self, role_id: RoleId) -> AppResult<Vec<ModulePermission>> {
        let rows = sqlx::query_as::<_, PermissionRow>(&format!(
            "SELECT {PERMISSION_COLUMNS} FROM module_permissions WHERE role_id = $1 ORDER BY id"
        ))
        .bind(role_id.as_i64())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to load permissions for role '{role_id}': {error}"
            ))
        })?;

        rows.into_iter().map(ModulePermission::try_from).collect()
    }

    async fn list_modules(&self) -> AppResult<Vec<Module>> {
        let rows = sqlx::query_as::<_, ModuleRow>(
            r#"
            SELECT id, name, display_label, sort_order, is_active
            FROM modules
            ORDER BY sort_order, name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load modules: {error}")))?;

        rows.into_iter().map(Module::try_from).collect()
    }
}
