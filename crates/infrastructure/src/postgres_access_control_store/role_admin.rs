use sqlx::{Postgres, Transaction};
use tracing::debug;

use super::permissions::{EMPLOYEE_ROLE_COLUMNS, PERMISSION_COLUMNS};
use super::*;

#[async_trait]
impl RoleAdminRepository for PostgresAccessControlStore {
    async fn replace_active_role_assignment(
        &self,
        input: AssignRoleInput,
    ) -> AppResult<EmployeeRole> {
        let mut transaction = self.pool.begin().await.map_err(|error| {
            AppError::Internal(format!("failed to begin transaction: {error}"))
        })?;

        // Serializes concurrent replacements for one employee until commit.
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(input.employee_id.as_i64())
            .execute(&mut *transaction)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to lock role assignments: {error}"))
            })?;

        require_live_role(&mut transaction, input.role_id).await?;

        let deactivated = sqlx::query(
            r#"
            UPDATE employee_roles
            SET is_active = FALSE
            WHERE employee_id = $1
                AND is_active = TRUE
                AND is_deleted = FALSE
            "#,
        )
        .bind(input.employee_id.as_i64())
        .execute(&mut *transaction)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to deactivate role assignments: {error}"))
        })?
        .rows_affected();
        debug!(
            employee_id = %input.employee_id,
            deactivated,
            "previous role assignments deactivated"
        );

        let row = sqlx::query_as::<_, EmployeeRoleRow>(&format!(
            r#"
            INSERT INTO employee_roles (employee_id, role_id, organization_id, position_id)
            VALUES ($1, $2, $3, $4)
            RETURNING {EMPLOYEE_ROLE_COLUMNS}
            "#
        ))
        .bind(input.employee_id.as_i64())
        .bind(input.role_id.as_i64())
        .bind(input.organization_id.map(|value| value.as_i64()))
        .bind(input.position_id.map(|value| value.as_i64()))
        .fetch_one(&mut *transaction)
        .await
        .map_err(|error| map_missing_reference(error, "employee", input.employee_id))?;

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })?;

        EmployeeRole::try_from(row)
    }

    async fn deactivate_role_assignments(&self, employee_id: ActorId) -> AppResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE employee_roles
            SET is_active = FALSE
            WHERE employee_id = $1
                AND is_active = TRUE
                AND is_deleted = FALSE
            "#,
        )
        .bind(employee_id.as_i64())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to deactivate role assignments: {error}"))
        })?;

        Ok(result.rows_affected())
    }

    async fn upsert_module_permission(
        &self,
        input: SaveModulePermissionInput,
    ) -> AppResult<ModulePermission> {
        let mut transaction = self.pool.begin().await.map_err(|error| {
            AppError::Internal(format!("failed to begin transaction: {error}"))
        })?;

        require_live_role(&mut transaction, input.role_id).await?;

        let module_id = sqlx::query_scalar::<_, i64>("SELECT id FROM modules WHERE name = $1")
            .bind(input.module_name.as_str())
            .fetch_optional(&mut *transaction)
            .await
            .map_err(|error| AppError::Internal(format!("failed to resolve module: {error}")))?
            .ok_or_else(|| {
                AppError::NotFound(format!("module '{}' was not found", input.module_name))
            })?;

        sqlx::query(
            r#"
            UPDATE module_permissions
            SET is_deleted = TRUE, is_active = FALSE
            WHERE role_id = $1
                AND module_id = $2
                AND is_deleted = FALSE
            "#,
        )
        .bind(input.role_id.as_i64())
        .bind(module_id)
        .execute(&mut *transaction)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to retire previous permission: {error}"))
        })?;

        let row = sqlx::query_as::<_, PermissionRow>(&format!(
            r#"
            INSERT INTO module_permissions (
                role_id, module_id,
                can_create, can_view, can_edit, can_delete,
                data_scope,
                can_access_subordinates, can_access_parent_org, can_access_child_org
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {PERMISSION_COLUMNS}
            "#
        ))
        .bind(input.role_id.as_i64())
        .bind(module_id)
        .bind(input.actions.can_create)
        .bind(input.actions.can_view)
        .bind(input.actions.can_edit)
        .bind(input.actions.can_delete)
        .bind(input.scope.as_str())
        .bind(input.hierarchy.can_access_subordinates)
        .bind(input.hierarchy.can_access_parent_org)
        .bind(input.hierarchy.can_access_child_org)
        .fetch_one(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to save permission: {error}")))?;

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })?;

        ModulePermission::try_from(row)
    }

    async fn soft_delete_module_permission(
        &self,
        role_id: RoleId,
        module_name: &str,
    ) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE module_permissions AS permissions
            SET is_deleted = TRUE, is_active = FALSE
            FROM modules
            WHERE modules.id = permissions.module_id
                AND modules.name = $2
                AND permissions.role_id = $1
                AND permissions.is_deleted = FALSE
            "#,
        )
        .bind(role_id.as_i64())
        .bind(module_name)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete permission: {error}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "role '{role_id}' has no permission on module '{module_name}'"
            )));
        }

        Ok(())
    }

    async fn set_role_active(&self, role_id: RoleId, is_active: bool) -> AppResult<Role> {
        sqlx::query_as::<_, RoleRow>(
            r#"
            UPDATE roles
            SET is_active = $2
            WHERE id = $1
                AND is_deleted = FALSE
            RETURNING id, name, description, is_active, is_deleted
            "#,
        )
        .bind(role_id.as_i64())
        .bind(is_active)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to update role: {error}")))?
        .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' was not found")))
        .and_then(Role::try_from)
    }

    async fn soft_delete_role(&self, role_id: RoleId) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE roles
            SET is_deleted = TRUE, is_active = FALSE
            WHERE id = $1
                AND is_deleted = FALSE
            "#,
        )
        .bind(role_id.as_i64())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete role: {error}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("role '{role_id}' was not found")));
        }

        Ok(())
    }

    async fn list_active_assignees(&self, role_id: RoleId) -> AppResult<Vec<ActorId>> {
        let employee_ids = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT DISTINCT employee_id
            FROM employee_roles
            WHERE role_id = $1
                AND is_active = TRUE
                AND is_deleted = FALSE
            ORDER BY employee_id
            "#,
        )
        .bind(role_id.as_i64())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to list assignees of role '{role_id}': {error}"
            ))
        })?;

        employee_ids.into_iter().map(stored_actor_id).collect()
    }
}

async fn require_live_role(
    transaction: &mut Transaction<'_, Postgres>,
    role_id: RoleId,
) -> AppResult<()> {
    let is_deleted = sqlx::query_scalar::<_, bool>("SELECT is_deleted FROM roles WHERE id = $1")
        .bind(role_id.as_i64())
        .fetch_optional(&mut **transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to resolve role: {error}")))?;

    match is_deleted {
        Some(false) => Ok(()),
        _ => Err(AppError::NotFound(format!("role '{role_id}' was not found"))),
    }
}

fn map_missing_reference(error: sqlx::Error, kind: &str, id: impl std::fmt::Display) -> AppError {
    if let sqlx::Error::Database(database_error) = &error
        && database_error.code().as_deref() == Some("23503")
    {
        return AppError::NotFound(format!("{kind} '{id}' was not found"));
    }

    AppError::Internal(format!("failed to assign role: {error}"))
}
