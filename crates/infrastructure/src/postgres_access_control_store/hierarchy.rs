use super::*;

#[async_trait]
impl HierarchyRepository for PostgresAccessControlStore {
    async fn list_position_assignments(
        &self,
        employee_id: ActorId,
    ) -> AppResult<Vec<PositionAssignment>> {
        let rows = sqlx::query_as::<_, PositionAssignmentRow>(
            r#"
            SELECT employee_id, position_id, start_date, end_date
            FROM employee_positions
            WHERE employee_id = $1
            ORDER BY start_date
            "#,
        )
        .bind(employee_id.as_i64())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to load positions for employee '{employee_id}': {error}"
            ))
        })?;

        rows.into_iter().map(PositionAssignment::try_from).collect()
    }

    async fn find_position(&self, position_id: PositionId) -> AppResult<Option<Position>> {
        let row = sqlx::query_as::<_, PositionRow>(
            r#"
            SELECT id, parent_position_id, organization_id, level
            FROM positions
            WHERE id = $1
            "#,
        )
        .bind(position_id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to load position '{position_id}': {error}"))
        })?;

        Ok(row.map(Position::from))
    }

    async fn find_organization(
        &self,
        organization_id: OrganizationId,
    ) -> AppResult<Option<Organization>> {
        let row = sqlx::query_as::<_, OrganizationRow>(
            r#"
            SELECT id, parent_organization_id, level
            FROM organizations
            WHERE id = $1
            "#,
        )
        .bind(organization_id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to load organization '{organization_id}': {error}"
            ))
        })?;

        Ok(row.map(Organization::from))
    }
}
