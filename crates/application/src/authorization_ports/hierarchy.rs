use async_trait::async_trait;

use orgauthz_core::{ActorId, AppResult};
use orgauthz_domain::{Organization, OrganizationId, Position, PositionAssignment, PositionId};

/// Read-only port over the organization and position trees.
#[async_trait]
pub trait HierarchyRepository: Send + Sync {
    /// Lists the position assignment history of an employee.
    async fn list_position_assignments(
        &self,
        employee_id: ActorId,
    ) -> AppResult<Vec<PositionAssignment>>;

    /// Finds a position node.
    async fn find_position(&self, position_id: PositionId) -> AppResult<Option<Position>>;

    /// Finds an organization node.
    async fn find_organization(
        &self,
        organization_id: OrganizationId,
    ) -> AppResult<Option<Organization>>;
}
