use std::sync::Arc;

use orgauthz_core::{ActorId, AppResult};
use orgauthz_domain::{
    DataScope, HierarchyAccess, ModulePermission, OrganizationId, Placement, PositionId,
    current_position_assignment,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::hierarchy_walker::{HierarchyWalker, OrganizationGraph, PositionGraph};
use crate::{CancellationSignal, HierarchyRepository};

/// Data whose owner an access check is about.
///
/// An explicit organization takes precedence over the target actor's
/// organization when both are supplied. A supplied actor must still hold a
/// current position for scoped checks to pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataTarget {
    /// Actor owning the data.
    pub actor_id: Option<ActorId>,
    /// Organization owning the data.
    pub organization_id: Option<OrganizationId>,
}

impl DataTarget {
    /// Targets data owned by an actor.
    #[must_use]
    pub fn actor(actor_id: ActorId) -> Self {
        Self {
            actor_id: Some(actor_id),
            organization_id: None,
        }
    }

    /// Targets data owned by an organization.
    #[must_use]
    pub fn organization(organization_id: OrganizationId) -> Self {
        Self {
            actor_id: None,
            organization_id: Some(organization_id),
        }
    }
}

/// Decides data access for a matched permission and a target.
#[derive(Clone)]
pub struct ScopeResolver {
    hierarchy: Arc<dyn HierarchyRepository>,
    walker: HierarchyWalker,
}

impl ScopeResolver {
    /// Creates a resolver over the hierarchy store.
    #[must_use]
    pub fn new(hierarchy: Arc<dyn HierarchyRepository>, walker: HierarchyWalker) -> Self {
        Self { hierarchy, walker }
    }

    /// Resolves an actor's current position and its organization.
    ///
    /// Returns `None` when the actor holds no open position or the position
    /// record is missing.
    pub async fn resolve_placement(&self, actor_id: ActorId) -> AppResult<Option<Placement>> {
        let assignments = self
            .hierarchy
            .list_position_assignments(actor_id)
            .await?;
        let Some(current) = current_position_assignment(&assignments) else {
            return Ok(None);
        };

        Ok(self
            .hierarchy
            .find_position(current.position_id)
            .await?
            .map(|position| Placement {
                position_id: position.position_id(),
                organization_id: position.organization_id(),
            }))
    }

    /// Decides whether `requester` may operate on `target` under `permission`.
    pub async fn resolve(
        &self,
        requester: ActorId,
        permission: &ModulePermission,
        target: &DataTarget,
        cancellation: &CancellationSignal,
    ) -> AppResult<bool> {
        match permission.scope() {
            DataScope::All => Ok(true),
            DataScope::Own => Ok(target.actor_id == Some(requester)),
            DataScope::Organization => {
                self.resolve_organization_scope(requester, permission.hierarchy(), target, cancellation)
                    .await
            }
            DataScope::PositionTree => {
                self.resolve_position_tree_scope(requester, permission.hierarchy(), target, cancellation)
                    .await
            }
        }
    }

    async fn resolve_organization_scope(
        &self,
        requester: ActorId,
        flags: HierarchyAccess,
        target: &DataTarget,
        cancellation: &CancellationSignal,
    ) -> AppResult<bool> {
        let Some(placement) = self.resolve_placement(requester).await? else {
            debug!(actor_id = %requester, "requester has no current position; denying");
            return Ok(false);
        };

        let target_placement = match target.actor_id {
            Some(actor_id) => match self.resolve_placement(actor_id).await? {
                Some(target_placement) => Some(target_placement),
                None => {
                    debug!(
                        target_actor_id = %actor_id,
                        "target actor has no current position; denying"
                    );
                    return Ok(false);
                }
            },
            None => None,
        };

        // An explicit organization wins over the target actor's placement.
        let target_organization = target
            .organization_id
            .or(target_placement.map(|target_placement| target_placement.organization_id));
        let Some(target_organization) = target_organization else {
            return Ok(false);
        };

        self.has_organization_access(
            placement.organization_id,
            target_organization,
            flags,
            cancellation,
        )
        .await
    }

    async fn resolve_position_tree_scope(
        &self,
        requester: ActorId,
        flags: HierarchyAccess,
        target: &DataTarget,
        cancellation: &CancellationSignal,
    ) -> AppResult<bool> {
        let Some(placement) = self.resolve_placement(requester).await? else {
            debug!(actor_id = %requester, "requester has no current position; denying");
            return Ok(false);
        };

        if target.actor_id == Some(requester) {
            return Ok(true);
        }

        let target_placement = match target.actor_id {
            Some(actor_id) => match self.resolve_placement(actor_id).await? {
                Some(target_placement) => Some(target_placement),
                None => return Ok(false),
            },
            None => None,
        };

        let Some(target_organization) = target
            .organization_id
            .or(target_placement.map(|value| value.organization_id))
        else {
            return Ok(false);
        };

        if !self
            .has_organization_access(
                placement.organization_id,
                target_organization,
                flags,
                cancellation,
            )
            .await?
        {
            return Ok(false);
        }

        let Some(target_placement) = target_placement else {
            return Ok(false);
        };

        if flags.can_access_subordinates
            && self
                .is_subordinate(placement.position_id, target_placement.position_id, cancellation)
                .await?
        {
            return Ok(true);
        }

        // Superior access rides on the parent-org flag; there is no dedicated flag.
        if flags.can_access_parent_org
            && self
                .is_superior(placement.position_id, target_placement.position_id, cancellation)
                .await?
        {
            return Ok(true);
        }

        Ok(false)
    }

    /// Same organization, or an ancestor/descendant organization when the
    /// matching flag is set.
    async fn has_organization_access(
        &self,
        requester_organization: OrganizationId,
        target_organization: OrganizationId,
        flags: HierarchyAccess,
        cancellation: &CancellationSignal,
    ) -> AppResult<bool> {
        if requester_organization == target_organization {
            return Ok(true);
        }

        let graph = OrganizationGraph(self.hierarchy.as_ref());

        if flags.can_access_parent_org
            && self
                .walker
                .find_ancestor(
                    &graph,
                    requester_organization,
                    move |organization_id| organization_id == target_organization,
                    cancellation,
                )
                .await?
                .is_found()
        {
            return Ok(true);
        }

        if flags.can_access_child_org
            && self
                .walker
                .find_ancestor(
                    &graph,
                    target_organization,
                    move |organization_id| organization_id == requester_organization,
                    cancellation,
                )
                .await?
                .is_found()
        {
            return Ok(true);
        }

        Ok(false)
    }

    /// Target position sits below the requester's position.
    async fn is_subordinate(
        &self,
        requester_position: PositionId,
        target_position: PositionId,
        cancellation: &CancellationSignal,
    ) -> AppResult<bool> {
        let graph = PositionGraph(self.hierarchy.as_ref());
        Ok(self
            .walker
            .find_ancestor(
                &graph,
                target_position,
                move |position_id| position_id == requester_position,
                cancellation,
            )
            .await?
            .is_found())
    }

    /// Target position sits above the requester's position.
    async fn is_superior(
        &self,
        requester_position: PositionId,
        target_position: PositionId,
        cancellation: &CancellationSignal,
    ) -> AppResult<bool> {
        let graph = PositionGraph(self.hierarchy.as_ref());
        Ok(self
            .walker
            .find_ancestor(
                &graph,
                requester_position,
                move |position_id| position_id == target_position,
                cancellation,
            )
            .await?
            .is_found())
    }
}
