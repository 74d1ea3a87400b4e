use std::fmt::Display;
use std::hash::Hash;

use async_trait::async_trait;
use orgauthz_core::AppResult;
use orgauthz_domain::{AncestorWalk, OrganizationId, PositionId, WalkOutcome, WalkStep};
use tracing::warn;

use crate::{CancellationSignal, HierarchyRepository};

/// Default bound on parent lookups per walk.
pub const DEFAULT_MAX_HIERARCHY_DEPTH: usize = 64;

/// Parent-pointer access to one tree instance.
#[async_trait]
pub trait ParentLookup<Id>: Send + Sync {
    /// Stable graph name used in logs.
    fn graph_name(&self) -> &'static str;

    /// Returns the parent of a node, or `None` when the node does not exist.
    async fn parent_of(&self, node_id: Id) -> AppResult<Option<Id>>;
}

/// Position tree view over a hierarchy repository.
pub struct PositionGraph<'a>(pub &'a dyn HierarchyRepository);

#[async_trait]
impl ParentLookup<PositionId> for PositionGraph<'_> {
    fn graph_name(&self) -> &'static str {
        "position"
    }

    async fn parent_of(&self, node_id: PositionId) -> AppResult<Option<PositionId>> {
        Ok(self
            .0
            .find_position(node_id)
            .await?
            .map(|position| position.parent_position_id()))
    }
}

/// Organization tree view over a hierarchy repository.
pub struct OrganizationGraph<'a>(pub &'a dyn HierarchyRepository);

#[async_trait]
impl ParentLookup<OrganizationId> for OrganizationGraph<'_> {
    fn graph_name(&self) -> &'static str {
        "organization"
    }

    async fn parent_of(&self, node_id: OrganizationId) -> AppResult<Option<OrganizationId>> {
        Ok(self
            .0
            .find_organization(node_id)
            .await?
            .map(|organization| organization.parent_organization_id()))
    }
}

/// Upward traversal over any parent-pointer graph.
#[derive(Debug, Clone, Copy)]
pub struct HierarchyWalker {
    max_depth: usize,
}

impl Default for HierarchyWalker {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HIERARCHY_DEPTH)
    }
}

impl HierarchyWalker {
    /// Creates a walker bounded to `max_depth` parent lookups per walk.
    #[must_use]
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// Returns the configured depth bound.
    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Walks up from `start`, testing `stop_condition` on every ancestor.
    ///
    /// Only [`WalkOutcome::Found`] means the ancestor exists; every other
    /// outcome is a not-found answer. Lookup errors propagate.
    pub async fn find_ancestor<Id, G>(
        &self,
        graph: &G,
        start: Id,
        stop_condition: impl Fn(Id) -> bool + Send,
        cancellation: &CancellationSignal,
    ) -> AppResult<WalkOutcome>
    where
        Id: Copy + Eq + Hash + Display + Send + Sync,
        G: ParentLookup<Id> + ?Sized,
    {
        let mut walk = AncestorWalk::new(start, self.max_depth);

        let outcome = loop {
            match walk.next_step() {
                WalkStep::Done(outcome) => break outcome,
                WalkStep::Lookup(_) if cancellation.is_cancelled() => walk.cancel(),
                WalkStep::Lookup(node_id) => {
                    let parent = graph.parent_of(node_id).await?;
                    walk.record_parent(parent, &stop_condition);
                }
            }
        };

        if outcome.indicates_corruption() {
            warn!(
                graph = graph.graph_name(),
                start = %start,
                depth = walk.depth(),
                outcome = outcome.as_str(),
                "hierarchy walk stopped by integrity guard; parent links need repair"
            );
        }

        Ok(outcome)
    }
}
