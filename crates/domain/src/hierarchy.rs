//! Organization and position trees.
//!
//! Both trees are parent-pointer graphs keyed by id. A root node names itself
//! as its parent; there is no null parent. [`AncestorWalk`] holds the single
//! upward-walk algorithm used for every hierarchy question, independent of how
//! parent links are fetched.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use chrono::NaiveDate;
use orgauthz_core::ActorId;
use serde::{Deserialize, Serialize};

use crate::access_control::record_id;

record_id!(
    /// Identifier of an organization node.
    OrganizationId
);
record_id!(
    /// Identifier of a position node.
    PositionId
);

/// Node of a self-referencing parent-pointer tree.
pub trait HierarchyNode {
    /// Node identifier type.
    type Id: Copy + Eq + Hash + std::fmt::Debug;

    /// Returns the node identifier.
    fn node_id(&self) -> Self::Id;

    /// Returns the parent identifier. Roots return their own identifier.
    fn parent_id(&self) -> Self::Id;
}

/// Organizational unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    organization_id: OrganizationId,
    parent_organization_id: OrganizationId,
    level: i32,
}

impl Organization {
    /// Creates an organization node.
    #[must_use]
    pub fn new(
        organization_id: OrganizationId,
        parent_organization_id: OrganizationId,
        level: i32,
    ) -> Self {
        Self {
            organization_id,
            parent_organization_id,
            level,
        }
    }

    /// Creates a root organization, which is its own parent.
    #[must_use]
    pub fn root(organization_id: OrganizationId) -> Self {
        Self::new(organization_id, organization_id, 0)
    }

    /// Returns the organization identifier.
    #[must_use]
    pub fn organization_id(&self) -> OrganizationId {
        self.organization_id
    }

    /// Returns the parent organization identifier.
    #[must_use]
    pub fn parent_organization_id(&self) -> OrganizationId {
        self.parent_organization_id
    }

    /// Returns the depth level recorded for the organization.
    #[must_use]
    pub fn level(&self) -> i32 {
        self.level
    }
}

impl HierarchyNode for Organization {
    type Id = OrganizationId;

    fn node_id(&self) -> OrganizationId {
        self.organization_id
    }

    fn parent_id(&self) -> OrganizationId {
        self.parent_organization_id
    }
}

/// Job position inside an organization's reporting tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    position_id: PositionId,
    parent_position_id: PositionId,
    organization_id: OrganizationId,
    level: i32,
}

impl Position {
    /// Creates a position node.
    #[must_use]
    pub fn new(
        position_id: PositionId,
        parent_position_id: PositionId,
        organization_id: OrganizationId,
        level: i32,
    ) -> Self {
        Self {
            position_id,
            parent_position_id,
            organization_id,
            level,
        }
    }

    /// Creates the root position of an organization's tree.
    #[must_use]
    pub fn root(position_id: PositionId, organization_id: OrganizationId) -> Self {
        Self::new(position_id, position_id, organization_id, 0)
    }

    /// Returns the position identifier.
    #[must_use]
    pub fn position_id(&self) -> PositionId {
        self.position_id
    }

    /// Returns the parent position identifier.
    #[must_use]
    pub fn parent_position_id(&self) -> PositionId {
        self.parent_position_id
    }

    /// Returns the owning organization.
    #[must_use]
    pub fn organization_id(&self) -> OrganizationId {
        self.organization_id
    }

    /// Returns the depth level recorded for the position.
    #[must_use]
    pub fn level(&self) -> i32 {
        self.level
    }
}

impl HierarchyNode for Position {
    type Id = PositionId;

    fn node_id(&self) -> PositionId {
        self.position_id
    }

    fn parent_id(&self) -> PositionId {
        self.parent_position_id
    }
}

/// Dated link between an employee and a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionAssignment {
    /// Employee holding the position.
    pub employee_id: ActorId,
    /// Held position.
    pub position_id: PositionId,
    /// First day in the position.
    pub start_date: NaiveDate,
    /// Last day in the position; open assignments have none.
    pub end_date: Option<NaiveDate>,
}

/// Returns the employee's current assignment: open-ended, latest start date.
#[must_use]
pub fn current_position_assignment(
    assignments: &[PositionAssignment],
) -> Option<&PositionAssignment> {
    assignments
        .iter()
        .filter(|assignment| assignment.end_date.is_none())
        .max_by_key(|assignment| (assignment.start_date, assignment.position_id))
}

/// Where an actor sits in both trees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Placement {
    /// Current position.
    pub position_id: PositionId,
    /// Organization owning the current position.
    pub organization_id: OrganizationId,
}

/// Terminal state of an ancestor walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkOutcome {
    /// The stop condition matched an ancestor.
    Found,
    /// The walk reached a root (self-parented) node.
    ReachedRoot,
    /// A node was visited twice.
    CycleDetected,
    /// A parent link pointed at a missing node.
    BrokenReference,
    /// The depth bound was hit before the walk resolved.
    DepthExceeded,
    /// The caller cancelled the walk.
    Cancelled,
}

impl WalkOutcome {
    /// Returns whether the walk found the requested ancestor.
    #[must_use]
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found)
    }

    /// Returns whether the outcome points at corrupted hierarchy data.
    #[must_use]
    pub fn indicates_corruption(&self) -> bool {
        matches!(self, Self::CycleDetected | Self::DepthExceeded)
    }

    /// Returns a stable label for logs.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Found => "found",
            Self::ReachedRoot => "reached_root",
            Self::CycleDetected => "cycle_detected",
            Self::BrokenReference => "broken_reference",
            Self::DepthExceeded => "depth_exceeded",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Next thing an [`AncestorWalk`] needs from its driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkStep<Id> {
    /// Fetch the parent of this node and feed it back.
    Lookup(Id),
    /// The walk is over.
    Done(WalkOutcome),
}

/// Upward walk over a parent-pointer tree, driven one parent lookup at a time.
///
/// The start node is never its own ancestor: the first candidate handed to the
/// stop condition is the start node's parent. Each fed parent is checked in
/// order for a root self-loop, a stop-condition match, and a revisit.
#[derive(Debug, Clone)]
pub struct AncestorWalk<Id> {
    current: Id,
    visited: HashSet<Id>,
    depth: usize,
    max_depth: usize,
    outcome: Option<WalkOutcome>,
}

impl<Id: Copy + Eq + Hash> AncestorWalk<Id> {
    /// Starts a walk from `start` bounded to `max_depth` parent lookups.
    #[must_use]
    pub fn new(start: Id, max_depth: usize) -> Self {
        Self {
            current: start,
            visited: HashSet::from([start]),
            depth: 0,
            max_depth,
            outcome: None,
        }
    }

    /// Returns the next lookup to perform, or the final outcome.
    #[must_use]
    pub fn next_step(&self) -> WalkStep<Id> {
        match self.outcome {
            Some(outcome) => WalkStep::Done(outcome),
            None if self.depth >= self.max_depth => WalkStep::Done(WalkOutcome::DepthExceeded),
            None => WalkStep::Lookup(self.current),
        }
    }

    /// Feeds the parent of the node returned by [`Self::next_step`].
    pub fn record_parent(&mut self, parent: Option<Id>, stop_condition: impl Fn(Id) -> bool) {
        if self.outcome.is_some() {
            return;
        }

        self.depth += 1;
        self.outcome = match parent {
            None => Some(WalkOutcome::BrokenReference),
            Some(parent) if parent == self.current => Some(WalkOutcome::ReachedRoot),
            Some(parent) if stop_condition(parent) => Some(WalkOutcome::Found),
            Some(parent) if !self.visited.insert(parent) => Some(WalkOutcome::CycleDetected),
            Some(parent) => {
                self.current = parent;
                None
            }
        };
    }

    /// Marks the walk as cancelled.
    pub fn cancel(&mut self) {
        if self.outcome.is_none() {
            self.outcome = Some(WalkOutcome::Cancelled);
        }
    }

    /// Returns the number of parent lookups performed so far.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }
}

/// Id-indexed arena holding one tree instance.
#[derive(Debug, Clone)]
pub struct HierarchyArena<N: HierarchyNode> {
    nodes: HashMap<N::Id, N>,
}

impl<N: HierarchyNode> Default for HierarchyArena<N> {
    fn default() -> Self {
        Self {
            nodes: HashMap::new(),
        }
    }
}

impl<N: HierarchyNode> HierarchyArena<N> {
    /// Creates an empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a node.
    pub fn insert(&mut self, node: N) {
        self.nodes.insert(node.node_id(), node);
    }

    /// Returns a node by id.
    #[must_use]
    pub fn get(&self, node_id: N::Id) -> Option<&N> {
        self.nodes.get(&node_id)
    }

    /// Returns the parent id of a stored node.
    #[must_use]
    pub fn parent_of(&self, node_id: N::Id) -> Option<N::Id> {
        self.nodes.get(&node_id).map(HierarchyNode::parent_id)
    }

    /// Walks up from `start` until `stop_condition` matches an ancestor.
    ///
    /// Synchronous form of the [`AncestorWalk`] that async walkers drive
    /// against a store; both yield the same [`WalkOutcome`] for the same
    /// parent links.
    pub fn find_ancestor(
        &self,
        start: N::Id,
        stop_condition: impl Fn(N::Id) -> bool,
        max_depth: usize,
    ) -> WalkOutcome {
        let mut walk = AncestorWalk::new(start, max_depth);
        loop {
            match walk.next_step() {
                WalkStep::Done(outcome) => return outcome,
                WalkStep::Lookup(node_id) => {
                    walk.record_parent(self.parent_of(node_id), &stop_condition);
                }
            }
        }
    }
}

impl<N: HierarchyNode> FromIterator<N> for HierarchyArena<N> {
    fn from_iter<T: IntoIterator<Item = N>>(iter: T) -> Self {
        Self {
            nodes: iter.into_iter().map(|node| (node.node_id(), node)).collect(),
        }
    }
}
