//! Domain entities and invariants of the authorization engine.

#![forbid(unsafe_code)]

mod access_control;
mod hierarchy;
mod security;

pub use access_control::{
    ActionFlags, ActorRecord, EmployeeRole, HierarchyAccess, Module, ModuleId, ModulePermission,
    PermissionId, RecordStatus, Role, RoleAssignmentId, RoleId, select_active_assignment,
};
pub use hierarchy::{
    AncestorWalk, HierarchyArena, HierarchyNode, Organization, OrganizationId, Placement,
    Position, PositionAssignment, PositionId, WalkOutcome, WalkStep, current_position_assignment,
};
pub use security::{Action, DataScope, ModuleAction};
