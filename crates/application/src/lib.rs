//! Authorization engine: ports, permission resolution, caching, and
//! hierarchy-aware data-scope decisions.

#![forbid(unsafe_code)]

mod authorization_ports;
mod authorization_service;
mod cancellation;
mod hierarchy_walker;
mod permission_cache;
mod permission_repository;
mod role_admin_service;
mod scope_resolver;

#[cfg(test)]
mod test_support;

pub use authorization_ports::{
    AccessControlRepository, AssignRoleInput, CacheGeneration, HierarchyRepository,
    PermissionCacheStore, RoleAdminRepository, SaveModulePermissionInput,
};
pub use authorization_service::{AuthorizationService, AuthorizationSettings};
pub use cancellation::CancellationSignal;
pub use hierarchy_walker::{
    DEFAULT_MAX_HIERARCHY_DEPTH, HierarchyWalker, OrganizationGraph, ParentLookup, PositionGraph,
};
pub use permission_cache::{DEFAULT_PERMISSION_CACHE_TTL, PermissionCache};
pub use permission_repository::{ActorPermissionSet, PermissionRepository};
pub use role_admin_service::{ROLE_ADMIN_MODULE, RoleAdminService};
pub use scope_resolver::{DataTarget, ScopeResolver};
