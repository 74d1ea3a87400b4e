mod access_control;
mod cache;
mod hierarchy;
mod role_admin;

pub use access_control::AccessControlRepository;
pub use cache::{CacheGeneration, PermissionCacheStore};
pub use hierarchy::HierarchyRepository;
pub use role_admin::{AssignRoleInput, RoleAdminRepository, SaveModulePermissionInput};
