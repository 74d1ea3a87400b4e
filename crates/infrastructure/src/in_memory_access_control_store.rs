use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use orgauthz_application::{
    AccessControlRepository, AssignRoleInput, HierarchyRepository, RoleAdminRepository,
    SaveModulePermissionInput,
};
use orgauthz_core::{ActorId, AppError, AppResult};
use orgauthz_domain::{
    ActorRecord, EmployeeRole, HierarchyArena, Module, ModulePermission, Organization,
    OrganizationId, Position, PositionAssignment, PositionId, RecordStatus, Role, RoleId,
};
use tokio::sync::RwLock;

mod reads;
mod role_admin;
mod seed;

#[cfg(test)]
mod tests;

/// In-memory access-control and hierarchy store.
///
/// Serves the read ports and role administration from one set of maps; used
/// for local runs and tests.
#[derive(Debug, Default)]
pub struct InMemoryAccessControlStore {
    actors: RwLock<HashMap<ActorId, ActorRecord>>,
    modules: RwLock<Vec<Module>>,
    roles: RwLock<HashMap<RoleId, Role>>,
    permissions: RwLock<Vec<ModulePermission>>,
    role_assignments: RwLock<Vec<EmployeeRole>>,
    organizations: RwLock<HierarchyArena<Organization>>,
    positions: RwLock<HierarchyArena<Position>>,
    position_assignments: RwLock<HashMap<ActorId, Vec<PositionAssignment>>>,
    next_record_id: AtomicI64,
}

impl InMemoryAccessControlStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_record_id: AtomicI64::new(1),
            ..Self::default()
        }
    }

    fn next_record_id(&self) -> i64 {
        self.next_record_id.fetch_add(1, Ordering::SeqCst).max(1)
    }

    fn bump_record_id(&self, used: i64) {
        self.next_record_id.fetch_max(used + 1, Ordering::SeqCst);
    }

    async fn module_by_name(&self, module_name: &str) -> AppResult<Module> {
        self.modules
            .read()
            .await
            .iter()
            .find(|module| module.name() == module_name)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("module '{module_name}' was not found")))
    }
}

const DEACTIVATED: RecordStatus = RecordStatus {
    is_active: false,
    is_deleted: false,
};

const SOFT_DELETED: RecordStatus = RecordStatus {
    is_active: false,
    is_deleted: true,
};
