//! In-crate fakes for the authorization ports.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use orgauthz_core::{ActorId, AppError, AppResult};
use orgauthz_domain::{
    ActionFlags, ActorRecord, DataScope, EmployeeRole, HierarchyAccess, HierarchyArena, Module,
    ModuleId, ModulePermission, Organization, OrganizationId, PermissionId, Position,
    PositionAssignment, PositionId, RecordStatus, Role, RoleAssignmentId, RoleId,
};
use tokio::sync::Mutex;

use crate::{
    AccessControlRepository, ActorPermissionSet, AuthorizationService, AuthorizationSettings,
    CacheGeneration, HierarchyRepository, PermissionCacheStore,
};

pub(crate) const EMPLOYEE_MODULE: i64 = 1;
pub(crate) const DOCUMENT_MODULE: i64 = 2;
pub(crate) const PAYROLL_MODULE: i64 = 3;
pub(crate) const ROLE_MODULE: i64 = 4;

pub(crate) fn actor(value: i64) -> ActorId {
    ActorId::new(value).unwrap_or_else(|error| panic!("invalid test actor id: {error}"))
}

pub(crate) fn view_only() -> ActionFlags {
    ActionFlags {
        can_view: true,
        ..ActionFlags::default()
    }
}

pub(crate) fn no_hierarchy() -> HierarchyAccess {
    HierarchyAccess::default()
}

#[derive(Default)]
pub(crate) struct FakeAccessControlRepository {
    actors: HashMap<ActorId, ActorRecord>,
    pub(crate) assignments: std::sync::Mutex<HashMap<ActorId, Vec<EmployeeRole>>>,
    pub(crate) roles: std::sync::Mutex<HashMap<RoleId, Role>>,
    pub(crate) permissions: std::sync::Mutex<HashMap<RoleId, Vec<ModulePermission>>>,
    pub(crate) modules: Vec<Module>,
    pub(crate) actor_loads: AtomicUsize,
    pub(crate) unavailable: AtomicBool,
}

impl FakeAccessControlRepository {
    fn check_available(&self) -> AppResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::Internal("access control store unavailable".to_owned()));
        }
        Ok(())
    }

    pub(crate) fn loads(&self) -> usize {
        self.actor_loads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AccessControlRepository for FakeAccessControlRepository {
    async fn find_actor(&self, actor_id: ActorId) -> AppResult<Option<ActorRecord>> {
        self.actor_loads.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        Ok(self.actors.get(&actor_id).copied())
    }

    async fn list_role_assignments(&self, employee_id: ActorId) -> AppResult<Vec<EmployeeRole>> {
        self.check_available()?;
        Ok(lock(&self.assignments)
            .get(&employee_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn find_role(&self, role_id: RoleId) -> AppResult<Option<Role>> {
        self.check_available()?;
        Ok(lock(&self.roles).get(&role_id).cloned())
    }

    async fn list_role_permissions(&self, role_id: RoleId) -> AppResult<Vec<ModulePermission>> {
        self.check_available()?;
        Ok(lock(&self.permissions)
            .get(&role_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn list_modules(&self) -> AppResult<Vec<Module>> {
        self.check_available()?;
        Ok(self.modules.clone())
    }
}

pub(crate) fn lock<T>(mutex: &std::sync::Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Default)]
pub(crate) struct FakeHierarchyRepository {
    positions: HierarchyArena<Position>,
    organizations: HierarchyArena<Organization>,
    position_assignments: HashMap<ActorId, Vec<PositionAssignment>>,
}

#[async_trait]
impl HierarchyRepository for FakeHierarchyRepository {
    async fn list_position_assignments(
        &self,
        employee_id: ActorId,
    ) -> AppResult<Vec<PositionAssignment>> {
        Ok(self
            .position_assignments
            .get(&employee_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn find_position(&self, position_id: PositionId) -> AppResult<Option<Position>> {
        Ok(self.positions.get(position_id).copied())
    }

    async fn find_organization(
        &self,
        organization_id: OrganizationId,
    ) -> AppResult<Option<Organization>> {
        Ok(self.organizations.get(organization_id).copied())
    }
}

#[derive(Default)]
pub(crate) struct FakePermissionCacheStore {
    slots: Mutex<HashMap<ActorId, (u64, Option<ActorPermissionSet>)>>,
}

#[async_trait]
impl PermissionCacheStore for FakePermissionCacheStore {
    async fn get(&self, actor_id: ActorId) -> AppResult<Option<ActorPermissionSet>> {
        Ok(self
            .slots
            .lock()
            .await
            .get(&actor_id)
            .and_then(|(_, value)| value.clone()))
    }

    async fn current_generation(&self, actor_id: ActorId) -> AppResult<CacheGeneration> {
        Ok(CacheGeneration::new(
            self.slots
                .lock()
                .await
                .get(&actor_id)
                .map(|(generation, _)| *generation)
                .unwrap_or_default(),
        ))
    }

    async fn put_if_current(
        &self,
        actor_id: ActorId,
        permissions: &ActorPermissionSet,
        generation: CacheGeneration,
        _ttl: Duration,
    ) -> AppResult<bool> {
        let mut slots = self.slots.lock().await;
        let slot = slots.entry(actor_id).or_insert((0, None));
        if slot.0 != generation.value() {
            return Ok(false);
        }
        slot.1 = Some(permissions.clone());
        Ok(true)
    }

    async fn invalidate(&self, actor_id: ActorId) -> AppResult<()> {
        let mut slots = self.slots.lock().await;
        let slot = slots.entry(actor_id).or_insert((0, None));
        slot.0 += 1;
        slot.1 = None;
        Ok(())
    }
}

/// Cache store whose every call fails, as during a cache outage.
pub(crate) struct FailingPermissionCacheStore;

impl FailingPermissionCacheStore {
    fn outage<T>() -> AppResult<T> {
        Err(AppError::Internal("permission cache unreachable".to_owned()))
    }
}

#[async_trait]
impl PermissionCacheStore for FailingPermissionCacheStore {
    async fn get(&self, _actor_id: ActorId) -> AppResult<Option<ActorPermissionSet>> {
        Self::outage()
    }

    async fn current_generation(&self, _actor_id: ActorId) -> AppResult<CacheGeneration> {
        Self::outage()
    }

    async fn put_if_current(
        &self,
        _actor_id: ActorId,
        _permissions: &ActorPermissionSet,
        _generation: CacheGeneration,
        _ttl: Duration,
    ) -> AppResult<bool> {
        Self::outage()
    }

    async fn invalidate(&self, _actor_id: ActorId) -> AppResult<()> {
        Self::outage()
    }
}

/// Builder for a small company:
///
/// ```text
/// organizations: 1 (root) <- 2 ; 3 (root)
/// positions:     P1 (org 1 root) <- P2 <- P3 ; P4 (org 2 root) ; P5 (org 3 root)
/// ```
pub(crate) struct Fixture {
    pub(crate) access: FakeAccessControlRepository,
    pub(crate) hierarchy: FakeHierarchyRepository,
    next_record_id: i64,
}

impl Fixture {
    pub(crate) fn new() -> Self {
        let module = |id: i64, name: &str, is_active: bool| {
            Module::new(ModuleId::new(id), name, name, i32::try_from(id).unwrap_or(0), is_active)
                .unwrap_or_else(|error| panic!("invalid test module: {error}"))
        };

        let mut fixture = Self {
            access: FakeAccessControlRepository {
                modules: vec![
                    module(EMPLOYEE_MODULE, "Employee", true),
                    module(DOCUMENT_MODULE, "Document", true),
                    module(PAYROLL_MODULE, "Payroll", false),
                    module(ROLE_MODULE, "Role", true),
                ],
                ..FakeAccessControlRepository::default()
            },
            hierarchy: FakeHierarchyRepository::default(),
            next_record_id: 1,
        };

        let hierarchy = &mut fixture.hierarchy;
        hierarchy
            .organizations
            .insert(Organization::root(OrganizationId::new(1)));
        hierarchy.organizations.insert(Organization::new(
            OrganizationId::new(2),
            OrganizationId::new(1),
            1,
        ));
        hierarchy
            .organizations
            .insert(Organization::root(OrganizationId::new(3)));

        hierarchy
            .positions
            .insert(Position::root(PositionId::new(1), OrganizationId::new(1)));
        hierarchy.positions.insert(Position::new(
            PositionId::new(2),
            PositionId::new(1),
            OrganizationId::new(1),
            1,
        ));
        hierarchy.positions.insert(Position::new(
            PositionId::new(3),
            PositionId::new(2),
            OrganizationId::new(1),
            2,
        ));
        hierarchy
            .positions
            .insert(Position::root(PositionId::new(4), OrganizationId::new(2)));
        hierarchy
            .positions
            .insert(Position::root(PositionId::new(5), OrganizationId::new(3)));

        fixture
    }

    fn next_id(&mut self) -> i64 {
        let id = self.next_record_id;
        self.next_record_id += 1;
        id
    }

    pub(crate) fn employee(&mut self, id: i64, position: Option<i64>) {
        let actor_id = actor(id);
        self.access.actors.insert(
            actor_id,
            ActorRecord {
                actor_id,
                is_administrator: false,
            },
        );
        if let Some(position) = position {
            self.place(id, position, 1, None);
        }
    }

    pub(crate) fn administrator(&mut self, id: i64) {
        let actor_id = actor(id);
        self.access.actors.insert(
            actor_id,
            ActorRecord {
                actor_id,
                is_administrator: true,
            },
        );
    }

    pub(crate) fn place(&mut self, id: i64, position: i64, start_day: u32, end_day: Option<u32>) {
        let date = |day: u32| {
            NaiveDate::from_ymd_opt(2025, 1, day).unwrap_or_else(|| panic!("invalid test date"))
        };
        self.hierarchy
            .position_assignments
            .entry(actor(id))
            .or_default()
            .push(PositionAssignment {
                employee_id: actor(id),
                position_id: PositionId::new(position),
                start_date: date(start_day),
                end_date: end_day.map(date),
            });
    }

    pub(crate) fn role(&mut self, role_id: i64, name: &str, status: RecordStatus) {
        let role = Role::new(RoleId::new(role_id), name, None, status)
            .unwrap_or_else(|error| panic!("invalid test role: {error}"));
        lock(&self.access.roles).insert(RoleId::new(role_id), role);
    }

    pub(crate) fn grant(
        &mut self,
        role_id: i64,
        module_id: i64,
        actions: ActionFlags,
        scope: DataScope,
        hierarchy: HierarchyAccess,
    ) {
        self.grant_with_status(
            role_id,
            module_id,
            actions,
            scope,
            hierarchy,
            RecordStatus::EFFECTIVE,
        );
    }

    pub(crate) fn grant_with_status(
        &mut self,
        role_id: i64,
        module_id: i64,
        actions: ActionFlags,
        scope: DataScope,
        hierarchy: HierarchyAccess,
        status: RecordStatus,
    ) {
        let permission_id = self.next_id();
        lock(&self.access.permissions)
            .entry(RoleId::new(role_id))
            .or_default()
            .push(ModulePermission::new(
                PermissionId::new(permission_id),
                RoleId::new(role_id),
                ModuleId::new(module_id),
                actions,
                scope,
                hierarchy,
                status,
            ));
    }

    pub(crate) fn assign(&mut self, employee: i64, role_id: i64, day: u32) {
        let assignment_id = self.next_id();
        let assigned_at = Utc
            .with_ymd_and_hms(2025, 1, day, 9, 0, 0)
            .single()
            .unwrap_or_else(|| panic!("invalid test timestamp"));
        lock(&self.access.assignments)
            .entry(actor(employee))
            .or_default()
            .push(EmployeeRole::new(
                RoleAssignmentId::new(assignment_id),
                actor(employee),
                RoleId::new(role_id),
                None,
                None,
                assigned_at,
                RecordStatus::EFFECTIVE,
            ));
    }

    pub(crate) fn build(self) -> (AuthorizationService, Arc<FakeAccessControlRepository>) {
        self.build_with(AuthorizationSettings::default())
    }

    pub(crate) fn build_with(
        self,
        settings: AuthorizationSettings,
    ) -> (AuthorizationService, Arc<FakeAccessControlRepository>) {
        self.build_with_cache_store(settings, Arc::new(FakePermissionCacheStore::default()))
    }

    pub(crate) fn build_with_cache_store(
        self,
        settings: AuthorizationSettings,
        cache_store: Arc<dyn PermissionCacheStore>,
    ) -> (AuthorizationService, Arc<FakeAccessControlRepository>) {
        let access = Arc::new(self.access);
        let service =
            AuthorizationService::new(access.clone(), Arc::new(self.hierarchy), cache_store, settings);
        (service, access)
    }
}
