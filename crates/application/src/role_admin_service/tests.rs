use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use orgauthz_core::{ActorId, ActorIdentity, AppError, AppResult};
use orgauthz_domain::{
    Action, ActionFlags, DataScope, EmployeeRole, HierarchyAccess, ModulePermission,
    PermissionId, RecordStatus, Role, RoleAssignmentId, RoleId,
};

use super::RoleAdminService;
use crate::test_support::{
    EMPLOYEE_MODULE, FakeAccessControlRepository, Fixture, ROLE_MODULE, actor, lock,
    no_hierarchy, view_only,
};
use crate::{AssignRoleInput, RoleAdminRepository, SaveModulePermissionInput};

const STAFF: i64 = 1;
const MANAGER: i64 = 2;
const ROLE_EDITOR: i64 = 3;

struct FakeRoleAdminRepository {
    records: Arc<FakeAccessControlRepository>,
    next_id: AtomicI64,
}

impl FakeRoleAdminRepository {
    fn new(records: Arc<FakeAccessControlRepository>) -> Self {
        Self {
            records,
            next_id: AtomicI64::new(1_000),
        }
    }

    fn next_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }
}

const INACTIVE: RecordStatus = RecordStatus {
    is_active: false,
    is_deleted: false,
};

const DELETED: RecordStatus = RecordStatus {
    is_active: true,
    is_deleted: true,
};

#[async_trait]
impl RoleAdminRepository for FakeRoleAdminRepository {
    async fn replace_active_role_assignment(
        &self,
        input: AssignRoleInput,
    ) -> AppResult<EmployeeRole> {
        let assignment = EmployeeRole::new(
            RoleAssignmentId::new(self.next_id()),
            input.employee_id,
            input.role_id,
            input.organization_id,
            input.position_id,
            Utc::now(),
            RecordStatus::EFFECTIVE,
        );

        let mut assignments = lock(&self.records.assignments);
        let rows = assignments.entry(input.employee_id).or_default();
        for row in rows.iter_mut() {
            *row = row.clone().with_status(INACTIVE);
        }
        rows.push(assignment.clone());

        Ok(assignment)
    }

    async fn deactivate_role_assignments(&self, employee_id: ActorId) -> AppResult<u64> {
        let mut assignments = lock(&self.records.assignments);
        let mut changed = 0;
        for row in assignments.entry(employee_id).or_default().iter_mut() {
            if row.status().is_effective() {
                *row = row.clone().with_status(INACTIVE);
                changed += 1;
            }
        }

        Ok(changed)
    }

    async fn upsert_module_permission(
        &self,
        input: SaveModulePermissionInput,
    ) -> AppResult<ModulePermission> {
        let module = self
            .records
            .modules
            .iter()
            .find(|module| module.name() == input.module_name)
            .ok_or_else(|| AppError::NotFound(format!("module '{}'", input.module_name)))?;

        let permission = ModulePermission::new(
            PermissionId::new(self.next_id()),
            input.role_id,
            module.module_id(),
            input.actions,
            input.scope,
            input.hierarchy,
            RecordStatus::EFFECTIVE,
        );

        let mut permissions = lock(&self.records.permissions);
        let rows = permissions.entry(input.role_id).or_default();
        rows.retain(|row| row.module_id() != module.module_id());
        rows.push(permission.clone());

        Ok(permission)
    }

    async fn soft_delete_module_permission(
        &self,
        role_id: RoleId,
        module_name: &str,
    ) -> AppResult<()> {
        let module_id = self
            .records
            .modules
            .iter()
            .find(|module| module.name() == module_name)
            .map(|module| module.module_id())
            .ok_or_else(|| AppError::NotFound(format!("module '{module_name}'")))?;

        let mut permissions = lock(&self.records.permissions);
        let rows = permissions.entry(role_id).or_default();
        let Some(position) = rows.iter().position(|row| row.module_id() == module_id) else {
            return Err(AppError::NotFound(format!(
                "permission of role '{role_id}' on '{module_name}'"
            )));
        };
        let row = rows.remove(position);
        rows.push(row.with_status(DELETED));

        Ok(())
    }

    async fn set_role_active(&self, role_id: RoleId, is_active: bool) -> AppResult<Role> {
        let mut roles = lock(&self.records.roles);
        let role = roles
            .get_mut(&role_id)
            .ok_or_else(|| AppError::NotFound(format!("role '{role_id}'")))?;
        let status = RecordStatus {
            is_active,
            is_deleted: role.status().is_deleted,
        };
        *role = role.clone().with_status(status);

        Ok(role.clone())
    }

    async fn soft_delete_role(&self, role_id: RoleId) -> AppResult<()> {
        let mut roles = lock(&self.records.roles);
        let role = roles
            .get_mut(&role_id)
            .ok_or_else(|| AppError::NotFound(format!("role '{role_id}'")))?;
        *role = role.clone().with_status(DELETED);

        Ok(())
    }

    async fn list_active_assignees(&self, role_id: RoleId) -> AppResult<Vec<ActorId>> {
        let assignments = lock(&self.records.assignments);
        let mut assignees: Vec<ActorId> = assignments
            .values()
            .flatten()
            .filter(|row| row.role_id() == role_id && row.status().is_effective())
            .map(EmployeeRole::employee_id)
            .collect();
        assignees.sort();
        assignees.dedup();

        Ok(assignees)
    }
}

/// Employees 10 and 20 hold Staff (Employee.view, all scope). Employee 30
/// edits roles without deleting them; 99 is an administrator.
fn build() -> (
    RoleAdminService,
    crate::AuthorizationService,
    Arc<FakeAccessControlRepository>,
) {
    let mut fixture = Fixture::new();
    fixture.administrator(99);
    for employee in [10, 20, 30] {
        fixture.employee(employee, Some(1));
    }
    fixture.role(STAFF, "Staff", RecordStatus::EFFECTIVE);
    fixture.grant(STAFF, EMPLOYEE_MODULE, view_only(), DataScope::All, no_hierarchy());
    fixture.role(MANAGER, "Manager", RecordStatus::EFFECTIVE);
    fixture.grant(
        MANAGER,
        EMPLOYEE_MODULE,
        ActionFlags {
            can_view: true,
            can_edit: true,
            ..ActionFlags::default()
        },
        DataScope::All,
        no_hierarchy(),
    );
    fixture.role(ROLE_EDITOR, "RoleEditor", RecordStatus::EFFECTIVE);
    fixture.grant(
        ROLE_EDITOR,
        ROLE_MODULE,
        ActionFlags {
            can_view: true,
            can_edit: true,
            ..ActionFlags::default()
        },
        DataScope::All,
        no_hierarchy(),
    );
    fixture.assign(10, STAFF, 1);
    fixture.assign(20, STAFF, 1);
    fixture.assign(30, ROLE_EDITOR, 1);

    let (authorization, records) = fixture.build();
    let service = RoleAdminService::new(
        authorization.clone(),
        Arc::new(FakeRoleAdminRepository::new(records.clone())),
    );
    (service, authorization, records)
}

fn identity(value: i64) -> ActorIdentity {
    ActorIdentity::new(actor(value))
}

async fn can(
    authorization: &crate::AuthorizationService,
    employee: i64,
    action: Action,
) -> bool {
    authorization
        .has_permission(actor(employee), "Employee", action)
        .await
        .unwrap_or_else(|error| panic!("permission check failed: {error}"))
}

#[tokio::test]
async fn assign_role_takes_effect_on_next_check() {
    let (service, authorization, _) = build();
    assert!(!can(&authorization, 10, Action::Edit).await);

    let assignment = service
        .assign_role(
            &identity(99),
            AssignRoleInput {
                employee_id: actor(10),
                role_id: RoleId::new(MANAGER),
                organization_id: None,
                position_id: None,
            },
        )
        .await
        .unwrap_or_else(|error| panic!("assign failed: {error}"));

    assert_eq!(assignment.role_id(), RoleId::new(MANAGER));
    assert!(can(&authorization, 10, Action::Edit).await);
}

#[tokio::test]
async fn saving_a_permission_refreshes_every_holder() {
    let (service, authorization, _) = build();
    assert!(!can(&authorization, 10, Action::Delete).await);
    assert!(!can(&authorization, 20, Action::Delete).await);

    let saved = service
        .save_module_permission(
            &identity(30),
            SaveModulePermissionInput {
                role_id: RoleId::new(STAFF),
                module_name: "Employee".to_owned(),
                actions: ActionFlags {
                    can_view: true,
                    can_delete: true,
                    ..ActionFlags::default()
                },
                scope: DataScope::Own,
                hierarchy: HierarchyAccess::default(),
            },
        )
        .await;

    assert!(saved.is_ok());
    assert!(can(&authorization, 10, Action::Delete).await);
    assert!(can(&authorization, 20, Action::Delete).await);
}

#[tokio::test]
async fn deleting_a_permission_revokes_it_from_holders() {
    let (service, authorization, _) = build();
    assert!(can(&authorization, 10, Action::View).await);

    let deleted = service
        .delete_module_permission(&identity(99), RoleId::new(STAFF), "Employee")
        .await;

    assert!(deleted.is_ok());
    assert!(!can(&authorization, 10, Action::View).await);
}

#[tokio::test]
async fn deactivating_and_deleting_roles_strip_holders() {
    let (service, authorization, _) = build();
    assert!(can(&authorization, 10, Action::View).await);

    let role = service
        .set_role_active(&identity(30), RoleId::new(STAFF), false)
        .await
        .unwrap_or_else(|error| panic!("deactivate failed: {error}"));
    assert!(!role.status().is_active);
    assert!(!can(&authorization, 10, Action::View).await);

    let reactivated = service
        .set_role_active(&identity(30), RoleId::new(STAFF), true)
        .await;
    assert!(reactivated.is_ok());
    assert!(can(&authorization, 20, Action::View).await);

    let deleted = service.delete_role(&identity(99), RoleId::new(STAFF)).await;
    assert!(deleted.is_ok());
    assert!(!can(&authorization, 20, Action::View).await);
}

#[tokio::test]
async fn revoking_assignments_denies_the_employee() {
    let (service, authorization, _) = build();
    assert!(can(&authorization, 20, Action::View).await);

    let revoked = service
        .revoke_role_assignment(&identity(99), actor(20))
        .await;

    assert!(matches!(revoked, Ok(1)));
    assert!(!can(&authorization, 20, Action::View).await);
}

#[tokio::test]
async fn mutations_require_the_matching_role_action() {
    let (service, _, records) = build();

    let by_staff = service
        .set_role_active(&identity(10), RoleId::new(STAFF), false)
        .await;
    assert!(matches!(by_staff, Err(AppError::Forbidden(_))));

    let delete_by_editor = service.delete_role(&identity(30), RoleId::new(STAFF)).await;
    assert!(matches!(delete_by_editor, Err(AppError::Forbidden(_))));

    let assign_by_editor = service
        .assign_role(
            &identity(30),
            AssignRoleInput {
                employee_id: actor(30),
                role_id: RoleId::new(MANAGER),
                organization_id: None,
                position_id: None,
            },
        )
        .await;
    assert!(matches!(assign_by_editor, Err(AppError::Forbidden(_))));

    let staff_role = lock(&records.roles).get(&RoleId::new(STAFF)).cloned();
    assert!(staff_role.is_some_and(|role| role.status().is_effective()));
}
