use std::sync::Arc;

use chrono::{NaiveDate, TimeZone, Utc};
use orgauthz_application::{
    AccessControlRepository, AssignRoleInput, AuthorizationService, AuthorizationSettings,
    DataTarget, RoleAdminRepository, SaveModulePermissionInput,
};
use orgauthz_core::{ActorId, AppError};
use orgauthz_domain::{
    Action, ActionFlags, ActorRecord, DataScope, EmployeeRole, HierarchyAccess, Module, ModuleId,
    ModulePermission, Organization, OrganizationId, PermissionId, Position, PositionAssignment,
    PositionId, RecordStatus, Role, RoleAssignmentId, RoleId,
};

use super::InMemoryAccessControlStore;
use crate::InMemoryPermissionCache;

fn actor(value: i64) -> ActorId {
    ActorId::new(value).unwrap_or_else(|error| panic!("invalid actor id: {error}"))
}

/// Employee 10 at root position 1, employee 20 at position 2 below it; both
/// hold Supervisor (Employee.view, position_tree, subordinates).
async fn seeded_store() -> Arc<InMemoryAccessControlStore> {
    let store = Arc::new(InMemoryAccessControlStore::new());
    let organization = OrganizationId::new(1);
    store.save_organization(Organization::root(organization)).await;
    store
        .save_position(Position::root(PositionId::new(1), organization))
        .await;
    store
        .save_position(Position::new(
            PositionId::new(2),
            PositionId::new(1),
            organization,
            1,
        ))
        .await;

    let module = Module::new(ModuleId::new(1), "Employee", "Employees", 10, true)
        .unwrap_or_else(|error| panic!("invalid module: {error}"));
    store.save_module(module).await;
    let role = Role::new(RoleId::new(1), "Supervisor", None, RecordStatus::EFFECTIVE)
        .unwrap_or_else(|error| panic!("invalid role: {error}"));
    store.save_role(role).await;
    store
        .save_permission(ModulePermission::new(
            PermissionId::new(1),
            RoleId::new(1),
            ModuleId::new(1),
            ActionFlags {
                can_view: true,
                ..ActionFlags::default()
            },
            DataScope::PositionTree,
            HierarchyAccess {
                can_access_subordinates: true,
                ..HierarchyAccess::default()
            },
            RecordStatus::EFFECTIVE,
        ))
        .await;

    let start = NaiveDate::from_ymd_opt(2025, 1, 1)
        .unwrap_or_else(|| panic!("invalid start date"));
    let assigned_at = Utc
        .with_ymd_and_hms(2025, 1, 1, 9, 0, 0)
        .single()
        .unwrap_or_else(|| panic!("invalid assignment timestamp"));
    for (employee, position, assignment) in [(10, 1, 1), (20, 2, 2)] {
        store
            .save_actor(ActorRecord {
                actor_id: actor(employee),
                is_administrator: false,
            })
            .await;
        store
            .save_position_assignment(PositionAssignment {
                employee_id: actor(employee),
                position_id: PositionId::new(position),
                start_date: start,
                end_date: None,
            })
            .await;
        store
            .save_role_assignment(EmployeeRole::new(
                RoleAssignmentId::new(assignment),
                actor(employee),
                RoleId::new(1),
                None,
                None,
                assigned_at,
                RecordStatus::EFFECTIVE,
            ))
            .await;
    }

    store
}

fn authorization(store: &Arc<InMemoryAccessControlStore>) -> AuthorizationService {
    AuthorizationService::new(
        store.clone(),
        store.clone(),
        Arc::new(InMemoryPermissionCache::new()),
        AuthorizationSettings::default(),
    )
}

#[tokio::test]
async fn supervisor_reaches_subordinate_but_not_the_reverse() {
    let store = seeded_store().await;
    let service = authorization(&store);

    let down = service
        .can_access_data(actor(10), "Employee", &DataTarget::actor(actor(20)))
        .await;
    let up = service
        .can_access_data(actor(20), "Employee", &DataTarget::actor(actor(10)))
        .await;

    assert!(matches!(down, Ok(true)));
    assert!(matches!(up, Ok(false)));
}

#[tokio::test]
async fn replacing_an_assignment_deactivates_the_previous_one() {
    let store = seeded_store().await;
    let role = Role::new(RoleId::new(2), "Staff", None, RecordStatus::EFFECTIVE)
        .unwrap_or_else(|error| panic!("invalid role: {error}"));
    store.save_role(role).await;

    let assignment = store
        .replace_active_role_assignment(AssignRoleInput {
            employee_id: actor(10),
            role_id: RoleId::new(2),
            organization_id: None,
            position_id: None,
        })
        .await
        .unwrap_or_else(|error| panic!("assignment failed: {error}"));

    let rows = store
        .list_role_assignments(actor(10))
        .await
        .unwrap_or_else(|error| panic!("listing failed: {error}"));
    let effective: Vec<&EmployeeRole> = rows
        .iter()
        .filter(|row| row.status().is_effective())
        .collect();

    assert_eq!(rows.len(), 2);
    assert_eq!(effective.len(), 1);
    assert_eq!(effective[0].assignment_id(), assignment.assignment_id());
    assert!(assignment.assignment_id().as_i64() > 2);
}

#[tokio::test]
async fn assigning_unknown_role_or_employee_is_not_found() {
    let store = seeded_store().await;

    let unknown_role = store
        .replace_active_role_assignment(AssignRoleInput {
            employee_id: actor(10),
            role_id: RoleId::new(404),
            organization_id: None,
            position_id: None,
        })
        .await;
    let unknown_employee = store
        .replace_active_role_assignment(AssignRoleInput {
            employee_id: actor(404),
            role_id: RoleId::new(1),
            organization_id: None,
            position_id: None,
        })
        .await;

    assert!(matches!(unknown_role, Err(AppError::NotFound(_))));
    assert!(matches!(unknown_employee, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn upsert_keeps_one_effective_permission_per_module() {
    let store = seeded_store().await;

    let saved = store
        .upsert_module_permission(SaveModulePermissionInput {
            role_id: RoleId::new(1),
            module_name: "Employee".to_owned(),
            actions: ActionFlags {
                can_view: true,
                can_edit: true,
                ..ActionFlags::default()
            },
            scope: DataScope::Organization,
            hierarchy: HierarchyAccess::default(),
        })
        .await
        .unwrap_or_else(|error| panic!("upsert failed: {error}"));

    let rows = store
        .list_role_permissions(RoleId::new(1))
        .await
        .unwrap_or_else(|error| panic!("listing failed: {error}"));
    let effective: Vec<&ModulePermission> = rows
        .iter()
        .filter(|row| row.status().is_effective())
        .collect();

    assert_eq!(effective.len(), 1);
    assert_eq!(effective[0].permission_id(), saved.permission_id());
    assert_eq!(effective[0].scope(), DataScope::Organization);

    let unknown_module = store
        .upsert_module_permission(SaveModulePermissionInput {
            role_id: RoleId::new(1),
            module_name: "Payroll".to_owned(),
            actions: ActionFlags::default(),
            scope: DataScope::Own,
            hierarchy: HierarchyAccess::default(),
        })
        .await;
    assert!(matches!(unknown_module, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn deleted_role_stays_readable_but_ineffective() {
    let store = seeded_store().await;

    assert!(store.soft_delete_role(RoleId::new(1)).await.is_ok());
    let again = store.soft_delete_role(RoleId::new(1)).await;
    assert!(matches!(again, Err(AppError::NotFound(_))));

    let role = store
        .find_role(RoleId::new(1))
        .await
        .unwrap_or_else(|error| panic!("lookup failed: {error}"));
    assert!(role.is_some_and(|role| !role.status().is_effective()));

    let service = authorization(&store);
    let allowed = service
        .has_permission(actor(10), "Employee", Action::View)
        .await;
    assert!(matches!(allowed, Ok(false)));
}

#[tokio::test]
async fn active_assignees_lists_each_holder_once() {
    let store = seeded_store().await;

    let assignees = store
        .list_active_assignees(RoleId::new(1))
        .await
        .unwrap_or_else(|error| panic!("listing failed: {error}"));
    assert_eq!(assignees, vec![actor(10), actor(20)]);

    let revoked = store.deactivate_role_assignments(actor(20)).await;
    assert!(matches!(revoked, Ok(1)));

    let assignees = store
        .list_active_assignees(RoleId::new(1))
        .await
        .unwrap_or_else(|error| panic!("listing failed: {error}"));
    assert_eq!(assignees, vec![actor(10)]);
}
