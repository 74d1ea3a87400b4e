//! Demo organization loaded into the in-memory access store.
//!
//! Headquarters (1) owns the Branch office (2). The reporting tree is
//! Director (P1) <- Manager (P2) <- Clerk (P3) at headquarters and a
//! standalone Branch lead (P4).
//!
//! | Employee | Position | Role |
//! |---|---|---|
//! | 1 | none | administrator |
//! | 10 | P1 | SecurityOfficer |
//! | 20 | P2 | Supervisor |
//! | 30 | P3 | Staff |
//! | 40 | P4 | Staff |

use chrono::{NaiveDate, Utc};
use orgauthz_core::{ActorId, AppError, AppResult};
use orgauthz_domain::{
    ActionFlags, ActorRecord, DataScope, EmployeeRole, HierarchyAccess, Module, ModuleId,
    ModulePermission, Organization, OrganizationId, PermissionId, Position, PositionAssignment,
    PositionId, RecordStatus, Role, RoleAssignmentId, RoleId,
};
use orgauthz_infrastructure::InMemoryAccessControlStore;

pub const HEADQUARTERS: i64 = 1;
pub const BRANCH: i64 = 2;

pub const ADMINISTRATOR: i64 = 1;
pub const SECURITY_OFFICER: i64 = 10;
pub const MANAGER: i64 = 20;
pub const CLERK: i64 = 30;
pub const BRANCH_LEAD: i64 = 40;

pub const SECURITY_OFFICER_ROLE: i64 = 1;
pub const SUPERVISOR_ROLE: i64 = 2;
pub const STAFF_ROLE: i64 = 3;

const EMPLOYEE_MODULE: i64 = 1;
const DOCUMENT_MODULE: i64 = 2;
const ROLE_MODULE: i64 = 3;

const ALL_ACTIONS: ActionFlags = ActionFlags {
    can_create: true,
    can_view: true,
    can_edit: true,
    can_delete: true,
};

pub async fn seed_demo_organization(store: &InMemoryAccessControlStore) -> AppResult<()> {
    seed_hierarchy(store).await?;
    seed_roles(store).await?;

    let assignments = [
        (SECURITY_OFFICER, SECURITY_OFFICER_ROLE),
        (MANAGER, SUPERVISOR_ROLE),
        (CLERK, STAFF_ROLE),
        (BRANCH_LEAD, STAFF_ROLE),
    ];
    for (index, (employee, role)) in (1_i64..).zip(assignments) {
        store
            .save_role_assignment(EmployeeRole::new(
                RoleAssignmentId::new(index),
                ActorId::new(employee)?,
                RoleId::new(role),
                None,
                None,
                Utc::now(),
                RecordStatus::EFFECTIVE,
            ))
            .await;
    }

    Ok(())
}

async fn seed_hierarchy(store: &InMemoryAccessControlStore) -> AppResult<()> {
    let headquarters = OrganizationId::new(HEADQUARTERS);
    let branch = OrganizationId::new(BRANCH);
    store.save_organization(Organization::root(headquarters)).await;
    store
        .save_organization(Organization::new(branch, headquarters, 1))
        .await;

    store
        .save_position(Position::root(PositionId::new(1), headquarters))
        .await;
    store
        .save_position(Position::new(
            PositionId::new(2),
            PositionId::new(1),
            headquarters,
            1,
        ))
        .await;
    store
        .save_position(Position::new(
            PositionId::new(3),
            PositionId::new(2),
            headquarters,
            2,
        ))
        .await;
    store
        .save_position(Position::root(PositionId::new(4), branch))
        .await;

    let start_date = NaiveDate::from_ymd_opt(2024, 1, 1)
        .ok_or_else(|| AppError::Internal("invalid demo start date".to_owned()))?;

    store
        .save_actor(ActorRecord {
            actor_id: ActorId::new(ADMINISTRATOR)?,
            is_administrator: true,
        })
        .await;
    for (employee, position) in [
        (SECURITY_OFFICER, 1),
        (MANAGER, 2),
        (CLERK, 3),
        (BRANCH_LEAD, 4),
    ] {
        let employee_id = ActorId::new(employee)?;
        store
            .save_actor(ActorRecord {
                actor_id: employee_id,
                is_administrator: false,
            })
            .await;
        store
            .save_position_assignment(PositionAssignment {
                employee_id,
                position_id: PositionId::new(position),
                start_date,
                end_date: None,
            })
            .await;
    }

    Ok(())
}

async fn seed_roles(store: &InMemoryAccessControlStore) -> AppResult<()> {
    for (module_id, name, sort_order) in [
        (EMPLOYEE_MODULE, "Employee", 10),
        (DOCUMENT_MODULE, "Document", 20),
        (ROLE_MODULE, "Role", 30),
    ] {
        store
            .save_module(Module::new(
                ModuleId::new(module_id),
                name,
                name,
                sort_order,
                true,
            )?)
            .await;
    }

    for (role_id, name, description) in [
        (
            SECURITY_OFFICER_ROLE,
            "SecurityOfficer",
            "Maintains roles and assignments",
        ),
        (SUPERVISOR_ROLE, "Supervisor", "Manages a reporting line"),
        (STAFF_ROLE, "Staff", "Regular employee"),
    ] {
        store
            .save_role(Role::new(
                RoleId::new(role_id),
                name,
                Some(description.to_owned()),
                RecordStatus::EFFECTIVE,
            )?)
            .await;
    }

    let view = ActionFlags {
        can_view: true,
        ..ActionFlags::default()
    };
    let grants = [
        (
            SECURITY_OFFICER_ROLE,
            ROLE_MODULE,
            ALL_ACTIONS,
            DataScope::All,
            HierarchyAccess::default(),
        ),
        (
            SECURITY_OFFICER_ROLE,
            EMPLOYEE_MODULE,
            view,
            DataScope::All,
            HierarchyAccess::default(),
        ),
        (
            SUPERVISOR_ROLE,
            EMPLOYEE_MODULE,
            ActionFlags {
                can_view: true,
                can_edit: true,
                ..ActionFlags::default()
            },
            DataScope::PositionTree,
            HierarchyAccess {
                can_access_subordinates: true,
                ..HierarchyAccess::default()
            },
        ),
        (
            SUPERVISOR_ROLE,
            DOCUMENT_MODULE,
            ActionFlags {
                can_create: true,
                can_view: true,
                ..ActionFlags::default()
            },
            DataScope::Organization,
            HierarchyAccess {
                can_access_child_org: true,
                ..HierarchyAccess::default()
            },
        ),
        (
            STAFF_ROLE,
            EMPLOYEE_MODULE,
            view,
            DataScope::Own,
            HierarchyAccess::default(),
        ),
        (
            STAFF_ROLE,
            DOCUMENT_MODULE,
            view,
            DataScope::Organization,
            HierarchyAccess::default(),
        ),
    ];
    for (index, (role_id, module_id, actions, scope, hierarchy)) in (1_i64..).zip(grants) {
        store
            .save_permission(ModulePermission::new(
                PermissionId::new(index),
                RoleId::new(role_id),
                ModuleId::new(module_id),
                actions,
                scope,
                hierarchy,
                RecordStatus::EFFECTIVE,
            ))
            .await;
    }

    Ok(())
}
