use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool};

use orgauthz_application::{
    AccessControlRepository, AssignRoleInput, HierarchyRepository, RoleAdminRepository,
    SaveModulePermissionInput,
};
use orgauthz_core::{ActorId, AppError, AppResult};
use orgauthz_domain::{
    ActionFlags, ActorRecord, DataScope, EmployeeRole, HierarchyAccess, Module, ModuleId,
    ModulePermission, Organization, OrganizationId, PermissionId, Position, PositionAssignment,
    PositionId, RecordStatus, Role, RoleAssignmentId, RoleId,
};

mod hierarchy;
mod permissions;
mod role_admin;


/// PostgreSQL-backed store for access-control and hierarchy records.
#[derive(Clone)]
pub struct PostgresAccessControlStore {
    pool: PgPool,
}

impl PostgresAccessControlStore {
    /// Creates a store with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn stored_actor_id(value: i64) -> AppResult<ActorId> {
    ActorId::new(value).map_err(|error| {
        AppError::Internal(format!("stored employee id '{value}' is invalid: {error}"))
    })
}

#[derive(Debug, FromRow)]
struct ActorRow {
    id: i64,
    is_administrator: bool,
}

impl TryFrom<ActorRow> for ActorRecord {
    type Error = AppError;

    fn try_from(row: ActorRow) -> Result<Self, Self::Error> {
        Ok(Self {
            actor_id: stored_actor_id(row.id)?,
            is_administrator: row.is_administrator,
        })
    }
}

#[derive(Debug, FromRow)]
struct ModuleRow {
    id: i64,
    name: String,
    display_label: String,
    sort_order: i32,
    is_active: bool,
}

impl TryFrom<ModuleRow> for Module {
    type Error = AppError;

    fn try_from(row: ModuleRow) -> Result<Self, Self::Error> {
        Module::new(
            ModuleId::new(row.id),
            row.name,
            row.display_label,
            row.sort_order,
            row.is_active,
        )
        .map_err(|error| AppError::Internal(format!("invalid module '{}': {error}", row.id)))
    }
}

#[derive(Debug, FromRow)]
struct RoleRow {
    id: i64,
    name: String,
    description: Option<String>,
    is_active: bool,
    is_deleted: bool,
}

impl TryFrom<RoleRow> for Role {
    type Error = AppError;

    fn try_from(row: RoleRow) -> Result<Self, Self::Error> {
        Role::new(
            RoleId::new(row.id),
            row.name,
            row.description,
            RecordStatus {
                is_active: row.is_active,
                is_deleted: row.is_deleted,
            },
        )
        .map_err(|error| AppError::Internal(format!("invalid role '{}': {error}", row.id)))
    }
}

#[derive(Debug, FromRow)]
struct PermissionRow {
    id: i64,
    role_id: i64,
    module_id: i64,
    can_create: bool,
    can_view: bool,
    can_edit: bool,
    can_delete: bool,
    data_scope: String,
    can_access_subordinates: bool,
    can_access_parent_org: bool,
    can_access_child_org: bool,
    is_active: bool,
    is_deleted: bool,
}

impl TryFrom<PermissionRow> for ModulePermission {
    type Error = AppError;

    fn try_from(row: PermissionRow) -> Result<Self, Self::Error> {
        let scope = DataScope::from_str(row.data_scope.as_str()).map_err(|error| {
            AppError::Internal(format!(
                "failed to decode data scope for permission '{}': {error}",
                row.id
            ))
        })?;

        Ok(ModulePermission::new(
            PermissionId::new(row.id),
            RoleId::new(row.role_id),
            ModuleId::new(row.module_id),
            ActionFlags {
                can_create: row.can_create,
                can_view: row.can_view,
                can_edit: row.can_edit,
                can_delete: row.can_delete,
            },
            scope,
            HierarchyAccess {
                can_access_subordinates: row.can_access_subordinates,
                can_access_parent_org: row.can_access_parent_org,
                can_access_child_org: row.can_access_child_org,
            },
            RecordStatus {
                is_active: row.is_active,
                is_deleted: row.is_deleted,
            },
        ))
    }
}

#[derive(Debug, FromRow)]
struct EmployeeRoleRow {
    id: i64,
    employee_id: i64,
    role_id: i64,
    organization_id: Option<i64>,
    position_id: Option<i64>,
    assigned_at: DateTime<Utc>,
    is_active: bool,
    is_deleted: bool,
}

impl TryFrom<EmployeeRoleRow> for EmployeeRole {
    type Error = AppError;

    fn try_from(row: EmployeeRoleRow) -> Result<Self, Self::Error> {
        Ok(EmployeeRole::new(
            RoleAssignmentId::new(row.id),
            stored_actor_id(row.employee_id)?,
            RoleId::new(row.role_id),
            row.organization_id.map(OrganizationId::new),
            row.position_id.map(PositionId::new),
            row.assigned_at,
            RecordStatus {
                is_active: row.is_active,
                is_deleted: row.is_deleted,
            },
        ))
    }
}

#[derive(Debug, FromRow)]
struct OrganizationRow {
    id: i64,
    parent_organization_id: i64,
    level: i32,
}

impl From<OrganizationRow> for Organization {
    fn from(row: OrganizationRow) -> Self {
        Organization::new(
            OrganizationId::new(row.id),
            OrganizationId::new(row.parent_organization_id),
            row.level,
        )
    }
}

#[derive(Debug, FromRow)]
struct PositionRow {
    id: i64,
    parent_position_id: i64,
    organization_id: i64,
    level: i32,
}

impl From<PositionRow> for Position {
    fn from(row: PositionRow) -> Self {
        Position::new(
            PositionId::new(row.id),
            PositionId::new(row.parent_position_id),
            OrganizationId::new(row.organization_id),
            row.level,
        )
    }
}

#[derive(Debug, FromRow)]
struct PositionAssignmentRow {
    employee_id: i64,
    position_id: i64,
    start_date: NaiveDate,
    end_date: Option<NaiveDate>,
}

impl TryFrom<PositionAssignmentRow> for PositionAssignment {
    type Error = AppError;

    fn try_from(row: PositionAssignmentRow) -> Result<Self, Self::Error> {
        Ok(PositionAssignment {
            employee_id: stored_actor_id(row.employee_id)?,
            position_id: PositionId::new(row.position_id),
            start_date: row.start_date,
            end_date: row.end_date,
        })
    }
}
