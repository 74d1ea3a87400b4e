//! Role, module, and permission records read by the authorization engine.
//!
//! Every record carries a [`RecordStatus`]; callers decide relevance through
//! [`RecordStatus::is_effective`] instead of inspecting the raw flags.

use chrono::{DateTime, Utc};
use orgauthz_core::{ActorId, AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};

use crate::hierarchy::{OrganizationId, PositionId};
use crate::security::{Action, DataScope};

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(i64);

        impl $name {
            /// Wraps a stored identifier value.
            #[must_use]
            pub fn new(value: i64) -> Self {
                Self(value)
            }

            /// Returns the underlying numeric value.
            #[must_use]
            pub fn as_i64(&self) -> i64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(formatter, "{}", self.0)
            }
        }
    };
}

pub(crate) use record_id;

record_id!(
    /// Identifier of a module row.
    ModuleId
);
record_id!(
    /// Identifier of a role row.
    RoleId
);
record_id!(
    /// Identifier of a permission row.
    PermissionId
);
record_id!(
    /// Identifier of an employee-role assignment row.
    RoleAssignmentId
);

/// Activation and soft-delete flags shared by access-control records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordStatus {
    /// Record is switched on.
    pub is_active: bool,
    /// Record was soft-deleted.
    pub is_deleted: bool,
}

impl RecordStatus {
    /// Active, not deleted.
    pub const EFFECTIVE: Self = Self {
        is_active: true,
        is_deleted: false,
    };

    /// Returns whether the record participates in authorization decisions.
    #[must_use]
    pub fn is_effective(&self) -> bool {
        self.is_active && !self.is_deleted
    }
}

impl Default for RecordStatus {
    fn default() -> Self {
        Self::EFFECTIVE
    }
}

/// Named functional area subject to independent permission grants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    module_id: ModuleId,
    name: NonEmptyString,
    display_label: NonEmptyString,
    sort_order: i32,
    is_active: bool,
}

impl Module {
    /// Creates a validated module record.
    pub fn new(
        module_id: ModuleId,
        name: impl Into<String>,
        display_label: impl Into<String>,
        sort_order: i32,
        is_active: bool,
    ) -> AppResult<Self> {
        let name = NonEmptyString::new(name)?;
        if name.as_str().contains('.') {
            return Err(AppError::Validation(format!(
                "module name '{}' must not contain '.'",
                name.as_str()
            )));
        }

        Ok(Self {
            module_id,
            name,
            display_label: NonEmptyString::new(display_label)?,
            sort_order,
            is_active,
        })
    }

    /// Returns the module identifier.
    #[must_use]
    pub fn module_id(&self) -> ModuleId {
        self.module_id
    }

    /// Returns the unique module name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the display label.
    #[must_use]
    pub fn display_label(&self) -> &str {
        self.display_label.as_str()
    }

    /// Returns the sort order used for listings.
    #[must_use]
    pub fn sort_order(&self) -> i32 {
        self.sort_order
    }

    /// Returns the record status. Modules are never soft-deleted.
    #[must_use]
    pub fn status(&self) -> RecordStatus {
        RecordStatus {
            is_active: self.is_active,
            is_deleted: false,
        }
    }
}

/// Named bundle of module permissions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    role_id: RoleId,
    name: NonEmptyString,
    description: Option<String>,
    status: RecordStatus,
}

impl Role {
    /// Creates a validated role record.
    pub fn new(
        role_id: RoleId,
        name: impl Into<String>,
        description: Option<String>,
        status: RecordStatus,
    ) -> AppResult<Self> {
        let description = description.and_then(|value| {
            let trimmed = value.trim().to_owned();
            (!trimmed.is_empty()).then_some(trimmed)
        });

        Ok(Self {
            role_id,
            name: NonEmptyString::new(name)?,
            description,
            status,
        })
    }

    /// Returns the role identifier.
    #[must_use]
    pub fn role_id(&self) -> RoleId {
        self.role_id
    }

    /// Returns the unique role name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the optional description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the record status.
    #[must_use]
    pub fn status(&self) -> RecordStatus {
        self.status
    }

    /// Returns the record with replaced status flags.
    #[must_use]
    pub fn with_status(mut self, status: RecordStatus) -> Self {
        self.status = status;
        self
    }
}

/// CRUD flags of one permission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionFlags {
    /// Create flag.
    pub can_create: bool,
    /// View flag.
    pub can_view: bool,
    /// Edit flag.
    pub can_edit: bool,
    /// Delete flag.
    pub can_delete: bool,
}

impl ActionFlags {
    /// Returns the flag matching one action.
    #[must_use]
    pub fn allows(&self, action: Action) -> bool {
        match action {
            Action::Create => self.can_create,
            Action::View => self.can_view,
            Action::Edit => self.can_edit,
            Action::Delete => self.can_delete,
        }
    }

    /// Returns granted actions in canonical order.
    pub fn granted(&self) -> impl Iterator<Item = Action> + '_ {
        Action::all()
            .iter()
            .copied()
            .filter(|action| self.allows(*action))
    }
}

/// Hierarchical access flags that widen organization and position-tree scopes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HierarchyAccess {
    /// Grants access to positions below the actor's position.
    pub can_access_subordinates: bool,
    /// Grants access to ancestor organizations, and to superior positions
    /// under the position-tree scope.
    pub can_access_parent_org: bool,
    /// Grants access to descendant organizations.
    pub can_access_child_org: bool,
}

/// Grant of one role on one module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModulePermission {
    permission_id: PermissionId,
    role_id: RoleId,
    module_id: ModuleId,
    actions: ActionFlags,
    scope: DataScope,
    hierarchy: HierarchyAccess,
    status: RecordStatus,
}

impl ModulePermission {
    /// Creates a permission record.
    #[must_use]
    pub fn new(
        permission_id: PermissionId,
        role_id: RoleId,
        module_id: ModuleId,
        actions: ActionFlags,
        scope: DataScope,
        hierarchy: HierarchyAccess,
        status: RecordStatus,
    ) -> Self {
        Self {
            permission_id,
            role_id,
            module_id,
            actions,
            scope,
            hierarchy,
            status,
        }
    }

    /// Returns the permission identifier.
    #[must_use]
    pub fn permission_id(&self) -> PermissionId {
        self.permission_id
    }

    /// Returns the owning role.
    #[must_use]
    pub fn role_id(&self) -> RoleId {
        self.role_id
    }

    /// Returns the module the grant applies to.
    #[must_use]
    pub fn module_id(&self) -> ModuleId {
        self.module_id
    }

    /// Returns the CRUD flags.
    #[must_use]
    pub fn actions(&self) -> ActionFlags {
        self.actions
    }

    /// Returns the data scope.
    #[must_use]
    pub fn scope(&self) -> DataScope {
        self.scope
    }

    /// Returns the hierarchical access flags.
    #[must_use]
    pub fn hierarchy(&self) -> HierarchyAccess {
        self.hierarchy
    }

    /// Returns the record status.
    #[must_use]
    pub fn status(&self) -> RecordStatus {
        self.status
    }

    /// Returns the record with replaced status flags.
    #[must_use]
    pub fn with_status(mut self, status: RecordStatus) -> Self {
        self.status = status;
        self
    }
}

/// Binding of an employee to a role, optionally narrowed to an organization
/// or position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeRole {
    assignment_id: RoleAssignmentId,
    employee_id: ActorId,
    role_id: RoleId,
    organization_id: Option<OrganizationId>,
    position_id: Option<PositionId>,
    assigned_at: DateTime<Utc>,
    status: RecordStatus,
}

impl EmployeeRole {
    /// Creates an assignment record.
    #[must_use]
    pub fn new(
        assignment_id: RoleAssignmentId,
        employee_id: ActorId,
        role_id: RoleId,
        organization_id: Option<OrganizationId>,
        position_id: Option<PositionId>,
        assigned_at: DateTime<Utc>,
        status: RecordStatus,
    ) -> Self {
        Self {
            assignment_id,
            employee_id,
            role_id,
            organization_id,
            position_id,
            assigned_at,
            status,
        }
    }

    /// Returns the assignment identifier.
    #[must_use]
    pub fn assignment_id(&self) -> RoleAssignmentId {
        self.assignment_id
    }

    /// Returns the assigned employee.
    #[must_use]
    pub fn employee_id(&self) -> ActorId {
        self.employee_id
    }

    /// Returns the assigned role.
    #[must_use]
    pub fn role_id(&self) -> RoleId {
        self.role_id
    }

    /// Returns the optional organization narrowing.
    #[must_use]
    pub fn organization_id(&self) -> Option<OrganizationId> {
        self.organization_id
    }

    /// Returns the optional position narrowing.
    #[must_use]
    pub fn position_id(&self) -> Option<PositionId> {
        self.position_id
    }

    /// Returns the assignment timestamp.
    #[must_use]
    pub fn assigned_at(&self) -> DateTime<Utc> {
        self.assigned_at
    }

    /// Returns the record status.
    #[must_use]
    pub fn status(&self) -> RecordStatus {
        self.status
    }

    /// Returns the record with replaced status flags.
    #[must_use]
    pub fn with_status(mut self, status: RecordStatus) -> Self {
        self.status = status;
        self
    }
}

/// Picks the single assignment that counts when several are effective.
///
/// The most recently assigned row wins; ties fall back to the highest
/// assignment id so the choice stays deterministic.
#[must_use]
pub fn select_active_assignment(assignments: &[EmployeeRole]) -> Option<&EmployeeRole> {
    assignments
        .iter()
        .filter(|assignment| assignment.status().is_effective())
        .max_by_key(|assignment| (assignment.assigned_at(), assignment.assignment_id()))
}

/// Actor record projection the engine needs: the administrator flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorRecord {
    /// Actor identifier.
    pub actor_id: ActorId,
    /// Administrators bypass every check.
    pub is_administrator: bool,
}
