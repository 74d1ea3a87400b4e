use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;

use orgauthz_application::{AssignRoleInput, SaveModulePermissionInput};
use orgauthz_core::{ActorId, ActorIdentity};
use orgauthz_domain::{OrganizationId, PositionId, RoleId};

use crate::dto::{
    AssignRoleRequest, ModulePermissionResponse, RevokedAssignmentsResponse,
    RoleAssignmentResponse, RoleResponse, SaveModulePermissionRequest, SetRoleActiveRequest,
};
use crate::error::ApiResult;
use crate::state::AppState;

mod assignments;
mod roles;

pub use assignments::{assign_role_handler, revoke_role_assignments_handler};
pub use roles::{
    delete_module_permission_handler, delete_role_handler, save_module_permission_handler,
    set_role_active_handler,
};
