use std::str::FromStr;

use axum::Json;
use axum::extract::{Extension, State};
use axum::http::StatusCode;

use orgauthz_application::DataTarget;
use orgauthz_core::{ActorId, ActorIdentity, AppError};
use orgauthz_domain::{ModuleAction, OrganizationId};

use crate::dto::{
    CheckPermissionRequest, CheckPermissionResponse, DataAccessRequest, DataAccessResponse,
    EffectivePermissionsResponse, InvalidateCacheRequest,
};
use crate::error::ApiResult;
use crate::state::AppState;

mod cache;
mod checks;

pub use cache::invalidate_cache_handler;
pub use checks::{check_permission_handler, data_access_handler, effective_permissions_handler};
