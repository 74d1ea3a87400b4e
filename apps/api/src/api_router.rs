use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::{delete, get, post, put};
use tower_http::trace::TraceLayer;

use crate::middleware::RequiredPermission;
use crate::state::AppState;
use crate::{handlers, middleware};


const ROLE_CREATE: RequiredPermission = RequiredPermission::new("Role.create");
const ROLE_EDIT: RequiredPermission = RequiredPermission::new("Role.edit");
const ROLE_DELETE: RequiredPermission = RequiredPermission::new("Role.delete");

pub fn build_router(app_state: AppState) -> Router {
    let authz_routes = Router::new()
        .route(
            "/api/authz/me/permissions",
            get(handlers::authz::effective_permissions_handler),
        )
        .route(
            "/api/authz/check",
            post(handlers::authz::check_permission_handler),
        )
        .route(
            "/api/authz/data-access",
            post(handlers::authz::data_access_handler),
        )
        .route(
            "/api/authz/cache/invalidate",
            post(handlers::authz::invalidate_cache_handler),
        );

    let role_create_routes = Router::new()
        .route(
            "/api/security/role-assignments",
            put(handlers::security::assign_role_handler),
        )
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_permission,
        ))
        .layer(axum::Extension(ROLE_CREATE));

    let role_edit_routes = Router::new()
        .route(
            "/api/security/roles/{role_id}/permissions",
            put(handlers::security::save_module_permission_handler),
        )
        .route(
            "/api/security/roles/{role_id}/active",
            put(handlers::security::set_role_active_handler),
        )
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_permission,
        ))
        .layer(axum::Extension(ROLE_EDIT));

    let role_delete_routes = Router::new()
        .route(
            "/api/security/role-assignments/{employee_id}",
            delete(handlers::security::revoke_role_assignments_handler),
        )
        .route(
            "/api/security/roles/{role_id}/permissions/{module_name}",
            delete(handlers::security::delete_module_permission_handler),
        )
        .route(
            "/api/security/roles/{role_id}",
            delete(handlers::security::delete_role_handler),
        )
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_permission,
        ))
        .layer(axum::Extension(ROLE_DELETE));

    let protected_routes = Router::new()
        .merge(authz_routes)
        .merge(role_create_routes)
        .merge(role_edit_routes)
        .merge(role_delete_routes)
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_actor,
        ));

    Router::new()
        .route("/health", get(handlers::health::health_handler))
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
