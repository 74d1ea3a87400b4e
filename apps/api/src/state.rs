use orgauthz_application::{AuthorizationService, RoleAdminService};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub authorization_service: AuthorizationService,
    pub role_admin_service: RoleAdminService,
    /// Lowercase name of the trusted header carrying the authenticated actor id.
    pub actor_id_header: String,
}
