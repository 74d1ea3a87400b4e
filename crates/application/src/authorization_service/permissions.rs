use std::collections::BTreeSet;
use std::str::FromStr;

use orgauthz_core::AppError;
use orgauthz_domain::{Action, ModuleAction};
use tracing::warn;

use super::*;

impl AuthorizationService {
    /// Returns whether the actor may perform `action` on `module_name`.
    pub async fn has_permission(
        &self,
        actor_id: ActorId,
        module_name: &str,
        action: Action,
    ) -> AppResult<bool> {
        let permissions = self.load_permissions(actor_id).await?;
        if permissions.is_administrator {
            return Ok(true);
        }

        Ok(permissions.grants(module_name, action))
    }

    /// Returns whether the actor bypasses every check.
    pub async fn is_administrator(&self, actor_id: ActorId) -> AppResult<bool> {
        Ok(self.load_permissions(actor_id).await?.is_administrator)
    }

    /// Action check for callers holding the action as a raw literal.
    ///
    /// Unknown literals answer `false` instead of failing.
    pub async fn has_permission_for_action_name(
        &self,
        actor_id: ActorId,
        module_name: &str,
        action_name: &str,
    ) -> AppResult<bool> {
        let Ok(action) = Action::from_str(action_name) else {
            warn!(
                actor_id = %actor_id,
                module = module_name,
                action = action_name,
                "unknown action literal checked; denying"
            );
            return Ok(false);
        };

        self.has_permission(actor_id, module_name, action).await
    }

    /// Checks a `Module.action` permission string.
    ///
    /// Malformed strings are [`AppError::Configuration`], not denials.
    pub async fn check_permission_string(
        &self,
        actor_id: ActorId,
        permission: &str,
    ) -> AppResult<bool> {
        let permission = ModuleAction::from_str(permission)?;
        self.has_permission(actor_id, permission.module_name(), permission.action())
            .await
    }

    /// Ensures the actor holds a permission.
    pub async fn require_permission(
        &self,
        actor_id: ActorId,
        permission: &ModuleAction,
    ) -> AppResult<()> {
        if self
            .has_permission(actor_id, permission.module_name(), permission.action())
            .await?
        {
            return Ok(());
        }

        Err(AppError::Forbidden(format!(
            "actor '{actor_id}' is missing permission '{permission}'"
        )))
    }

    /// Flattens the actor's grants into `Module.action` strings.
    ///
    /// Administrators receive every active module crossed with every action.
    pub async fn effective_permissions(&self, actor_id: ActorId) -> AppResult<BTreeSet<String>> {
        let permissions = self.load_permissions(actor_id).await?;
        if !permissions.is_administrator {
            return Ok(permissions.granted_permission_strings());
        }

        let modules = self.permissions.list_active_modules().await?;
        Ok(modules
            .iter()
            .flat_map(|module| {
                Action::all()
                    .iter()
                    .map(move |action| format!("{}.{action}", module.name()))
            })
            .collect())
    }
}
