use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use orgauthz_core::{ActorId, AppResult};
use orgauthz_domain::{
    Action, Module, ModuleId, ModulePermission, Role, select_active_assignment,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::AccessControlRepository;

/// Effective permissions of one actor, keyed by module name.
///
/// An empty set denies everything; the administrator flag overrides it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorPermissionSet {
    /// Administrators bypass every check.
    pub is_administrator: bool,
    /// Effective role, when one is assigned.
    pub role: Option<Role>,
    /// Effective permissions keyed by active module name.
    pub permissions_by_module: BTreeMap<String, ModulePermission>,
}

impl ActorPermissionSet {
    /// Returns the deny-all set.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns the set of an administrator.
    #[must_use]
    pub fn administrator() -> Self {
        Self {
            is_administrator: true,
            ..Self::default()
        }
    }

    /// Returns the effective permission for a module.
    #[must_use]
    pub fn permission_for(&self, module_name: &str) -> Option<&ModulePermission> {
        self.permissions_by_module.get(module_name)
    }

    /// Returns whether the role grants `action` on `module_name`.
    ///
    /// Administrators are answered by the caller; this only reads role grants.
    #[must_use]
    pub fn grants(&self, module_name: &str, action: Action) -> bool {
        self.permission_for(module_name)
            .is_some_and(|permission| permission.actions().allows(action))
    }

    /// Flattens role grants into `Module.action` strings.
    #[must_use]
    pub fn granted_permission_strings(&self) -> BTreeSet<String> {
        self.permissions_by_module
            .iter()
            .flat_map(|(module_name, permission)| {
                permission
                    .actions()
                    .granted()
                    .map(move |action| format!("{module_name}.{action}"))
                    .collect::<Vec<_>>()
            })
            .collect()
    }
}

/// Resolves an actor's effective role and permissions from raw records.
#[derive(Clone)]
pub struct PermissionRepository {
    repository: Arc<dyn AccessControlRepository>,
}

impl PermissionRepository {
    /// Creates a permission repository over a record store.
    #[must_use]
    pub fn new(repository: Arc<dyn AccessControlRepository>) -> Self {
        Self { repository }
    }

    /// Loads the effective permission set of an actor.
    ///
    /// Missing actors, missing assignments, and ineffective roles yield the
    /// empty set. Store failures propagate.
    pub async fn load_actor_permissions(&self, actor_id: ActorId) -> AppResult<ActorPermissionSet> {
        let Some(actor) = self.repository.find_actor(actor_id).await? else {
            debug!(actor_id = %actor_id, "no actor record; resolving empty permission set");
            return Ok(ActorPermissionSet::empty());
        };

        if actor.is_administrator {
            return Ok(ActorPermissionSet::administrator());
        }

        let assignments = self.repository.list_role_assignments(actor_id).await?;
        let effective_count = assignments
            .iter()
            .filter(|assignment| assignment.status().is_effective())
            .count();
        if effective_count > 1 {
            warn!(
                actor_id = %actor_id,
                effective_count,
                "multiple active role assignments found; using the most recent one"
            );
        }

        let Some(assignment) = select_active_assignment(&assignments) else {
            debug!(actor_id = %actor_id, "no active role assignment");
            return Ok(ActorPermissionSet::empty());
        };

        let role = match self.repository.find_role(assignment.role_id()).await? {
            Some(role) if role.status().is_effective() => role,
            _ => {
                debug!(
                    actor_id = %actor_id,
                    role_id = %assignment.role_id(),
                    "assigned role is missing, inactive, or deleted"
                );
                return Ok(ActorPermissionSet::empty());
            }
        };

        let active_modules: HashMap<ModuleId, String> = self
            .list_active_modules()
            .await?
            .into_iter()
            .map(|module| (module.module_id(), module.name().to_owned()))
            .collect();

        let mut permissions_by_module: BTreeMap<String, ModulePermission> = BTreeMap::new();
        for permission in self
            .repository
            .list_role_permissions(role.role_id())
            .await?
            .into_iter()
            .filter(|permission| permission.status().is_effective())
        {
            let Some(module_name) = active_modules.get(&permission.module_id()) else {
                continue;
            };

            if let Some(existing) = permissions_by_module.get(module_name) {
                warn!(
                    role_id = %role.role_id(),
                    module = module_name.as_str(),
                    "duplicate effective permissions for role and module; keeping the newest"
                );
                if existing.permission_id() >= permission.permission_id() {
                    continue;
                }
            }

            permissions_by_module.insert(module_name.clone(), permission);
        }

        Ok(ActorPermissionSet {
            is_administrator: false,
            role: Some(role),
            permissions_by_module,
        })
    }

    /// Lists active modules ordered for display.
    pub async fn list_active_modules(&self) -> AppResult<Vec<Module>> {
        let mut modules: Vec<Module> = self
            .repository
            .list_modules()
            .await?
            .into_iter()
            .filter(|module| module.status().is_effective())
            .collect();
        modules.sort_by(|left, right| {
            left.sort_order()
                .cmp(&right.sort_order())
                .then_with(|| left.name().cmp(right.name()))
        });

        Ok(modules)
    }
}
