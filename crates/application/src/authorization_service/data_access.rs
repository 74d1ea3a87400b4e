use crate::{CancellationSignal, DataTarget};

use super::*;

impl AuthorizationService {
    /// Returns whether the actor may operate on the target's data in a module.
    pub async fn can_access_data(
        &self,
        actor_id: ActorId,
        module_name: &str,
        target: &DataTarget,
    ) -> AppResult<bool> {
        self.can_access_data_until(actor_id, module_name, target, &CancellationSignal::new())
            .await
    }

    /// Same as [`Self::can_access_data`], aborting hierarchy walks once
    /// `cancellation` fires. A cancelled check denies.
    pub async fn can_access_data_until(
        &self,
        actor_id: ActorId,
        module_name: &str,
        target: &DataTarget,
        cancellation: &CancellationSignal,
    ) -> AppResult<bool> {
        let permissions = self.load_permissions(actor_id).await?;
        if permissions.is_administrator {
            return Ok(true);
        }

        let Some(permission) = permissions.permission_for(module_name) else {
            return Ok(false);
        };

        self.resolver
            .resolve(actor_id, permission, target, cancellation)
            .await
            .inspect_err(|error| {
                error!(
                    actor_id = %actor_id,
                    module = module_name,
                    %error,
                    "failed to resolve data scope; failing closed"
                );
            })
    }
}
