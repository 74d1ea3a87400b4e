use serde::{Deserialize, Serialize};

use crate::ActorId;

/// Authenticated actor handed to the authorization engine.
///
/// Credential verification happens upstream; the engine only consumes the
/// already verified actor identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorIdentity {
    actor_id: ActorId,
}

impl ActorIdentity {
    /// Creates an identity for a verified actor.
    #[must_use]
    pub fn new(actor_id: ActorId) -> Self {
        Self { actor_id }
    }

    /// Returns the verified actor identifier.
    #[must_use]
    pub fn actor_id(&self) -> ActorId {
        self.actor_id
    }
}
