use crate::database::DatabaseId;
use frame_common::UserAddress;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CipherEvent {
    DatabaseCreated {
        id: DatabaseId,
        owner: UserAddress,
        name: String,
    },
    /// Emitted once per write whether or not the submitted key matched.
    EntryAdded {
        id: DatabaseId,
        writer: UserAddress,
        position: u64,
    },
}

impl CipherEvent {
    pub fn database_id(&self) -> DatabaseId {
        match self {
            CipherEvent::DatabaseCreated { id, .. } => *id,
            CipherEvent::EntryAdded { id, .. } => *id,
        }
    }
}
