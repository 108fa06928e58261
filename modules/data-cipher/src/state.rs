use crate::{
    database::{Database, DatabaseId},
    error::{DataCipherError, Result},
    events::CipherEvent,
};
use frame_common::{CiphertextHandle, UserAddress};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A single staged mutation of `CipherState`.
#[derive(Clone, Debug, PartialEq)]
pub enum StateOp {
    InsertDatabase(Database),
    IndexOwner {
        owner: UserAddress,
        id: DatabaseId,
    },
    AppendEntry {
        id: DatabaseId,
        handle: CiphertextHandle,
    },
    Emit(CipherEvent),
    ConsumeChallenge([u8; 32]),
}

/// Write transaction. Operations are applied in order by `CipherState::commit`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StateTx {
    ops: Vec<StateOp>,
}

impl StateTx {
    pub fn new() -> Self {
        StateTx::default()
    }

    pub fn insert_database(&mut self, database: Database) {
        self.ops.push(StateOp::InsertDatabase(database));
    }

    pub fn index_owner(&mut self, owner: UserAddress, id: DatabaseId) {
        self.ops.push(StateOp::IndexOwner { owner, id });
    }

    pub fn append_entry(&mut self, id: DatabaseId, handle: CiphertextHandle) {
        self.ops.push(StateOp::AppendEntry { id, handle });
    }

    pub fn emit(&mut self, event: CipherEvent) {
        self.ops.push(StateOp::Emit(event));
    }

    pub fn consume_challenge(&mut self, challenge: [u8; 32]) {
        self.ops.push(StateOp::ConsumeChallenge(challenge));
    }

    pub fn ops(&self) -> &[StateOp] {
        &self.ops
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

/// Databases, the owner index, the event log and the access-policy challenges
/// already accepted.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CipherState {
    databases: Vec<Database>,
    owners: BTreeMap<UserAddress, Vec<DatabaseId>>,
    events: Vec<CipherEvent>,
    used_challenges: BTreeSet<[u8; 32]>,
}

impl CipherState {
    pub fn new() -> Self {
        CipherState::default()
    }

    /// Identifier the next inserted database receives.
    pub fn next_id(&self) -> DatabaseId {
        DatabaseId::new(self.databases.len() as u64)
    }

    pub fn database(&self, id: DatabaseId) -> Result<&Database> {
        id.as_index()
            .and_then(|idx| self.databases.get(idx))
            .ok_or(DataCipherError::NotFound(id))
    }

    pub fn database_ids(&self, owner: &UserAddress) -> Vec<DatabaseId> {
        self.owners.get(owner).cloned().unwrap_or_default()
    }

    pub fn database_count(&self) -> u64 {
        self.databases.len() as u64
    }

    pub fn events(&self) -> &[CipherEvent] {
        &self.events
    }

    pub fn is_challenge_used(&self, challenge: &[u8; 32]) -> bool {
        self.used_challenges.contains(challenge)
    }

    /// Apply every staged operation. Callers stage a transaction only after all
    /// fallible steps of an operation have succeeded.
    pub fn commit(&mut self, tx: StateTx) {
        for op in tx.ops {
            match op {
                StateOp::InsertDatabase(database) => {
                    debug_assert_eq!(database.id(), self.next_id());
                    self.databases.push(database);
                }
                StateOp::IndexOwner { owner, id } => {
                    self.owners.entry(owner).or_default().push(id);
                }
                StateOp::AppendEntry { id, handle } => {
                    if let Some(database) =
                        id.as_index().and_then(|idx| self.databases.get_mut(idx))
                    {
                        database.push_entry(handle);
                    }
                }
                StateOp::Emit(event) => self.events.push(event),
                StateOp::ConsumeChallenge(challenge) => {
                    self.used_challenges.insert(challenge);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use frame_common::FheType;

    fn handle(byte: u8, fhe_type: FheType) -> CiphertextHandle {
        CiphertextHandle::from_digest([byte; 32], fhe_type)
    }

    #[test]
    fn test_staged_ops_apply_on_commit() {
        let mut state = CipherState::new();
        let owner = UserAddress::from_array([1u8; 20]);
        let id = state.next_id();

        let mut tx = StateTx::new();
        tx.insert_database(Database::new(
            id,
            "Alpha".to_string(),
            owner,
            handle(1, FheType::Address),
        ));
        tx.index_owner(owner, id);
        tx.append_entry(id, handle(2, FheType::Uint32));
        tx.consume_challenge([9u8; 32]);
        assert_eq!(state.database_count(), 0);
        assert!(!state.is_challenge_used(&[9u8; 32]));

        state.commit(tx);
        assert_eq!(state.database_count(), 1);
        assert_eq!(state.database_ids(&owner), vec![id]);
        assert_eq!(state.database(id).unwrap().entries().len(), 1);
        assert_eq!(state.next_id(), DatabaseId::new(1));
        assert!(state.is_challenge_used(&[9u8; 32]));
    }

    #[test]
    fn test_unknown_database() {
        let state = CipherState::new();
        assert!(matches!(
            state.database(DatabaseId::new(0)),
            Err(DataCipherError::NotFound(_))
        ));
        assert!(state.database_ids(&UserAddress::default()).is_empty());
    }

    #[test]
    fn test_state_encoding() {
        let mut state = CipherState::new();
        let owner = UserAddress::from_array([3u8; 20]);
        let mut tx = StateTx::new();
        tx.insert_database(Database::new(
            state.next_id(),
            "Notes".to_string(),
            owner,
            handle(4, FheType::Address),
        ));
        tx.index_owner(owner, DatabaseId::new(0));
        tx.consume_challenge([5u8; 32]);
        state.commit(tx);

        let bytes = bincode::serialize(&state).unwrap();
        let decoded: CipherState = bincode::deserialize(&bytes).unwrap();
        assert_eq!(decoded, state);
    }
}
