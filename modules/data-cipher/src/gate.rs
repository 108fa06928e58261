//! Keyed write gate.
//!
//! A write carries an encrypted value and an encrypted candidate key. The
//! engine compares the candidate with the database key and selects either the
//! value or an encrypted zero on that encrypted result. The outcome of the
//! comparison is never decrypted, so a call with a wrong key succeeds exactly
//! like a call with the right one and appends one entry either way.

use crate::{
    cipher::DataCipher,
    database::DatabaseId,
    error::{DataCipherError, Result},
    events::CipherEvent,
    operation::add_entry_operation,
    state::StateTx,
    use_case::CipherUseCase,
};
use frame_common::{AccessPolicy, CiphertextHandle, FheType, UserAddress};
use frame_fhe::{ClearValue, HomomorphicEngine, InputProof};
use tracing::info;

/// `stored_key == candidate_key ? value : 0`, evaluated entirely over ciphertexts.
pub fn keyed_select<E: HomomorphicEngine + ?Sized>(
    engine: &E,
    stored_key: &CiphertextHandle,
    candidate_key: &CiphertextHandle,
    value: &CiphertextHandle,
) -> frame_fhe::Result<CiphertextHandle> {
    let matched = engine.eq(stored_key, candidate_key)?;
    let zero = engine.trivial_encrypt(ClearValue::Uint32(0))?;
    engine.select(&matched, value, &zero)
}

/// Appends one entry to a database, gated by the encrypted key.
#[derive(Clone, Debug)]
pub struct AddEntry<'a, AP> {
    access_policy: AP,
    id: DatabaseId,
    value_input: CiphertextHandle,
    candidate_key_input: CiphertextHandle,
    proof: &'a InputProof,
}

impl<'a, AP: AccessPolicy> AddEntry<'a, AP> {
    pub fn new(
        access_policy: AP,
        id: DatabaseId,
        value_input: CiphertextHandle,
        candidate_key_input: CiphertextHandle,
        proof: &'a InputProof,
    ) -> Self {
        AddEntry {
            access_policy,
            id,
            value_input,
            candidate_key_input,
            proof,
        }
    }
}

impl<'a, AP: AccessPolicy> CipherUseCase for AddEntry<'a, AP> {
    type AP = AP;
    type Output = ();

    fn access_policy(&self) -> &AP {
        &self.access_policy
    }

    fn operation(&self, contract: &UserAddress) -> [u8; 32] {
        add_entry_operation(
            contract,
            self.id,
            &self.value_input,
            &self.candidate_key_input,
        )
    }

    fn run<E: HomomorphicEngine>(
        self,
        cipher: &DataCipher<E>,
        caller: UserAddress,
    ) -> Result<(StateTx, ())> {
        let database = cipher.state().database(self.id)?;
        let candidate_key = cipher.verify_input(
            &self.candidate_key_input,
            self.proof,
            caller,
            FheType::Address,
        )?;
        let value = cipher.verify_input(&self.value_input, self.proof, caller, FheType::Uint32)?;

        let entry = keyed_select(
            cipher.engine(),
            &database.key_handle(),
            &candidate_key,
            &value,
        )
        .map_err(DataCipherError::Engine)?;
        cipher.allow_all(
            &entry,
            &[cipher.contract_address(), database.owner(), caller],
        )?;

        let mut tx = StateTx::new();
        tx.append_entry(self.id, entry);
        tx.emit(CipherEvent::EntryAdded {
            id: self.id,
            writer: caller,
            position: database.entries().len() as u64,
        });

        Ok((tx, ()))
    }
}

impl<E: HomomorphicEngine> DataCipher<E> {
    /// Anyone holding the database key may write; the owner is not required.
    pub fn add_entry<AP: AccessPolicy>(
        &mut self,
        access_policy: AP,
        id: DatabaseId,
        value_input: CiphertextHandle,
        candidate_key_input: CiphertextHandle,
        proof: &InputProof,
    ) -> Result<()> {
        let writer = access_policy.into_user_address();
        self.execute(AddEntry::new(
            access_policy,
            id,
            value_input,
            candidate_key_input,
            proof,
        ))?;
        info!("Added entry to database {} from {}", id, writer);

        Ok(())
    }
}
