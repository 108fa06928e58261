use crate::{
    cipher::DataCipher,
    database::{validate_name, Database, DatabaseId, DatabaseInfo},
    error::Result,
    events::CipherEvent,
    operation::create_database_operation,
    state::StateTx,
    use_case::CipherUseCase,
};
use frame_common::{AccessPolicy, CiphertextHandle, FheType, UserAddress};
use frame_fhe::{HomomorphicEngine, InputProof};
use tracing::info;

/// Registers a new database protected by an encrypted key.
#[derive(Clone, Debug)]
pub struct CreateDatabase<'a, AP> {
    access_policy: AP,
    name: &'a str,
    key_input: CiphertextHandle,
    proof: &'a InputProof,
}

impl<'a, AP: AccessPolicy> CreateDatabase<'a, AP> {
    pub fn new(
        access_policy: AP,
        name: &'a str,
        key_input: CiphertextHandle,
        proof: &'a InputProof,
    ) -> Self {
        CreateDatabase {
            access_policy,
            name,
            key_input,
            proof,
        }
    }
}

impl<'a, AP: AccessPolicy> CipherUseCase for CreateDatabase<'a, AP> {
    type AP = AP;
    type Output = DatabaseId;

    fn access_policy(&self) -> &AP {
        &self.access_policy
    }

    fn operation(&self, contract: &UserAddress) -> [u8; 32] {
        create_database_operation(contract, self.name, &self.key_input)
    }

    fn run<E: HomomorphicEngine>(
        self,
        cipher: &DataCipher<E>,
        caller: UserAddress,
    ) -> Result<(StateTx, DatabaseId)> {
        validate_name(self.name)?;
        let key_handle =
            cipher.verify_input(&self.key_input, self.proof, caller, FheType::Address)?;
        cipher.allow_all(&key_handle, &[cipher.contract_address(), caller])?;

        let id = cipher.state().next_id();
        let mut tx = StateTx::new();
        tx.insert_database(Database::new(
            id,
            self.name.to_string(),
            caller,
            key_handle,
        ));
        tx.index_owner(caller, id);
        tx.emit(CipherEvent::DatabaseCreated {
            id,
            owner: caller,
            name: self.name.to_string(),
        });

        Ok((tx, id))
    }
}

impl<E: HomomorphicEngine> DataCipher<E> {
    pub fn create_database<AP: AccessPolicy>(
        &mut self,
        access_policy: AP,
        name: &str,
        key_input: CiphertextHandle,
        proof: &InputProof,
    ) -> Result<DatabaseId> {
        let id = self.execute(CreateDatabase::new(access_policy, name, key_input, proof))?;
        info!("Created database {} ({})", id, name);

        Ok(id)
    }

    pub fn get_database(&self, id: DatabaseId) -> Result<DatabaseInfo> {
        self.state().database(id).map(|database| database.info())
    }

    /// Returns the stored key handle as-is.
    pub fn get_database_key(&self, id: DatabaseId) -> Result<CiphertextHandle> {
        self.state().database(id).map(|database| database.key_handle())
    }

    pub fn get_database_ids(&self, owner: &UserAddress) -> Vec<DatabaseId> {
        self.state().database_ids(owner)
    }

    pub fn database_count(&self) -> u64 {
        self.state().database_count()
    }
}
