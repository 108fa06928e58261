//! End-to-end scenarios over the service, the client and the in-process coprocessor.
//! Plaintexts are only ever recovered through the decryption authority.

use ed25519_dalek::Keypair;
use frame_common::UserAddress;
use frame_fhe::LocalCoprocessor;
use module_data_cipher::{
    add_entry_operation, create_database_operation, DataCipher, DatabaseId,
};
use module_data_cipher_client::Client;
use rand::rngs::OsRng;
use std::sync::Arc;

#[cfg(test)]
mod decryption;
#[cfg(test)]
mod scenarios;

/// A deployed service sharing its coprocessor with the test as decryption authority.
pub struct Deployment {
    pub cipher: DataCipher<Arc<LocalCoprocessor>>,
    pub coprocessor: Arc<LocalCoprocessor>,
}

impl Deployment {
    pub fn new() -> Self {
        let coprocessor = Arc::new(LocalCoprocessor::new().expect("coprocessor"));
        let cipher = DataCipher::new(coprocessor.clone(), UserAddress::random(&mut OsRng));
        Deployment {
            cipher,
            coprocessor,
        }
    }

    pub fn new_client(&self) -> Client {
        Client::new(
            Keypair::generate(&mut OsRng),
            self.cipher.contract_address(),
            self.coprocessor.public_key(),
        )
    }

    pub fn create_database(
        &mut self,
        client: &Client,
        name: &str,
        key: UserAddress,
    ) -> module_data_cipher::Result<DatabaseId> {
        let input = client.encrypt_key(&mut OsRng, key).expect("encrypt key");
        let operation =
            create_database_operation(&self.cipher.contract_address(), name, &input.handles[0]);
        self.cipher.create_database(
            client.access_policy(&mut OsRng, &operation),
            name,
            input.handles[0],
            &input.input_proof,
        )
    }

    pub fn add_entry(
        &mut self,
        client: &Client,
        id: DatabaseId,
        key: UserAddress,
        value: u32,
    ) -> module_data_cipher::Result<()> {
        let input = client
            .encrypt_entry(&mut OsRng, key, value)
            .expect("encrypt entry");
        let operation = add_entry_operation(
            &self.cipher.contract_address(),
            id,
            &input.handles[1],
            &input.handles[0],
        );
        self.cipher.add_entry(
            client.access_policy(&mut OsRng, &operation),
            id,
            input.handles[1],
            input.handles[0],
            &input.input_proof,
        )
    }

    pub fn entries_as(&self, client: &Client, id: DatabaseId) -> Vec<u32> {
        let handles = self.cipher.get_entries(id).expect("entries");
        client
            .decrypt_entries(&self.coprocessor, &handles)
            .expect("decrypt entries")
    }
}

impl Default for Deployment {
    fn default() -> Self {
        Self::new()
    }
}
