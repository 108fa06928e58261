use crate::{
    error::Result,
    store::{load_or_create_keypair, ServiceStore},
};
use frame_common::UserAddress;
use frame_fhe::LocalCoprocessor;
use module_data_cipher::{
    add_entry_operation, create_database_operation, DataCipher, DatabaseId, DatabaseInfo,
};
use module_data_cipher_client::Client;
use rand::rngs::OsRng;
use std::path::Path;

fn client_for(
    root_dir: &Path,
    index: usize,
    cipher: &DataCipher<LocalCoprocessor>,
) -> Result<Client> {
    let keypair = load_or_create_keypair(root_dir, index)?;
    Ok(Client::new(
        keypair,
        cipher.contract_address(),
        cipher.engine().public_key(),
    ))
}

/// Service address and the address of the selected account.
pub(crate) fn address(root_dir: &Path, index: usize) -> Result<(UserAddress, UserAddress)> {
    let store = ServiceStore::new(root_dir);
    let cipher = store.load()?;
    let client = client_for(root_dir, index, &cipher)?;
    store.save(&cipher)?;

    Ok((cipher.contract_address(), client.address()))
}

/// Create a database under a freshly generated key and return both.
pub(crate) fn create(root_dir: &Path, index: usize, name: &str) -> Result<(DatabaseId, UserAddress)> {
    let store = ServiceStore::new(root_dir);
    let mut cipher = store.load()?;
    let client = client_for(root_dir, index, &cipher)?;

    let key = UserAddress::random(&mut OsRng);
    let input = client.encrypt_key(&mut OsRng, key)?;
    let operation =
        create_database_operation(&cipher.contract_address(), name, &input.handles[0]);
    let id = cipher.create_database(
        client.access_policy(&mut OsRng, &operation),
        name,
        input.handles[0],
        &input.input_proof,
    )?;
    store.save(&cipher)?;

    Ok((id, key))
}

pub(crate) fn info(root_dir: &Path, id: DatabaseId) -> Result<DatabaseInfo> {
    let cipher = ServiceStore::new(root_dir).load()?;
    cipher.get_database(id).map_err(Into::into)
}

pub(crate) fn ids(root_dir: &Path, index: usize) -> Result<Vec<DatabaseId>> {
    let cipher = ServiceStore::new(root_dir).load()?;
    let client = client_for(root_dir, index, &cipher)?;
    Ok(cipher.get_database_ids(&client.address()))
}

pub(crate) fn decrypt_key(root_dir: &Path, index: usize, id: DatabaseId) -> Result<UserAddress> {
    let cipher = ServiceStore::new(root_dir).load()?;
    let client = client_for(root_dir, index, &cipher)?;
    let handle = cipher.get_database_key(id)?;

    client.decrypt_key(cipher.engine(), handle).map_err(Into::into)
}

pub(crate) fn add_entry(
    root_dir: &Path,
    index: usize,
    id: DatabaseId,
    key: UserAddress,
    value: u32,
) -> Result<()> {
    let store = ServiceStore::new(root_dir);
    let mut cipher = store.load()?;
    let client = client_for(root_dir, index, &cipher)?;

    let input = client.encrypt_entry(&mut OsRng, key, value)?;
    let operation = add_entry_operation(
        &cipher.contract_address(),
        id,
        &input.handles[1],
        &input.handles[0],
    );
    cipher.add_entry(
        client.access_policy(&mut OsRng, &operation),
        id,
        input.handles[1],
        input.handles[0],
        &input.input_proof,
    )?;
    store.save(&cipher)
}

pub(crate) fn entries(root_dir: &Path, index: usize, id: DatabaseId) -> Result<Vec<u32>> {
    let cipher = ServiceStore::new(root_dir).load()?;
    let client = client_for(root_dir, index, &cipher)?;
    let handles = cipher.get_entries(id)?;

    client
        .decrypt_entries(cipher.engine(), &handles)
        .map_err(Into::into)
}
