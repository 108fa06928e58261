//! Digests of the calls a caller signs with its access policy.
//!
//! Each digest covers the service address and every argument of the call, so a
//! signed access policy cannot be replayed against another service, another
//! database or other encrypted inputs.

use crate::database::DatabaseId;
use frame_common::{CiphertextHandle, Sha256, UserAddress};

const CREATE_DATABASE_TAG: &[u8] = b"data-cipher/create-database";
const ADD_ENTRY_TAG: &[u8] = b"data-cipher/add-entry";

pub fn create_database_operation(
    contract: &UserAddress,
    name: &str,
    key_input: &CiphertextHandle,
) -> [u8; 32] {
    // name is the only variable-length part and goes last
    Sha256::hash_parts(&[
        CREATE_DATABASE_TAG,
        contract.as_bytes(),
        key_input.as_bytes(),
        name.as_bytes(),
    ])
    .as_array()
}

pub fn add_entry_operation(
    contract: &UserAddress,
    id: DatabaseId,
    value_input: &CiphertextHandle,
    candidate_key_input: &CiphertextHandle,
) -> [u8; 32] {
    let id = id.as_u64().to_be_bytes();
    Sha256::hash_parts(&[
        ADD_ENTRY_TAG,
        contract.as_bytes(),
        &id[..],
        value_input.as_bytes(),
        candidate_key_input.as_bytes(),
    ])
    .as_array()
}
