use crate::error::{ClientError, Result};
use ed25519_dalek::Keypair;
use frame_common::{CiphertextHandle, Ed25519ChallengeResponse, FheType, UserAddress};
use frame_config::USER_DECRYPT_DURATION_DAYS;
use frame_fhe::{
    unix_timestamp, ClearValue, DecryptionAuthority, EncryptedInput, EncryptedInputBuilder,
    FheError, HandleContractPair, UserDecryptAuthorization, UserDecryptRequest,
};
use frame_sodium::{SodiumPrivateKey, SodiumPubKey};
use rand::{rngs::OsRng, Rng};
use rand_core::{CryptoRng, RngCore};
use std::collections::BTreeMap;
use tracing::debug;

/// Prepares encrypted inputs for one DataCipher instance and recovers
/// plaintexts the holder of `keypair` has been granted.
pub struct Client {
    keypair: Keypair,
    contract: UserAddress,
    coprocessor_key: SodiumPubKey,
    duration_days: u64,
}

impl Client {
    pub fn new(keypair: Keypair, contract: UserAddress, coprocessor_key: SodiumPubKey) -> Self {
        Client {
            keypair,
            contract,
            coprocessor_key,
            duration_days: *USER_DECRYPT_DURATION_DAYS,
        }
    }

    pub fn with_duration_days(mut self, days: u64) -> Self {
        self.duration_days = days;
        self
    }

    pub fn address(&self) -> UserAddress {
        UserAddress::from_pubkey(&self.keypair.public)
    }

    pub fn contract_address(&self) -> UserAddress {
        self.contract
    }

    /// Authorizes one call, identified by the digest of its arguments.
    pub fn access_policy<R: Rng>(
        &self,
        rng: &mut R,
        operation: &[u8],
    ) -> Ed25519ChallengeResponse {
        Ed25519ChallengeResponse::new_from_keypair(&self.keypair, rng, operation)
    }

    pub fn encrypt_key<R>(&self, rng: &mut R, key: UserAddress) -> Result<EncryptedInput>
    where
        R: RngCore + CryptoRng,
    {
        EncryptedInputBuilder::new(self.contract, self.address())
            .add_address(key)
            .encrypt(rng, &self.coprocessor_key)
            .map_err(Into::into)
    }

    /// The returned input holds the candidate key at `handles[0]` and the value at `handles[1]`.
    pub fn encrypt_entry<R>(&self, rng: &mut R, key: UserAddress, value: u32) -> Result<EncryptedInput>
    where
        R: RngCore + CryptoRng,
    {
        EncryptedInputBuilder::new(self.contract, self.address())
            .add_address(key)
            .add_u32(value)
            .encrypt(rng, &self.coprocessor_key)
            .map_err(Into::into)
    }

    pub fn decrypt_key<A: DecryptionAuthority>(
        &self,
        authority: &A,
        handle: CiphertextHandle,
    ) -> Result<UserAddress> {
        let values = self.user_decrypt(authority, &[handle])?;
        lookup(&values, &handle)?
            .as_address()
            .ok_or(ClientError::UnexpectedValue {
                handle,
                expected: FheType::Address,
            })
    }

    pub fn decrypt_entries<A: DecryptionAuthority>(
        &self,
        authority: &A,
        handles: &[CiphertextHandle],
    ) -> Result<Vec<u32>> {
        if handles.is_empty() {
            return Ok(vec![]);
        }

        let values = self.user_decrypt(authority, handles)?;
        handles
            .iter()
            .map(|handle| {
                lookup(&values, handle)?
                    .as_u32()
                    .ok_or(ClientError::UnexpectedValue {
                        handle: *handle,
                        expected: FheType::Uint32,
                    })
            })
            .collect()
    }

    /// Each request is authorized for a fresh ephemeral key, starting now.
    fn user_decrypt<A: DecryptionAuthority>(
        &self,
        authority: &A,
        handles: &[CiphertextHandle],
    ) -> Result<BTreeMap<CiphertextHandle, ClearValue>> {
        let ephemeral = SodiumPrivateKey::from_random(&mut OsRng).map_err(FheError::from)?;
        let authorization = UserDecryptAuthorization::new(
            ephemeral.public_key(),
            vec![self.contract],
            unix_timestamp(),
            self.duration_days,
        );
        let pairs = handles
            .iter()
            .map(|handle| HandleContractPair::new(*handle, self.contract))
            .collect();
        let request = UserDecryptRequest::sign(&self.keypair, pairs, authorization)?;
        debug!(
            "Requesting decryption of {} handles for {}",
            handles.len(),
            self.address()
        );

        let response = authority.user_decrypt(&request)?;
        response.open(&ephemeral).map_err(Into::into)
    }
}

fn lookup(
    values: &BTreeMap<CiphertextHandle, ClearValue>,
    handle: &CiphertextHandle,
) -> Result<ClearValue> {
    values
        .get(handle)
        .copied()
        .ok_or(ClientError::MissingValue(*handle))
}
