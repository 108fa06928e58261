use ed25519_dalek::Keypair;
use frame_common::{CiphertextHandle, Ed25519ChallengeResponse, UserAddress};
use frame_fhe::{
    unix_timestamp, ClearValue, DecryptionAuthority, EncryptedInput, EncryptedInputBuilder,
    HandleContractPair, UserDecryptAuthorization, UserDecryptRequest,
};
use frame_sodium::{SodiumPrivateKey, SodiumPubKey};
use rand::rngs::OsRng;

/// Returns a fresh random database key.
pub fn random_key() -> UserAddress {
    UserAddress::random(&mut OsRng)
}

/// A signing identity acting against a DataCipher instance in tests.
pub struct TestUser {
    keypair: Keypair,
}

impl TestUser {
    pub fn new() -> Self {
        TestUser {
            keypair: Keypair::generate(&mut OsRng),
        }
    }

    pub fn keypair(&self) -> &Keypair {
        &self.keypair
    }

    pub fn address(&self) -> UserAddress {
        UserAddress::from_pubkey(&self.keypair.public)
    }

    /// Signs `operation` under a fresh challenge.
    pub fn access_policy(&self, operation: &[u8]) -> Ed25519ChallengeResponse {
        Ed25519ChallengeResponse::new_from_keypair(&self.keypair, &mut OsRng, operation)
    }

    pub fn encrypt_key(
        &self,
        contract: UserAddress,
        coprocessor_key: &SodiumPubKey,
        key: UserAddress,
    ) -> EncryptedInput {
        EncryptedInputBuilder::new(contract, self.address())
            .add_address(key)
            .encrypt(&mut OsRng, coprocessor_key)
            .unwrap()
    }

    /// handles[0] is the candidate key, handles[1] the value.
    pub fn encrypt_entry(
        &self,
        contract: UserAddress,
        coprocessor_key: &SodiumPubKey,
        key: UserAddress,
        value: u32,
    ) -> EncryptedInput {
        EncryptedInputBuilder::new(contract, self.address())
            .add_address(key)
            .add_u32(value)
            .encrypt(&mut OsRng, coprocessor_key)
            .unwrap()
    }

    pub fn decrypt<A: DecryptionAuthority>(
        &self,
        authority: &A,
        contract: UserAddress,
        handles: &[CiphertextHandle],
    ) -> frame_fhe::Result<Vec<ClearValue>> {
        let ephemeral = SodiumPrivateKey::from_random(&mut OsRng).unwrap();
        let request = self.decrypt_request(&ephemeral, contract, handles, unix_timestamp(), 10);
        let values = authority.user_decrypt(&request)?.open(&ephemeral)?;

        Ok(handles.iter().map(|handle| values[handle]).collect())
    }

    pub fn decrypt_request(
        &self,
        ephemeral: &SodiumPrivateKey,
        contract: UserAddress,
        handles: &[CiphertextHandle],
        start_timestamp: u64,
        duration_days: u64,
    ) -> UserDecryptRequest {
        let pairs = handles
            .iter()
            .map(|handle| HandleContractPair::new(*handle, contract))
            .collect();
        let authorization = UserDecryptAuthorization::new(
            ephemeral.public_key(),
            vec![contract],
            start_timestamp,
            duration_days,
        );
        UserDecryptRequest::sign(&self.keypair, pairs, authorization).unwrap()
    }
}

impl Default for TestUser {
    fn default() -> Self {
        Self::new()
    }
}
