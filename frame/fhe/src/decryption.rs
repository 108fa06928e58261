use crate::{
    error::{FheError, Result},
    value::ClearValue,
};
use ed25519_dalek::{Keypair, PublicKey, Signature, Signer, Verifier, PUBLIC_KEY_LENGTH};
use frame_common::{CiphertextHandle, State, UserAddress};
use frame_config::SECONDS_PER_DAY;
use frame_sodium::{SodiumCiphertext, SodiumPrivateKey, SodiumPubKey};
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    convert::TryFrom,
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};

const AUTHORIZATION_DOMAIN: &[u8] = b"UserDecryptRequestVerification";

/// Current unix time in seconds, the clock decryption windows are measured against.
pub fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// A handle together with the contract whose grant covers it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandleContractPair {
    pub handle: CiphertextHandle,
    pub contract_address: UserAddress,
}

impl HandleContractPair {
    pub fn new(handle: CiphertextHandle, contract_address: UserAddress) -> Self {
        HandleContractPair {
            handle,
            contract_address,
        }
    }
}

/// The message a user signs to authorize decryption towards an ephemeral key.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserDecryptAuthorization {
    pub public_key: SodiumPubKey,
    pub contract_addresses: Vec<UserAddress>,
    pub start_timestamp: u64,
    pub duration_days: u64,
}

impl UserDecryptAuthorization {
    pub fn new(
        public_key: SodiumPubKey,
        contract_addresses: Vec<UserAddress>,
        start_timestamp: u64,
        duration_days: u64,
    ) -> Self {
        UserDecryptAuthorization {
            public_key,
            contract_addresses,
            start_timestamp,
            duration_days,
        }
    }

    pub fn signing_bytes(&self) -> Result<Vec<u8>> {
        let mut msg = AUTHORIZATION_DOMAIN.to_vec();
        msg.extend_from_slice(&self.encode_s()?);
        Ok(msg)
    }

    pub fn end_timestamp(&self) -> u64 {
        self.start_timestamp
            .saturating_add(self.duration_days.saturating_mul(SECONDS_PER_DAY))
    }

    pub fn check_window(&self, now: u64, max_duration_days: u64) -> Result<()> {
        if self.duration_days > max_duration_days {
            return Err(FheError::DurationTooLong {
                requested: self.duration_days,
                max: max_duration_days,
            });
        }
        if now < self.start_timestamp {
            return Err(FheError::RequestNotYetValid {
                start: self.start_timestamp,
                now,
            });
        }
        let end = self.end_timestamp();
        if now >= end {
            return Err(FheError::RequestExpired { end, now });
        }

        Ok(())
    }

    pub fn covers(&self, contract: &UserAddress) -> bool {
        self.contract_addresses.contains(contract)
    }
}

/// A signed user-decryption request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserDecryptRequest {
    pub pairs: Vec<HandleContractPair>,
    pub authorization: UserDecryptAuthorization,
    pub user: UserAddress,
    signer: [u8; PUBLIC_KEY_LENGTH],
    signature: Vec<u8>,
}

impl UserDecryptRequest {
    pub fn sign(
        keypair: &Keypair,
        pairs: Vec<HandleContractPair>,
        authorization: UserDecryptAuthorization,
    ) -> Result<Self> {
        let sig = keypair.sign(&authorization.signing_bytes()?);

        Ok(UserDecryptRequest {
            pairs,
            authorization,
            user: UserAddress::from_pubkey(&keypair.public),
            signer: keypair.public.to_bytes(),
            signature: sig.to_bytes().to_vec(),
        })
    }

    /// Returns the requester only if the signature covers the authorization and
    /// the signing key belongs to the claimed user.
    pub fn verified_user(&self) -> Result<UserAddress> {
        let pubkey = PublicKey::from_bytes(&self.signer)
            .map_err(|e| FheError::InvalidSignature(e.to_string()))?;
        let sig = Signature::try_from(&self.signature[..])
            .map_err(|e| FheError::InvalidSignature(e.to_string()))?;
        pubkey
            .verify(&self.authorization.signing_bytes()?, &sig)
            .map_err(|e| FheError::InvalidSignature(e.to_string()))?;

        let signer_address = UserAddress::from_pubkey(&pubkey);
        if signer_address != self.user {
            return Err(FheError::InvalidSignature(format!(
                "signer {} does not match requester {}",
                signer_address, self.user
            )));
        }

        Ok(self.user)
    }
}

/// Plaintexts sealed to the request's ephemeral key, keyed by handle.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UserDecryptResponse {
    pub values: BTreeMap<CiphertextHandle, SodiumCiphertext>,
}

impl UserDecryptResponse {
    pub fn open(
        &self,
        ephemeral_key: &SodiumPrivateKey,
    ) -> Result<BTreeMap<CiphertextHandle, ClearValue>> {
        self.values
            .iter()
            .map(|(handle, sealed)| {
                let bytes = sealed.open(ephemeral_key)?;
                Ok((*handle, ClearValue::decode_s(&bytes)?))
            })
            .collect()
    }
}

/// Releases plaintexts to users holding a standing grant, under a signed and time-bounded request.
pub trait DecryptionAuthority {
    fn user_decrypt(&self, request: &UserDecryptRequest) -> Result<UserDecryptResponse>;
}

impl<A: DecryptionAuthority + ?Sized> DecryptionAuthority for Arc<A> {
    fn user_decrypt(&self, request: &UserDecryptRequest) -> Result<UserDecryptResponse> {
        (**self).user_decrypt(request)
    }
}
