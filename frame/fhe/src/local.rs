//! In-process coprocessor implementing both the engine and the decryption authority.
//!
//! Ciphertexts are kept sealed under the coprocessor's own key and only opened
//! while an operation or an authorized decryption is evaluated.

use crate::{
    decryption::{unix_timestamp, DecryptionAuthority, UserDecryptRequest, UserDecryptResponse},
    engine::HomomorphicEngine,
    error::{FheError, Result},
    input::{InputBinding, InputProof, SealedInput},
    value::ClearValue,
};
use frame_common::{CiphertextHandle, FheType, Sha256, State, UserAddress};
use frame_config::MAX_USER_DECRYPT_DURATION_DAYS;
use frame_sodium::{SodiumCiphertext, SodiumPrivateKey, SodiumPubKey};
use parking_lot::RwLock;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

const OP_DOMAIN: &[u8] = b"data-cipher/op";
const OP_EQ: &[u8] = b"eq";
const OP_SELECT: &[u8] = b"select";
const OP_TRIVIAL: &[u8] = b"trivial";

/// Serializable contents of a `LocalCoprocessor`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LocalSnapshot {
    sealing_key: SodiumPrivateKey,
    ciphertexts: BTreeMap<CiphertextHandle, SealedInput>,
    acl: BTreeMap<CiphertextHandle, BTreeSet<UserAddress>>,
}

impl LocalSnapshot {
    fn new(sealing_key: SodiumPrivateKey) -> Self {
        LocalSnapshot {
            sealing_key,
            ciphertexts: BTreeMap::new(),
            acl: BTreeMap::new(),
        }
    }

    fn open(&self, handle: &CiphertextHandle) -> Result<ClearValue> {
        let sealed = self
            .ciphertexts
            .get(handle)
            .ok_or(FheError::UnknownHandle(*handle))?;
        let bytes = sealed.ciphertext.open(&self.sealing_key)?;
        ClearValue::from_bytes(sealed.fhe_type, &bytes)
    }

    fn store(&mut self, handle: CiphertextHandle, value: &ClearValue) -> Result<()> {
        if self.ciphertexts.contains_key(&handle) {
            return Ok(());
        }
        let ciphertext = SodiumCiphertext::seal(
            &mut OsRng,
            &self.sealing_key.public_key(),
            &value.to_bytes(),
        )?;
        self.ciphertexts.insert(
            handle,
            SealedInput {
                fhe_type: value.fhe_type(),
                ciphertext,
            },
        );

        Ok(())
    }

    fn is_allowed(&self, handle: &CiphertextHandle, account: &UserAddress) -> bool {
        self.acl
            .get(handle)
            .map(|accounts| accounts.contains(account))
            .unwrap_or(false)
    }
}

#[derive(Debug)]
pub struct LocalCoprocessor {
    state: RwLock<LocalSnapshot>,
    max_duration_days: u64,
}

impl LocalCoprocessor {
    pub fn new() -> Result<Self> {
        let sealing_key = SodiumPrivateKey::from_random(&mut OsRng)?;
        Ok(Self::from_snapshot(LocalSnapshot::new(sealing_key)))
    }

    pub fn from_snapshot(snapshot: LocalSnapshot) -> Self {
        LocalCoprocessor {
            state: RwLock::new(snapshot),
            max_duration_days: *MAX_USER_DECRYPT_DURATION_DAYS,
        }
    }

    pub fn with_max_duration_days(mut self, days: u64) -> Self {
        self.max_duration_days = days;
        self
    }

    pub fn snapshot(&self) -> LocalSnapshot {
        self.state.read().clone()
    }

    /// Key clients seal their encrypted inputs to.
    pub fn public_key(&self) -> SodiumPubKey {
        self.state.read().sealing_key.public_key()
    }

    pub fn ciphertext_count(&self) -> usize {
        self.state.read().ciphertexts.len()
    }

    fn derive_handle(op: &[u8], operands: &[&[u8]], fhe_type: FheType) -> CiphertextHandle {
        let mut parts: Vec<&[u8]> = vec![OP_DOMAIN, op];
        parts.extend_from_slice(operands);
        let digest = Sha256::hash_parts(&parts);
        CiphertextHandle::from_digest(digest.as_array(), fhe_type)
    }
}

impl HomomorphicEngine for LocalCoprocessor {
    fn verify_input(
        &self,
        handle: &CiphertextHandle,
        proof: &InputProof,
        binding: &InputBinding,
    ) -> Result<CiphertextHandle> {
        let proof_binding = proof.binding();
        if proof_binding != binding {
            return Err(FheError::BindingMismatch {
                proof_contract: proof_binding.contract,
                proof_user: proof_binding.user,
                contract: binding.contract,
                user: binding.user,
            });
        }

        let sealed = proof.find(handle)?;
        let mut state = self.state.write();
        let bytes = sealed.ciphertext.open(&state.sealing_key)?;
        ClearValue::from_bytes(sealed.fhe_type, &bytes)?;

        state
            .ciphertexts
            .entry(*handle)
            .or_insert_with(|| sealed.clone());
        debug!("Verified input {} for user {}", handle, binding.user);

        Ok(*handle)
    }

    fn eq(&self, lhs: &CiphertextHandle, rhs: &CiphertextHandle) -> Result<CiphertextHandle> {
        let mut state = self.state.write();
        let a = state.open(lhs)?;
        let b = state.open(rhs)?;
        if a.fhe_type() != b.fhe_type() {
            return Err(FheError::TypeMismatch {
                expected: a.fhe_type(),
                actual: b.fhe_type(),
            });
        }

        let handle = Self::derive_handle(OP_EQ, &[lhs.as_bytes(), rhs.as_bytes()], FheType::Bool);
        state.store(handle, &ClearValue::Bool(a == b))?;

        Ok(handle)
    }

    fn select(
        &self,
        cond: &CiphertextHandle,
        if_true: &CiphertextHandle,
        if_false: &CiphertextHandle,
    ) -> Result<CiphertextHandle> {
        let mut state = self.state.write();
        let c = state.open(cond)?;
        let flag = c.as_bool().ok_or(FheError::TypeMismatch {
            expected: FheType::Bool,
            actual: c.fhe_type(),
        })?;
        let t = state.open(if_true)?;
        let f = state.open(if_false)?;
        if t.fhe_type() != f.fhe_type() {
            return Err(FheError::TypeMismatch {
                expected: t.fhe_type(),
                actual: f.fhe_type(),
            });
        }

        let handle = Self::derive_handle(
            OP_SELECT,
            &[cond.as_bytes(), if_true.as_bytes(), if_false.as_bytes()],
            t.fhe_type(),
        );
        state.store(handle, if flag { &t } else { &f })?;

        Ok(handle)
    }

    fn trivial_encrypt(&self, value: ClearValue) -> Result<CiphertextHandle> {
        let tag = [value.fhe_type().tag()];
        let bytes = value.to_bytes();
        let handle = Self::derive_handle(OP_TRIVIAL, &[&tag[..], &bytes[..]], value.fhe_type());
        self.state.write().store(handle, &value)?;

        Ok(handle)
    }

    fn allow(&self, handle: &CiphertextHandle, account: &UserAddress) -> Result<()> {
        let mut state = self.state.write();
        if !state.ciphertexts.contains_key(handle) {
            return Err(FheError::UnknownHandle(*handle));
        }
        state.acl.entry(*handle).or_default().insert(*account);

        Ok(())
    }

    fn is_allowed(&self, handle: &CiphertextHandle, account: &UserAddress) -> bool {
        self.state.read().is_allowed(handle, account)
    }
}

impl DecryptionAuthority for LocalCoprocessor {
    fn user_decrypt(&self, request: &UserDecryptRequest) -> Result<UserDecryptResponse> {
        let user = request.verified_user()?;
        let authorization = &request.authorization;
        authorization.check_window(unix_timestamp(), self.max_duration_days)?;

        let state = self.state.read();
        let mut response = UserDecryptResponse::default();
        for pair in &request.pairs {
            if !authorization.covers(&pair.contract_address) {
                return Err(FheError::ContractNotAuthorized(pair.contract_address));
            }
            for account in &[user, pair.contract_address] {
                if !state.is_allowed(&pair.handle, account) {
                    return Err(FheError::AclDenied {
                        handle: pair.handle,
                        account: *account,
                    });
                }
            }

            let value = state.open(&pair.handle)?;
            let sealed =
                SodiumCiphertext::seal(&mut OsRng, &authorization.public_key, &value.encode_s()?)?;
            response.values.insert(pair.handle, sealed);
        }
        info!(
            "Released {} values to user {}",
            response.values.len(),
            user
        );

        Ok(response)
    }
}
