use crate::{
    error::Result,
    input::{InputBinding, InputProof},
    value::ClearValue,
};
use frame_common::{CiphertextHandle, UserAddress};
use std::sync::Arc;

/// Operations the external homomorphic-computation service evaluates on behalf of a caller.
///
/// Every method returns handles only; implementations must produce deterministic
/// handles for deterministic operands and must never reveal plaintexts through
/// their return values.
pub trait HomomorphicEngine {
    /// Check that `handle` is committed to by `proof` for the given binding and lift it
    /// into a handle usable in further operations.
    fn verify_input(
        &self,
        handle: &CiphertextHandle,
        proof: &InputProof,
        binding: &InputBinding,
    ) -> Result<CiphertextHandle>;

    /// Encrypted equality of two operands of the same type; the result is an encrypted bool.
    fn eq(&self, lhs: &CiphertextHandle, rhs: &CiphertextHandle) -> Result<CiphertextHandle>;

    /// Encrypted multiplexer: `cond ? if_true : if_false` without decrypting `cond`.
    fn select(
        &self,
        cond: &CiphertextHandle,
        if_true: &CiphertextHandle,
        if_false: &CiphertextHandle,
    ) -> Result<CiphertextHandle>;

    /// Encrypt a public constant.
    fn trivial_encrypt(&self, value: ClearValue) -> Result<CiphertextHandle>;

    /// Grant `account` a standing right to have `handle` decrypted for it.
    fn allow(&self, handle: &CiphertextHandle, account: &UserAddress) -> Result<()>;

    fn is_allowed(&self, handle: &CiphertextHandle, account: &UserAddress) -> bool;
}

impl<E: HomomorphicEngine + ?Sized> HomomorphicEngine for Arc<E> {
    fn verify_input(
        &self,
        handle: &CiphertextHandle,
        proof: &InputProof,
        binding: &InputBinding,
    ) -> Result<CiphertextHandle> {
        (**self).verify_input(handle, proof, binding)
    }

    fn eq(&self, lhs: &CiphertextHandle, rhs: &CiphertextHandle) -> Result<CiphertextHandle> {
        (**self).eq(lhs, rhs)
    }

    fn select(
        &self,
        cond: &CiphertextHandle,
        if_true: &CiphertextHandle,
        if_false: &CiphertextHandle,
    ) -> Result<CiphertextHandle> {
        (**self).select(cond, if_true, if_false)
    }

    fn trivial_encrypt(&self, value: ClearValue) -> Result<CiphertextHandle> {
        (**self).trivial_encrypt(value)
    }

    fn allow(&self, handle: &CiphertextHandle, account: &UserAddress) -> Result<()> {
        (**self).allow(handle, account)
    }

    fn is_allowed(&self, handle: &CiphertextHandle, account: &UserAddress) -> bool {
        (**self).is_allowed(handle, account)
    }
}
