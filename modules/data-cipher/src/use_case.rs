use crate::{cipher::DataCipher, error::Result, state::StateTx};
use frame_common::{AccessPolicy, UserAddress};
use frame_fhe::HomomorphicEngine;

/// A state-changing operation on a `DataCipher`.
///
/// The service checks `access_policy` against `operation` to establish the
/// caller, then `run` performs every fallible step against a shared borrow of
/// the service and stages the resulting writes.
pub trait CipherUseCase: Sized {
    type AP: AccessPolicy;
    type Output;

    fn access_policy(&self) -> &Self::AP;

    /// Digest of this call as signed by the caller, for the service at `contract`.
    fn operation(&self, contract: &UserAddress) -> [u8; 32];

    fn run<E: HomomorphicEngine>(
        self,
        cipher: &DataCipher<E>,
        caller: UserAddress,
    ) -> Result<(StateTx, Self::Output)>;
}
