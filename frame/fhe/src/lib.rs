//! Seams to the external homomorphic-computation service.
//!
//! `HomomorphicEngine` evaluates operations over ciphertext handles and
//! `DecryptionAuthority` releases plaintexts to authorized users. Callers
//! only ever hold handles; the `local` feature provides an in-process
//! coprocessor implementing both traits.

mod decryption;
mod engine;
mod error;
mod input;
#[cfg(feature = "local")]
pub mod local;
mod value;

pub use crate::decryption::{
    unix_timestamp, DecryptionAuthority, HandleContractPair, UserDecryptAuthorization,
    UserDecryptRequest, UserDecryptResponse,
};
pub use crate::engine::HomomorphicEngine;
pub use crate::error::{FheError, Result};
pub use crate::input::{
    input_handle, EncryptedInput, EncryptedInputBuilder, InputBinding, InputProof, SealedInput,
};
pub use crate::value::ClearValue;
#[cfg(feature = "local")]
pub use crate::local::{LocalCoprocessor, LocalSnapshot};
