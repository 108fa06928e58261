use crate::database::DatabaseId;
use frame_common::UserAddress;
use frame_fhe::FheError;
use thiserror::Error;

/// The result type in this crate.
pub type Result<T> = std::result::Result<T, DataCipherError>;

/// The error type in this crate.
/// Every variant is raised before any state is committed.
#[derive(Error, Debug)]
pub enum DataCipherError {
    #[error("invalid database name length: {len}")]
    InvalidName { len: usize },
    #[error("invalid ciphertext input: {0}")]
    InvalidCiphertextInput(FheError),
    #[error("database {0} is not found")]
    NotFound(DatabaseId),
    #[error("invalid access policy: {0}")]
    InvalidAccessPolicy(anyhow::Error),
    #[error("access policy of {0} has already been used")]
    ReplayedAccessPolicy(UserAddress),
    #[error("homomorphic engine error: {0}")]
    Engine(FheError),
}
