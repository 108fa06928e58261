use frame_common::{CiphertextHandle, FheType};
use frame_fhe::FheError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("{0}")]
    FheError(#[from] FheError),
    #[error("Decryption response is missing handle {0}")]
    MissingValue(CiphertextHandle),
    #[error("Handle {handle} did not decrypt to a {expected:?} value")]
    UnexpectedValue {
        handle: CiphertextHandle,
        expected: FheType,
    },
}
