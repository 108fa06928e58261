use frame_common::{CiphertextHandle, FheType, UserAddress};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, FheError>;

#[derive(Error, Debug)]
pub enum FheError {
    #[error("Unknown ciphertext handle: {0}")]
    UnknownHandle(CiphertextHandle),
    #[error("Type mismatch: expected {expected:?}, got {actual:?}")]
    TypeMismatch { expected: FheType, actual: FheType },
    #[error("Handle {0} is not part of the input proof")]
    HandleNotInProof(CiphertextHandle),
    #[error("Input proof is bound to ({proof_contract}, {proof_user}), expected ({contract}, {user})")]
    BindingMismatch {
        proof_contract: UserAddress,
        proof_user: UserAddress,
        contract: UserAddress,
        user: UserAddress,
    },
    #[error("Malformed {fhe_type:?} plaintext of {len} bytes")]
    MalformedPlaintext { fhe_type: FheType, len: usize },
    #[error("{account} is not allowed to access {handle}")]
    AclDenied {
        handle: CiphertextHandle,
        account: UserAddress,
    },
    #[error("Contract {0} is not covered by the decryption authorization")]
    ContractNotAuthorized(UserAddress),
    #[error("Invalid signature: {0}")]
    InvalidSignature(String),
    #[error("Decryption request is not valid before {start}, now is {now}")]
    RequestNotYetValid { start: u64, now: u64 },
    #[error("Decryption request expired at {end}, now is {now}")]
    RequestExpired { end: u64, now: u64 },
    #[error("Requested duration of {requested} days exceeds the maximum of {max} days")]
    DurationTooLong { requested: u64, max: u64 },
    #[error("Sealing error: {0}")]
    Sealing(#[from] anyhow::Error),
    #[error("Codec error: {0}")]
    Codec(#[from] bincode::Error),
}
