pub mod ciphertexts;
pub mod crypto;
pub mod traits;

pub use crate::ciphertexts::{CiphertextHandle, FheType, HANDLE_SIZE};
pub use crate::crypto::{Ed25519ChallengeResponse, Sha256, UserAddress, ADDRESS_SIZE};
pub use traits::*;
