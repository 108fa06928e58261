use crate::crypto::UserAddress;
use anyhow::Result;
use ed25519_dalek::PublicKey;
use serde::{de::DeserializeOwned, Serialize};
use std::fmt::Debug;

/// A trait to verify policy to access resources held by a service.
pub trait AccessPolicy: Clone + Debug {
    /// Check that the caller authorized exactly `operation`.
    fn verify(&self, operation: &[u8]) -> Result<()>;

    fn into_user_address(&self) -> UserAddress;

    /// One-time value covered by the signature. A service accepts each at most once.
    fn challenge(&self) -> [u8; 32];
}

/// Trait of any state persisted or signed in its bincode encoding.
pub trait State: Sized + Clone + Debug + DeserializeOwned + Serialize {
    fn encode_s(&self) -> Result<Vec<u8>> {
        bincode::serialize(&self).map_err(Into::into)
    }

    fn decode_s(bytes: &[u8]) -> Result<Self> {
        bincode::deserialize(bytes).map_err(Into::into)
    }
}

impl<T: Sized + Clone + Debug + DeserializeOwned + Serialize> State for T {}

/// Trait for 256-bits hash functions
pub trait Hash256 {
    fn hash(inp: &[u8]) -> Self;

    fn from_pubkey(pubkey: &PublicKey) -> Self;
}
