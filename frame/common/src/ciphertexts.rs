use anyhow::{anyhow, Error, Result};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

pub const HANDLE_SIZE: usize = 32;
const TYPE_TAG_INDEX: usize = HANDLE_SIZE - 1;

/// Encrypted types understood by the homomorphic engine.
/// Tags follow the numbering used for `ebool`, `euint32` and `eaddress`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FheType {
    Bool,
    Uint32,
    Address,
}

impl FheType {
    pub fn tag(self) -> u8 {
        match self {
            FheType::Bool => 0,
            FheType::Uint32 => 4,
            FheType::Address => 7,
        }
    }

    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(FheType::Bool),
            4 => Some(FheType::Uint32),
            7 => Some(FheType::Address),
            _ => None,
        }
    }

    /// Byte length of the plaintext encoding of this type.
    pub fn plaintext_size(self) -> usize {
        match self {
            FheType::Bool => 1,
            FheType::Uint32 => 4,
            FheType::Address => crate::crypto::ADDRESS_SIZE,
        }
    }
}

/// An opaque reference to a ciphertext held by the homomorphic engine.
/// It carries no plaintext; the last byte records the encrypted type.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CiphertextHandle([u8; HANDLE_SIZE]);

impl CiphertextHandle {
    /// Build a handle from a 32-byte digest, overwriting the last byte with the type tag.
    pub fn from_digest(digest: [u8; HANDLE_SIZE], fhe_type: FheType) -> Self {
        let mut inner = digest;
        inner[TYPE_TAG_INDEX] = fhe_type.tag();
        CiphertextHandle(inner)
    }

    pub fn from_array(array: [u8; HANDLE_SIZE]) -> Self {
        CiphertextHandle(array)
    }

    pub fn fhe_type(&self) -> Option<FheType> {
        FheType::from_tag(self.0[TYPE_TAG_INDEX])
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0[..]
    }

    pub fn into_array(self) -> [u8; HANDLE_SIZE] {
        self.0
    }
}

impl fmt::Debug for CiphertextHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CiphertextHandle({})", self)
    }
}

impl fmt::Display for CiphertextHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for CiphertextHandle {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex_part = s.trim().strip_prefix("0x").unwrap_or_else(|| s.trim());
        let bytes = hex::decode(hex_part)?;
        if bytes.len() != HANDLE_SIZE {
            return Err(anyhow!(
                "handle length must be {}, got {}",
                HANDLE_SIZE,
                bytes.len()
            ));
        }

        let mut res = [0u8; HANDLE_SIZE];
        res.copy_from_slice(&bytes);
        Ok(CiphertextHandle(res))
    }
}
