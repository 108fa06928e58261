use crate::error::{FheError, Result};
use frame_common::{FheType, UserAddress};
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;

/// A plaintext of one of the encrypted types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClearValue {
    Bool(bool),
    Uint32(u32),
    Address(UserAddress),
}

impl ClearValue {
    pub fn fhe_type(&self) -> FheType {
        match self {
            ClearValue::Bool(_) => FheType::Bool,
            ClearValue::Uint32(_) => FheType::Uint32,
            ClearValue::Address(_) => FheType::Address,
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            ClearValue::Bool(b) => vec![*b as u8],
            ClearValue::Uint32(v) => v.to_be_bytes().to_vec(),
            ClearValue::Address(addr) => addr.as_bytes().to_vec(),
        }
    }

    /// Parse a plaintext of the given type, rejecting anything that is not its canonical encoding.
    pub fn from_bytes(fhe_type: FheType, bytes: &[u8]) -> Result<Self> {
        let malformed = || FheError::MalformedPlaintext {
            fhe_type,
            len: bytes.len(),
        };
        if bytes.len() != fhe_type.plaintext_size() {
            return Err(malformed());
        }

        match fhe_type {
            FheType::Bool => match bytes[0] {
                0 => Ok(ClearValue::Bool(false)),
                1 => Ok(ClearValue::Bool(true)),
                _ => Err(malformed()),
            },
            FheType::Uint32 => {
                let mut buf = [0u8; 4];
                buf.copy_from_slice(bytes);
                Ok(ClearValue::Uint32(u32::from_be_bytes(buf)))
            }
            FheType::Address => UserAddress::try_from(bytes)
                .map(ClearValue::Address)
                .map_err(|_| malformed()),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ClearValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_u32(&self) -> Option<u32> {
        match self {
            ClearValue::Uint32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_address(&self) -> Option<UserAddress> {
        match self {
            ClearValue::Address(addr) => Some(*addr),
            _ => None,
        }
    }
}
