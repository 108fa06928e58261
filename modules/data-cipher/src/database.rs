use crate::error::{DataCipherError, Result};
use frame_common::{CiphertextHandle, UserAddress};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Upper bound on the number of characters in a database name.
pub const MAX_DATABASE_NAME_LEN: usize = 48;

/// Sequential identifier of a database, starting at 0.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DatabaseId(u64);

impl DatabaseId {
    pub fn new(id: u64) -> Self {
        DatabaseId(id)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }

    pub(crate) fn as_index(&self) -> Option<usize> {
        if self.0 > usize::max_value() as u64 {
            return None;
        }
        Some(self.0 as usize)
    }
}

impl From<u64> for DatabaseId {
    fn from(id: u64) -> Self {
        DatabaseId(id)
    }
}

impl fmt::Display for DatabaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DatabaseId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        s.trim().parse::<u64>().map(DatabaseId)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Database {
    id: DatabaseId,
    name: String,
    owner: UserAddress,
    key_handle: CiphertextHandle,
    entries: Vec<CiphertextHandle>,
}

impl Database {
    pub(crate) fn new(
        id: DatabaseId,
        name: String,
        owner: UserAddress,
        key_handle: CiphertextHandle,
    ) -> Self {
        Database {
            id,
            name,
            owner,
            key_handle,
            entries: vec![],
        }
    }

    pub fn id(&self) -> DatabaseId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn owner(&self) -> UserAddress {
        self.owner
    }

    pub fn key_handle(&self) -> CiphertextHandle {
        self.key_handle
    }

    pub fn entries(&self) -> &[CiphertextHandle] {
        &self.entries
    }

    pub fn info(&self) -> DatabaseInfo {
        DatabaseInfo {
            name: self.name.clone(),
            owner: self.owner,
            entry_count: self.entries.len() as u64,
        }
    }

    pub(crate) fn push_entry(&mut self, handle: CiphertextHandle) {
        self.entries.push(handle);
    }
}

/// Public metadata of a database. Never includes the key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseInfo {
    pub name: String,
    pub owner: UserAddress,
    pub entry_count: u64,
}

/// Names are counted in characters, not bytes.
pub fn validate_name(name: &str) -> Result<()> {
    let len = name.chars().count();
    if len == 0 || len > MAX_DATABASE_NAME_LEN {
        return Err(DataCipherError::InvalidName { len });
    }

    Ok(())
}
