//! Confidential keyed-write gate.
//!
//! Databases are created with an encrypted key. Entries are written together
//! with an encrypted candidate key and are stored as the submitted value when
//! the keys match and as an encrypted zero otherwise, without the service ever
//! learning which case occurred.

mod cipher;
mod database;
mod entries;
mod error;
mod events;
mod gate;
mod operation;
mod registry;
mod state;
mod use_case;

pub use crate::cipher::DataCipher;
pub use crate::database::{
    validate_name, Database, DatabaseId, DatabaseInfo, MAX_DATABASE_NAME_LEN,
};
pub use crate::error::{DataCipherError, Result};
pub use crate::events::CipherEvent;
pub use crate::gate::{keyed_select, AddEntry};
pub use crate::operation::{add_entry_operation, create_database_operation};
pub use crate::registry::CreateDatabase;
pub use crate::state::{CipherState, StateOp, StateTx};
pub use crate::use_case::CipherUseCase;
