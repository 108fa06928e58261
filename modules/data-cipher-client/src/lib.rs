mod client;
mod error;

pub use crate::client::Client;
pub use crate::error::{ClientError, Result};
