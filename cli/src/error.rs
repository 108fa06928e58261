use frame_fhe::FheError;
use module_data_cipher::DataCipherError;
use module_data_cipher_client::ClientError;
use std::{io, path::PathBuf};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    IoError(#[from] io::Error),
    #[error("{0}")]
    CodecError(#[from] bincode::Error),
    #[error("{0}")]
    DataCipherError(#[from] DataCipherError),
    #[error("{0}")]
    ClientError(#[from] ClientError),
    #[error("{0}")]
    FheError(#[from] FheError),
    #[error("Invalid keyfile: {0}")]
    InvalidKeyfile(PathBuf),
}
