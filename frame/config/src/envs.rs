use lazy_static::lazy_static;
use std::{env, path::PathBuf};

lazy_static! {
    pub static ref DATA_CIPHER_ROOT_DIR: PathBuf = env::var("DATA_CIPHER_ROOT_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let mut root_dir = env::var("HOME")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("."));
            root_dir.push(".data-cipher");
            root_dir
        });
    /// Validity window requested by clients when asking for user decryption.
    pub static ref USER_DECRYPT_DURATION_DAYS: u64 =
        days_from_env("USER_DECRYPT_DURATION_DAYS", 10);
    /// Longest validity window a decryption authority accepts.
    pub static ref MAX_USER_DECRYPT_DURATION_DAYS: u64 =
        days_from_env("MAX_USER_DECRYPT_DURATION_DAYS", 365);
    pub static ref STATE_FILE_NAME: String =
        env::var("DATA_CIPHER_STATE_FILE").unwrap_or_else(|_| "state.bin".to_string());
    pub static ref KEYS_DIR_NAME: String =
        env::var("DATA_CIPHER_KEYS_DIR").unwrap_or_else(|_| "keys".to_string());
}

pub const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

fn days_from_env(var: &str, default: u64) -> u64 {
    match env::var(var) {
        Ok(days) => days
            .parse()
            .unwrap_or_else(|_| panic!("{} must be an unsigned integer, got {:?}", var, days)),
        Err(_) => default,
    }
}
