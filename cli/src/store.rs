use crate::error::{CliError, Result};
use ed25519_dalek::{Keypair, PublicKey, SecretKey};
use frame_common::UserAddress;
use frame_config::{KEYS_DIR_NAME, STATE_FILE_NAME};
use frame_fhe::{LocalCoprocessor, LocalSnapshot};
use module_data_cipher::{CipherState, DataCipher};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::info;

/// What is written to the state file: the service identity, its state and the coprocessor's tables.
#[derive(Serialize, Deserialize)]
struct StoredService {
    contract: UserAddress,
    state: CipherState,
    coprocessor: LocalSnapshot,
}

/// The service as persisted under a root directory.
#[derive(Debug, Clone)]
pub struct ServiceStore {
    path: PathBuf,
}

impl ServiceStore {
    pub fn new(root_dir: &Path) -> Self {
        ServiceStore {
            path: root_dir.join(&*STATE_FILE_NAME),
        }
    }

    /// Load the service, deploying a fresh one on first use.
    pub fn load(&self) -> Result<DataCipher<LocalCoprocessor>> {
        if !self.path.exists() {
            let contract = UserAddress::random(&mut OsRng);
            info!("Deploying a new DataCipher at {}", contract);
            return Ok(DataCipher::new(LocalCoprocessor::new()?, contract));
        }

        let bytes = fs::read(&self.path)?;
        let stored: StoredService = bincode::deserialize(&bytes)?;
        Ok(DataCipher::from_state(
            LocalCoprocessor::from_snapshot(stored.coprocessor),
            stored.contract,
            stored.state,
        ))
    }

    pub fn save(&self, cipher: &DataCipher<LocalCoprocessor>) -> Result<()> {
        let stored = StoredService {
            contract: cipher.contract_address(),
            state: cipher.state().clone(),
            coprocessor: cipher.engine().snapshot(),
        };
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        // a crash mid-write must not truncate the previous state
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, bincode::serialize(&stored)?)?;
        fs::rename(&tmp, &self.path)?;

        Ok(())
    }
}

/// Load the account key at `index`, generating it on first use.
pub fn load_or_create_keypair(root_dir: &Path, index: usize) -> Result<Keypair> {
    let path = root_dir
        .join(&*KEYS_DIR_NAME)
        .join(format!("{}.key", index));

    if path.exists() {
        let encoded = fs::read_to_string(&path)?;
        let bytes =
            hex::decode(encoded.trim()).map_err(|_| CliError::InvalidKeyfile(path.clone()))?;
        let secret =
            SecretKey::from_bytes(&bytes).map_err(|_| CliError::InvalidKeyfile(path.clone()))?;
        let public = PublicKey::from(&secret);
        return Ok(Keypair { secret, public });
    }

    let keypair = Keypair::generate(&mut OsRng);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, hex::encode(keypair.secret.to_bytes()))?;
    info!("Created account {} at {}", index, path.display());

    Ok(keypair)
}
