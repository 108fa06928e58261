use anyhow::{anyhow, Result};
use crypto_box::{
    aead::{generic_array::GenericArray, Aead},
    Box as CryptoBox, PublicKey, SecretKey, KEY_SIZE,
};
use rand_core::{CryptoRng, RngCore};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

pub const SODIUM_PUBLIC_KEY_SIZE: usize = KEY_SIZE;
pub const SODIUM_NONCE_SIZE: usize = 24;

fn fixed<const N: usize>(what: &str, bytes: &[u8]) -> Result<[u8; N]> {
    if bytes.len() != N {
        return Err(anyhow!("{} must be {} bytes, got {}", what, N, bytes.len()));
    }
    let mut buf = [0u8; N];
    buf.copy_from_slice(bytes);
    Ok(buf)
}

#[derive(Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SodiumNonce([u8; SODIUM_NONCE_SIZE]);

impl fmt::Debug for SodiumNonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SodiumNonce({:02x?})", &self.0[..])
    }
}

impl SodiumNonce {
    pub fn generate<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        let nonce = crypto_box::generate_nonce(rng);
        let mut buf = [0u8; SODIUM_NONCE_SIZE];
        buf.copy_from_slice(nonce.as_slice());
        SodiumNonce(buf)
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0[..]
    }
}

/// X25519 secret used to open sealed values: the coprocessor's sealing key,
/// or a user's ephemeral key during user decryption.
#[derive(Clone)]
pub struct SodiumPrivateKey(SecretKey);

impl fmt::Debug for SodiumPrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SodiumPrivateKey(..)")
    }
}

impl PartialEq for SodiumPrivateKey {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bytes() == other.0.to_bytes()
    }
}

impl Serialize for SodiumPrivateKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.to_bytes().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SodiumPrivateKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        <[u8; KEY_SIZE]>::deserialize(deserializer).map(|bytes| SodiumPrivateKey(bytes.into()))
    }
}

impl SodiumPrivateKey {
    pub fn from_random<R>(rng: &mut R) -> Result<Self>
    where
        R: RngCore + CryptoRng,
    {
        Ok(SodiumPrivateKey(SecretKey::generate(rng)))
    }

    pub fn public_key(&self) -> SodiumPubKey {
        SodiumPubKey(self.0.public_key())
    }
}

#[derive(Clone)]
pub struct SodiumPubKey(PublicKey);

impl fmt::Debug for SodiumPubKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SodiumPubKey({:02x?})", &self.to_bytes()[..])
    }
}

impl PartialEq for SodiumPubKey {
    fn eq(&self, other: &Self) -> bool {
        self.to_bytes() == other.to_bytes()
    }
}

impl Eq for SodiumPubKey {}

impl Serialize for SodiumPubKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_bytes().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SodiumPubKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let bytes = <[u8; SODIUM_PUBLIC_KEY_SIZE]>::deserialize(deserializer)?;
        SodiumPubKey::from_bytes(&bytes).map_err(de::Error::custom)
    }
}

impl SodiumPubKey {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        fixed::<SODIUM_PUBLIC_KEY_SIZE>("sodium public key", bytes)
            .map(|buf| SodiumPubKey(PublicKey::from(buf)))
    }

    pub fn to_bytes(&self) -> [u8; SODIUM_PUBLIC_KEY_SIZE] {
        *self.0.as_bytes()
    }
}

/// A value sealed to a recipient key. Each seal uses a fresh sender key, so
/// sealing the same plaintext twice yields unrelated ciphertexts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SodiumCiphertext {
    sender: SodiumPubKey,
    nonce: SodiumNonce,
    #[serde(with = "serde_bytes")]
    sealed: Vec<u8>,
}

impl SodiumCiphertext {
    pub fn seal<R>(rng: &mut R, recipient: &SodiumPubKey, plaintext: &[u8]) -> Result<Self>
    where
        R: RngCore + CryptoRng,
    {
        let sender_key = SodiumPrivateKey::from_random(rng)?;
        let nonce = SodiumNonce::generate(rng);
        let sealed = CryptoBox::new(&recipient.0, &sender_key.0)
            .encrypt(GenericArray::from_slice(nonce.as_slice()), plaintext)
            .map_err(|e| anyhow!("Failed to seal value: {:?}", e))?;

        Ok(SodiumCiphertext {
            sender: sender_key.public_key(),
            nonce,
            sealed,
        })
    }

    pub fn open(&self, recipient_key: &SodiumPrivateKey) -> Result<Vec<u8>> {
        CryptoBox::new(&self.sender.0, &recipient_key.0)
            .decrypt(GenericArray::from_slice(self.nonce.as_slice()), &self.sealed[..])
            .map_err(|e| anyhow!("Failed to open sealed value: {:?}", e))
    }
}
