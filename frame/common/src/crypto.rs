use crate::traits::{AccessPolicy, Hash256};
use anyhow::{anyhow, Error, Result};
use ed25519_dalek::{Keypair, PublicKey, Signature, Signer, Verifier};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::{convert::TryFrom, fmt, str::FromStr};

pub const ADDRESS_SIZE: usize = 20;
const CHALLENGE_SIZE: usize = 32;

/// User address represents last 20 bytes of digest of user's public key.
/// Owners, database keys and the service identity are all user addresses.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserAddress([u8; ADDRESS_SIZE]);

impl fmt::Debug for UserAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UserAddress({})", self)
    }
}

impl fmt::Display for UserAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl TryFrom<&[u8]> for UserAddress {
    type Error = Error;

    fn try_from(s: &[u8]) -> Result<Self, Self::Error> {
        if s.len() != ADDRESS_SIZE {
            return Err(anyhow!(
                "source length must be {}, got {}",
                ADDRESS_SIZE,
                s.len()
            ));
        }

        let mut res = [0u8; ADDRESS_SIZE];
        res.copy_from_slice(s);
        Ok(Self::from_array(res))
    }
}

impl TryFrom<Vec<u8>> for UserAddress {
    type Error = Error;

    fn try_from(s: Vec<u8>) -> Result<Self, Self::Error> {
        Self::try_from(&s[..])
    }
}

/// Accepts a `0x`-prefixed or bare hex string, or the base64 form.
impl FromStr for UserAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let hex_part = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        if hex_part.len() == ADDRESS_SIZE * 2 {
            if let Ok(bytes) = hex::decode(hex_part) {
                return Self::try_from(bytes);
            }
        }

        Self::base64_decode(trimmed)
    }
}

impl UserAddress {
    pub fn from_pubkey(pubkey: &PublicKey) -> Self {
        let hash = Sha256::from_pubkey(pubkey);
        let addr = &hash.as_array()[12..];
        let mut res = [0u8; ADDRESS_SIZE];
        res.copy_from_slice(addr);

        UserAddress(res)
    }

    pub fn base64_encode(&self) -> String {
        base64::encode(self.as_bytes())
    }

    pub fn base64_decode(encoded_str: &str) -> Result<Self> {
        let decoded_vec = base64::decode(encoded_str)?;
        Self::try_from(decoded_vec)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0[..]
    }

    pub fn from_array(array: [u8; ADDRESS_SIZE]) -> Self {
        UserAddress(array)
    }

    pub fn into_array(self) -> [u8; ADDRESS_SIZE] {
        self.0
    }

    /// Generates an address from a fresh random key. Used for database keys,
    /// which only need to be unpredictable, not backed by a signing key.
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        UserAddress(rng.gen::<[u8; ADDRESS_SIZE]>())
    }
}

/// Hash digest of sha256 hash function
#[derive(Clone, Default, Debug, PartialEq, Eq, Hash)]
pub struct Sha256([u8; 32]);

impl Hash256 for Sha256 {
    fn hash(inp: &[u8]) -> Self {
        use sha2::Digest;
        let mut hasher = sha2::Sha256::new();
        hasher.update(inp);

        let mut res = Sha256::default();
        res.copy_from_slice(&hasher.finalize());
        res
    }

    fn from_pubkey(pubkey: &PublicKey) -> Self {
        Self::hash(&pubkey.to_bytes())
    }
}

impl Sha256 {
    /// Hash the concatenation of several byte strings without allocating them together.
    pub fn hash_parts(parts: &[&[u8]]) -> Self {
        use sha2::Digest;
        let mut hasher = sha2::Sha256::new();
        for part in parts {
            hasher.update(part);
        }

        let mut res = Sha256::default();
        res.copy_from_slice(&hasher.finalize());
        res
    }

    pub fn as_array(&self) -> [u8; 32] {
        self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0[..]
    }

    fn copy_from_slice(&mut self, src: &[u8]) {
        self.0.copy_from_slice(src)
    }
}

/// Access right of Read/Write to the service state.
/// The caller signs a random challenge together with the operation it
/// authorizes, so the response is valid for that operation only.
#[derive(Debug, Clone)]
pub struct Ed25519ChallengeResponse {
    sig: Signature,
    pubkey: PublicKey,
    challenge: [u8; CHALLENGE_SIZE],
}

impl AccessPolicy for Ed25519ChallengeResponse {
    fn verify(&self, operation: &[u8]) -> Result<()> {
        self.verify_sig(operation)
    }

    fn into_user_address(&self) -> UserAddress {
        self.user_address()
    }

    fn challenge(&self) -> [u8; 32] {
        self.challenge
    }
}

fn signed_message(challenge: &[u8], operation: &[u8]) -> Vec<u8> {
    let mut msg = Vec::with_capacity(challenge.len() + operation.len());
    msg.extend_from_slice(challenge);
    msg.extend_from_slice(operation);
    msg
}

impl Ed25519ChallengeResponse {
    pub fn new(sig: Signature, pubkey: PublicKey, challenge: [u8; CHALLENGE_SIZE]) -> Self {
        Ed25519ChallengeResponse {
            sig,
            pubkey,
            challenge,
        }
    }

    pub fn new_from_keypair<R: Rng>(keypair: &Keypair, rng: &mut R, operation: &[u8]) -> Self {
        let challenge = rng.gen::<[u8; CHALLENGE_SIZE]>();
        let sig = keypair.sign(&signed_message(&challenge, operation));

        Self::new(sig, keypair.public, challenge)
    }

    pub fn verify_sig(&self, operation: &[u8]) -> Result<()> {
        self.pubkey
            .verify(&signed_message(&self.challenge, operation), &self.sig)
            .map_err(|e| anyhow!("{:?}", e))?;

        Ok(())
    }

    pub fn user_address(&self) -> UserAddress {
        UserAddress::from_pubkey(self.pubkey())
    }

    pub fn sig(&self) -> &Signature {
        &self.sig
    }

    pub fn pubkey(&self) -> &PublicKey {
        &self.pubkey
    }
}
