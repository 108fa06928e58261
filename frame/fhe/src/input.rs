use crate::{
    error::{FheError, Result},
    value::ClearValue,
};
use frame_common::{CiphertextHandle, FheType, Sha256, State, UserAddress};
use frame_sodium::{SodiumCiphertext, SodiumPubKey};
use rand_core::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};

const INPUT_DOMAIN: &[u8] = b"data-cipher/input";

/// Encrypted inputs are only valid for the (contract, user) pair they were produced for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputBinding {
    pub contract: UserAddress,
    pub user: UserAddress,
}

impl InputBinding {
    pub fn new(contract: UserAddress, user: UserAddress) -> Self {
        InputBinding { contract, user }
    }
}

/// One plaintext sealed to the coprocessor's public key.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SealedInput {
    pub fhe_type: FheType,
    pub ciphertext: SodiumCiphertext,
}

/// Proof accompanying a batch of external handles: the binding plus every sealed value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InputProof {
    binding: InputBinding,
    inputs: Vec<SealedInput>,
}

impl InputProof {
    pub fn new(binding: InputBinding, inputs: Vec<SealedInput>) -> Self {
        InputProof { binding, inputs }
    }

    pub fn binding(&self) -> &InputBinding {
        &self.binding
    }

    pub fn inputs(&self) -> &[SealedInput] {
        &self.inputs
    }

    pub fn handles(&self) -> Result<Vec<CiphertextHandle>> {
        self.inputs
            .iter()
            .enumerate()
            .map(|(i, sealed)| input_handle(&self.binding, i as u32, sealed))
            .collect()
    }

    /// Find the sealed value the given handle commits to.
    pub fn find(&self, handle: &CiphertextHandle) -> Result<&SealedInput> {
        for (i, sealed) in self.inputs.iter().enumerate() {
            if input_handle(&self.binding, i as u32, sealed)? == *handle {
                return Ok(sealed);
            }
        }

        Err(FheError::HandleNotInProof(*handle))
    }
}

/// Handle of the `index`-th input of a proof, committing to the binding and the sealed bytes.
pub fn input_handle(
    binding: &InputBinding,
    index: u32,
    sealed: &SealedInput,
) -> Result<CiphertextHandle> {
    let sealed_bytes = sealed.ciphertext.encode_s()?;
    let digest = Sha256::hash_parts(&[
        INPUT_DOMAIN,
        binding.contract.as_bytes(),
        binding.user.as_bytes(),
        &index.to_be_bytes(),
        &[sealed.fhe_type.tag()],
        &sealed_bytes,
    ]);

    Ok(CiphertextHandle::from_digest(
        digest.as_array(),
        sealed.fhe_type,
    ))
}

/// External handles and the proof that lets the engine verify them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EncryptedInput {
    pub handles: Vec<CiphertextHandle>,
    pub input_proof: InputProof,
}

/// Client-side builder of encrypted inputs. Handles are returned in insertion order.
#[derive(Clone, Debug)]
pub struct EncryptedInputBuilder {
    binding: InputBinding,
    values: Vec<ClearValue>,
}

impl EncryptedInputBuilder {
    pub fn new(contract: UserAddress, user: UserAddress) -> Self {
        EncryptedInputBuilder {
            binding: InputBinding::new(contract, user),
            values: vec![],
        }
    }

    pub fn add_bool(mut self, value: bool) -> Self {
        self.values.push(ClearValue::Bool(value));
        self
    }

    pub fn add_u32(mut self, value: u32) -> Self {
        self.values.push(ClearValue::Uint32(value));
        self
    }

    pub fn add_address(mut self, value: UserAddress) -> Self {
        self.values.push(ClearValue::Address(value));
        self
    }

    pub fn encrypt<R>(self, rng: &mut R, coprocessor_key: &SodiumPubKey) -> Result<EncryptedInput>
    where
        R: RngCore + CryptoRng,
    {
        let inputs = self
            .values
            .iter()
            .map(|value| {
                let ciphertext = SodiumCiphertext::seal(rng, coprocessor_key, &value.to_bytes())?;
                Ok(SealedInput {
                    fhe_type: value.fhe_type(),
                    ciphertext,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let input_proof = InputProof::new(self.binding, inputs);
        let handles = input_proof.handles()?;

        Ok(EncryptedInput {
            handles,
            input_proof,
        })
    }
}
