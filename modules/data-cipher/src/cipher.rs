use crate::{
    error::{DataCipherError, Result},
    events::CipherEvent,
    state::CipherState,
    use_case::CipherUseCase,
};
use frame_common::{AccessPolicy, CiphertextHandle, FheType, UserAddress};
use frame_fhe::{FheError, HomomorphicEngine, InputBinding, InputProof};
use tracing::debug;

/// A DataCipher service instance: its identity, its state and the engine it
/// evaluates encrypted operations with.
///
/// Mutators take `&mut self`, so operations on one instance are applied one at a time.
#[derive(Debug)]
pub struct DataCipher<E> {
    engine: E,
    contract: UserAddress,
    state: CipherState,
}

impl<E: HomomorphicEngine> DataCipher<E> {
    pub fn new(engine: E, contract: UserAddress) -> Self {
        Self::from_state(engine, contract, CipherState::new())
    }

    pub fn from_state(engine: E, contract: UserAddress, state: CipherState) -> Self {
        DataCipher {
            engine,
            contract,
            state,
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Identity encrypted inputs are bound to and that holds grants on every stored handle.
    pub fn contract_address(&self) -> UserAddress {
        self.contract
    }

    pub fn state(&self) -> &CipherState {
        &self.state
    }

    pub fn into_parts(self) -> (E, CipherState) {
        (self.engine, self.state)
    }

    pub fn events(&self) -> &[CipherEvent] {
        self.state.events()
    }

    /// Evaluate the use case against the current state and commit what it staged.
    /// Nothing is committed when any step fails, including the use of the challenge.
    pub fn execute<U: CipherUseCase>(&mut self, use_case: U) -> Result<U::Output> {
        let caller = self.eval_policy(&use_case)?;
        let challenge = use_case.access_policy().challenge();
        let (mut tx, output) = use_case.run(self, caller)?;
        tx.consume_challenge(challenge);
        self.state.commit(tx);

        Ok(output)
    }

    /// The caller is whoever signed this exact call with a challenge not seen before.
    fn eval_policy<U: CipherUseCase>(&self, use_case: &U) -> Result<UserAddress> {
        let access_policy = use_case.access_policy();
        access_policy
            .verify(&use_case.operation(&self.contract))
            .map_err(DataCipherError::InvalidAccessPolicy)?;

        let caller = access_policy.into_user_address();
        if self.state.is_challenge_used(&access_policy.challenge()) {
            return Err(DataCipherError::ReplayedAccessPolicy(caller));
        }

        Ok(caller)
    }

    /// Lift an external handle submitted by `caller`, requiring it to carry the given type.
    pub(crate) fn verify_input(
        &self,
        handle: &CiphertextHandle,
        proof: &InputProof,
        caller: UserAddress,
        expected: FheType,
    ) -> Result<CiphertextHandle> {
        match handle.fhe_type() {
            Some(actual) if actual == expected => {}
            Some(actual) => {
                return Err(DataCipherError::InvalidCiphertextInput(
                    FheError::TypeMismatch { expected, actual },
                ))
            }
            None => {
                return Err(DataCipherError::InvalidCiphertextInput(
                    FheError::HandleNotInProof(*handle),
                ))
            }
        }

        let binding = InputBinding::new(self.contract, caller);
        let verified = self
            .engine
            .verify_input(handle, proof, &binding)
            .map_err(DataCipherError::InvalidCiphertextInput)?;
        debug!("Verified {:?} input {} from {}", expected, verified, caller);

        Ok(verified)
    }

    pub(crate) fn allow_all(&self, handle: &CiphertextHandle, accounts: &[UserAddress]) -> Result<()> {
        for account in accounts {
            self.engine
                .allow(handle, account)
                .map_err(DataCipherError::Engine)?;
        }

        Ok(())
    }
}
