use crate::Deployment;
use frame_common::{CiphertextHandle, UserAddress};
use frame_fhe::{
    unix_timestamp, DecryptionAuthority, FheError, HandleContractPair, UserDecryptAuthorization,
    UserDecryptRequest,
};
use frame_sodium::SodiumPrivateKey;
use module_data_cipher::create_database_operation;
use module_data_cipher_client::ClientError;
use rand::rngs::OsRng;
use test_utils::fixtures::TestUser;

const DAY: u64 = 24 * 60 * 60;

struct Setup {
    deployment: Deployment,
    owner: TestUser,
    key_handle: CiphertextHandle,
}

fn setup() -> Setup {
    let mut deployment = Deployment::new();
    let owner = TestUser::new();
    let contract = deployment.cipher.contract_address();
    let input = owner.encrypt_key(
        contract,
        &deployment.coprocessor.public_key(),
        UserAddress::random(&mut OsRng),
    );
    let id = deployment
        .cipher
        .create_database(
            owner.access_policy(&create_database_operation(
                &contract,
                "Secret",
                &input.handles[0],
            )),
            "Secret",
            input.handles[0],
            &input.input_proof,
        )
        .unwrap();
    let key_handle = deployment.cipher.get_database_key(id).unwrap();

    Setup {
        deployment,
        owner,
        key_handle,
    }
}

#[test]
fn test_user_without_grant_is_rejected() {
    let s = setup();
    let stranger = s.deployment.new_client();

    assert!(matches!(
        stranger.decrypt_key(&s.deployment.coprocessor, s.key_handle),
        Err(ClientError::FheError(FheError::AclDenied { .. }))
    ));
}

#[test]
fn test_expired_request_is_rejected() {
    let s = setup();
    let ephemeral = SodiumPrivateKey::from_random(&mut OsRng).unwrap();
    let request = s.owner.decrypt_request(
        &ephemeral,
        s.deployment.cipher.contract_address(),
        &[s.key_handle],
        unix_timestamp() - 11 * DAY,
        10,
    );

    assert!(matches!(
        s.deployment.coprocessor.user_decrypt(&request),
        Err(FheError::RequestExpired { .. })
    ));
}

#[test]
fn test_request_signed_by_another_key_is_rejected() {
    let s = setup();
    let impostor = TestUser::new();
    let ephemeral = SodiumPrivateKey::from_random(&mut OsRng).unwrap();
    let mut request = impostor.decrypt_request(
        &ephemeral,
        s.deployment.cipher.contract_address(),
        &[s.key_handle],
        unix_timestamp(),
        10,
    );
    request.user = s.owner.address();

    assert!(matches!(
        s.deployment.coprocessor.user_decrypt(&request),
        Err(FheError::InvalidSignature(_))
    ));
}

#[test]
fn test_tampered_authorization_is_rejected() {
    let s = setup();
    let ephemeral = SodiumPrivateKey::from_random(&mut OsRng).unwrap();
    let mut request = s.owner.decrypt_request(
        &ephemeral,
        s.deployment.cipher.contract_address(),
        &[s.key_handle],
        unix_timestamp(),
        10,
    );
    let attacker_key = SodiumPrivateKey::from_random(&mut OsRng).unwrap();
    request.authorization.public_key = attacker_key.public_key();

    assert!(matches!(
        s.deployment.coprocessor.user_decrypt(&request),
        Err(FheError::InvalidSignature(_))
    ));
}

#[test]
fn test_pair_outside_authorization_is_rejected() {
    let s = setup();
    let contract = s.deployment.cipher.contract_address();
    let ephemeral = SodiumPrivateKey::from_random(&mut OsRng).unwrap();
    let other_contract = UserAddress::random(&mut OsRng);
    let authorization = UserDecryptAuthorization::new(
        ephemeral.public_key(),
        vec![other_contract],
        unix_timestamp(),
        10,
    );
    let request = UserDecryptRequest::sign(
        s.owner.keypair(),
        vec![HandleContractPair::new(s.key_handle, contract)],
        authorization,
    )
    .unwrap();

    assert!(matches!(
        s.deployment.coprocessor.user_decrypt(&request),
        Err(FheError::ContractNotAuthorized(addr)) if addr == contract
    ));
}

#[test]
fn test_owner_reads_key_through_authority() {
    let s = setup();
    let values = s
        .owner
        .decrypt(
            &s.deployment.coprocessor,
            s.deployment.cipher.contract_address(),
            &[s.key_handle],
        )
        .unwrap();
    assert_eq!(values.len(), 1);
    assert!(values[0].as_address().is_some());
}
