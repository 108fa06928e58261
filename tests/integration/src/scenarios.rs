use crate::Deployment;
use frame_fhe::EncryptedInputBuilder;
use module_data_cipher::{
    add_entry_operation, create_database_operation, CipherEvent, DataCipherError, DatabaseId,
    DatabaseInfo,
};
use rand::rngs::OsRng;
use test_utils::{
    fixtures::random_key,
    tracing::{init_tracing, logs_contain},
};

#[test]
fn test_alpha_notes_mismatch() {
    init_tracing();
    let mut deployment = Deployment::new();
    let owner = deployment.new_client();

    let k = random_key();
    let alpha = deployment.create_database(&owner, "Alpha", k).unwrap();
    assert_eq!(alpha, DatabaseId::new(0));
    assert_eq!(
        deployment.cipher.get_database(alpha).unwrap(),
        DatabaseInfo {
            name: "Alpha".to_string(),
            owner: owner.address(),
            entry_count: 0,
        }
    );
    let key_handle = deployment.cipher.get_database_key(alpha).unwrap();
    assert_eq!(
        owner.decrypt_key(&deployment.coprocessor, key_handle).unwrap(),
        k
    );

    let k2 = random_key();
    let notes = deployment.create_database(&owner, "Notes", k2).unwrap();
    deployment.add_entry(&owner, notes, k2, 42).unwrap();
    assert_eq!(deployment.entries_as(&owner, notes), vec![42]);

    let k3 = random_key();
    let k4 = random_key();
    let mismatch = deployment.create_database(&owner, "Mismatch", k3).unwrap();
    deployment.add_entry(&owner, mismatch, k4, 77).unwrap();
    assert_eq!(deployment.entries_as(&owner, mismatch), vec![0]);

    assert_eq!(deployment.cipher.database_count(), 3);
    assert!(logs_contain("Created database 2 (Mismatch)"));
}

#[test]
fn test_owner_index_is_disjoint() {
    let mut deployment = Deployment::new();
    let alice = deployment.new_client();
    let bob = deployment.new_client();

    let mut alice_ids = vec![];
    let mut bob_ids = vec![];
    for i in 0..3 {
        alice_ids.push(
            deployment
                .create_database(&alice, &format!("alice-{}", i), random_key())
                .unwrap(),
        );
        bob_ids.push(
            deployment
                .create_database(&bob, &format!("bob-{}", i), random_key())
                .unwrap(),
        );
    }

    assert_eq!(deployment.cipher.get_database_ids(&alice.address()), alice_ids);
    assert_eq!(deployment.cipher.get_database_ids(&bob.address()), bob_ids);
    assert!(alice_ids.iter().all(|id| !bob_ids.contains(id)));
    assert!(deployment
        .cipher
        .get_database_ids(&random_key())
        .is_empty());
}

#[test]
fn test_each_write_appends_exactly_one_entry() {
    let mut deployment = Deployment::new();
    let owner = deployment.new_client();
    let writer = deployment.new_client();
    let key = random_key();
    let id = deployment.create_database(&owner, "Ledger", key).unwrap();

    let writes = [(key, 10), (random_key(), 20), (key, 30), (random_key(), 40)];
    for (n, (candidate, value)) in writes.iter().enumerate() {
        deployment.add_entry(&writer, id, *candidate, *value).unwrap();
        assert_eq!(
            deployment.cipher.get_entries(id).unwrap().len(),
            n + 1
        );
    }

    assert_eq!(deployment.entries_as(&writer, id), vec![10, 0, 30, 0]);
    assert_eq!(deployment.entries_as(&owner, id), vec![10, 0, 30, 0]);
    assert_eq!(deployment.cipher.get_database(id).unwrap().entry_count, 4);
}

#[test]
fn test_failed_operations_leave_state_unchanged() {
    let mut deployment = Deployment::new();
    let owner = deployment.new_client();
    let key = random_key();
    let id = deployment.create_database(&owner, "Stable", key).unwrap();
    deployment.add_entry(&owner, id, key, 1).unwrap();
    let before = deployment.cipher.state().clone();

    assert!(matches!(
        deployment.create_database(&owner, &"n".repeat(49), key),
        Err(DataCipherError::InvalidName { .. })
    ));
    assert!(matches!(
        deployment.add_entry(&owner, DatabaseId::new(9), key, 2),
        Err(DataCipherError::NotFound(_))
    ));

    // input bound to another caller
    let other = deployment.new_client();
    let input = other.encrypt_entry(&mut OsRng, key, 3).unwrap();
    let operation = add_entry_operation(
        &deployment.cipher.contract_address(),
        id,
        &input.handles[1],
        &input.handles[0],
    );
    assert!(matches!(
        deployment.cipher.add_entry(
            owner.access_policy(&mut OsRng, &operation),
            id,
            input.handles[1],
            input.handles[0],
            &input.input_proof,
        ),
        Err(DataCipherError::InvalidCiphertextInput(_))
    ));

    assert_eq!(deployment.cipher.state(), &before);
}

#[test]
fn test_events_follow_operations() {
    let mut deployment = Deployment::new();
    let owner = deployment.new_client();
    let writer = deployment.new_client();
    let key = random_key();
    let id = deployment.create_database(&owner, "Audit", key).unwrap();
    deployment.add_entry(&writer, id, random_key(), 5).unwrap();

    assert_eq!(
        deployment.cipher.events(),
        &[
            CipherEvent::DatabaseCreated {
                id,
                owner: owner.address(),
                name: "Audit".to_string(),
            },
            CipherEvent::EntryAdded {
                id,
                writer: writer.address(),
                position: 0,
            },
        ][..]
    );
}

#[test]
fn test_observed_access_policy_cannot_forge_databases() {
    let mut deployment = Deployment::new();
    let alice = deployment.new_client();
    let contract = deployment.cipher.contract_address();
    let genuine = alice.encrypt_key(&mut OsRng, random_key()).unwrap();
    let observed = alice.access_policy(
        &mut OsRng,
        &create_database_operation(&contract, "Alpha", &genuine.handles[0]),
    );
    deployment
        .cipher
        .create_database(
            observed.clone(),
            "Alpha",
            genuine.handles[0],
            &genuine.input_proof,
        )
        .unwrap();

    // an input bound to alice needs no secret of hers
    let forged = EncryptedInputBuilder::new(contract, alice.address())
        .add_address(random_key())
        .encrypt(&mut OsRng, &deployment.coprocessor.public_key())
        .unwrap();
    for (name, handle, proof) in vec![
        ("forged-1", forged.handles[0], &forged.input_proof),
        ("Alpha", genuine.handles[0], &genuine.input_proof),
    ] {
        assert!(deployment
            .cipher
            .create_database(observed.clone(), name, handle, proof)
            .is_err());
    }

    assert_eq!(
        deployment.cipher.get_database_ids(&alice.address()),
        vec![DatabaseId::new(0)]
    );
    assert_eq!(deployment.cipher.database_count(), 1);
}
