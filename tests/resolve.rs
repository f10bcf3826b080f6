use forknet::{
    ChainId, ConfigVariant,
    test_utils::{TEST_RPC_URL, setup_logging, setup_test_env},
};

#[test]
fn test_variant_a_numeric_chain_id() {
    setup_logging();
    let config = ConfigVariant::A.resolve(&setup_test_env());

    assert_eq!(config.solidity, "0.8.19");
    assert_eq!(config.networks.hardhat.chain_id, ChainId::Number(1337.0));
    assert_eq!(config.chain_id(), Some(1337));
    assert_eq!(config.fork_url(), Some(TEST_RPC_URL));
    assert_eq!(config.networks.hardhat.forking.block_number, None);
}

#[test]
fn test_variant_b_raw_chain_id() {
    let config = ConfigVariant::B.resolve(&setup_test_env());

    assert_eq!(config.solidity, "0.8.19");
    assert_eq!(config.networks.hardhat.chain_id, ChainId::Text("1337".into()));
    assert_eq!(config.chain_id(), Some(1337));
    assert_eq!(config.networks.hardhat.forking.block_number, None);
}

#[test]
fn test_variants_disagree() {
    let env = forknet::ForkEnv { ethereum_rpc_url: None, ..setup_test_env() };

    let a = ConfigVariant::A.resolve(&env);
    let b = ConfigVariant::B.resolve(&env);
    assert_ne!(a, b);
    assert_eq!(a.fork_url(), Some(TEST_RPC_URL));
    assert_eq!(b.fork_url(), None);
}

#[test]
fn test_block_number_never_set() {
    let mut env = setup_test_env();
    for chain_id in [None, Some(""), Some("12"), Some("nope")] {
        env.chain_id = chain_id.map(Into::into);
        for variant in [ConfigVariant::A, ConfigVariant::B] {
            let config = variant.resolve(&env);
            assert_eq!(config.networks.hardhat.forking.block_number, None);
            assert!(config.to_json().unwrap()["networks"]["hardhat"]["forking"].get("blockNumber").is_none());
        }
    }
}

#[test]
fn test_empty_chain_id_is_zero_under_coercion() {
    let env = forknet::ForkEnv { chain_id: Some(String::new()), ..setup_test_env() };
    assert_eq!(ConfigVariant::A.resolve(&env).networks.hardhat.chain_id, ChainId::Number(0.0));
    assert_eq!(ConfigVariant::B.resolve(&env).networks.hardhat.chain_id, ChainId::Text(String::new()));
}
