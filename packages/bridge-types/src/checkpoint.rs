//! Digests the EVM contract verifies signatures against.
//!
//! Both functions must stay bit-exact with the contract's `abi.encode`
//! layout: five (resp. four) 32-byte words hashed with keccak-256. The
//! method-name word only separates the two domains; the contract discards it
//! otherwise.

use alloy_primitives::{keccak256, Address, B256, U256};
use alloy_sol_types::{sol, SolValue};

use crate::validator::Valset;

sol! {
    /// Domain-separated tuple the contract checkpoints a validator set with.
    struct ValsetCheckpoint {
        bytes32 bridge_id;
        bytes32 method_name;
        uint256 nonce;
        uint256 power_threshold;
        bytes32 validator_set_hash;
    }

    /// Domain-separated tuple the contract commits a data-root tuple root with.
    struct TupleRootCheckpoint {
        bytes32 bridge_id;
        bytes32 method_name;
        uint256 nonce;
        bytes32 data_root_tuple_root;
    }
}

/// `"checkpoint"` left-aligned into a 32-byte word.
const VALSET_DOMAIN: &[u8] = b"checkpoint";

/// `"transactionBatch"` left-aligned into a 32-byte word.
const TUPLE_ROOT_DOMAIN: &[u8] = b"transactionBatch";

fn domain_word(name: &[u8]) -> B256 {
    let mut word = [0u8; 32];
    word[..name.len()].copy_from_slice(name);
    B256::from(word)
}

/// keccak-256 of `abi.encode(address[] validators, uint256[] powers)` in
/// canonical member order.
pub fn valset_hash(valset: &Valset) -> B256 {
    let validators: Vec<Address> = valset.members.iter().map(|m| m.ethereum_address).collect();
    let powers: Vec<U256> = valset
        .members
        .iter()
        .map(|m| U256::from(m.power))
        .collect();
    keccak256((validators, powers).abi_encode_params())
}

/// Digest an orchestrator signs to confirm a validator-set update.
pub fn valset_checkpoint_digest(bridge_id: B256, valset: &Valset) -> B256 {
    let checkpoint = ValsetCheckpoint {
        bridge_id,
        method_name: domain_word(VALSET_DOMAIN),
        nonce: U256::from(valset.nonce),
        power_threshold: U256::from(valset.two_thirds_threshold()),
        validator_set_hash: valset_hash(valset),
    };
    keccak256(checkpoint.abi_encode())
}

/// Digest an orchestrator signs to confirm a data commitment over a block
/// range; `data_root_tuple_root` comes from the source chain.
pub fn tuple_root_digest(bridge_id: B256, nonce: u64, data_root_tuple_root: B256) -> B256 {
    let checkpoint = TupleRootCheckpoint {
        bridge_id,
        method_name: domain_word(TUPLE_ROOT_DOMAIN),
        nonce: U256::from(nonce),
        data_root_tuple_root,
    };
    keccak256(checkpoint.abi_encode())
}
