//! Beacon-chain containers used by the end-to-end tests.

use crate::{
    BitList, ByteVector, CacheConfig, FixedVector, HashCache, List, Merkleize, SSZError,
    SimpleDeserialize, SimpleSerialize, SszSchema, SszTypeInfo, deserialize, impl_ssz_container,
    merkleization::proofs::{is_valid_merkle_branch, multi_prove, prove},
    serialize,
};
use alloc::vec::Vec;
use alloy_primitives::{B256, hex};
use quickcheck_macros::quickcheck;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Checkpoint {
    pub epoch: u64,
    pub root: B256,
}
impl_ssz_container!(Checkpoint { epoch: u64, root: B256 });

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Validator {
    pub pubkey: ByteVector<48>,
    pub withdrawal_credentials: B256,
    pub effective_balance: u64,
    pub slashed: bool,
    pub activation_eligibility_epoch: u64,
    pub activation_epoch: u64,
    pub exit_epoch: u64,
    pub withdrawable_epoch: u64,
}
impl_ssz_container!(Validator {
    pubkey: ByteVector<48>,
    withdrawal_credentials: B256,
    effective_balance: u64,
    slashed: bool,
    activation_eligibility_epoch: u64,
    activation_epoch: u64,
    exit_epoch: u64,
    withdrawable_epoch: u64,
});

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Eth1Data {
    pub deposit_root: B256,
    pub deposit_count: u64,
    pub block_hash: B256,
}
impl_ssz_container!(Eth1Data {
    deposit_root: B256,
    deposit_count: u64,
    block_hash: B256,
});

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DepositData {
    pub pubkey: ByteVector<48>,
    pub withdrawal_credentials: B256,
    pub amount: u64,
    pub signature: ByteVector<96>,
}
impl_ssz_container!(DepositData {
    pubkey: ByteVector<48>,
    withdrawal_credentials: B256,
    amount: u64,
    signature: ByteVector<96>,
});

/// Branch depth of the deposit contract tree, plus one for the length mix-in.
pub const DEPOSIT_PROOF_LENGTH: usize = 33;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Deposit {
    pub proof: FixedVector<B256, DEPOSIT_PROOF_LENGTH>,
    pub data: DepositData,
}
impl_ssz_container!(Deposit {
    proof: FixedVector<B256, DEPOSIT_PROOF_LENGTH>,
    data: DepositData,
});

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BeaconBlockHeader {
    pub slot: u64,
    pub proposer_index: u64,
    pub parent_root: B256,
    pub state_root: B256,
    pub body_root: B256,
}
impl_ssz_container!(BeaconBlockHeader {
    slot: u64,
    proposer_index: u64,
    parent_root: B256,
    state_root: B256,
    body_root: B256,
});

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttestationData {
    pub slot: u64,
    pub index: u64,
    pub beacon_block_root: B256,
    pub source: Checkpoint,
    pub target: Checkpoint,
}
impl_ssz_container!(AttestationData {
    slot: u64,
    index: u64,
    beacon_block_root: B256,
    source: Checkpoint,
    target: Checkpoint,
});

pub const MAX_VALIDATORS_PER_COMMITTEE: usize = 2048;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingAttestation {
    pub aggregation_bits: BitList<MAX_VALIDATORS_PER_COMMITTEE>,
    pub data: AttestationData,
    pub inclusion_delay: u64,
    pub proposer_index: u64,
}
impl_ssz_container!(PendingAttestation {
    aggregation_bits: BitList<MAX_VALIDATORS_PER_COMMITTEE>,
    data: AttestationData,
    inclusion_delay: u64,
    proposer_index: u64,
});

fn validator() -> Validator {
    Validator {
        pubkey: ByteVector::new(core::array::from_fn(|i| i as u8)),
        withdrawal_credentials: B256::repeat_byte(0x22),
        effective_balance: 32_000_000_000,
        slashed: false,
        activation_eligibility_epoch: 1,
        activation_epoch: 2,
        exit_epoch: u64::MAX,
        withdrawable_epoch: u64::MAX,
    }
}

fn attestation_data() -> AttestationData {
    AttestationData {
        slot: 64,
        index: 3,
        beacon_block_root: B256::repeat_byte(0xcc),
        source: Checkpoint {
            epoch: 1,
            root: B256::repeat_byte(0xaa),
        },
        target: Checkpoint {
            epoch: 2,
            root: B256::repeat_byte(0xbb),
        },
    }
}

fn pending_attestation() -> PendingAttestation {
    let bits: Vec<bool> = (0..10).map(|i| i % 3 == 0).collect();
    PendingAttestation {
        aggregation_bits: BitList::from_bools(&bits).unwrap(),
        data: attestation_data(),
        inclusion_delay: 1,
        proposer_index: 7,
    }
}

fn deposit_data(amount: u64) -> DepositData {
    DepositData {
        pubkey: ByteVector::repeat_byte(amount as u8),
        withdrawal_credentials: B256::repeat_byte(0x01),
        amount,
        signature: ByteVector::repeat_byte(0x99),
    }
}

/// Checks that the static codec and the descriptor-driven codec agree on `value`.
fn agrees_with_schema<T>(value: &T) -> bool
where
    T: SimpleSerialize + SimpleDeserialize + Merkleize + SszSchema + PartialEq,
{
    let schema = T::schema();
    let bytes = serialize(value).unwrap();
    let dynamic = schema.deserialize(&bytes).unwrap();
    schema.serialize(&dynamic).unwrap() == bytes
        && schema.size_ssz(&dynamic).unwrap() == value.size_ssz()
        && schema.hash_tree_root(&dynamic).unwrap() == value.hash_tree_root().unwrap()
        && deserialize::<T>(&bytes).unwrap() == *value
}

fn root_from_seed(seed: &[u8]) -> B256 {
    let mut root = [0u8; 32];
    root.iter_mut().zip(seed).for_each(|(byte, seed)| *byte = *seed);
    B256::from(root)
}

#[test]
fn test_fixed_sizes() {
    assert_eq!(Checkpoint::fixed_size(), Some(40));
    assert_eq!(Validator::fixed_size(), Some(121));
    assert_eq!(Eth1Data::fixed_size(), Some(72));
    assert_eq!(DepositData::fixed_size(), Some(184));
    assert_eq!(Deposit::fixed_size(), Some(1240));
    assert_eq!(BeaconBlockHeader::fixed_size(), Some(112));
    assert_eq!(AttestationData::fixed_size(), Some(128));
    assert!(!PendingAttestation::is_fixed_size());
    assert_eq!(PendingAttestation::fixed_size(), None);

    assert_eq!(serialize(&validator()).unwrap().len(), 121);
    assert_eq!(Deposit::default().size_ssz(), 1240);
}

#[test]
fn test_checkpoint() {
    let checkpoint = Checkpoint {
        epoch: 3,
        root: B256::repeat_byte(0x11),
    };
    let bytes = serialize(&checkpoint).unwrap();
    assert_eq!(&bytes[..8], &3u64.to_le_bytes());
    assert_eq!(&bytes[8..], checkpoint.root.as_slice());
    assert_eq!(
        checkpoint.hash_tree_root().unwrap(),
        B256::from(hex!(
            "8d7ec135ffb397a99e8b3794c3adf61271572d368226dc807636996c30776aa6"
        ))
    );
    assert_eq!(deserialize::<Checkpoint>(&bytes).unwrap(), checkpoint);
    assert!(deserialize::<Checkpoint>(&bytes[..39]).is_err());
}

#[test]
fn test_validator_root() {
    let validator = validator();
    assert_eq!(
        validator.hash_tree_root().unwrap(),
        B256::from(hex!(
            "c70e3fd6b85b3002bd7e2748577ea05a173de057aeb1768b223ec1ac5c749bfc"
        ))
    );
    assert!(agrees_with_schema(&validator));

    let mut bytes = serialize(&validator).unwrap();
    // `slashed` sits after pubkey, credentials and balance.
    bytes[48 + 32 + 8] = 2;
    assert_eq!(
        deserialize::<Validator>(&bytes),
        Err(SSZError::InvalidBooleanByte(2))
    );
}

#[test]
fn test_pending_attestation() {
    let attestation = pending_attestation();
    assert_eq!(
        attestation.data.hash_tree_root().unwrap(),
        B256::from(hex!(
            "2b2590aa968e869b318d958cdcbe13c7c468c7ed5c76e7115392feebd0a9a376"
        ))
    );
    assert_eq!(
        attestation.hash_tree_root().unwrap(),
        B256::from(hex!(
            "0ac40bab5ee48e628248fbad7d36d4634a477ae2f51459769b48977564e1d11f"
        ))
    );

    let bytes = serialize(&attestation).unwrap();
    // Offset, attestation data, two u64s, then ten bits plus sentinel in two bytes.
    assert_eq!(bytes.len(), 4 + 128 + 8 + 8 + 2);
    assert_eq!(&bytes[..4], &148u32.to_le_bytes());
    assert_eq!(attestation.size_ssz(), bytes.len());
    assert_eq!(deserialize::<PendingAttestation>(&bytes).unwrap(), attestation);
    assert!(agrees_with_schema(&attestation));

    let mut bad_offset = bytes.clone();
    bad_offset[..4].copy_from_slice(&200u32.to_le_bytes());
    assert!(deserialize::<PendingAttestation>(&bad_offset).is_err());
}

#[test]
fn test_generalized_indices() {
    assert_eq!(Validator::generalized_index("pubkey"), Ok(8));
    assert_eq!(Validator::generalized_index("slashed"), Ok(11));
    assert_eq!(
        PendingAttestation::generalized_index("data/target/root"),
        Ok(89)
    );
    assert_eq!(
        PendingAttestation::generalized_index("aggregation_bits/__len__"),
        Ok(9)
    );
    assert_eq!(
        crate::resolve_path(&PendingAttestation::schema(), "aggregation_bits/300"),
        Ok((65, 44))
    );
    assert_eq!(
        Deposit::generalized_index("proof/32"),
        Ok(2 * 64 + 32)
    );
    assert!(Checkpoint::generalized_index("slot").is_err());
    assert!(Deposit::generalized_index("proof/33").is_err());
}

#[test]
fn test_field_proofs() {
    let attestation = pending_attestation();
    let (proof, root) = prove(&attestation, "data/target/root").unwrap();
    assert_eq!(root, attestation.hash_tree_root().unwrap());
    assert_eq!(proof.gindex, 89);
    assert_eq!(proof.leaf, B256::repeat_byte(0xbb));
    assert_eq!(proof.branch.len(), 6);
    assert!(proof.verify(root).is_ok());
    assert!(proof.verify(B256::ZERO).is_err());

    let (multi, root) = multi_prove(
        &attestation,
        &["inclusion_delay", "data/source/epoch", "aggregation_bits/__len__"],
    )
    .unwrap();
    assert_eq!(multi.leaves[2].0[0], 10);
    assert!(multi.verify(root).is_ok());
}

#[test]
fn test_deposit_proof_checks_against_deposit_root() {
    let deposits: List<DepositData, 4294967296> =
        List::new((1..=3).map(deposit_data).collect()).unwrap();
    let deposit_root = deposits.hash_tree_root().unwrap();

    let (proof, root) = prove(&deposits, "2").unwrap();
    assert_eq!(root, deposit_root);
    assert_eq!(proof.branch.len(), DEPOSIT_PROOF_LENGTH);

    let deposit = Deposit {
        proof: FixedVector::try_from(proof.branch.clone()).unwrap(),
        data: deposit_data(3),
    };
    assert!(is_valid_merkle_branch(
        deposit.data.hash_tree_root().unwrap(),
        deposit.proof.as_slice(),
        DEPOSIT_PROOF_LENGTH,
        2,
        deposit_root,
    ));
    assert!(!is_valid_merkle_branch(
        deposit.data.hash_tree_root().unwrap(),
        deposit.proof.as_slice(),
        DEPOSIT_PROOF_LENGTH,
        1,
        deposit_root,
    ));
    assert!(agrees_with_schema(&deposit));
}

#[test]
fn test_hash_cache_with_containers() {
    let mut cache = HashCache::new(CacheConfig { capacity: 2 });
    let header = BeaconBlockHeader {
        slot: 1,
        proposer_index: 2,
        ..Default::default()
    };
    let expected = header.hash_tree_root().unwrap();
    assert_eq!(cache.hash_tree_root(&header).unwrap(), expected);
    assert_eq!(cache.hash_tree_root(&header.clone()).unwrap(), expected);
    assert_eq!(cache.hits(), 1);
    assert_eq!(cache.misses(), 1);

    // Same bytes under a different type never share an entry.
    let eth1 = Eth1Data::default();
    cache.hash_tree_root(&eth1).unwrap();
    assert_eq!(cache.misses(), 2);
}

#[quickcheck]
fn quickcheck_checkpoint(epoch: u64, seed: Vec<u8>) -> bool {
    agrees_with_schema(&Checkpoint {
        epoch,
        root: root_from_seed(&seed),
    })
}

#[quickcheck]
fn quickcheck_pending_attestation(bits: Vec<bool>, slot: u64, delay: u64, seed: Vec<u8>) -> bool {
    let bits = &bits[..bits.len().min(MAX_VALIDATORS_PER_COMMITTEE)];
    let mut data = attestation_data();
    data.slot = slot;
    data.beacon_block_root = root_from_seed(&seed);
    agrees_with_schema(&PendingAttestation {
        aggregation_bits: BitList::from_bools(bits).unwrap(),
        data,
        inclusion_delay: delay,
        proposer_index: slot ^ delay,
    })
}

#[quickcheck]
fn quickcheck_list_of_validators(balances: Vec<u64>) -> bool {
    let validators = balances
        .into_iter()
        .take(8)
        .map(|effective_balance| Validator {
            effective_balance,
            ..validator()
        })
        .collect();
    agrees_with_schema(&List::<Validator, 8>::new(validators).unwrap())
}

#[quickcheck]
fn quickcheck_list_of_lists(values: Vec<Vec<u16>>) -> bool {
    let lists = values
        .into_iter()
        .take(4)
        .map(|inner| List::<u16, 32>::new(inner.into_iter().take(32).collect()).unwrap())
        .collect();
    agrees_with_schema(&List::<List<u16, 32>, 4>::new(lists).unwrap())
}
