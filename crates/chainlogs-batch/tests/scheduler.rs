//! End-to-end scheduler tests: registry → routing → merge.

use alloy_core::dyn_abi::DynSolValue;
use alloy_primitives::{Address, B256, U256};
use chainlogs_batch::{BatchScheduler, CancellationToken, SchedulerConfig};
use chainlogs_core::{
    AbiEventDef, AbiParameter, DecodeErrorKind, DecodeSource, EventSignatureHash, RawLog,
    RegisteredEvent, SignatureLookup,
};
use chainlogs_evm::encode_log;
use chainlogs_registry::SignatureRegistry;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

fn transfer_def() -> AbiEventDef {
    AbiEventDef::new(
        "Transfer",
        vec![
            AbiParameter::new("from", "address", true),
            AbiParameter::new("to", "address", true),
            AbiParameter::new("value", "uint256", false),
        ],
    )
}

fn sync_def() -> AbiEventDef {
    AbiEventDef::new(
        "Sync",
        vec![
            AbiParameter::new("reserve0", "uint112", false),
            AbiParameter::new("reserve1", "uint112", false),
        ],
    )
}

fn transfer_log(tx: u64, log_index: u64, amount: u64) -> RawLog {
    encode_log(
        &transfer_def(),
        &[
            DynSolValue::Address(Address::repeat_byte(0x11)),
            DynSolValue::Address(Address::repeat_byte(0x22)),
            DynSolValue::Uint(U256::from(amount), 256),
        ],
    )
    .unwrap()
    .into_raw_log(Address::repeat_byte(0xa0), B256::with_last_byte(tx as u8), log_index)
}

fn sync_log(tx: u64, log_index: u64) -> RawLog {
    encode_log(
        &sync_def(),
        &[
            DynSolValue::Uint(U256::from(7u64), 112),
            DynSolValue::Uint(U256::from(9u64), 112),
        ],
    )
    .unwrap()
    .into_raw_log(Address::repeat_byte(0xb0), B256::with_last_byte(tx as u8), log_index)
}

fn registry() -> SignatureRegistry {
    let registry = SignatureRegistry::new();
    registry.register_events([transfer_def()]);
    registry
}

fn scheduler(
    registry: &SignatureRegistry,
    concurrency: usize,
    chunk_size: usize,
) -> BatchScheduler {
    BatchScheduler::new(
        Arc::new(registry.clone()),
        SchedulerConfig::new(concurrency, chunk_size),
    )
    .unwrap()
}

/// 250 logs over 25 transactions, each transaction's logs emitted in
/// reverse log-index order.
fn shuffled_logs() -> Vec<RawLog> {
    (0..25u64)
        .flat_map(|tx| (0..10u64).rev().map(move |i| transfer_log(tx, i, tx * 100 + i)))
        .collect()
}

#[test]
fn chunks_250_logs_into_100_100_50() {
    let result = scheduler(&registry(), 4, 100).process_transaction_logs(&shuffled_logs());
    assert_eq!(result.stats.chunk_sizes, vec![100, 100, 50]);
    assert_eq!(result.stats.chunks_processed, 3);
    assert_eq!(result.stats.total_input, 250);
    assert_eq!(result.stats.decoded, 250);
    assert!(!result.stats.cancelled);
}

#[test]
fn per_transaction_order_follows_log_index() {
    let logs = shuffled_logs();
    let reg = registry();
    let parallel = scheduler(&reg, 8, 7).process_transaction_logs(&logs);
    let serial = scheduler(&reg, 1, 250).process_transaction_logs(&logs);

    assert_eq!(parallel.by_transaction.len(), 25);
    for (tx, outcomes) in &parallel.by_transaction {
        let indices: Vec<u64> = outcomes
            .iter()
            .map(|o| o.as_decoded().unwrap().log.log_index)
            .collect();
        assert_eq!(indices, (0..10).collect::<Vec<_>>(), "tx {tx}");
    }
    assert_eq!(parallel.by_transaction, serial.by_transaction);
}

#[test]
fn routes_abi_heuristic_and_unknown() {
    let reg = registry();
    reg.learn_signature("Sync(uint112,uint112)");

    let mut stray = transfer_log(3, 2, 1);
    stray.topics[0] = B256::repeat_byte(0xee);

    let logs = vec![transfer_log(3, 0, 5), sync_log(3, 1), stray.clone()];
    let result = scheduler(&reg, 2, 2).process_transaction_logs(&logs);

    let outcomes = result.transaction(&B256::with_last_byte(3)).unwrap();
    assert_eq!(outcomes.len(), 3);

    let transfer = outcomes[0].as_decoded().unwrap();
    assert_eq!(transfer.source, DecodeSource::Abi);
    assert_eq!(transfer.field("value").unwrap().as_u256(), Some(U256::from(5u64)));

    let sync = outcomes[1].as_decoded().unwrap();
    assert_eq!(sync.source, DecodeSource::Heuristic);
    assert_eq!(sync.field_names(), vec!["param1", "param2"]);

    let unknown = outcomes[2].as_unknown().unwrap();
    assert_eq!(unknown.log, stray);
    assert!(unknown.failure.is_none());

    assert_eq!(result.unknown, vec![stray]);
    assert_eq!((result.stats.decoded, result.stats.heuristic, result.stats.unknown), (1, 1, 1));
}

#[test]
fn decode_failure_degrades_to_unknown_with_detail() {
    let mut broken = transfer_log(1, 0, 1);
    broken.topics.truncate(2);
    let logs = vec![broken.clone(), transfer_log(1, 1, 2)];

    let result = scheduler(&registry(), 2, 1).process_transaction_logs(&logs);
    let outcomes = result.transaction(&broken.transaction_hash).unwrap();

    let unknown = outcomes[0].as_unknown().unwrap();
    assert_eq!(unknown.log, broken);
    assert_eq!(unknown.failure.as_ref().unwrap().kind, DecodeErrorKind::TruncatedTopics);
    assert!(outcomes[1].is_decoded());
    assert_eq!(result.stats.failed, 1);
}

#[test]
fn every_log_yields_one_outcome() {
    let mut logs = shuffled_logs();
    logs.push(RawLog {
        topics: vec![],
        ..transfer_log(99, 0, 0)
    });
    let result = scheduler(&registry(), 3, 33).process_transaction_logs(&logs);
    assert_eq!(result.outcome_count(), logs.len());
    assert!(result.undecoded.is_empty());
}

#[test]
fn oversized_array_types_degrade_per_log() {
    let huge = AbiEventDef::new(
        "Huge",
        vec![AbiParameter::new("values", "uint256[2305843009213693952]", false)],
    );
    let registry = registry();
    registry.register_events([huge.clone()]);
    let learned = registry
        .learn_signature("Packed(uint256[1152921504606846976][8])")
        .unwrap();

    let with_topic0 = |topic0: B256, tx: u64| RawLog {
        topics: vec![topic0],
        data: vec![0u8; 64].into(),
        ..transfer_log(tx, 0, 0)
    };
    let logs = vec![
        with_topic0(chainlogs_evm::event_signature_hash(&huge).0, 1),
        with_topic0(learned.0, 2),
        transfer_log(3, 0, 5),
    ];

    let result = scheduler(&registry, 2, 1).process_transaction_logs(&logs);
    assert_eq!(result.outcome_count(), 3);

    let abi = result.transaction(&logs[0].transaction_hash).unwrap()[0].as_unknown().unwrap();
    assert_eq!(abi.failure.as_ref().unwrap().kind, DecodeErrorKind::DataLengthMismatch);

    let heuristic = result.transaction(&logs[1].transaction_hash).unwrap()[0]
        .as_decoded()
        .unwrap();
    assert_eq!(heuristic.source, DecodeSource::Heuristic);
    assert_eq!(heuristic.fields.len(), 1);

    assert!(result.transaction(&logs[2].transaction_hash).unwrap()[0].is_decoded());
}

#[test]
fn empty_input() {
    let result = scheduler(&registry(), 2, 10).process_transaction_logs(&[]);
    assert!(result.by_transaction.is_empty());
    assert!(result.stats.chunk_sizes.is_empty());
}

#[test]
fn invalid_config_is_fatal() {
    let lookup: Arc<dyn SignatureLookup> = Arc::new(SignatureRegistry::new());
    assert!(BatchScheduler::new(Arc::clone(&lookup), SchedulerConfig::new(0, 10)).is_err());
    assert!(BatchScheduler::new(lookup, SchedulerConfig::new(2, 0)).is_err());
}

#[test]
fn cancelled_before_start_decodes_nothing() {
    let logs = shuffled_logs();
    let token = CancellationToken::new();
    token.cancel();
    let result = scheduler(&registry(), 2, 100).process_with_cancel(&logs, &token);
    assert!(result.stats.cancelled);
    assert_eq!(result.outcome_count(), 0);
    assert_eq!(result.undecoded, logs);
}

/// Cancels the token on its first lookup, i.e. while chunk 0 is in flight.
struct CancelOnFirstLookup {
    inner: SignatureRegistry,
    token: CancellationToken,
    calls: AtomicUsize,
}

impl SignatureLookup for CancelOnFirstLookup {
    fn lookup(&self, hash: &EventSignatureHash) -> Option<Arc<RegisteredEvent>> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            self.token.cancel();
        }
        self.inner.lookup(hash)
    }

    fn signature_text(&self, hash: &EventSignatureHash) -> Option<Arc<str>> {
        self.inner.signature_text(hash)
    }
}

#[test]
fn cancellation_finishes_in_flight_chunk() {
    let logs = shuffled_logs();
    let token = CancellationToken::new();
    let lookup = Arc::new(CancelOnFirstLookup {
        inner: registry(),
        token: token.clone(),
        calls: AtomicUsize::new(0),
    });
    let scheduler = BatchScheduler::new(lookup, SchedulerConfig::new(1, 100)).unwrap();
    let result = scheduler.process_with_cancel(&logs, &token);

    assert!(result.stats.cancelled);
    assert_eq!(result.stats.chunks_processed, 1);
    assert_eq!(result.outcome_count(), 100);
    assert_eq!(result.undecoded.len(), 150);
    assert_eq!(result.outcome_count() + result.undecoded.len(), logs.len());
    assert!(result.outcomes().all(|o| o.is_decoded()));
}
