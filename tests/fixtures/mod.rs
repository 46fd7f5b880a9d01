//! Synthetic test data shared by the integration tests.

#![allow(dead_code)]

use std::sync::OnceLock;
use vultus::KeySet;

pub const CCYS: [&str; 3] = ["GBP", "EUR", "USD"];

/// Bit flags carried in `TestObject::status`
pub const STATUS_LOW: u8 = 1;
pub const STATUS_HIGH: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TestStatus {
    Low,
    High,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TestObject {
    pub code: String,
    pub ccy: Option<String>,
    pub balance: u32,
    pub high: bool,
    pub low: bool,
    pub status: u8,
    pub ccys: Vec<String>,
}

impl TestObject {
    pub fn new(code: &str, ccy: &str, high: bool, low: bool) -> Self {
        Self {
            code: code.to_string(),
            ccy: Some(ccy.to_string()),
            balance: 1000,
            high,
            low,
            status: 0,
            ccys: Vec::new(),
        }
    }

    pub fn with_status(mut self, status: u8) -> Self {
        self.status = status;
        self
    }

    pub fn with_ccys(mut self, ccys: &[&str]) -> Self {
        self.ccys = ccys.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn with_balance(mut self, balance: u32) -> Self {
        self.balance = balance;
        self
    }

    /// Individual flags set in `status`
    pub fn statuses(&self) -> Vec<TestStatus> {
        let mut statuses = Vec::new();
        if self.status & STATUS_LOW == STATUS_LOW {
            statuses.push(TestStatus::Low);
        }
        if self.status & STATUS_HIGH == STATUS_HIGH {
            statuses.push(TestStatus::High);
        }
        statuses
    }
}

/// `count` objects coded `Test0..Test{count-1}` with pseudo-random properties
pub fn generate_test_objects(count: usize) -> Vec<TestObject> {
    generate_test_objects_with_seed(count, 0x5eed)
}

pub fn generate_test_objects_with_seed(count: usize, seed: u64) -> Vec<TestObject> {
    let mut rng = fastrand::Rng::with_seed(seed);
    (0..count)
        .map(|i| TestObject {
            code: format!("Test{}", i),
            ccy: Some(CCYS[rng.usize(..CCYS.len())].to_string()),
            balance: rng.u32(..1000),
            high: rng.bool(),
            low: rng.bool(),
            status: rng.u8(..4),
            ccys: CCYS
                .iter()
                .filter(|_| rng.bool())
                .map(|c| c.to_string())
                .collect(),
        })
        .collect()
}

/// Keys of a result set in sorted order, for order-independent comparisons
pub fn sorted<K: Ord + Clone>(set: &KeySet<K>) -> Vec<K> {
    let mut keys: Vec<K> = set.iter().cloned().collect();
    keys.sort();
    keys
}

static TRACING: OnceLock<()> = OnceLock::new();

/// Route `tracing` output to the test harness; filter with `RUST_LOG`
pub fn init_tracing() {
    TRACING.get_or_init(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}
