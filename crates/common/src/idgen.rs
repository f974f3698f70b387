//! Injectable identifier source.
//!
//! Record ids and the random token portion of order/tracking numbers come
//! from an [`IdGenerator`] so tests can produce predictable values.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::{OrderId, ProductId};

/// A source of fresh identifiers and short random tokens.
pub trait IdGenerator: Send + Sync {
    /// Returns a fresh order ID.
    fn order_id(&self) -> OrderId;

    /// Returns a fresh product ID.
    fn product_id(&self) -> ProductId;

    /// Returns a short uppercase alphanumeric token of the given length,
    /// used as the random suffix of order and tracking numbers.
    fn token(&self, len: usize) -> String;
}

/// Production generator backed by random UUIDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIds;

impl IdGenerator for RandomIds {
    fn order_id(&self) -> OrderId {
        OrderId::new()
    }

    fn product_id(&self) -> ProductId {
        ProductId::new()
    }

    fn token(&self, len: usize) -> String {
        // Hex from a v4 UUID is 32 chars; chain a second one for longer tokens.
        let mut token = String::with_capacity(len);
        while token.len() < len {
            let hex = uuid::Uuid::new_v4().simple().to_string().to_uppercase();
            token.push_str(&hex[..(len - token.len()).min(hex.len())]);
        }
        token
    }
}

/// Deterministic generator for tests: counter-based ids and tokens.
#[derive(Debug, Default)]
pub struct SequentialIds {
    counter: AtomicU64,
}

impl SequentialIds {
    /// Creates a generator starting at zero.
    pub fn new() -> Self {
        Self::default()
    }

    fn next(&self) -> u64 {
        self.counter.fetch_add(1, Ordering::Relaxed)
    }
}

impl IdGenerator for SequentialIds {
    fn order_id(&self) -> OrderId {
        OrderId::from_uuid(uuid::Uuid::from_u128(u128::from(self.next())))
    }

    fn product_id(&self) -> ProductId {
        ProductId::from_uuid(uuid::Uuid::from_u128(u128::from(self.next())))
    }

    fn token(&self, len: usize) -> String {
        format!("{:0>len$}", self.next())
    }
}
