//! Shared types for the order and inventory service.
//!
//! Provides the typed identifiers used across crates, the [`Money`] value
//! type, and the injected [`Clock`] / [`IdGenerator`] abstractions that keep
//! timestamps and generated identifiers deterministic in tests.

mod clock;
mod idgen;
mod money;
mod types;

pub use clock::{Clock, FixedClock, SystemClock};
pub use idgen::{IdGenerator, RandomIds, SequentialIds};
pub use money::Money;
pub use types::{OrderId, ProductId, Sku};
