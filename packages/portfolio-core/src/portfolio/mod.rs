//! Portfolio construction and analytics.
//!
//! A [`Portfolio`] is an immutable snapshot of one weight candidate over
//! shared return data. Every accessor recomputes from the inputs; nothing is
//! cached.

mod analytics;
mod holdings;

pub use analytics::PeriodReturns;
pub use holdings::Portfolio;
