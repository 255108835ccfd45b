//! Series acquisition and reference data.
//!
//! - `provider`: the remote quote provider trait
//! - `stooq`: Stooq.com implementation
//! - `loader`: the `load` contract (remote or local, canonicalized)
//! - `recessions`: the recession reference table

pub mod loader;
pub mod provider;
pub mod recessions;
pub mod stooq;

pub use loader::{LoadedSeries, SeriesOrigin, SeriesSource, load};
pub use provider::QuoteProvider;
pub use stooq::StooqClient;
