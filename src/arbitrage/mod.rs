//! Arbitrage pipeline: quoting, signal evaluation, trade preparation,
//! and execution dispatch.

pub mod delegated;
pub mod dispatcher;
pub mod preparer;
pub mod quote;
pub mod signal;

pub use delegated::{DelegatedClient, DelegatedOutcome, DelegatedParams};
pub use dispatcher::{DispatchOutcome, ExecutionDispatcher};
pub use preparer::{PrepareRequest, TradePreparer};
pub use signal::Signal;
