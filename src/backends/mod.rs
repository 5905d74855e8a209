//! Exchange backend implementations

pub mod coinbase;
pub mod remote;
pub mod simple;

pub use coinbase::{CoinbaseBackend, CoinbaseSource};
pub use remote::{RateSource, RemoteBackend};
pub use simple::SimpleBackend;
