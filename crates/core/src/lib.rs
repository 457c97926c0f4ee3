pub mod config;
pub mod error;
pub mod review;

pub use config::GateConfig;
pub use error::*;
pub use review::*;
