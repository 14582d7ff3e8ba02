//! 시그널 허브 도메인 모델.

mod metrics;
mod platform;
mod signal;
mod stats;
mod strategy;

pub use metrics::*;
pub use platform::*;
pub use signal::*;
pub use stats::*;
pub use strategy::*;
