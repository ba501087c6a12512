pub mod compute;
pub mod error;
pub mod lookback;
pub mod pipeline;
pub mod trim;

pub use compute::compute_indicators;
pub use error::EngineError;
pub use lookback::{FetchWindow, LookbackPolicy};
pub use pipeline::{build_display_table, DisplayTable};
pub use trim::trim_to_display;
