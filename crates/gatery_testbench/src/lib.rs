//! Testbench synthesis from simulation traces: replays a recorded
//! stimulus/response trace as a self-checking VHDL testbench wrapping a
//! design's root entity, grounded on `TestbenchRecorder`/`BaseTestbenchRecorder`.

#![warn(missing_docs)]

pub mod error;
pub mod recorder;
pub mod time;

pub use error::{TestbenchError, TestbenchResult};
pub use recorder::{is_pin, TestbenchRecorder};
pub use time::format_time;
