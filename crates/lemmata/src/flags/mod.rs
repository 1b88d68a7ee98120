//! Review flag collection and the merged flag set.

mod collector;
mod flag;

pub use collector::{calibration_sample, collect_entry_flags, FlagConfig, FlagSet};
pub use flag::{FlagCategory, FlagTarget, ReviewFlag};
