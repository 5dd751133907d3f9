//! Bar delivery port trait.

use crate::domain::bar::Bar;
use crate::domain::error::GaptraderError;

/// Source of time-ordered fine bars. A finite historical file and a live
/// feed implement the same trait; the engine pulls one bar at a time and
/// never knows which kind is driving it.
pub trait BarSource {
    /// The next bar in time order, or `None` once the source is exhausted.
    fn next_bar(&mut self) -> Result<Option<Bar>, GaptraderError>;
}
