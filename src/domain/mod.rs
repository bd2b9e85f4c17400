// Domain types and value objects
pub mod pivot;
pub mod wave;

// Re-export commonly used types
pub use pivot::{enforce_alternation, merge_pivots, Pivot, PivotKind};
pub use wave::{CorrectiveWave, Direction, ImpulseWave, Wave, WaveLeg};
