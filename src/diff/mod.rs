mod engine;
mod line;
mod structured;

pub use engine::{Diff, DiffStats, DiffThresholds};
pub use line::{ChangeKind, DiffLine, Line, LineAnchor};
pub use structured::{count_lines, Change, Chunk, StructuredDiff, TextDiff, CONTEXT_LINES};
