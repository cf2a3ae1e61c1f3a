//! Scanner error types

use crate::MIN_IMAGE_BYTES;

/// Hard failures of the Laxity scan.
///
/// Heuristic misses are not errors; they degrade to defaults and surface as
/// warnings on the extraction. Only input that cannot possibly hold a player
/// is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LaxityError {
    /// Buffer smaller than the minimum plausible player image
    #[error("input too small for a Laxity scan: {0} bytes (minimum {min})", min = MIN_IMAGE_BYTES)]
    InputTooSmall(usize),
}
