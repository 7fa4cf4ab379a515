//! Text/binary classification of file contents.

use crate::options::BinaryDetection;

/// Share of non-printable bytes above which a buffer counts as binary.
const BINARY_RATIO: f64 = 0.2;

/// Returns true when more than 20% of `data` lies outside printable ASCII.
///
/// Control characters (tabs and newlines included) and every byte with the
/// high bit set count as non-printable, so this is a heuristic rather than a
/// charset detector. An empty buffer is never binary.
pub fn is_likely_binary(data: &[u8]) -> bool {
    if data.is_empty() {
        return false;
    }
    let non_printable = data.iter().filter(|&&b| !(32..=126).contains(&b)).count();
    non_printable as f64 / data.len() as f64 > BINARY_RATIO
}

impl BinaryDetection {
    pub fn is_binary(self, data: &[u8]) -> bool {
        match self {
            BinaryDetection::Ratio => is_likely_binary(data),
            BinaryDetection::Accurate => content_inspector::inspect(data).is_binary(),
            BinaryDetection::None => false,
        }
    }
}
