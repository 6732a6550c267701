//! Final text normalization.
//!
//! Applied once, after the retry loop settles on an accumulated result.
//! Closes any blocks the backend left open, then smooths artifacts that
//! chunk merging tends to introduce.

use crate::services::depth::BlockDepthTracker;

/// Normalize the accumulated text into its deliverable form.
///
/// Appends synthetic closers for every still-open block, collapses runs
/// of blank lines down to a single blank line, rewrites the `};` merge
/// artifact to a bare `}`, and trims surrounding whitespace.
pub fn finalize(accumulated: &str, tracker: &BlockDepthTracker) -> String {
    let mut text = accumulated.to_string();
    text.push_str(&tracker.closing_suffix());

    while text.contains("\n\n\n") {
        text = text.replace("\n\n\n", "\n\n");
    }
    text = text.replace("};", "}");

    text.trim().to_string()
}
