use codemorph::domain::models::generation::Verdict;
use codemorph::services::classifier::{ClassifierConfig, CompletenessClassifier};
use codemorph::services::depth::BlockDepthTracker;
use codemorph::services::merger::{MergerConfig, OverlapMerger};
use codemorph::services::text::trailing_chars;
use proptest::prelude::*;

proptest! {
    /// Property: merging never loses accumulated text
    ///
    /// Whatever the backend returns, the merged result starts with the
    /// accumulated text verbatim and never shrinks.
    #[test]
    fn prop_merge_preserves_base_as_prefix(base in ".*", chunk in ".*") {
        let merger = OverlapMerger::new(MergerConfig::default());
        let merged = merger.merge(&base, &chunk);
        prop_assert!(merged.starts_with(&base));
        prop_assert!(merged.len() >= base.len());
    }

    /// Property: merging adds at most the chunk plus one separator
    #[test]
    fn prop_merge_growth_is_bounded(base in ".*", chunk in ".*") {
        let merger = OverlapMerger::new(MergerConfig::default());
        let merged = merger.merge(&base, &chunk);
        prop_assert!(merged.len() <= base.len() + chunk.len() + 1);
    }

    /// Property: block depth never exceeds the number of openers and
    /// never underflows on stray closers
    #[test]
    fn prop_depth_is_bounded_by_openers(text in "[{}a-z \n]*") {
        let mut tracker = BlockDepthTracker::new();
        tracker.update(&text);
        let opener_count = text.matches('{').count();
        prop_assert!(tracker.depth() <= opener_count);
    }

    /// Property: feeding chunks one at a time equals feeding them at once
    #[test]
    fn prop_depth_is_chunking_invariant(chunks in prop::collection::vec("[{}a-z]*", 0..8)) {
        let mut incremental = BlockDepthTracker::new();
        for chunk in &chunks {
            incremental.update(chunk);
        }
        let mut whole = BlockDepthTracker::new();
        whole.update(&chunks.concat());
        prop_assert_eq!(incremental.depth(), whole.depth());
    }

    /// Property: text ending in a continuation mark is never complete
    #[test]
    fn prop_trailing_mark_forces_incomplete(
        prefix in "[a-z ]{0,60}",
        mark in prop::sample::select(vec!['{', ':', '(', ',', ';']),
    ) {
        let classifier = CompletenessClassifier::new(ClassifierConfig::default());
        let text = format!("{prefix}{mark}");
        prop_assert_eq!(classifier.classify(&text, 0), Verdict::Incomplete);
    }

    /// Property: the trailing window is a real suffix and respects the cap
    #[test]
    fn prop_trailing_chars_is_a_bounded_suffix(text in ".*", max in 0usize..300) {
        let tail = trailing_chars(&text, max);
        prop_assert!(text.ends_with(tail));
        prop_assert!(tail.chars().count() <= max);
    }
}
