//! Condition-based artifact file matching.
//!
//! Correlated artifact files (visual captures, waveform captures) encode
//! the test conditions of the measurement they belong to in their file
//! names (`vio=3[V]_temp=25[C]_..._Report-Picture.png`). Matching is a
//! substring-count heuristic, not an exact key-value parse: it tolerates
//! filenames with extra non-condition text, but can over- or under-match
//! when condition values are substrings of one another (e.g. "1" inside
//! "10"). That behavior is an accepted limitation of the format, kept
//! as-is rather than silently corrected.

use crate::constants::MATCH_CONDITION_OFFSET;
use std::path::{Path, PathBuf};

/// Select the candidate files whose names encode the given condition set.
///
/// A candidate counts as matched iff the number of `condition_tokens`
/// found as case-insensitive substrings of its path equals the number of
/// `=`-delimited condition fragments physically present in the path, plus
/// a fixed offset for the mandatory parent-folder and artifact-class
/// tokens. The result preserves candidate order and holds base filenames
/// with path separators normalized to `/`.
pub fn matching_files(condition_tokens: &[String], candidates: &[PathBuf]) -> Vec<String> {
    let lowered: Vec<String> = condition_tokens.iter().map(|t| t.to_lowercase()).collect();
    let mut matched = Vec::new();

    for candidate in candidates {
        let path_text = candidate.to_string_lossy();
        let path_lower = path_text.to_lowercase();

        // Every '=' in the path marks one encoded condition; the offset
        // accounts for the parent-folder and artifact-class tokens that
        // must also be found.
        let required = path_text.matches('=').count() + MATCH_CONDITION_OFFSET;
        let found = lowered
            .iter()
            .filter(|token| path_lower.contains(token.as_str()))
            .count();

        if found == required {
            matched.push(base_filename(candidate));
        }
    }

    matched
}

/// Base filename with separators normalized for the report document
fn base_filename(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().replace('\\', "/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_matches_when_all_conditions_found() {
        let candidates = vec![PathBuf::from(
            "/data/run1/vio=3[V]_temp=25[C]_sample=7_Report-Picture.png",
        )];
        // 3 '=' in the name, +2 offset: all five tokens must be found
        let conds = tokens(&[
            "/data/run1",
            "sample=7",
            "vio=3[",
            "temp=25[",
            "Report-Picture",
        ]);
        let matched = matching_files(&conds, &candidates);
        assert_eq!(
            matched,
            vec!["vio=3[V]_temp=25[C]_sample=7_Report-Picture.png".to_string()]
        );
    }

    #[test]
    fn test_no_match_when_condition_missing() {
        let candidates = vec![PathBuf::from(
            "/data/run1/vio=3[V]_temp=25[C]_sample=7_Report-Picture.png",
        )];
        // temp token absent: only 4 of the required 5 are found
        let conds = tokens(&["/data/run1", "sample=7", "vio=3[", "Report-Picture"]);
        assert!(matching_files(&conds, &candidates).is_empty());
    }

    #[test]
    fn test_wrong_artifact_class_rejected() {
        let candidates = vec![PathBuf::from(
            "/data/run1/vio=3[V]_sample=7_Report-waveform.mat",
        )];
        let conds = tokens(&["/data/run1", "sample=7", "vio=3[", "Report-Picture"]);
        assert!(matching_files(&conds, &candidates).is_empty());
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let candidates = vec![PathBuf::from(
            "/data/run1/VIO=3[V]_Sample=7_report-picture.png",
        )];
        let conds = tokens(&["/data/RUN1", "SAMPLE=7", "vio=3[", "Report-Picture"]);
        assert_eq!(matching_files(&conds, &candidates).len(), 1);
    }

    #[test]
    fn test_order_preserving() {
        let candidates = vec![
            PathBuf::from("/d/r/b_vio=3[V]_sample=7_Report-Picture.png"),
            PathBuf::from("/d/r/a_vio=3[V]_sample=7_Report-Picture.png"),
        ];
        let conds = tokens(&["/d/r", "sample=7", "vio=3[", "Report-Picture"]);
        let matched = matching_files(&conds, &candidates);
        assert_eq!(
            matched,
            vec![
                "b_vio=3[V]_sample=7_Report-Picture.png".to_string(),
                "a_vio=3[V]_sample=7_Report-Picture.png".to_string(),
            ]
        );
    }

    #[test]
    fn test_extra_tokens_cause_overcount_rejection() {
        // Two tokens both matching the same fragment push the found count
        // past the required count; the file is rejected. Known behavior of
        // the heuristic.
        let candidates = vec![PathBuf::from(
            "/d/r/vio=10[V]_sample=7_Report-Picture.png",
        )];
        let conds = tokens(&[
            "/d/r",
            "sample=7",
            "vio=10[",
            "vio=1",
            "Report-Picture",
        ]);
        assert!(matching_files(&conds, &candidates).is_empty());
    }

    #[test]
    fn test_empty_candidates() {
        let conds = tokens(&["/d/r", "sample=7"]);
        assert!(matching_files(&conds, &[]).is_empty());
    }
}
