//! Maps a `<sec>` title to one of the coarse body-section buckets used
//! to group body sentences. Rules are tried in order; the first match
//! wins, and an untitled or unrecognized section falls to `Other`.

use litscan_core::SectionBucket;
use once_cell::sync::Lazy;
use regex::Regex;

static INTRO: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)intro.+").unwrap());
static RESULTS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)results").unwrap());
static DISCUSSION: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)discussion").unwrap());
static CONCLUSION: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)conclusion").unwrap());
static METHOD: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)method.+").unwrap());

/// `title` is the raw section heading text, if any.
pub fn bucket_for_title(title: Option<&str>) -> SectionBucket {
    let Some(title) = title else {
        return SectionBucket::Other;
    };
    if INTRO.is_match(title) {
        SectionBucket::Intro
    } else if RESULTS.is_match(title) {
        SectionBucket::Results
    } else if DISCUSSION.is_match(title) {
        SectionBucket::Discussion
    } else if CONCLUSION.is_match(title) {
        SectionBucket::Conclusion
    } else if METHOD.is_match(title) {
        SectionBucket::Method
    } else {
        SectionBucket::Other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_each_bucket_keyword() {
        assert_eq!(bucket_for_title(Some("Introduction")), SectionBucket::Intro);
        assert_eq!(bucket_for_title(Some("Results")), SectionBucket::Results);
        assert_eq!(bucket_for_title(Some("Discussion")), SectionBucket::Discussion);
        assert_eq!(bucket_for_title(Some("Conclusions")), SectionBucket::Conclusion);
        assert_eq!(bucket_for_title(Some("Materials and Methods")), SectionBucket::Method);
    }

    #[test]
    fn falls_back_to_other_when_untitled_or_unrecognized() {
        assert_eq!(bucket_for_title(None), SectionBucket::Other);
        assert_eq!(bucket_for_title(Some("Acknowledgements")), SectionBucket::Other);
    }

    #[test]
    fn bare_intro_and_method_titles_with_nothing_following_do_not_match() {
        // the ".+" trailing requirement means the bare stem alone misses.
        assert_eq!(bucket_for_title(Some("Intro")), SectionBucket::Other);
        assert_eq!(bucket_for_title(Some("Method")), SectionBucket::Other);
    }

    #[test]
    fn results_takes_precedence_over_discussion_when_title_has_both() {
        assert_eq!(bucket_for_title(Some("Results and Discussion")), SectionBucket::Results);
    }
}
