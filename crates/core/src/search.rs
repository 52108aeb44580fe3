//! Review filtering and search.
//!
//! Given the full review set (newest first), a set of selected tags and a
//! free-text query, derive the visible subset:
//!
//! - Tag filter: a review matches if it carries *any* selected tag.
//! - Text filter: the trimmed, lowercased query must be a substring of the
//!   text, the location, the display name or any tag.
//! - Both filters must pass when active. Input order is preserved.
//!
//! The derivation is pure and cheap, so callers simply re-run it whenever the
//! review set or the [`FilterState`] changes.

use std::collections::BTreeSet;

use crate::review::normalize_tag;

// ---------------------------------------------------------------------------
// Searchable
// ---------------------------------------------------------------------------

/// The fields of a review that the filter engine inspects.
///
/// Tags are expected to be stored lowercase (see
/// [`normalize_tags`](crate::review::normalize_tags)).
pub trait Searchable {
    fn text(&self) -> &str;
    fn location(&self) -> Option<&str>;
    fn display_name(&self) -> Option<&str>;
    fn tags(&self) -> &[String];
}

// ---------------------------------------------------------------------------
// FilterState
// ---------------------------------------------------------------------------

/// Ephemeral filter settings held by whoever is viewing the review list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    selected_tags: BTreeSet<String>,
    search_query: String,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a filter from HTTP-style parameters: a comma-separated tag list
    /// and a raw query string.
    pub fn from_params(tags: Option<&str>, query: Option<&str>) -> Self {
        let selected_tags = tags
            .into_iter()
            .flat_map(|list| list.split(','))
            .filter_map(normalize_tag)
            .collect();

        Self {
            selected_tags,
            search_query: query.unwrap_or_default().to_string(),
        }
    }

    /// Select the tag if it is not selected, deselect it otherwise.
    ///
    /// Returns whether the tag is selected after the call. Blank tags are
    /// ignored and return `false`.
    pub fn toggle_tag(&mut self, tag: &str) -> bool {
        let Some(tag) = normalize_tag(tag) else {
            return false;
        };
        if self.selected_tags.remove(&tag) {
            false
        } else {
            self.selected_tags.insert(tag);
            true
        }
    }

    pub fn clear_tags(&mut self) {
        self.selected_tags.clear();
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.search_query = query.into();
    }

    pub fn selected_tags(&self) -> &BTreeSet<String> {
        &self.selected_tags
    }

    /// The query exactly as entered.
    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    /// The query as used for matching; `None` when blank.
    pub fn normalized_query(&self) -> Option<String> {
        normalize_query(&self.search_query)
    }

    /// Whether any filter is in effect.
    pub fn is_active(&self) -> bool {
        !self.selected_tags.is_empty() || self.normalized_query().is_some()
    }
}

/// Trim and lowercase a search query. Blank queries yield `None`.
pub fn normalize_query(query: &str) -> Option<String> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        None
    } else {
        Some(query)
    }
}

// ---------------------------------------------------------------------------
// Matching
// ---------------------------------------------------------------------------

/// `true` if the review carries at least one of the selected tags.
pub fn matches_tags<T: Searchable>(review: &T, selected: &BTreeSet<String>) -> bool {
    review.tags().iter().any(|tag| selected.contains(tag))
}

/// `true` if the (already normalized) query occurs in any searchable field.
pub fn matches_query<T: Searchable>(review: &T, query: &str) -> bool {
    let contains = |field: &str| field.to_lowercase().contains(query);

    contains(review.text())
        || review.location().is_some_and(contains)
        || review.display_name().is_some_and(contains)
        || review.tags().iter().any(|tag| contains(tag))
}

/// Derive the visible subset of `reviews` for the given filter state.
pub fn filter_reviews<'a, T: Searchable>(reviews: &'a [T], state: &FilterState) -> Vec<&'a T> {
    let query = state.normalized_query();
    let tags = state.selected_tags();

    reviews
        .iter()
        .filter(|review| tags.is_empty() || matches_tags(*review, tags))
        .filter(|review| query.as_deref().map_or(true, |q| matches_query(*review, q)))
        .collect()
}

// ---------------------------------------------------------------------------
// Filtered result
// ---------------------------------------------------------------------------

/// The visible subset together with the counts a results banner needs.
#[derive(Debug)]
pub struct FilteredReviews<'a, T> {
    pub reviews: Vec<&'a T>,
    /// Size of the unfiltered input set.
    pub total: usize,
    /// Human-readable summary, present only while a filter is active.
    pub summary: Option<String>,
}

impl<T> FilteredReviews<'_, T> {
    pub fn visible_count(&self) -> usize {
        self.reviews.len()
    }

    /// Whether any filter was active when this result was derived.
    pub fn is_filtered(&self) -> bool {
        self.summary.is_some()
    }
}

/// Run [`filter_reviews`] and build the summary line.
pub fn apply_filter<'a, T: Searchable>(
    reviews: &'a [T],
    state: &FilterState,
) -> FilteredReviews<'a, T> {
    let visible = filter_reviews(reviews, state);
    let summary = summarize(visible.len(), state);

    FilteredReviews {
        reviews: visible,
        total: reviews.len(),
        summary,
    }
}

/// E.g. `Showing 2 reviews for "tacos" with selected tags`.
pub fn summarize(count: usize, state: &FilterState) -> Option<String> {
    if !state.is_active() {
        return None;
    }

    let mut summary = format!(
        "Showing {count} review{}",
        if count == 1 { "" } else { "s" }
    );
    let query = state.search_query().trim();
    if !query.is_empty() {
        summary.push_str(&format!(" for \"{query}\""));
    }
    if !state.selected_tags().is_empty() {
        summary.push_str(" with selected tags");
    }
    Some(summary)
}

/// Every distinct tag across the review set, in lexicographic order.
pub fn available_tags<T: Searchable>(reviews: &[T]) -> Vec<String> {
    reviews
        .iter()
        .flat_map(|review| review.tags().iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        id: u32,
        text: String,
        location: Option<String>,
        name: Option<String>,
        tags: Vec<String>,
    }

    impl Searchable for Item {
        fn text(&self) -> &str {
            &self.text
        }
        fn location(&self) -> Option<&str> {
            self.location.as_deref()
        }
        fn display_name(&self) -> Option<&str> {
            self.name.as_deref()
        }
        fn tags(&self) -> &[String] {
            &self.tags
        }
    }

    fn item(id: u32, text: &str, tags: &[&str], location: Option<&str>) -> Item {
        Item {
            id,
            text: text.to_string(),
            location: location.map(str::to_string),
            name: None,
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    /// Tacos in Austin, a library in Boston.
    fn sample() -> Vec<Item> {
        vec![
            item(1, "Great tacos", &["food", "mexican"], Some("Austin")),
            item(2, "Quiet library", &["study"], Some("Boston")),
        ]
    }

    fn ids(found: &[&Item]) -> Vec<u32> {
        found.iter().map(|r| r.id).collect()
    }

    fn state(tags: &str, query: &str) -> FilterState {
        FilterState::from_params(Some(tags), Some(query))
    }

    // -- scenarios -----------------------------------------------------------

    #[test]
    fn tag_filter_selects_tacos() {
        let reviews = sample();
        assert_eq!(ids(&filter_reviews(&reviews, &state("food", ""))), vec![1]);
    }

    #[test]
    fn query_matches_location_case_insensitively() {
        let reviews = sample();
        assert_eq!(ids(&filter_reviews(&reviews, &state("", "boston"))), vec![2]);
        assert_eq!(ids(&filter_reviews(&reviews, &state("", "BOSTON"))), vec![2]);
    }

    #[test]
    fn disjoint_tag_and_query_yield_nothing() {
        let reviews = sample();
        assert!(filter_reviews(&reviews, &state("study", "tacos")).is_empty());
    }

    #[test]
    fn paris_query_matches_lowercase_location() {
        let reviews = vec![item(7, "Lovely", &[], Some("paris cafe"))];
        assert_eq!(ids(&filter_reviews(&reviews, &state("", "PARIS"))), vec![7]);
    }

    #[test]
    fn selected_tags_are_ored() {
        let reviews = vec![item(1, "Espresso", &["coffee"], None)];
        let found = filter_reviews(&reviews, &state("coffee,cozy", ""));
        assert_eq!(ids(&found), vec![1]);
    }

    #[test]
    fn query_matches_display_name_and_tags() {
        let mut named = item(1, "Fine", &[], None);
        named.name = Some("Ana Lima".to_string());
        let tagged = item(2, "Fine", &["rooftop"], None);
        let reviews = vec![named, tagged];

        assert_eq!(ids(&filter_reviews(&reviews, &state("", "lima"))), vec![1]);
        assert_eq!(ids(&filter_reviews(&reviews, &state("", "roof"))), vec![2]);
    }

    #[test]
    fn whitespace_query_applies_no_filter() {
        let reviews = sample();
        assert_eq!(ids(&filter_reviews(&reviews, &state("", "   "))), vec![1, 2]);
    }

    #[test]
    fn empty_set_yields_empty_result() {
        let reviews: Vec<Item> = Vec::new();
        assert!(filter_reviews(&reviews, &state("food", "tacos")).is_empty());
    }

    // -- properties ----------------------------------------------------------

    fn larger_sample() -> Vec<Item> {
        vec![
            item(1, "Great tacos", &["food", "mexican"], Some("Austin")),
            item(2, "Quiet library", &["study"], Some("Boston")),
            item(3, "Taco truck at night", &["food", "late"], None),
            item(4, "Cozy coffee", &["coffee", "cozy"], Some("Paris")),
            item(5, "Study cafe", &["coffee", "study"], Some("Austin")),
        ]
    }

    fn all_states() -> Vec<FilterState> {
        let tag_sets = ["", "food", "study", "coffee,cozy", "late,study", "missing"];
        let queries = ["", "  ", "a", "taco", "AUSTIN", "cafe", "zzz"];
        tag_sets
            .iter()
            .flat_map(|t| queries.iter().map(move |q| state(t, q)))
            .collect()
    }

    #[test]
    fn no_filters_is_identity() {
        let reviews = larger_sample();
        let found = filter_reviews(&reviews, &FilterState::new());
        assert_eq!(ids(&found), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn result_is_ordered_subset_of_input() {
        let reviews = larger_sample();
        for s in all_states() {
            let found = ids(&filter_reviews(&reviews, &s));
            let mut sorted = found.clone();
            sorted.sort_unstable();
            assert_eq!(found, sorted, "order must be preserved for {s:?}");
            assert!(found.iter().all(|id| (1..=5).contains(id)));
        }
    }

    #[test]
    fn filtering_is_idempotent() {
        let reviews = larger_sample();
        for s in all_states() {
            let once: Vec<Item> = filter_reviews(&reviews, &s).into_iter().cloned().collect();
            let twice: Vec<Item> = filter_reviews(&once, &s).into_iter().cloned().collect();
            assert_eq!(once, twice, "filter must be idempotent for {s:?}");
        }
    }

    #[test]
    fn lengthening_query_never_grows_result() {
        let reviews = larger_sample();
        let prefixes = ["t", "ta", "tac", "taco", "tacos"];
        let counts: Vec<usize> = prefixes
            .iter()
            .map(|q| filter_reviews(&reviews, &state("", q)).len())
            .collect();
        assert!(counts.windows(2).all(|w| w[1] <= w[0]), "{counts:?}");
    }

    #[test]
    fn activating_tag_filter_never_grows_result() {
        let reviews = larger_sample();
        for q in ["", "a", "cafe"] {
            let unfiltered = filter_reviews(&reviews, &state("", q)).len();
            for tags in ["food", "coffee,cozy", "missing"] {
                assert!(filter_reviews(&reviews, &state(tags, q)).len() <= unfiltered);
            }
        }
    }

    // -- FilterState ---------------------------------------------------------

    #[test]
    fn toggle_selects_then_deselects() {
        let mut s = FilterState::new();
        assert!(s.toggle_tag("Coffee"));
        assert!(s.selected_tags().contains("coffee"));
        assert!(!s.toggle_tag("coffee"));
        assert!(s.selected_tags().is_empty());
    }

    #[test]
    fn toggle_ignores_blank_tag() {
        let mut s = FilterState::new();
        assert!(!s.toggle_tag("  "));
        assert!(!s.is_active());
    }

    #[test]
    fn clear_tags_removes_all_selections() {
        let mut s = state("a,b,c", "x");
        s.clear_tags();
        assert!(s.selected_tags().is_empty());
        assert_eq!(s.search_query(), "x");
    }

    #[test]
    fn from_params_normalizes_tags() {
        let s = FilterState::from_params(Some(" Food, ,MEXICAN"), None);
        let tags: Vec<&str> = s.selected_tags().iter().map(String::as_str).collect();
        assert_eq!(tags, vec!["food", "mexican"]);
        assert_eq!(s.normalized_query(), None);
    }

    // -- summary & available tags --------------------------------------------

    #[test]
    fn summary_absent_without_filters() {
        let reviews = sample();
        let result = apply_filter(&reviews, &FilterState::new());
        assert_eq!(result.summary, None);
        assert!(!result.is_filtered());
        assert_eq!(result.total, 2);
        assert_eq!(result.visible_count(), 2);
    }

    #[test]
    fn summary_mentions_query_and_tags() {
        let reviews = sample();
        let result = apply_filter(&reviews, &state("food", " Tacos "));
        assert_eq!(
            result.summary.as_deref(),
            Some("Showing 1 review for \"Tacos\" with selected tags")
        );
        assert!(result.is_filtered());
    }

    #[test]
    fn summary_pluralizes() {
        assert_eq!(
            summarize(0, &state("", "zzz")).as_deref(),
            Some("Showing 0 reviews for \"zzz\"")
        );
    }

    #[test]
    fn available_tags_are_distinct_and_sorted() {
        let reviews = larger_sample();
        assert_eq!(
            available_tags(&reviews),
            vec!["coffee", "cozy", "food", "late", "mexican", "study"]
        );
    }
}
