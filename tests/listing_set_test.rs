//! Property tests for `ListingSet` deduplication

use fitmap_crawler::{ListingReference, ListingSet};
use proptest::prelude::*;
use std::collections::HashSet;

fn reference_strategy() -> impl Strategy<Value = Vec<ListingReference>> {
    prop::collection::vec("/gym/[0-9]{1,2}/", 0..60).prop_map(|paths| {
        paths
            .into_iter()
            .map(|p| ListingReference::new(format!("https://fitmap.jp{p}")))
            .collect()
    })
}

proptest! {
    #[test]
    fn test_set_holds_each_reference_once(refs in reference_strategy()) {
        let set: ListingSet = refs.iter().cloned().collect();
        let unique: HashSet<&ListingReference> = refs.iter().collect();
        prop_assert_eq!(set.len(), unique.len());
    }

    #[test]
    fn test_set_keeps_first_occurrence_order(refs in reference_strategy()) {
        let set: ListingSet = refs.iter().cloned().collect();
        let mut seen = HashSet::new();
        let expected: Vec<&ListingReference> =
            refs.iter().filter(|r| seen.insert(*r)).collect();
        let actual: Vec<&ListingReference> = set.iter().collect();
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn test_reinsertion_is_idempotent(refs in reference_strategy()) {
        let mut set: ListingSet = refs.iter().cloned().collect();
        let before = set.clone();
        prop_assert_eq!(set.extend(refs.iter().cloned()), 0);
        prop_assert_eq!(set, before);
    }
}
