//! Property tests for search signature canonicalisation and result merging

use clarity_core::prelude::{EntityRef, Link, ParamValue, Sample, SearchParams, search_params};
use clarity_recorder::{RecordedSearch, SearchSignature};
use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

type Terms = BTreeMap<String, Vec<String>>;

fn terms() -> impl Strategy<Value = Terms> {
    prop::collection::btree_map(
        "[a-z]{1,8}",
        prop::collection::vec("[A-Za-z0-9_]{1,6}", 1..4),
        1..4,
    )
}

fn ids() -> impl Strategy<Value = BTreeSet<String>> {
    prop::collection::btree_set("[0-9]{1,4}", 0..6)
}

fn params_in_order(terms: &Terms) -> SearchParams {
    search_params(terms.iter().map(|(k, v)| (k.clone(), v.clone())))
}

fn params_reversed(terms: &Terms) -> SearchParams {
    search_params(terms.iter().rev().map(|(k, v)| {
        let mut values = v.clone();
        values.reverse();
        (k.clone(), values)
    }))
}

fn recorded(ids: &BTreeSet<String>) -> RecordedSearch<Sample> {
    let signature =
        SearchSignature::for_entity::<Sample>(&search_params([("name", "34_a")])).unwrap();
    let links = ids
        .iter()
        .map(|id| Link::parse(&format!("https://lims.example.org/api/v2/samples/{id}")).unwrap())
        .collect();
    RecordedSearch::new(signature, links)
}

fn result_ids(search: &RecordedSearch<Sample>) -> Vec<String> {
    search
        .results()
        .iter()
        .map(|l| EntityRef::of_link(l).unwrap().id)
        .collect()
}

proptest! {
    #[test]
    fn prop_order_never_changes_the_signature(terms in terms()) {
        let a = SearchSignature::for_entity::<Sample>(&params_in_order(&terms)).unwrap();
        let b = SearchSignature::for_entity::<Sample>(&params_reversed(&terms)).unwrap();

        prop_assert_eq!(&a, &b);
        prop_assert_eq!(a.signature_hash(), b.signature_hash());
        prop_assert_eq!(a.file_name(), b.file_name());
    }

    #[test]
    fn prop_duplicate_and_missing_values_are_ignored(terms in terms()) {
        let plain = SearchSignature::for_entity::<Sample>(&params_in_order(&terms)).unwrap();

        let padded: SearchParams = terms
            .iter()
            .map(|(k, v)| {
                let mut values: Vec<Option<String>> = v.iter().cloned().map(Some).collect();
                values.extend(v.iter().cloned().map(Some));
                values.push(None);
                values.push(Some(String::new()));
                (k.clone(), ParamValue::from_optional(values))
            })
            .collect();
        let padded = SearchSignature::for_entity::<Sample>(&padded).unwrap();

        prop_assert_eq!(plain, padded);
    }

    #[test]
    fn prop_storage_key_is_the_unsigned_hash_in_hex(terms in terms()) {
        let signature = SearchSignature::for_entity::<Sample>(&params_in_order(&terms)).unwrap();
        let key = signature.storage_key();

        prop_assert!(!key.starts_with('0') || key == "0");
        prop_assert_eq!(key.to_lowercase(), key.clone());
        prop_assert_eq!(u32::from_str_radix(&key, 16).unwrap(), signature.signature_hash() as u32);
        prop_assert_eq!(signature.file_name(), format!("search_{}.xml", key));
    }

    #[test]
    fn prop_merge_is_an_ordered_union(existing in ids(), incoming in ids()) {
        let mut merged = recorded(&existing);
        let changed = merged.merge(&recorded(&incoming)).unwrap();

        prop_assert_eq!(changed, !incoming.is_subset(&existing));

        let mut expected: Vec<String> = existing.iter().cloned().collect();
        expected.extend(incoming.iter().filter(|id| !existing.contains(*id)).cloned());
        prop_assert_eq!(result_ids(&merged), expected);
    }

    #[test]
    fn prop_merge_with_itself_changes_nothing(existing in ids()) {
        let mut search = recorded(&existing);
        prop_assert!(!search.merge(&recorded(&existing)).unwrap());
        prop_assert_eq!(result_ids(&search), existing.into_iter().collect::<Vec<_>>());
    }
}
