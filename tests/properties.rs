use huffvizd::engine::{analyze_frequency, assign_codes, build_tree, decode, encode};
use proptest::prelude::*;

/// Short texts over a small alphabet, so ties are common.
fn tie_heavy_text() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(vec!['A', 'B', 'C', 'D', ' ']), 1..64)
        .prop_map(|chars| chars.into_iter().collect())
}

fn any_text() -> impl Strategy<Value = String> {
    prop::collection::vec(any::<char>(), 1..200).prop_map(|chars| chars.into_iter().collect())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        ..ProptestConfig::default()
    })]

    #[test]
    fn round_trip(text in prop_oneof![tie_heavy_text(), any_text()]) {
        let tree = build_tree(&analyze_frequency(&text)).unwrap();
        let encoded = encode(&text, &tree).unwrap();
        prop_assert_eq!(decode(&tree, &encoded.bits).unwrap(), text);
    }

    #[test]
    fn codes_are_prefix_free(text in any_text()) {
        let codes = assign_codes(&build_tree(&analyze_frequency(&text)).unwrap());
        prop_assert!(codes.is_prefix_free());
    }

    #[test]
    fn frequency_is_conserved(text in any_text()) {
        let table = analyze_frequency(&text);
        let tree = build_tree(&table).unwrap();
        let leaf_sum: u64 = tree.leaves().iter().map(|(_, f)| *f).sum();
        prop_assert_eq!(tree.frequency(), leaf_sum);
        prop_assert_eq!(leaf_sum, text.chars().count() as u64);
    }

    #[test]
    fn node_counts(text in any_text()) {
        let table = analyze_frequency(&text);
        let tree = build_tree(&table).unwrap();
        let n = table.len();
        prop_assert_eq!(tree.leaf_count(), n);
        prop_assert_eq!(tree.internal_count(), n - 1);
        prop_assert_eq!(tree.node_count(), 2 * n - 1);
    }

    #[test]
    fn build_is_deterministic(text in tie_heavy_text()) {
        let table = analyze_frequency(&text);
        let first = build_tree(&table).unwrap();
        let second = build_tree(&table).unwrap();
        prop_assert_eq!(assign_codes(&first), assign_codes(&second));
        prop_assert_eq!(first, second);
    }

    #[test]
    fn encoded_size_matches_weighted_code_length(text in tie_heavy_text()) {
        let table = analyze_frequency(&text);
        let tree = build_tree(&table).unwrap();
        let codes = assign_codes(&tree);
        let encoded = encode(&text, &tree).unwrap();
        let expected: u64 = table
            .iter()
            .map(|e| e.count * codes.get(e.symbol).unwrap().len() as u64)
            .sum();
        prop_assert_eq!(encoded.compressed_size_bits, expected);
        prop_assert_eq!(encoded.original_size_bits, 8 * text.chars().count() as u64);
    }
}
