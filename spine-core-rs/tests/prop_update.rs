//! Property tests for the update engine
//!
//! Tests invariants for:
//! - update_list: idempotence, merge-not-erase, ordering, unique identifiers
//! - remove_element_from_item: exact clearing, idempotence

use spine_core::*;
use proptest::prelude::*;

// ============================================================================
// Strategies
// ============================================================================

fn scaled_number() -> impl Strategy<Value = ScaledNumber> {
    (any::<i32>(), prop::option::of(-3i8..=0)).prop_map(|(number, scale)| ScaledNumber {
        number: Some(number as i64),
        scale,
    })
}

fn limit(id: impl Strategy<Value = Option<u32>>) -> impl Strategy<Value = LoadControlLimitData> {
    (
        id,
        prop::option::of(any::<bool>()),
        prop::option::of(any::<bool>()),
        prop::option::of(scaled_number()),
    )
        .prop_map(|(limit_id, is_limit_changeable, is_limit_active, value)| LoadControlLimitData {
            limit_id,
            is_limit_changeable,
            is_limit_active,
            time_period: None,
            value,
        })
}

/// Cached list: identifiers present and unique
fn existing_list() -> impl Strategy<Value = Vec<LoadControlLimitData>> {
    prop::collection::btree_set(0u32..8, 0..6).prop_flat_map(|ids| {
        ids.into_iter()
            .map(|id| limit(Just(Some(id))))
            .collect::<Vec<_>>()
    })
}

/// Delta: keyed and broadcast records mixed, identifiers may repeat
fn incoming_list() -> impl Strategy<Value = Vec<LoadControlLimitData>> {
    prop::collection::vec(limit(prop::option::of(0u32..10)), 0..6)
}

fn field() -> impl Strategy<Value = LoadControlLimitField> {
    prop_oneof![
        Just(LoadControlLimitField::IsLimitChangeable),
        Just(LoadControlLimitField::IsLimitActive),
        Just(LoadControlLimitField::TimePeriod),
        Just(LoadControlLimitField::Value),
    ]
}

fn ids(list: &[LoadControlLimitData]) -> Vec<Option<u32>> {
    list.iter().map(|l| l.limit_id).collect()
}

// ============================================================================
// update_list Property Tests
// ============================================================================

proptest! {
    /// CORE INVARIANT: applying the same delta twice equals applying it once
    #[test]
    fn update_list_idempotent(
        existing in existing_list(),
        incoming in incoming_list()
    ) {
        let once = update_list(&existing, &incoming, None, None);
        let twice = update_list(&once, &incoming, None, None);

        prop_assert_eq!(twice, once);
    }

    /// Present cached fields stay present after any merge
    #[test]
    fn update_list_never_erases(
        existing in existing_list(),
        incoming in incoming_list()
    ) {
        let result = update_list(&existing, &incoming, None, None);

        for cached in &existing {
            let merged = result.iter().find(|r| r.limit_id == cached.limit_id);
            prop_assert!(merged.is_some(), "Record {:?} disappeared", cached.limit_id);
            let merged = merged.unwrap();

            if cached.is_limit_active.is_some() {
                prop_assert!(merged.is_limit_active.is_some());
            }
            if cached.value.is_some() {
                prop_assert!(merged.value.is_some());
            }
        }
    }

    /// Existing records keep their order and come first; identifiers stay unique
    #[test]
    fn update_list_order_and_uniqueness(
        existing in existing_list(),
        incoming in incoming_list()
    ) {
        let result = update_list(&existing, &incoming, None, None);
        let result_ids = ids(&result);
        let existing_ids = ids(&existing);

        prop_assert_eq!(&result_ids[..existing.len()], existing_ids.as_slice());

        let mut seen = std::collections::BTreeSet::new();
        for id in result_ids {
            prop_assert!(seen.insert(id), "Duplicate identifier {:?}", id);
        }
    }

    /// The delta itself is never modified
    #[test]
    fn update_list_leaves_incoming_untouched(
        existing in existing_list(),
        incoming in incoming_list()
    ) {
        let before = incoming.clone();
        let _ = update_list(&existing, &incoming, None, None);

        prop_assert_eq!(incoming, before);
    }
}

// ============================================================================
// remove_element_from_item Property Tests
// ============================================================================

proptest! {
    /// Clearing one field clears exactly that field
    #[test]
    fn remove_element_clears_only_named_field(
        record in limit(Just(Some(1))),
        field in field()
    ) {
        let mut cleared = record.clone();
        remove_element_from_item(&mut cleared, &FieldMask::new().with(field));

        let mut expected = record.clone();
        expected.clear_field(field);
        prop_assert_eq!(&cleared, &expected);
        prop_assert_eq!(cleared.limit_id, record.limit_id);

        if field != LoadControlLimitField::Value {
            prop_assert_eq!(cleared.value, record.value);
        }
        if field != LoadControlLimitField::IsLimitActive {
            prop_assert_eq!(cleared.is_limit_active, record.is_limit_active);
        }
    }

    /// Re-applying a mask is a no-op
    #[test]
    fn remove_element_idempotent(
        record in limit(Just(Some(1))),
        fields in prop::collection::vec(field(), 0..4)
    ) {
        let mask: FieldMask<LoadControlLimitField> = fields.into_iter().collect();

        let mut once = record;
        remove_element_from_item(&mut once, &mask);
        let mut twice = once.clone();
        remove_element_from_item(&mut twice, &mask);

        prop_assert_eq!(twice, once);
    }
}
