//! Integration tests for rating-valued event stores.
//!
//! Covers pair lookup (full and subset), overwrite semantics, aggregate
//! statistics under mutation, and the NotFound / IndexOutOfRange paths.

use std::collections::BTreeSet;

use pulsecf::{DataSet, EventStore, PulseCFError, Ratings, StoreConfig};

/// Helper: the small dataset most tests start from.
///
/// ```text
/// pos  user  item  rating
///  0    1     2     3.0
///  1    1     4     5.0
///  2    3     2     1.0
/// ```
fn sample() -> Ratings {
    let mut ratings = Ratings::with_config(&StoreConfig::seeded(5));
    ratings.add(1, 2, 3.0);
    ratings.add(1, 4, 5.0);
    ratings.add(3, 2, 1.0);
    ratings
}

// ============================================================================
// Lookup
// ============================================================================

#[test]
fn test_get_and_index_of() {
    let ratings = sample();
    assert_eq!(ratings.get(1, 4).unwrap(), 5.0);
    assert_eq!(ratings.index_of(3, 2).unwrap(), 2);
    assert_eq!(ratings.try_get(3, 4), None);

    let err = ratings.get(3, 4).unwrap_err();
    assert!(err.is_not_found());
    assert!(err.to_string().contains("user 3"));
}

#[test]
fn test_subset_lookup() {
    let ratings = sample();
    assert_eq!(ratings.get_in(1, 2, &[0, 2]).unwrap(), 3.0);
    assert_eq!(ratings.try_get_in(1, 4, &[0, 2]).unwrap(), None);
    assert!(ratings.get_in(1, 4, &[0, 2]).unwrap_err().is_not_found());
}

#[test]
fn test_subset_invalid_position() {
    let ratings = sample();
    let err = ratings.try_index_of_in(1, 2, &[0, 9]).unwrap_err();
    assert!(matches!(
        err,
        PulseCFError::IndexOutOfRange { position: 9, len: 3 }
    ));
}

#[test]
fn test_duplicates_resolve_to_first() {
    let mut ratings = sample();
    ratings.add(1, 2, 4.5);
    assert_eq!(ratings.index_of(1, 2).unwrap(), 0);
    assert_eq!(ratings.get(1, 2).unwrap(), 3.0);
    // Subset order does not matter
    assert_eq!(ratings.index_of_in(1, 2, &[3, 0]).unwrap(), 0);
    assert_eq!(ratings.index_of_in(1, 2, &[3]).unwrap(), 3);
}

#[test]
fn test_referenced_sets() {
    let ratings = sample();
    assert_eq!(
        ratings.users_referenced_by(&[0, 1, 2]).unwrap(),
        BTreeSet::from([1, 3])
    );
    assert_eq!(
        ratings.items_referenced_by(&[1, 2]).unwrap(),
        BTreeSet::from([2, 4])
    );
    assert!(ratings.items_referenced_by(&[7]).unwrap_err().is_out_of_range());
}

// ============================================================================
// Mutation
// ============================================================================

#[test]
fn test_add_or_update_overwrites_in_place() {
    let mut ratings = sample();
    ratings.by_user();
    let generation = ratings.events().cache().generation();

    let position = ratings.add_or_update(1, 4, 2.0);
    assert_eq!(position, 1);
    assert_eq!(ratings.len(), 3);
    assert_eq!(ratings.get(1, 4).unwrap(), 2.0);
    assert_eq!(ratings.events().cache().generation(), generation);
}

#[test]
fn test_add_or_update_appends_new_pair() {
    let mut ratings = sample();
    let position = ratings.add_or_update(9, 9, 4u8);
    assert_eq!(position, 3);
    assert_eq!(ratings.get(9, 9).unwrap(), 4.0);
}

#[test]
fn test_set_returns_previous() {
    let mut ratings = sample();
    assert_eq!(ratings.set(2, 2.5).unwrap(), 1.0);
    assert_eq!(ratings.value(2).unwrap(), 2.5);
    assert!(ratings.set(3, 1.0).unwrap_err().is_out_of_range());
}

#[test]
fn test_remove_user_then_lookup() {
    let mut ratings = sample();
    assert_eq!(ratings.remove_user(1), 2);
    assert!(ratings.get(1, 2).unwrap_err().is_not_found());
    // The survivor moved to position 0
    assert_eq!(ratings.index_of(3, 2).unwrap(), 0);
    assert_eq!(ratings.values(), &[1.0]);
}

#[test]
fn test_remove_item_through_dataset() {
    let mut ratings = sample();
    assert_eq!(DataSet::remove_item(&mut ratings, 2), 2);
    assert_eq!(ratings.all_users(), vec![1]);
    assert_eq!(ratings.all_items(), vec![4]);
}

// ============================================================================
// Aggregates
// ============================================================================

#[test]
fn test_stats_track_mutation() {
    let mut ratings = sample();
    assert_eq!(ratings.max_rating(), Some(5.0));
    assert_eq!(ratings.min_rating(), Some(1.0));
    assert_eq!(ratings.average(), Some(3.0));

    ratings.add(7, 7, 0.5);
    assert_eq!(ratings.min_rating(), Some(0.5));
    assert_eq!(ratings.stats().count, 4);

    ratings.set(1, 4.0).unwrap();
    assert_eq!(ratings.max_rating(), Some(4.0));

    ratings.remove_item(2);
    assert_eq!(ratings.stats().count, 2);
    assert_eq!(ratings.min_rating(), Some(0.5));
}

#[test]
fn test_empty_stats() {
    let ratings = Ratings::new();
    assert_eq!(ratings.max_rating(), None);
    assert_eq!(ratings.average(), None);
    assert_eq!(ratings.max_user_id(), None);
}

#[test]
fn test_counts() {
    let ratings = sample();
    let by_user = ratings.count_by_user();
    assert_eq!(by_user[&1], 2);
    assert_eq!(by_user[&3], 1);
    let by_item = ratings.count_by_item();
    assert_eq!(by_item[&2], 2);
    assert_eq!(by_item.get(&9), None);
}

// ============================================================================
// Conversions
// ============================================================================

#[test]
fn test_from_event_store() {
    let events: EventStore<f64> = [(0, 1, 2.0), (1, 1, 4.0)].into_iter().collect();
    let ratings = Ratings::from(events);
    assert_eq!(ratings.average(), Some(3.0));

    let back = ratings.into_events();
    assert_eq!(back.values(), &[2.0, 4.0]);
}

#[test]
fn test_extend_clears_stats() {
    let mut ratings = sample();
    assert_eq!(ratings.max_rating(), Some(5.0));
    ratings.extend([(8, 8, 9.0), (8, 9, 0.0)]);
    assert_eq!(ratings.max_rating(), Some(9.0));
    assert_eq!(ratings.min_rating(), Some(0.0));
    assert_eq!(ratings.by_user().get(8), &[3, 4]);
}
