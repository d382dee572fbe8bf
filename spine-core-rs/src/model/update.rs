//! List reconciliation and selective field clearing
//!
//! Incoming SPINE data is always a delta against what is already cached:
//! - records carrying an identifier merge into the record with that identifier
//! - records without an identifier are broadcast onto every cached record
//! - unknown identifiers are appended
//!
//! Fields that are absent in an incoming record never erase cached values.
//! Clearing individual fields is expressed separately with a [`FieldMask`].

use std::collections::BTreeSet;
use std::fmt::Debug;

use tracing::debug;

/// Field-wise merge of a record
pub trait Merge {
    /// Copy every present field of `incoming` onto `self`
    fn merge_from(&mut self, incoming: &Self);
}

/// A list record that can take part in list reconciliation
pub trait UpdateItem: Merge + Clone {
    /// Identifier value type, compared by value
    type Key: PartialEq + Debug;

    /// Identifier of this record, `None` when unset
    fn key(&self) -> Option<Self::Key>;
}

/// Restricts which cached records an update or delete may touch
pub trait Selector<T> {
    fn matches(&self, item: &T) -> bool;
}

impl<T, F> Selector<T> for F
where
    F: Fn(&T) -> bool,
{
    fn matches(&self, item: &T) -> bool {
        self(item)
    }
}

/// Merge `incoming` into a copy of `existing` and return the result.
///
/// A broadcast record applies to the whole list, so records appended later in
/// the same delta also receive the broadcasts that preceded them. Applying the
/// same delta twice therefore yields the same list as applying it once.
///
/// With a `delete_selector`, cached records matching it are dropped before the
/// merge. With an `update_selector`, only matching records may be merged into;
/// a keyed record whose counterpart is not eligible is skipped so identifiers
/// stay unique.
pub fn update_list<T: UpdateItem>(
    existing: &[T],
    incoming: &[T],
    update_selector: Option<&dyn Selector<T>>,
    delete_selector: Option<&dyn Selector<T>>,
) -> Vec<T> {
    let mut result: Vec<T> = match delete_selector {
        Some(selector) => existing
            .iter()
            .filter(|item| !selector.matches(item))
            .cloned()
            .collect(),
        None => existing.to_vec(),
    };

    let eligible = |item: &T| update_selector.map_or(true, |s| s.matches(item));
    let mut broadcasts: Vec<&T> = Vec::new();

    for item in incoming {
        match item.key() {
            None => {
                for target in result.iter_mut().filter(|t| eligible(&**t)) {
                    target.merge_from(item);
                }
                broadcasts.push(item);
            }
            Some(key) => match result.iter_mut().find(|t| t.key().as_ref() == Some(&key)) {
                Some(target) if eligible(&*target) => target.merge_from(item),
                Some(_) => {
                    debug!("Skipping update for {:?}: not selected", key);
                }
                None => {
                    let mut record = item.clone();
                    if eligible(item) && !broadcasts.is_empty() {
                        for broadcast in &broadcasts {
                            record.merge_from(broadcast);
                        }
                        record.merge_from(item);
                    }
                    result.push(record);
                }
            },
        }
    }

    result
}

/// A record whose fields can be cleared one by one
pub trait Clearable {
    /// Schema of clearable fields
    type Field: Copy + Ord + Debug;

    /// Reset `field` to its absent value
    fn clear_field(&mut self, field: Self::Field);
}

/// Set of fields to clear on a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMask<F: Ord> {
    fields: BTreeSet<F>,
}

impl<F: Copy + Ord> FieldMask<F> {
    pub fn new() -> Self {
        Self {
            fields: BTreeSet::new(),
        }
    }

    pub fn with(mut self, field: F) -> Self {
        self.fields.insert(field);
        self
    }

    pub fn insert(&mut self, field: F) {
        self.fields.insert(field);
    }

    pub fn contains(&self, field: F) -> bool {
        self.fields.contains(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = F> + '_ {
        self.fields.iter().copied()
    }
}

impl<F: Copy + Ord> Default for FieldMask<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: Copy + Ord> FromIterator<F> for FieldMask<F> {
    fn from_iter<I: IntoIterator<Item = F>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

/// Clear every field named by `mask` on `item`
pub fn remove_element_from_item<T: Clearable>(item: &mut T, mask: &FieldMask<T::Field>) {
    for field in mask.iter() {
        item.clear_field(field);
    }
}

/// Copy each listed `Option` field from `$src` to `$dst` when it is set
#[macro_export]
macro_rules! merge_present {
    ($dst:expr, $src:expr; $($field:ident),+ $(,)?) => {
        $(
            if $src.$field.is_some() {
                $dst.$field = $src.$field.clone();
            }
        )+
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Default)]
    struct TestUpdateData {
        id: Option<u32>,
        data_item: Option<i32>,
        label: Option<String>,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
    enum TestField {
        DataItem,
        Label,
    }

    impl Merge for TestUpdateData {
        fn merge_from(&mut self, incoming: &Self) {
            merge_present!(self, incoming; id, data_item, label);
        }
    }

    impl UpdateItem for TestUpdateData {
        type Key = u32;

        fn key(&self) -> Option<u32> {
            self.id
        }
    }

    impl Clearable for TestUpdateData {
        type Field = TestField;

        fn clear_field(&mut self, field: TestField) {
            match field {
                TestField::DataItem => self.data_item = None,
                TestField::Label => self.label = None,
            }
        }
    }

    fn item(id: Option<u32>, data_item: i32) -> TestUpdateData {
        TestUpdateData {
            id,
            data_item: Some(data_item),
            label: None,
        }
    }

    #[test]
    fn test_update_list_new_item() {
        let existing = vec![item(Some(1), 1)];
        let incoming = vec![item(Some(2), 2)];

        let result = update_list(&existing, &incoming, None, None);
        assert_eq!(result, vec![item(Some(1), 1), item(Some(2), 2)]);
    }

    #[test]
    fn test_update_list_changed_item() {
        let existing = vec![item(Some(1), 1)];
        let incoming = vec![item(Some(1), 2)];

        let result = update_list(&existing, &incoming, None, None);
        assert_eq!(result, vec![item(Some(1), 2)]);
    }

    #[test]
    fn test_update_list_new_and_changed_item() {
        let existing = vec![item(Some(1), 1)];
        let incoming = vec![item(Some(1), 2), item(Some(3), 3)];

        let result = update_list(&existing, &incoming, None, None);
        assert_eq!(result, vec![item(Some(1), 2), item(Some(3), 3)]);
    }

    #[test]
    fn test_update_list_item_without_identifier() {
        let existing = vec![item(Some(1), 1), item(Some(2), 2)];
        let incoming = vec![item(None, 3)];

        let result = update_list(&existing, &incoming, None, None);
        assert_eq!(result, vec![item(Some(1), 3), item(Some(2), 3)]);
    }

    #[test]
    fn test_update_list_broadcast_reaches_appended_items() {
        let existing = vec![item(Some(1), 1)];
        let broadcast = TestUpdateData {
            id: None,
            data_item: None,
            label: Some("all".to_string()),
        };
        let incoming = vec![broadcast, item(Some(2), 2)];

        let once = update_list(&existing, &incoming, None, None);
        assert_eq!(once[1].label.as_deref(), Some("all"));
        assert_eq!(once[1].data_item, Some(2));
        assert_eq!(update_list(&once, &incoming, None, None), once);
    }

    #[test]
    fn test_update_list_absent_fields_keep_values() {
        let mut cached = item(Some(1), 1);
        cached.label = Some("keep".to_string());
        let incoming = TestUpdateData {
            id: Some(1),
            data_item: None,
            label: None,
        };

        let result = update_list(&[cached.clone()], &[incoming.clone()], None, None);
        assert_eq!(result, vec![cached]);
        assert_eq!(incoming.data_item, None);
    }

    #[test]
    fn test_update_list_duplicate_identifier_last_wins() {
        let incoming = vec![item(Some(5), 1), item(Some(5), 2)];

        let result = update_list(&[], &incoming, None, None);
        assert_eq!(result, vec![item(Some(5), 2)]);
    }

    #[test]
    fn test_update_list_update_selector() {
        let existing = vec![item(Some(1), 1), item(Some(2), 2)];
        let incoming = vec![item(None, 3)];
        let only_first = |i: &TestUpdateData| i.id == Some(1);

        let result = update_list(&existing, &incoming, Some(&only_first as &dyn Selector<TestUpdateData>), None);
        assert_eq!(result, vec![item(Some(1), 3), item(Some(2), 2)]);
    }

    #[test]
    fn test_update_list_delete_selector() {
        let existing = vec![item(Some(1), 1), item(Some(2), 2)];
        let only_first = |i: &TestUpdateData| i.id == Some(1);

        let result = update_list(&existing, &[], None, Some(&only_first as &dyn Selector<TestUpdateData>));
        assert_eq!(result, vec![item(Some(2), 2)]);
    }

    #[test]
    fn test_update_list_keyed_item_outside_update_selector() {
        let existing = vec![item(Some(1), 1), item(Some(2), 2)];
        let incoming = vec![item(Some(2), 20)];
        let only_first = |i: &TestUpdateData| i.id == Some(1);

        let result = update_list(&existing, &incoming, Some(&only_first as &dyn Selector<TestUpdateData>), None);
        assert_eq!(result, existing);
        assert_eq!(result.iter().filter(|i| i.id == Some(2)).count(), 1);
    }

    #[test]
    fn test_update_list_delete_then_append() {
        let existing = vec![item(Some(1), 1), item(Some(2), 2)];
        let incoming = vec![item(Some(1), 10), item(Some(3), 3)];
        let only_first = |i: &TestUpdateData| i.id == Some(1);

        let result = update_list(&existing, &incoming, None, Some(&only_first as &dyn Selector<TestUpdateData>));
        // the dropped record comes back from the delta as a fresh one
        assert_eq!(result, vec![item(Some(2), 2), item(Some(1), 10), item(Some(3), 3)]);
    }

    #[test]
    fn test_remove_element_from_item() {
        let mut record = TestUpdateData {
            id: Some(1),
            data_item: Some(7),
            label: Some("limit".to_string()),
        };
        let mask = FieldMask::new().with(TestField::DataItem);

        remove_element_from_item(&mut record, &mask);
        assert_eq!(record.data_item, None);
        assert_eq!(record.label.as_deref(), Some("limit"));
        assert_eq!(record.id, Some(1));

        let once = record.clone();
        remove_element_from_item(&mut record, &mask);
        assert_eq!(record, once);

        remove_element_from_item(&mut record, &mask.with(TestField::Label));
        assert_eq!(record.label, None);
        assert_eq!(record.id, Some(1));
    }
}
