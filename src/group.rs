use std::{
    cell::RefCell,
    collections::{HashMap, HashSet},
    rc::Rc,
};

use crate::record::{DebugRecord, Keys};

/// Records determined to correlate, in filing order.
///
/// Append paths rely on the input already being timestamp-ordered; only a
/// merge re-sorts, because concatenating two independently ordered
/// sequences would interleave them wrongly.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Group {
    records: Vec<DebugRecord>,
}

impl Group {
    pub fn records(&self) -> &[DebugRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    fn push(&mut self, record: DebugRecord) {
        self.records.push(record);
    }

    /// Hash-side records first, then id-side, stably sorted by timestamp.
    fn merged(hash_side: &Self, id_side: &Self) -> Self {
        let mut records: Vec<_> = hash_side
            .records
            .iter()
            .chain(id_side.records.iter())
            .cloned()
            .collect();
        records.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));
        Self { records }
    }
}

/// A group shared by every index entry that references it; it lives
/// exactly as long as at least one entry does.
pub type SharedGroup = Rc<RefCell<Group>>;

/// The grouping engine. Owns both indices for the duration of the pass,
/// then hands itself to the inspection shell read-only.
#[derive(Debug, Default)]
pub struct Correlator {
    by_hash: HashMap<String, SharedGroup>,
    by_id: HashMap<i64, SharedGroup>,
    records_filed: usize,
}

impl Correlator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Files one record, merging two groups when the record links a hash
    /// key and an id that currently map to distinct groups.
    pub fn file(&mut self, record: DebugRecord) {
        let group = match record.keys.clone() {
            Keys::Hash(hash) => Rc::clone(self.by_hash.entry(hash).or_default()),
            Keys::Id(id) => Rc::clone(self.by_id.entry(id).or_default()),
            Keys::Both { hash, id } => self.link(hash, id),
        };

        group.borrow_mut().push(record);
        self.records_filed += 1;
    }

    /// Resolves the target group for a record carrying both keys.
    ///
    /// A merge builds a new combined group and re-points only the two
    /// keys on the record; any other key that referenced one of the old
    /// groups keeps the old object.
    fn link(&mut self, hash: String, id: i64) -> SharedGroup {
        let hash_group = Rc::clone(self.by_hash.entry(hash.clone()).or_default());
        let id_group = Rc::clone(self.by_id.entry(id).or_insert_with(|| Rc::clone(&hash_group)));

        if Rc::ptr_eq(&hash_group, &id_group) {
            return hash_group;
        }

        let merged = Rc::new(RefCell::new(Group::merged(
            &hash_group.borrow(),
            &id_group.borrow(),
        )));
        self.by_hash.insert(hash, Rc::clone(&merged));
        self.by_id.insert(id, Rc::clone(&merged));
        merged
    }

    pub fn hash_group(&self, hash: &str) -> Option<&SharedGroup> {
        self.by_hash.get(hash)
    }

    pub fn id_group(&self, id: i64) -> Option<&SharedGroup> {
        self.by_id.get(&id)
    }

    pub fn hash_keys(&self) -> Vec<&str> {
        let mut keys: Vec<_> = self.by_hash.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    pub fn id_keys(&self) -> Vec<i64> {
        let mut keys: Vec<_> = self.by_id.keys().copied().collect();
        keys.sort_unstable();
        keys
    }

    pub fn records_filed(&self) -> usize {
        self.records_filed
    }

    /// Number of group objects still reachable through some index entry.
    pub fn distinct_group_count(&self) -> usize {
        let mut seen = HashSet::new();
        self.by_hash
            .values()
            .chain(self.by_id.values())
            .filter(|group| seen.insert(Rc::as_ptr(group)))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Token;

    fn hash_record(timestamp: f64, hash: &str) -> DebugRecord {
        DebugRecord::from_parts(
            timestamp,
            vec![
                Token::Tag("sendLoop".to_owned()),
                Token::HashKey(hash.to_owned()),
            ],
        )
        .unwrap()
    }

    fn id_record(timestamp: f64, id: i64) -> DebugRecord {
        DebugRecord::from_parts(
            timestamp,
            vec![Token::Tag("seqCheck".to_owned()), Token::NumericKey(id)],
        )
        .unwrap()
    }

    fn linked_record(timestamp: f64, hash: &str, id: i64) -> DebugRecord {
        DebugRecord::from_parts(
            timestamp,
            vec![
                Token::Tag("keepConfirming".to_owned()),
                Token::HashKey(hash.to_owned()),
                Token::NumericKey(id),
            ],
        )
        .unwrap()
    }

    fn timestamps(group: &SharedGroup) -> Vec<f64> {
        group.borrow().records().iter().map(|r| r.timestamp).collect()
    }

    #[test]
    fn test_filing_same_hash_twice_grows_one_group() {
        let mut correlator = Correlator::new();
        correlator.file(hash_record(1.0, "shaaaa"));
        correlator.file(hash_record(2.0, "shaaaa"));

        let group = correlator.hash_group("shaaaa").unwrap();
        assert_eq!(group.borrow().len(), 2);
        assert_eq!(correlator.hash_keys(), vec!["shaaaa"]);
        assert!(correlator.id_keys().is_empty());
    }

    #[test]
    fn test_linked_record_unifies_hash_and_id() {
        let mut correlator = Correlator::new();
        correlator.file(hash_record(1.0, "shaaaa"));
        correlator.file(id_record(2.0, 7));
        correlator.file(linked_record(3.0, "shaaaa", 7));

        let by_hash = correlator.hash_group("shaaaa").unwrap();
        let by_id = correlator.id_group(7).unwrap();

        assert!(Rc::ptr_eq(by_hash, by_id));
        assert_eq!(timestamps(by_hash), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_merge_resorts_concatenated_groups() {
        let mut correlator = Correlator::new();
        correlator.file(hash_record(5.0, "shaaaa"));
        correlator.file(id_record(2.0, 7));
        correlator.file(linked_record(8.0, "shaaaa", 7));

        let group = correlator.hash_group("shaaaa").unwrap();
        assert_eq!(timestamps(group), vec![2.0, 5.0, 8.0]);
    }

    #[test]
    fn test_trigger_appends_after_sort() {
        // The combined sequence is sorted before the triggering record is
        // appended, so an early-timestamped trigger still sits last.
        let mut correlator = Correlator::new();
        correlator.file(hash_record(5.0, "shaaaa"));
        correlator.file(id_record(2.0, 7));
        correlator.file(linked_record(1.0, "shaaaa", 7));

        let group = correlator.hash_group("shaaaa").unwrap();
        assert_eq!(timestamps(group), vec![2.0, 5.0, 1.0]);
    }

    #[test]
    fn test_merge_sort_is_stable_for_equal_timestamps() {
        let mut correlator = Correlator::new();
        correlator.file(hash_record(2.0, "shaaaa"));
        correlator.file(id_record(2.0, 7));
        correlator.file(linked_record(9.0, "shaaaa", 7));

        let group = correlator.hash_group("shaaaa").unwrap();
        let group = group.borrow();
        assert!(matches!(group.records()[0].keys, Keys::Hash(_)));
        assert!(matches!(group.records()[1].keys, Keys::Id(7)));
    }

    #[test]
    fn test_append_does_not_disturb_other_mappings() {
        let mut correlator = Correlator::new();
        correlator.file(hash_record(1.0, "shaaaa"));
        correlator.file(id_record(2.0, 7));

        let id_group_before = Rc::clone(correlator.id_group(7).unwrap());
        correlator.file(hash_record(3.0, "shaaaa"));

        assert!(Rc::ptr_eq(&id_group_before, correlator.id_group(7).unwrap()));
        assert_eq!(timestamps(correlator.hash_group("shaaaa").unwrap()), vec![1.0, 3.0]);
        assert_eq!(timestamps(&id_group_before), vec![2.0]);
    }

    #[test]
    fn test_both_new_keys_share_one_group() {
        let mut correlator = Correlator::new();
        correlator.file(linked_record(1.0, "shaaaa", 7));

        let by_hash = correlator.hash_group("shaaaa").unwrap();
        let by_id = correlator.id_group(7).unwrap();

        assert!(Rc::ptr_eq(by_hash, by_id));
        assert_eq!(by_hash.borrow().len(), 1);
        assert_eq!(correlator.distinct_group_count(), 1);
    }

    #[test]
    fn test_new_id_adopts_existing_hash_group() {
        let mut correlator = Correlator::new();
        correlator.file(hash_record(5.0, "shaaaa"));

        let before = Rc::clone(correlator.hash_group("shaaaa").unwrap());
        correlator.file(linked_record(3.0, "shaaaa", 7));

        // No merge happened: the id entry joins the existing group object,
        // and nothing is re-sorted on this path.
        assert!(Rc::ptr_eq(&before, correlator.id_group(7).unwrap()));
        assert_eq!(timestamps(&before), vec![5.0, 3.0]);
    }

    #[test]
    fn test_new_hash_joins_known_id_group() {
        let mut correlator = Correlator::new();
        correlator.file(id_record(2.0, 7));

        let old_id_group = Rc::clone(correlator.id_group(7).unwrap());
        correlator.file(linked_record(4.0, "shaaaa", 7));

        let by_hash = correlator.hash_group("shaaaa").unwrap();
        let by_id = correlator.id_group(7).unwrap();

        assert!(Rc::ptr_eq(by_hash, by_id));
        assert_eq!(timestamps(by_hash), vec![2.0, 4.0]);
        // The id entry was re-pointed at a new combined group.
        assert!(!Rc::ptr_eq(&old_id_group, by_id));
    }

    #[test]
    fn test_repeated_pair_files_without_merging() {
        let mut correlator = Correlator::new();
        correlator.file(linked_record(1.0, "shaaaa", 7));

        let before = Rc::clone(correlator.hash_group("shaaaa").unwrap());
        correlator.file(linked_record(2.0, "shaaaa", 7));

        assert!(Rc::ptr_eq(&before, correlator.hash_group("shaaaa").unwrap()));
        assert_eq!(timestamps(&before), vec![1.0, 2.0]);
    }

    #[test]
    fn test_merge_leaves_third_key_alias_stale() {
        // Documents the deliberate choice to reproduce the source
        // behavior: a merge re-points only the two keys on the triggering
        // record. shbbbb shared a group with id 9, but the merge triggered
        // by shcccc leaves shbbbb on the old, no-longer-indexed object.
        let mut correlator = Correlator::new();
        correlator.file(linked_record(1.0, "shbbbb", 9));
        correlator.file(linked_record(2.0, "shcccc", 9));

        let stale = correlator.hash_group("shbbbb").unwrap();
        let merged = correlator.hash_group("shcccc").unwrap();

        assert!(!Rc::ptr_eq(stale, merged));
        assert!(Rc::ptr_eq(merged, correlator.id_group(9).unwrap()));
        assert_eq!(timestamps(merged), vec![1.0, 2.0]);
        assert_eq!(timestamps(stale), vec![1.0]);

        // Later appends through the live keys never reach the stale alias.
        correlator.file(id_record(3.0, 9));
        assert_eq!(timestamps(correlator.hash_group("shcccc").unwrap()), vec![1.0, 2.0, 3.0]);
        assert_eq!(timestamps(correlator.hash_group("shbbbb").unwrap()), vec![1.0]);
    }

    #[test]
    fn test_id_zero_is_an_ordinary_key() {
        let mut correlator = Correlator::new();
        correlator.file(id_record(1.0, 0));
        correlator.file(linked_record(2.0, "shaaaa", 0));

        let by_id = correlator.id_group(0).unwrap();
        assert!(Rc::ptr_eq(correlator.hash_group("shaaaa").unwrap(), by_id));
        assert_eq!(timestamps(by_id), vec![1.0, 2.0]);
    }

    #[test]
    fn test_counts() {
        let mut correlator = Correlator::new();
        correlator.file(hash_record(1.0, "shaaaa"));
        correlator.file(id_record(2.0, 7));
        correlator.file(linked_record(3.0, "shaaaa", 7));

        assert_eq!(correlator.records_filed(), 3);
        assert_eq!(correlator.hash_keys(), vec!["shaaaa"]);
        assert_eq!(correlator.id_keys(), vec![7]);
        assert_eq!(correlator.distinct_group_count(), 1);
    }
}
