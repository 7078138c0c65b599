use std::collections::{BTreeMap, BTreeSet};

use crate::{AssetRecord, MatchedPair};

/// Selects which Stein asset groups take part in availability sync.
///
/// Stein tracks trailers, equipment and other assets next to vehicles; only
/// the configured groups are matched against Divera.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupFilter {
    group_ids: BTreeSet<i64>,
}

impl GroupFilter {
    pub fn new(group_ids: impl IntoIterator<Item = i64>) -> Self {
        Self {
            group_ids: group_ids.into_iter().collect(),
        }
    }

    /// Records without a group never pass.
    pub fn accepts(&self, record: &AssetRecord) -> bool {
        record
            .group_id
            .map(|g| self.group_ids.contains(&g))
            .unwrap_or(false)
    }
}

impl Default for GroupFilter {
    /// Stein groups 1 and 5 (vehicles).
    fn default() -> Self {
        Self::new([1, 5])
    }
}

/// Key a snapshot by `match_key`. Duplicate keys: the last record seen wins.
fn keyed<I>(records: I) -> BTreeMap<String, AssetRecord>
where
    I: IntoIterator<Item = AssetRecord>,
{
    let mut out = BTreeMap::new();
    for r in records {
        if r.match_key.is_empty() {
            continue;
        }
        out.insert(r.match_key.clone(), r);
    }
    out
}

/// Join both snapshots on `match_key`.
///
/// - Empty keys are dropped on both sides.
/// - The right side is additionally filtered with `right_filter`.
/// - Keys present on only one side produce nothing.
/// - Output is ordered by `match_key`.
pub fn match_assets<F>(
    left: Vec<AssetRecord>,
    right: Vec<AssetRecord>,
    right_filter: F,
) -> Vec<MatchedPair>
where
    F: Fn(&AssetRecord) -> bool,
{
    let mut left = keyed(left);
    let right = keyed(right.into_iter().filter(|r| right_filter(r)));

    right
        .into_iter()
        .filter_map(|(key, right)| {
            left.remove(&key).map(|left| MatchedPair { left, right })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{NativeStatus, RawTimestamp};

    fn divera(key: &str, id: &str) -> AssetRecord {
        AssetRecord::new(key, NativeStatus::Divera(2), None, RawTimestamp::EpochSeconds(1), id)
    }

    fn stein(key: &str, id: &str, group: i64) -> AssetRecord {
        AssetRecord::new(
            key,
            NativeStatus::Stein("ready".into()),
            None,
            RawTimestamp::Iso8601("2022-10-18T13:36:04+02:00".into()),
            id,
        )
        .with_group_id(group)
    }

    #[test]
    fn default_filter_is_vehicle_groups() {
        let f = GroupFilter::default();
        assert!(f.accepts(&stein("A", "1", 1)));
        assert!(f.accepts(&stein("A", "1", 5)));
        assert!(!f.accepts(&stein("A", "1", 2)));
        assert!(!f.accepts(&divera("A", "1")));
    }

    #[test]
    fn last_seen_wins_on_duplicate_keys() {
        let map = keyed(vec![divera("X", "first"), divera("X", "second")]);
        assert_eq!(map.len(), 1);
        assert_eq!(map["X"].source_id, "second");
    }

    #[test]
    fn output_is_sorted_by_key() {
        let left = vec![divera("C", "l3"), divera("A", "l1"), divera("B", "l2")];
        let right = vec![stein("B", "r2", 1), stein("C", "r3", 1), stein("A", "r1", 5)];
        let keys: Vec<String> = match_assets(left, right, |_| true)
            .iter()
            .map(|p| p.match_key().to_string())
            .collect();
        assert_eq!(keys, vec!["A", "B", "C"]);
    }
}
