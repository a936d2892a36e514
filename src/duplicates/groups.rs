//! Row patterns and pattern grouping.
//!
//! # Overview
//!
//! A [`Pattern`] is the tuple of values a row holds at the key columns. Rows
//! with equal patterns are duplicates of each other, whatever they hold in
//! the remaining columns.
//!
//! Grouping is a single pass: every pattern seen for the first time opens a
//! new [`PatternGroup`], and each repeat appends its row index. Groups keep
//! first-encountered order and each group keeps its row indices in original
//! row order, so classification (duplicate vs single) is only decided once
//! the pass is complete and counts are final.
//!
//! # Example
//!
//! ```
//! use rowdupe::duplicates::{group_by_pattern, NullEquality, Pattern};
//! use rowdupe::table::Value;
//!
//! let patterns = vec![
//!     Pattern::new(vec![Value::Int(1), Value::Int(2)]),
//!     Pattern::new(vec![Value::Int(1), Value::Int(2)]),
//!     Pattern::new(vec![Value::Int(3), Value::Int(4)]),
//! ];
//!
//! let (groups, stats) = group_by_pattern(patterns, NullEquality::Equal);
//!
//! assert_eq!(stats.total_rows, 3);
//! assert_eq!(stats.duplicate_patterns, 1);
//! assert_eq!(groups.count_of(&Pattern::new(vec![Value::Int(1), Value::Int(2)])), Some(2));
//! ```

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::table::Value;

/// How null values take part in pattern equality.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NullEquality {
    /// Two nulls in the same column are equal (dataframe-style duplicate detection).
    #[default]
    Equal,
    /// A row holding a null in any key column never matches another row.
    Distinct,
}

/// The key-column values of one row.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pattern(Vec<Value>);

impl Pattern {
    /// Create a pattern from values.
    #[must_use]
    pub fn new(values: Vec<Value>) -> Self {
        Self(values)
    }

    /// Build the pattern of `row` restricted to the columns at `key_columns`.
    #[must_use]
    pub fn from_row(row: &[Value], key_columns: &[usize]) -> Self {
        Self(key_columns.iter().map(|&col| row[col].clone()).collect())
    }

    /// Values in key-column order.
    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.0
    }

    /// Number of values in the pattern.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the pattern has no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Check if any value is null.
    #[must_use]
    pub fn has_null(&self) -> bool {
        self.0.iter().any(Value::is_null)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, value) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", value)?;
        }
        if self.0.len() == 1 {
            write!(f, ",")?;
        }
        write!(f, ")")
    }
}

impl Serialize for Pattern {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

/// All rows sharing one pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternGroup {
    /// The shared key-column values
    pub pattern: Pattern,
    /// Row indices holding this pattern, in original row order
    pub rows: Vec<usize>,
}

impl PatternGroup {
    /// Create a group seen first at `row`.
    #[must_use]
    pub fn new(pattern: Pattern, row: usize) -> Self {
        Self {
            pattern,
            rows: vec![row],
        }
    }

    /// Total number of rows with this pattern.
    #[must_use]
    pub fn count(&self) -> usize {
        self.rows.len()
    }

    /// Check if the pattern occurs two or more times.
    #[must_use]
    pub fn is_duplicate(&self) -> bool {
        self.rows.len() > 1
    }

    /// Index of the first row with this pattern.
    #[must_use]
    pub fn first_row(&self) -> usize {
        self.rows[0]
    }

    /// The first `cap` row indices, in original order.
    #[must_use]
    pub fn exemplars(&self, cap: usize) -> &[usize] {
        &self.rows[..cap.min(self.rows.len())]
    }

    /// Number of rows left out when keeping at most `cap`.
    #[must_use]
    pub fn omitted(&self, cap: usize) -> usize {
        self.rows.len().saturating_sub(cap)
    }
}

/// Statistics from the grouping pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GroupingStats {
    /// Total number of rows grouped
    pub total_rows: usize,
    /// Number of distinct patterns (duplicate and single)
    pub distinct_patterns: usize,
    /// Number of patterns occurring 2+ times
    pub duplicate_patterns: usize,
    /// Number of rows whose pattern occurs 2+ times (uncapped)
    pub duplicate_rows: usize,
    /// Number of rows whose pattern occurs once
    pub single_rows: usize,
    /// Rows kept apart because they hold a null under [`NullEquality::Distinct`]
    pub null_isolated_rows: usize,
}

impl GroupingStats {
    /// Percentage of rows that belong to a duplicate pattern.
    #[must_use]
    pub fn duplicate_rate(&self) -> f64 {
        if self.total_rows == 0 {
            0.0
        } else {
            (self.duplicate_rows as f64 / self.total_rows as f64) * 100.0
        }
    }
}

/// Pattern groups in first-encountered order, with lookup by pattern.
#[derive(Debug, Clone, Default)]
pub struct PatternGroups {
    groups: Vec<PatternGroup>,
    lookup: HashMap<Pattern, usize>,
}

impl PatternGroups {
    /// Group for `pattern`, if it was seen.
    ///
    /// Patterns holding a null under [`NullEquality::Distinct`] are not
    /// addressable here since each such row forms its own group, so this and
    /// [`count_of`](Self::count_of) return `None` for them.
    #[must_use]
    pub fn get(&self, pattern: &Pattern) -> Option<&PatternGroup> {
        self.lookup.get(pattern).map(|&slot| &self.groups[slot])
    }

    /// Total occurrence count of `pattern`.
    #[must_use]
    pub fn count_of(&self, pattern: &Pattern) -> Option<usize> {
        self.get(pattern).map(PatternGroup::count)
    }

    /// All groups in first-encountered order.
    pub fn iter(&self) -> impl Iterator<Item = &PatternGroup> {
        self.groups.iter()
    }

    /// Groups occurring 2+ times, in first-encountered order.
    pub fn duplicates(&self) -> impl Iterator<Item = &PatternGroup> {
        self.groups.iter().filter(|g| g.is_duplicate())
    }

    /// Groups occurring once, in original row order.
    pub fn singles(&self) -> impl Iterator<Item = &PatternGroup> {
        self.groups.iter().filter(|g| !g.is_duplicate())
    }

    /// Number of distinct groups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Check if no rows were grouped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Incremental pattern grouper.
///
/// Rows must be pushed in increasing index order; that is what keeps each
/// group's indices (and the group order itself) aligned with the table.
#[derive(Debug, Default)]
pub struct PatternGrouper {
    groups: PatternGroups,
    nulls: NullEquality,
    next_row: usize,
    null_isolated: usize,
}

impl PatternGrouper {
    /// Create an empty grouper.
    #[must_use]
    pub fn new(nulls: NullEquality) -> Self {
        Self {
            nulls,
            ..Self::default()
        }
    }

    /// Record the pattern of the next row and return its running count.
    pub fn push(&mut self, pattern: Pattern) -> usize {
        let row = self.next_row;
        self.next_row += 1;

        if self.nulls == NullEquality::Distinct && pattern.has_null() {
            self.null_isolated += 1;
            self.groups.groups.push(PatternGroup::new(pattern, row));
            return 1;
        }

        match self.groups.lookup.get(&pattern) {
            Some(&slot) => {
                let group = &mut self.groups.groups[slot];
                group.rows.push(row);
                group.count()
            }
            None => {
                let slot = self.groups.groups.len();
                self.groups
                    .groups
                    .push(PatternGroup::new(pattern.clone(), row));
                self.groups.lookup.insert(pattern, slot);
                1
            }
        }
    }

    /// Number of rows pushed so far.
    #[must_use]
    pub fn rows_seen(&self) -> usize {
        self.next_row
    }

    /// Finish grouping and compute statistics from the final counts.
    #[must_use]
    pub fn finish(self) -> (PatternGroups, GroupingStats) {
        let mut stats = GroupingStats {
            total_rows: self.next_row,
            distinct_patterns: self.groups.len(),
            null_isolated_rows: self.null_isolated,
            ..Default::default()
        };

        for group in self.groups.iter() {
            if group.is_duplicate() {
                stats.duplicate_patterns += 1;
                stats.duplicate_rows += group.count();
                log::trace!(
                    "Pattern {} occurs {} times (first at row {})",
                    group.pattern,
                    group.count(),
                    group.first_row()
                );
            } else {
                stats.single_rows += 1;
            }
        }

        log::debug!(
            "Grouping complete: {} rows -> {} patterns ({} duplicate, {:.1}% of rows duplicated)",
            stats.total_rows,
            stats.distinct_patterns,
            stats.duplicate_patterns,
            stats.duplicate_rate()
        );

        (self.groups, stats)
    }
}

/// Group row patterns given in row order.
///
/// # Arguments
///
/// * `patterns` - One pattern per row, in original row order
/// * `nulls` - How nulls take part in equality
///
/// # Returns
///
/// A tuple of:
/// - `PatternGroups` - Every pattern (duplicate and single) with its row indices
/// - `GroupingStats` - Statistics about the grouping
///
/// # Performance
///
/// - Time complexity: O(n) hash lookups where n is the number of rows
/// - Space complexity: O(n) for row indices plus one key per distinct pattern
#[must_use]
pub fn group_by_pattern(
    patterns: impl IntoIterator<Item = Pattern>,
    nulls: NullEquality,
) -> (PatternGroups, GroupingStats) {
    let mut grouper = PatternGrouper::new(nulls);
    for pattern in patterns {
        grouper.push(pattern);
    }
    grouper.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pat(values: &[i64]) -> Pattern {
        Pattern::new(values.iter().map(|&v| Value::Int(v)).collect())
    }

    #[test]
    fn test_pattern_from_row_selects_columns() {
        let row = vec![Value::Int(1), Value::Text("x".into()), Value::Int(3)];
        let pattern = Pattern::from_row(&row, &[2, 0]);
        assert_eq!(pattern.values(), &[Value::Int(3), Value::Int(1)]);
    }

    #[test]
    fn test_pattern_display() {
        assert_eq!(pat(&[1, 2]).to_string(), "(1, 2)");
        assert_eq!(pat(&[7]).to_string(), "(7,)");
        let mixed = Pattern::new(vec![Value::Text("a".into()), Value::Null]);
        assert_eq!(mixed.to_string(), "('a', NaN)");
    }

    #[test]
    fn test_pattern_group_exemplars() {
        let mut group = PatternGroup::new(pat(&[1]), 4);
        group.rows.extend([6, 9, 12]);

        assert_eq!(group.count(), 4);
        assert!(group.is_duplicate());
        assert_eq!(group.first_row(), 4);
        assert_eq!(group.exemplars(2), &[4, 6]);
        assert_eq!(group.exemplars(10), &[4, 6, 9, 12]);
        assert_eq!(group.omitted(2), 2);
        assert_eq!(group.omitted(10), 0);
    }

    #[test]
    fn test_group_by_pattern_empty_input() {
        let (groups, stats) = group_by_pattern(Vec::new(), NullEquality::Equal);
        assert!(groups.is_empty());
        assert_eq!(stats, GroupingStats::default());
        assert_eq!(stats.duplicate_rate(), 0.0);
    }

    #[test]
    fn test_group_by_pattern_counts_and_order() {
        let patterns = vec![pat(&[2]), pat(&[1]), pat(&[2]), pat(&[3]), pat(&[1]), pat(&[2])];
        let (groups, stats) = group_by_pattern(patterns, NullEquality::Equal);

        let order: Vec<&Pattern> = groups.iter().map(|g| &g.pattern).collect();
        assert_eq!(order, vec![&pat(&[2]), &pat(&[1]), &pat(&[3])]);

        assert_eq!(groups.get(&pat(&[2])).unwrap().rows, vec![0, 2, 5]);
        assert_eq!(groups.get(&pat(&[1])).unwrap().rows, vec![1, 4]);
        assert_eq!(groups.count_of(&pat(&[3])), Some(1));
        assert_eq!(groups.count_of(&pat(&[9])), None);

        assert_eq!(stats.total_rows, 6);
        assert_eq!(stats.distinct_patterns, 3);
        assert_eq!(stats.duplicate_patterns, 2);
        assert_eq!(stats.duplicate_rows, 5);
        assert_eq!(stats.single_rows, 1);
    }

    #[test]
    fn test_singles_follow_row_order() {
        let patterns = vec![pat(&[5]), pat(&[1]), pat(&[4]), pat(&[1]), pat(&[3])];
        let (groups, _) = group_by_pattern(patterns, NullEquality::Equal);
        let singles: Vec<usize> = groups.singles().map(|g| g.first_row()).collect();
        assert_eq!(singles, vec![0, 2, 4]);
    }

    #[test]
    fn test_grouper_running_count() {
        let mut grouper = PatternGrouper::new(NullEquality::Equal);
        assert_eq!(grouper.push(pat(&[1])), 1);
        assert_eq!(grouper.push(pat(&[1])), 2);
        assert_eq!(grouper.push(pat(&[2])), 1);
        assert_eq!(grouper.push(pat(&[1])), 3);
        assert_eq!(grouper.rows_seen(), 4);
    }

    #[test]
    fn test_nulls_equal_groups_null_rows() {
        let patterns = vec![
            Pattern::new(vec![Value::Null]),
            Pattern::new(vec![Value::Null]),
        ];
        let (groups, stats) = group_by_pattern(patterns, NullEquality::Equal);
        assert_eq!(groups.count_of(&Pattern::new(vec![Value::Null])), Some(2));
        assert_eq!(stats.duplicate_patterns, 1);
        assert_eq!(stats.null_isolated_rows, 0);
    }

    #[test]
    fn test_nulls_distinct_isolates_null_rows() {
        let patterns = vec![
            Pattern::new(vec![Value::Null, Value::Int(1)]),
            Pattern::new(vec![Value::Null, Value::Int(1)]),
            Pattern::new(vec![Value::Int(2), Value::Int(1)]),
            Pattern::new(vec![Value::Int(2), Value::Int(1)]),
        ];
        let (groups, stats) = group_by_pattern(patterns, NullEquality::Distinct);

        assert_eq!(groups.len(), 3);
        assert_eq!(stats.single_rows, 2);
        assert_eq!(stats.duplicate_patterns, 1);
        assert_eq!(stats.null_isolated_rows, 2);
        assert_eq!(
            groups.count_of(&Pattern::new(vec![Value::Int(2), Value::Int(1)])),
            Some(2)
        );
        assert_eq!(
            groups.count_of(&Pattern::new(vec![Value::Null, Value::Int(1)])),
            None
        );
    }

    #[test]
    fn test_large_row_count_performance() {
        use std::time::Instant;

        let patterns: Vec<Pattern> = (0..100_000)
            .map(|i| {
                // roughly half unique, half in groups of 100
                let key = if i % 2 == 0 { i } else { i / 100 + 1_000_000 };
                pat(&[key])
            })
            .collect();

        let start = Instant::now();
        let (groups, stats) = group_by_pattern(patterns, NullEquality::Equal);
        let elapsed = start.elapsed();

        assert_eq!(stats.total_rows, 100_000);
        assert!(groups.duplicates().count() > 0);
        assert!(
            elapsed.as_secs() < 2,
            "Grouping took too long: {:?}",
            elapsed
        );
    }
}
