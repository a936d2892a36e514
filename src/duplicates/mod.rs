//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Row pattern extraction and grouping ([`groups`])
//! - Capped exemplar selection and `duplicate_count` annotation ([`finder`])

pub mod finder;
pub mod groups;

pub use finder::{
    analyze, AnalysisStats, AnalyzerConfig, AnalyzerError, AnnotatedRow, AnnotatedTable,
    DuplicateAnalysis, DuplicateAnalyzer, DEFAULT_MAX_DUPLICATES, DEFAULT_PARALLEL_THRESHOLD,
    DUPLICATE_COUNT_COLUMN,
};
pub use groups::{
    group_by_pattern, GroupingStats, NullEquality, Pattern, PatternGroup, PatternGrouper,
    PatternGroups,
};
