//! Survey scoring and per-country aggregation.
//!
//! Each respondent's religiosity answer decides their group, two attitude
//! answers are mapped onto [-1, 1] scores, and scores are averaged per
//! country and group.

pub mod aggregate;
pub mod analyzer;
pub mod classifier;
pub mod mappers;
pub mod types;
pub mod utility;
