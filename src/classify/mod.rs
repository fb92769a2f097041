//! Geometric classification of selected alignment pairs.
//!
//! Two alignments of one contig are compared by their contig-space spans:
//! nested, overlapping by a few bases, or separated by a short gap, each on
//! the same or opposite strand. Anything else is not a fusion candidate.

pub mod breakpoint;
pub mod group;

use std::fmt;

use crate::alignment::Alignment;
use crate::coords::CoordPair;
use crate::error::CoordError;

pub use breakpoint::{derive_junction, FusionJunction, JunctionSide};
pub use group::{group_alignments, ContigGroups};

/// Relationship between the two contig spans of an alignment pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AlignmentCategory {
    ContainsSameStrand,
    ContainsDifferentStrand,
    OverlapsSameStrand,
    OverlapsDifferentStrand,
    GapSameStrand,
    GapDifferentStrand,
}

impl AlignmentCategory {
    pub const ALL: [AlignmentCategory; 6] = [
        AlignmentCategory::ContainsSameStrand,
        AlignmentCategory::ContainsDifferentStrand,
        AlignmentCategory::OverlapsSameStrand,
        AlignmentCategory::OverlapsDifferentStrand,
        AlignmentCategory::GapSameStrand,
        AlignmentCategory::GapDifferentStrand,
    ];

    fn contains(same_strand: bool) -> Self {
        if same_strand {
            AlignmentCategory::ContainsSameStrand
        } else {
            AlignmentCategory::ContainsDifferentStrand
        }
    }

    fn overlaps(same_strand: bool) -> Self {
        if same_strand {
            AlignmentCategory::OverlapsSameStrand
        } else {
            AlignmentCategory::OverlapsDifferentStrand
        }
    }

    fn gap(same_strand: bool) -> Self {
        if same_strand {
            AlignmentCategory::GapSameStrand
        } else {
            AlignmentCategory::GapDifferentStrand
        }
    }

    pub fn is_same_strand(self) -> bool {
        matches!(
            self,
            AlignmentCategory::ContainsSameStrand
                | AlignmentCategory::OverlapsSameStrand
                | AlignmentCategory::GapSameStrand
        )
    }

    pub fn is_contains(self) -> bool {
        matches!(
            self,
            AlignmentCategory::ContainsSameStrand | AlignmentCategory::ContainsDifferentStrand
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AlignmentCategory::ContainsSameStrand => "CONTAINS_SAME_STRAND",
            AlignmentCategory::ContainsDifferentStrand => "CONTAINS_DIFFERENT_STRAND",
            AlignmentCategory::OverlapsSameStrand => "OVERLAPS_SAME_STRAND",
            AlignmentCategory::OverlapsDifferentStrand => "OVERLAPS_DIFFERENT_STRAND",
            AlignmentCategory::GapSameStrand => "GAP_SAME_STRAND",
            AlignmentCategory::GapDifferentStrand => "GAP_DIFFERENT_STRAND",
        }
    }
}

impl fmt::Display for AlignmentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Largest overlap and gap (in bases) still accepted as a junction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairThresholds {
    pub max_overlap: i64,
    pub max_gap: i64,
}

impl Default for PairThresholds {
    fn default() -> Self {
        Self {
            max_overlap: 8,
            max_gap: 2,
        }
    }
}

/// Classify two contig intervals; strand agreement comes from `pos_strand`.
pub fn classify_intervals(
    a: &CoordPair,
    b: &CoordPair,
    thresholds: &PairThresholds,
) -> Option<AlignmentCategory> {
    let same_strand = a.pos_strand() == b.pos_strand();
    if a.contains(b) || b.contains(a) {
        Some(AlignmentCategory::contains(same_strand))
    } else if a.overlaps(b) {
        (a.overlap_len(b) <= thresholds.max_overlap).then(|| AlignmentCategory::overlaps(same_strand))
    } else {
        (a.gap_len(b) <= thresholds.max_gap).then(|| AlignmentCategory::gap(same_strand))
    }
}

/// Classify a pair of alignments of the same contig.
pub fn classify_pair(
    a: &Alignment,
    b: &Alignment,
    thresholds: &PairThresholds,
) -> Result<Option<AlignmentCategory>, CoordError> {
    Ok(classify_intervals(&a.query_span()?, &b.query_span()?, thresholds))
}
