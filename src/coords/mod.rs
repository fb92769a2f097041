// Strand-aware closed coordinate intervals and block-list helpers

pub mod blocks;

use std::fmt;
use std::str::FromStr;

pub use crate::error::CoordError;
pub use blocks::{cut_or_extend_blocks, merge_adjacent_blocks};

/// A closed genomic or contig interval with strand orientation.
///
/// `start`/`end` are strand-directional (`start <= end` on the forward
/// strand); `min`/`max` are the strand-independent bounds. Both views are
/// kept in sync by every mutator.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CoordPair {
    start: i64,
    end: i64,
    min: i64,
    max: i64,
    pos_strand: bool,
    name: Option<String>,
}

impl CoordPair {
    /// Build from directional endpoints; the strand is inferred from their order.
    pub fn new(start: i64, end: i64) -> Self {
        let pos_strand = start <= end;
        let mut pair = Self {
            start,
            end,
            min: start.min(end),
            max: start.max(end),
            pos_strand,
            name: None,
        };
        pair.orient();
        pair
    }

    /// Build from strand-independent bounds.
    pub fn from_bounds(min: i64, max: i64, pos_strand: bool) -> Result<Self, CoordError> {
        if max < min {
            return Err(CoordError::InvalidSpan { min, max });
        }
        let mut pair = Self {
            start: min,
            end: max,
            min,
            max,
            pos_strand,
            name: None,
        };
        pair.orient();
        Ok(pair)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn start(&self) -> i64 {
        self.start
    }

    pub fn end(&self) -> i64 {
        self.end
    }

    pub fn min(&self) -> i64 {
        self.min
    }

    pub fn max(&self) -> i64 {
        self.max
    }

    pub fn pos_strand(&self) -> bool {
        self.pos_strand
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn span(&self) -> i64 {
        self.max - self.min + 1
    }

    fn orient(&mut self) {
        if self.pos_strand {
            self.start = self.min;
            self.end = self.max;
        } else {
            self.start = self.max;
            self.end = self.min;
        }
    }

    /// Grow to cover `other`. The strand of `self` is kept.
    pub fn union(&mut self, other: &CoordPair) {
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
        self.orient();
    }

    /// Shrink to the region shared with `other`.
    pub fn intersect(&mut self, other: &CoordPair) -> Result<(), CoordError> {
        let min = self.min.max(other.min);
        let max = self.max.min(other.max);
        if max < min {
            return Err(CoordError::NoIntersection);
        }
        self.min = min;
        self.max = max;
        self.orient();
        Ok(())
    }

    pub fn contains(&self, other: &CoordPair) -> bool {
        self.min <= other.min && self.max >= other.max
    }

    pub fn overlaps(&self, other: &CoordPair) -> bool {
        !(other.max < self.min || self.max < other.min)
    }

    pub fn gap(&self, other: &CoordPair) -> bool {
        !self.overlaps(other)
    }

    /// Number of positions shared with `other` (0 when disjoint).
    pub fn overlap_len(&self, other: &CoordPair) -> i64 {
        (self.max.min(other.max) - self.min.max(other.min) + 1).max(0)
    }

    /// Distance from the end of the lower interval to the start of the
    /// higher one (0 when they overlap).
    pub fn gap_len(&self, other: &CoordPair) -> i64 {
        (self.min.max(other.min) - self.max.min(other.max)).max(0)
    }

    /// The positions strictly between two disjoint intervals, if any.
    pub fn between(&self, other: &CoordPair) -> Option<CoordPair> {
        let lo = self.max.min(other.max) + 1;
        let hi = self.min.max(other.min) - 1;
        CoordPair::from_bounds(lo, hi, self.pos_strand).ok()
    }

    pub fn set_min(&mut self, min: i64) -> Result<(), CoordError> {
        if min > self.max {
            return Err(CoordError::InvalidSpan { min, max: self.max });
        }
        self.min = min;
        self.orient();
        Ok(())
    }

    pub fn set_max(&mut self, max: i64) -> Result<(), CoordError> {
        if max < self.min {
            return Err(CoordError::InvalidSpan { min: self.min, max });
        }
        self.max = max;
        self.orient();
        Ok(())
    }

    pub fn move_min(&mut self, delta: i64) -> Result<(), CoordError> {
        self.set_min(self.min + delta)
    }

    pub fn move_max(&mut self, delta: i64) -> Result<(), CoordError> {
        self.set_max(self.max + delta)
    }
}

impl fmt::Display for CoordPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

impl FromStr for CoordPair {
    type Err = String;

    /// Parses `start-end`, e.g. `10-50` or `50-10` for the reverse strand.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (start, end) = s
            .split_once('-')
            .ok_or_else(|| format!("invalid interval '{s}'; expected 'start-end'"))?;
        let start = start
            .trim()
            .parse::<i64>()
            .map_err(|e| format!("invalid interval start in '{s}': {e}"))?;
        let end = end
            .trim()
            .parse::<i64>()
            .map_err(|e| format!("invalid interval end in '{s}': {e}"))?;
        Ok(CoordPair::new(start, end))
    }
}
