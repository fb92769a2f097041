// Fusion junction of a classified pair: contig breakpoint plus the target
// position and footprint on each side
use crate::alignment::{Alignment, Strand};
use crate::coords::{cut_or_extend_blocks, merge_adjacent_blocks, CoordPair};
use crate::error::CoordError;

use super::AlignmentCategory;

#[derive(Debug, Clone, PartialEq)]
pub struct JunctionSide {
    pub target: String,
    pub strand: Strand,
    /// Target position of the base next to the contig breakpoint.
    pub breakpoint: i64,
    /// Target runs covered by this side, touching blocks merged.
    pub footprint: Vec<CoordPair>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FusionJunction {
    /// Last contig base (forward strand) explained by the upstream side.
    pub contig_breakpoint: i64,
    /// Contig bases claimed by both sides, removed from the downstream side.
    pub overlap: i64,
    pub upstream: JunctionSide,
    pub downstream: JunctionSide,
}

fn total_span(blocks: &[CoordPair]) -> i64 {
    blocks.iter().map(|b| b.span()).sum()
}

/// Derive the junction between two alignments ordered by contig start.
///
/// Nested pairs have no junction. For overlapping pairs the shared contig
/// bases stay with `upstream` and are cut off `downstream`.
pub fn derive_junction(
    upstream: &Alignment,
    downstream: &Alignment,
    category: AlignmentCategory,
) -> Result<Option<FusionJunction>, CoordError> {
    if category.is_contains() {
        return Ok(None);
    }
    let overlap = upstream.query_span()?.overlap_len(&downstream.query_span()?);

    let up_target = upstream.blocks().target();
    let up_breakpoint = match upstream.strand {
        Strand::Forward => up_target.last().map(|b| b.max()),
        Strand::Reverse => up_target.first().map(|b| b.min()),
    };

    // the contig start of a reverse alignment is the right end of its blocks
    let from_left = !downstream.strand.is_forward();
    let down_target = downstream.blocks().target();
    let keep = total_span(down_target) - overlap;
    if keep <= 0 {
        return Ok(None);
    }
    let trimmed = cut_or_extend_blocks(down_target, keep, from_left)?;
    let down_breakpoint = match downstream.strand {
        Strand::Forward => trimmed.first().map(|b| b.min()),
        Strand::Reverse => trimmed.last().map(|b| b.max()),
    };

    let (Some(up_breakpoint), Some(down_breakpoint)) = (up_breakpoint, down_breakpoint) else {
        return Ok(None);
    };

    Ok(Some(FusionJunction {
        contig_breakpoint: upstream.query_end,
        overlap,
        upstream: JunctionSide {
            target: upstream.target.clone(),
            strand: upstream.strand,
            breakpoint: up_breakpoint,
            footprint: merge_adjacent_blocks(up_target)?,
        },
        downstream: JunctionSide {
            target: downstream.target.clone(),
            strand: downstream.strand,
            breakpoint: down_breakpoint,
            footprint: merge_adjacent_blocks(&trimmed)?,
        },
    }))
}
