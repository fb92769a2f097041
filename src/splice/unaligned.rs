// Unaligned-stretch correction: pull short unaligned contig pieces into an
// adjacent block when they match the start or end of the target gap
use log::debug;

use super::{splice_site, Side};
use crate::alignment::{Alignment, Blocks};
use crate::error::Error;
use crate::genome::subsequence;

/// Target gaps must exceed the unaligned query piece by at least this much.
const MIN_INTRON_EXCESS: usize = 20;

fn hamming(a: &[u8], b: &[u8]) -> i64 {
    a.iter().zip(b).filter(|(x, y)| x != y).count() as i64
}

/// Extend blocks over unaligned query stretches that sit in a target gap.
///
/// For each gap open on both query and target, the query piece is compared
/// with the first and last bases of the target gap. The end with fewer than
/// `max_diff` differences (and strictly fewer than the other end) absorbs
/// the piece. Differences are added to the mismatch count.
///
/// `aligned_query` is the contig on the aligned strand. Returns the number
/// of stretches absorbed.
pub fn correct_unaligned(
    aln: &mut Alignment,
    target_seq: &[u8],
    aligned_query: &[u8],
    max_diff: i64,
) -> Result<usize, Error> {
    let n = aln.block_count();
    if n < 2 {
        return Ok(0);
    }

    let (mut target, mut query, mut sites) = aln.blocks().clone().into_parts();
    let mut fixed = 0;
    let mut added_mismatch = 0;

    for i in 0..n - 1 {
        if query[i + 1].min() - query[i].max() == 1 || target[i + 1].min() - target[i].max() == 1 {
            continue;
        }
        let qseq = subsequence(aligned_query, query[i].max() + 1, query[i + 1].min() - 1)?;
        let tseq = subsequence(target_seq, target[i].max() + 1, target[i + 1].min() - 1)?;
        let (qlen, tlen) = (qseq.len(), tseq.len());
        if qlen > tlen || tlen - qlen < MIN_INTRON_EXCESS {
            continue;
        }

        let start_diff = hamming(qseq, &tseq[..qlen]);
        let end_diff = hamming(qseq, &tseq[tlen - qlen..]);
        let shift = qlen as i64;
        let (side, diff) = if start_diff < end_diff && start_diff < max_diff {
            target[i].move_max(shift)?;
            query[i].move_max(shift)?;
            (Side::Left, start_diff)
        } else if end_diff < start_diff && end_diff < max_diff {
            target[i + 1].move_min(-shift)?;
            query[i + 1].move_min(-shift)?;
            (Side::Right, end_diff)
        } else {
            continue;
        };

        sites[i] = splice_site(target_seq, target[i].max() + 1, target[i + 1].min() - 1)?;
        debug!(
            "{} absorbed {qlen} unaligned bases into the {side} block on {} ({diff} differences)",
            aln.query, aln.target
        );
        added_mismatch += diff;
        fixed += 1;
    }

    if fixed > 0 {
        aln.replace_blocks(Blocks::with_splice_sites(target, query, sites)?);
        // absorbed bases join the record's realized mismatch count
        aln.mismatch += added_mismatch;
    }
    Ok(fixed)
}
