// Neighbor-gap correction: fold a tiny middle block into one of its neighbors
use std::collections::BTreeSet;

use log::debug;

use super::single::fix_single_gap;
use super::{correctable_gaps, splice_site, Side, SpliceMotifs};
use crate::alignment::{Alignment, Blocks};
use crate::coords::CoordPair;
use crate::error::Error;

/// Middle blocks longer than this are real exons.
const MAX_MIDDLE_BLOCK: i64 = 10;
const NEAR_GAP: i64 = 10;
const FAR_GAP: i64 = 20;

/// Outer block pairs after a middle block was absorbed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NeighborFix {
    pub t1: CoordPair,
    pub t3: CoordPair,
    pub q1: CoordPair,
    pub q3: CoordPair,
    pub site: String,
    pub side: Side,
}

/// Fold block 2 into whichever neighbor it nearly touches.
///
/// The middle block must be at most 10 bases, within 10 bases of one
/// neighbor and more than 20 from the other. The merged gap must then sit
/// on a motif, either directly or after a single-gap shift. Inputs are
/// never modified.
#[allow(clippy::too_many_arguments)]
pub fn fix_neighbor_gaps(
    t1: &CoordPair,
    t2: &CoordPair,
    t3: &CoordPair,
    q1: &CoordPair,
    q2: &CoordPair,
    q3: &CoordPair,
    motifs: &SpliceMotifs,
    target_seq: &[u8],
) -> Result<Option<NeighborFix>, Error> {
    let middle = t2.span();
    if middle > MAX_MIDDLE_BLOCK {
        return Ok(None);
    }
    let gap1 = t2.min() - t1.max() - 1;
    let gap2 = t3.min() - t2.max() - 1;

    let (mut t1, mut t3, mut q1, mut q3) = (t1.clone(), t3.clone(), q1.clone(), q3.clone());
    let side = if gap1 < NEAR_GAP && gap2 > FAR_GAP {
        t3.move_min(-middle)?;
        q3.set_min(q2.min())?;
        Side::Right
    } else if gap2 < NEAR_GAP && gap1 > FAR_GAP {
        t1.move_max(middle)?;
        q1.set_max(q2.max())?;
        Side::Left
    } else {
        return Ok(None);
    };

    let site = splice_site(target_seq, t1.max() + 1, t3.min() - 1)?;
    if motifs.matches(site.as_bytes()) {
        return Ok(Some(NeighborFix { t1, t3, q1, q3, site, side }));
    }
    Ok(fix_single_gap(&mut t1, &mut t3, &mut q1, &mut q3, motifs, target_seq)?
        .map(|site| NeighborFix { t1, t3, q1, q3, site, side }))
}

/// Apply [`fix_neighbor_gaps`] left to right over adjacent correctable gaps.
///
/// Each success removes the middle block and its trailing splice site; a
/// consumed gap is never reused. Returns the number of blocks removed.
pub fn correct_neighbor_gaps(
    aln: &mut Alignment,
    motifs: &SpliceMotifs,
    target_seq: &[u8],
) -> Result<usize, Error> {
    let n = aln.block_count();
    if n < 3 {
        return Ok(0);
    }
    let mut available: BTreeSet<usize> = correctable_gaps(aln.blocks(), motifs).into_iter().collect();
    if available.len() < 2 {
        return Ok(0);
    }

    let (mut target, mut query, mut sites) = aln.blocks().clone().into_parts();
    let mut removed = vec![false; n];
    let mut fixed = 0;

    for i in 0..n - 2 {
        if !(available.contains(&i) && available.contains(&(i + 1))) {
            continue;
        }
        let Some(fix) = fix_neighbor_gaps(
            &target[i],
            &target[i + 1],
            &target[i + 2],
            &query[i],
            &query[i + 1],
            &query[i + 2],
            motifs,
            target_seq,
        )?
        else {
            continue;
        };

        debug!(
            "{} merged block {} into the {} neighbor on {} at {}",
            aln.query,
            target[i + 1],
            fix.side,
            aln.target,
            fix.site
        );
        target[i] = fix.t1;
        target[i + 2] = fix.t3;
        query[i] = fix.q1;
        query[i + 2] = fix.q3;
        sites[i] = fix.site;
        removed[i + 1] = true;
        available.remove(&i);
        available.remove(&(i + 1));
        fixed += 1;
    }

    if fixed == 0 {
        return Ok(0);
    }

    let keep_block = |j: &usize| !removed[*j];
    let target: Vec<CoordPair> = target
        .into_iter()
        .enumerate()
        .filter(|(j, _)| keep_block(j))
        .map(|(_, b)| b)
        .collect();
    let query: Vec<CoordPair> = query
        .into_iter()
        .enumerate()
        .filter(|(j, _)| keep_block(j))
        .map(|(_, b)| b)
        .collect();
    // site j is the gap after block j; the merged site already sits at i
    let sites: Vec<String> = sites
        .into_iter()
        .enumerate()
        .filter(|(j, _)| keep_block(j))
        .map(|(_, s)| s)
        .collect();

    aln.replace_blocks(Blocks::with_splice_sites(target, query, sites)?);
    aln.mismatch = aln.mismatch.max(1);
    Ok(fixed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::splice::annotate_splice_sites;
    use crate::splice::testutil::{bounds, gapped};

    fn reference(edits: &[(usize, &[u8])]) -> Vec<u8> {
        let mut seq = vec![b'C'; 100];
        for &(pos, bases) in edits {
            seq[pos - 1..pos - 1 + bases.len()].copy_from_slice(bases);
        }
        seq
    }

    #[test]
    fn middle_block_joins_right_neighbor() {
        let seq = reference(&[(21, b"GT"), (52, b"AG")]);
        let mut aln = gapped(
            &[((1, 20), (1, 20)), ((25, 30), (21, 26)), ((60, 80), (27, 47))],
            47,
        );
        annotate_splice_sites(&mut aln, &seq).unwrap();
        assert_eq!(aln.blocks().splice_sites(), &["GTCC".to_string(), "CCCC".to_string()]);

        let n = correct_neighbor_gaps(&mut aln, &SpliceMotifs::default(), &seq).unwrap();
        assert_eq!(n, 1);
        assert_eq!(bounds(aln.blocks().target()), vec![(1, 20), (54, 80)]);
        assert_eq!(bounds(aln.blocks().query()), vec![(1, 20), (21, 47)]);
        assert_eq!(aln.blocks().splice_sites(), &["GTAG".to_string()]);
        assert_eq!(aln.mismatch, 1);
    }

    #[test]
    fn middle_block_joins_left_neighbor() {
        let seq = reference(&[(37, b"GT"), (64, b"AG")]);
        let mut aln = gapped(
            &[((1, 30), (1, 30)), ((56, 61), (31, 36)), ((66, 80), (37, 51))],
            51,
        );
        annotate_splice_sites(&mut aln, &seq).unwrap();

        let n = correct_neighbor_gaps(&mut aln, &SpliceMotifs::default(), &seq).unwrap();
        assert_eq!(n, 1);
        assert_eq!(bounds(aln.blocks().target()), vec![(1, 36), (66, 80)]);
        assert_eq!(bounds(aln.blocks().query()), vec![(1, 36), (37, 51)]);
        assert_eq!(aln.blocks().splice_sites(), &["GTAG".to_string()]);
    }

    #[test]
    fn consumed_gap_not_merged_twice() {
        // blocks 1 and 2 are both tiny; windows 0..2 and 1..3 both land on GT..AG
        let seq = reference(&[(21, b"GT"), (52, b"AG"), (37, b"GT"), (68, b"AG")]);
        let mut aln = gapped(
            &[
                ((1, 20), (1, 20)),
                ((25, 30), (21, 26)),
                ((60, 65), (27, 32)),
                ((70, 90), (33, 53)),
            ],
            53,
        );
        annotate_splice_sites(&mut aln, &seq).unwrap();
        assert_eq!(correctable_gaps(aln.blocks(), &SpliceMotifs::default()), vec![0, 1, 2]);

        let (t, q, _) = aln.blocks().clone().into_parts();
        let second = fix_neighbor_gaps(&t[1], &t[2], &t[3], &q[1], &q[2], &q[3], &SpliceMotifs::default(), &seq)
            .unwrap();
        assert_eq!(second.map(|f| f.side), Some(Side::Left));

        let n = correct_neighbor_gaps(&mut aln, &SpliceMotifs::default(), &seq).unwrap();
        assert_eq!(n, 1);
        assert_eq!(bounds(aln.blocks().target()), vec![(1, 20), (54, 65), (70, 90)]);
        assert_eq!(bounds(aln.blocks().query()), vec![(1, 20), (21, 32), (33, 53)]);
        assert_eq!(aln.blocks().splice_sites(), &["GTAG".to_string(), "CCAG".to_string()]);
    }

    #[test]
    fn falls_back_to_shifted_merge() {
        // merged gap 21..53 misses the motif by one base
        let seq = reference(&[(22, b"GT"), (53, b"AG")]);
        let t1 = CoordPair::new(1, 20);
        let t2 = CoordPair::new(25, 30);
        let t3 = CoordPair::new(60, 80);
        let q1 = CoordPair::new(1, 20);
        let q2 = CoordPair::new(21, 26);
        let q3 = CoordPair::new(27, 47);
        let fix = fix_neighbor_gaps(&t1, &t2, &t3, &q1, &q2, &q3, &SpliceMotifs::default(), &seq)
            .unwrap()
            .unwrap();
        assert_eq!(fix.side, Side::Right);
        assert_eq!(fix.site, "GTAG");
        assert_eq!((fix.t1.max(), fix.t3.min()), (21, 55));
        assert_eq!((fix.q1.max(), fix.q3.min()), (21, 22));
    }

    #[test]
    fn large_middle_block_kept() {
        let seq = reference(&[(21, b"GT"), (47, b"AG")]);
        let t1 = CoordPair::new(1, 20);
        let t2 = CoordPair::new(25, 40);
        let t3 = CoordPair::new(70, 90);
        let q1 = CoordPair::new(1, 20);
        let q2 = CoordPair::new(21, 36);
        let q3 = CoordPair::new(37, 57);
        let out = fix_neighbor_gaps(&t1, &t2, &t3, &q1, &q2, &q3, &SpliceMotifs::default(), &seq).unwrap();
        assert!(out.is_none());
    }

    #[test]
    fn balanced_gaps_kept() {
        let seq = reference(&[]);
        let mut aln = gapped(
            &[((1, 20), (1, 20)), ((45, 50), (21, 26)), ((75, 90), (27, 42))],
            42,
        );
        annotate_splice_sites(&mut aln, &seq).unwrap();
        let before = aln.clone();
        let n = correct_neighbor_gaps(&mut aln, &SpliceMotifs::default(), &seq).unwrap();
        assert_eq!(n, 0);
        assert_eq!(aln, before);
    }

    #[test]
    fn merged_site_without_motif_kept() {
        let seq = reference(&[]);
        let mut aln = gapped(
            &[((1, 20), (1, 20)), ((25, 30), (21, 26)), ((60, 80), (27, 47))],
            47,
        );
        annotate_splice_sites(&mut aln, &seq).unwrap();
        let before = aln.clone();
        assert_eq!(correct_neighbor_gaps(&mut aln, &SpliceMotifs::default(), &seq).unwrap(), 0);
        assert_eq!(aln, before);
    }
}
