// Single-gap correction: slide an intron boundary by a few bases onto a motif
use log::debug;

use super::{correctable_gaps, pair_mut, splice_site, SpliceMotifs};
use crate::alignment::{Alignment, Blocks};
use crate::coords::CoordPair;
use crate::error::Error;

const MIN_GAP: i64 = 10;
const MAX_GAP: i64 = 10_000;
const SHIFTS: [i64; 4] = [-2, -1, 1, 2];

/// Try to move the gap between blocks 1 and 2 onto exactly one motif.
///
/// On success both block pairs are shifted by the same offset and the new
/// splice site is returned. No motif, or more than one matching offset,
/// leaves the blocks unchanged.
pub fn fix_single_gap(
    t1: &mut CoordPair,
    t2: &mut CoordPair,
    q1: &mut CoordPair,
    q2: &mut CoordPair,
    motifs: &SpliceMotifs,
    target_seq: &[u8],
) -> Result<Option<String>, Error> {
    let gap_min = t1.max() + 1;
    let gap_max = t2.min() - 1;
    let gap_len = gap_max - gap_min + 1;
    if !(MIN_GAP..=MAX_GAP).contains(&gap_len) {
        return Ok(None);
    }

    // a shift must leave every flanking block at least two bases long
    let room = t1.span().min(t2.span()).min(q1.span()).min(q2.span()) - 1;

    let mut found: Option<(i64, String)> = None;
    for shift in SHIFTS {
        if shift.abs() >= room {
            continue;
        }
        let site = splice_site(target_seq, gap_min + shift, gap_max + shift)?;
        if motifs.matches(site.as_bytes()) {
            if found.is_some() {
                return Ok(None);
            }
            found = Some((shift, site));
        }
    }

    let Some((shift, site)) = found else {
        return Ok(None);
    };
    t1.move_max(shift)?;
    t2.move_min(shift)?;
    q1.move_max(shift)?;
    q2.move_min(shift)?;
    Ok(Some(site))
}

/// Apply [`fix_single_gap`] left to right to every correctable gap.
///
/// Returns the number of gaps moved. When any moved the record's mismatch
/// count becomes at least 1.
pub fn correct_single_gaps(
    aln: &mut Alignment,
    motifs: &SpliceMotifs,
    target_seq: &[u8],
) -> Result<usize, Error> {
    let gaps = correctable_gaps(aln.blocks(), motifs);
    if gaps.is_empty() {
        return Ok(0);
    }

    let (mut target, mut query, mut sites) = aln.blocks().clone().into_parts();
    let mut fixed = 0;
    for i in gaps {
        let (t1, t2) = pair_mut(&mut target, i);
        let (q1, q2) = pair_mut(&mut query, i);
        let before = (t1.clone(), t2.clone());
        if let Some(site) = fix_single_gap(t1, t2, q1, q2, motifs, target_seq)? {
            debug!(
                "{} changed blocks {} [{}, {}] to [{}, {}] at {}",
                aln.query, aln.target, before.0, before.1, t1, t2, site
            );
            sites[i] = site;
            fixed += 1;
        }
    }

    if fixed > 0 {
        aln.replace_blocks(Blocks::with_splice_sites(target, query, sites)?);
        aln.mismatch = aln.mismatch.max(1);
    }
    Ok(fixed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::splice::annotate_splice_sites;
    use crate::splice::testutil::{bounds, gapped};

    /// 80 bases of `C` with the given 1-based positions overwritten.
    fn reference(edits: &[(usize, u8)]) -> Vec<u8> {
        let mut seq = vec![b'C'; 80];
        for &(pos, base) in edits {
            seq[pos - 1] = base;
        }
        seq
    }

    fn two_block() -> Alignment {
        gapped(&[((1, 20), (1, 20)), ((51, 70), (21, 40))], 40)
    }

    #[test]
    fn one_base_shift_applied_once() {
        // motif sits one base to the right of the aligned gap 21..50
        let seq = reference(&[(22, b'G'), (23, b'T'), (50, b'A'), (51, b'G')]);
        let mut aln = two_block();
        annotate_splice_sites(&mut aln, &seq).unwrap();
        assert_eq!(aln.blocks().splice_sites(), &["CGCA".to_string()]);

        let n = correct_single_gaps(&mut aln, &SpliceMotifs::default(), &seq).unwrap();
        assert_eq!(n, 1);
        assert_eq!(bounds(aln.blocks().target()), vec![(1, 21), (52, 70)]);
        assert_eq!(bounds(aln.blocks().query()), vec![(1, 21), (22, 40)]);
        assert_eq!(aln.blocks().splice_sites(), &["GTAG".to_string()]);
        assert_eq!(aln.mismatch, 1);
        assert_eq!(aln.blocks().target().len(), aln.blocks().query().len());

        // already on a motif now; a second pass changes nothing
        let again = correct_single_gaps(&mut aln, &SpliceMotifs::default(), &seq).unwrap();
        assert_eq!(again, 0);
        assert_eq!(bounds(aln.blocks().target()), vec![(1, 21), (52, 70)]);
    }

    #[test]
    fn ambiguous_shift_rejected() {
        // both -1 (20..49) and +1 (22..51) land on GT..AG
        let seq = reference(&[
            (20, b'G'),
            (21, b'T'),
            (48, b'A'),
            (49, b'G'),
            (22, b'G'),
            (23, b'T'),
            (50, b'A'),
            (51, b'G'),
        ]);
        let mut aln = two_block();
        annotate_splice_sites(&mut aln, &seq).unwrap();
        let before = aln.clone();
        let n = correct_single_gaps(&mut aln, &SpliceMotifs::default(), &seq).unwrap();
        assert_eq!(n, 0);
        assert_eq!(aln, before);
    }

    #[test]
    fn reverse_complement_motif_accepted() {
        // CT..AC is GT..AG on the other strand
        let seq = reference(&[(22, b'C'), (23, b'T'), (50, b'A'), (51, b'C'), (21, b'A')]);
        let mut aln = two_block();
        annotate_splice_sites(&mut aln, &seq).unwrap();
        let n = correct_single_gaps(&mut aln, &SpliceMotifs::default(), &seq).unwrap();
        assert_eq!(n, 1);
        assert_eq!(aln.blocks().splice_sites(), &["CTAC".to_string()]);
    }

    #[test]
    fn short_gap_not_shifted() {
        let mut t1 = CoordPair::new(1, 20);
        let mut t2 = CoordPair::new(26, 40);
        let mut q1 = CoordPair::new(1, 20);
        let mut q2 = CoordPair::new(21, 35);
        let seq = reference(&[]);
        let out = fix_single_gap(&mut t1, &mut t2, &mut q1, &mut q2, &SpliceMotifs::default(), &seq).unwrap();
        assert!(out.is_none());
        assert_eq!((t1.max(), t2.min()), (20, 26));
    }

    #[test]
    fn short_flanking_block_limits_shift() {
        // block 1 is only two bases long, so no shift is allowed
        let seq = reference(&[(4, b'G'), (5, b'T'), (32, b'A'), (33, b'G')]);
        let mut t1 = CoordPair::new(1, 2);
        let mut t2 = CoordPair::new(33, 50);
        let mut q1 = CoordPair::new(1, 2);
        let mut q2 = CoordPair::new(3, 20);
        let out = fix_single_gap(&mut t1, &mut t2, &mut q1, &mut q2, &SpliceMotifs::default(), &seq).unwrap();
        assert!(out.is_none());
    }

    #[test]
    fn out_of_range_shift_is_an_error() {
        let mut aln = gapped(&[((1, 20), (1, 20)), ((51, 70), (21, 40))], 40);
        let seq = reference(&[]);
        annotate_splice_sites(&mut aln, &seq).unwrap();
        // a reference too short for the shifted windows
        assert!(correct_single_gaps(&mut aln, &SpliceMotifs::default(), &seq[..50]).is_err());
    }
}
