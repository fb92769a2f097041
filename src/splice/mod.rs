//! Splice-junction correction of alignment block boundaries.
//!
//! Three passes run in a fixed order on one alignment: unaligned-stretch
//! extension, single-gap motif shifts, then neighbor-gap collapsing. Each
//! pass edits private copies of the block lists and commits them through
//! [`Blocks::with_splice_sites`] only when something changed.

pub mod neighbor;
pub mod single;
pub mod unaligned;

use std::collections::HashSet;
use std::fmt;

use crate::alignment::{Alignment, Blocks};
use crate::error::Error;
use crate::genome::{reverse_complement, subsequence};

pub use neighbor::correct_neighbor_gaps;
pub use single::correct_single_gaps;
pub use unaligned::correct_unaligned;

/// GT-AG, GC-AG and AT-AC introns.
pub const DEFAULT_MOTIFS: [&str; 3] = ["GTAG", "GCAG", "ATAC"];

/// Accepted splice-site dinucleotide pairs (donor + acceptor, 4 bases).
///
/// A site also matches when its reverse complement is in the set, so
/// `GTAG` covers `CTAC` on the opposite strand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpliceMotifs {
    motifs: HashSet<[u8; 4]>,
}

impl SpliceMotifs {
    pub fn new<S: AsRef<str>>(motifs: &[S]) -> Result<Self, Error> {
        let mut set = HashSet::new();
        for motif in motifs {
            let motif = motif.as_ref().trim().to_ascii_uppercase();
            let bytes: [u8; 4] = motif
                .as_bytes()
                .try_into()
                .map_err(|_| Error::Parameter(format!("splice motif '{motif}' must be 4 bases")))?;
            if !bytes.iter().all(|b| matches!(b, b'A' | b'C' | b'G' | b'T')) {
                return Err(Error::Parameter(format!(
                    "splice motif '{motif}' must contain only A, C, G, T"
                )));
            }
            set.insert(bytes);
        }
        Ok(Self { motifs: set })
    }

    pub fn is_empty(&self) -> bool {
        self.motifs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.motifs.len()
    }

    pub fn matches(&self, site: &[u8]) -> bool {
        let Ok(site) = <[u8; 4]>::try_from(site) else {
            return false;
        };
        if self.motifs.contains(&site) {
            return true;
        }
        let rc: [u8; 4] = [
            crate::genome::complement(site[3]),
            crate::genome::complement(site[2]),
            crate::genome::complement(site[1]),
            crate::genome::complement(site[0]),
        ];
        self.motifs.contains(&rc)
    }
}

impl Default for SpliceMotifs {
    fn default() -> Self {
        Self {
            motifs: DEFAULT_MOTIFS
                .iter()
                .filter_map(|m| <[u8; 4]>::try_from(m.as_bytes()).ok())
                .collect(),
        }
    }
}

impl fmt::Display for SpliceMotifs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<String> = self
            .motifs
            .iter()
            .map(|m| String::from_utf8_lossy(m).into_owned())
            .collect();
        names.sort();
        write!(f, "{}", names.join(","))
    }
}

/// The first two and last two bases of the target gap `min..=max`.
///
/// Empty when the gap is shorter than two bases.
pub fn splice_site(target_seq: &[u8], min: i64, max: i64) -> Result<String, Error> {
    if max - min + 1 < 2 {
        return Ok(String::new());
    }
    let gap = subsequence(target_seq, min, max)?;
    let mut site = Vec::with_capacity(4);
    site.extend_from_slice(&gap[..2]);
    site.extend_from_slice(&gap[gap.len() - 2..]);
    Ok(String::from_utf8_lossy(&site).into_owned())
}

/// Fill every splice site of `aln` from the target sequence.
pub fn annotate_splice_sites(aln: &mut Alignment, target_seq: &[u8]) -> Result<(), Error> {
    let (target, query, _) = aln.blocks().clone().into_parts();
    let sites = target
        .windows(2)
        .map(|pair| splice_site(target_seq, pair[0].max() + 1, pair[1].min() - 1))
        .collect::<Result<Vec<_>, _>>()?;
    aln.replace_blocks(Blocks::with_splice_sites(target, query, sites)?);
    Ok(())
}

/// Gap indices with a known, non-motif splice site and abutting query blocks.
pub(crate) fn correctable_gaps(blocks: &Blocks, motifs: &SpliceMotifs) -> Vec<usize> {
    blocks
        .splice_sites()
        .iter()
        .enumerate()
        .filter(|(i, site)| {
            !site.is_empty() && !motifs.matches(site.as_bytes()) && blocks.query_contiguous(*i)
        })
        .map(|(i, _)| i)
        .collect()
}

/// Which flanking block absorbed a correction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => write!(f, "left"),
            Side::Right => write!(f, "right"),
        }
    }
}

pub(crate) fn pair_mut<T>(items: &mut [T], i: usize) -> (&mut T, &mut T) {
    let (left, right) = items.split_at_mut(i + 1);
    (&mut left[i], &mut right[0])
}

/// Block changes made by [`correct_blocks`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CorrectionReport {
    pub unaligned: usize,
    pub single: usize,
    pub neighbor: usize,
}

impl CorrectionReport {
    pub fn total(&self) -> usize {
        self.unaligned + self.single + self.neighbor
    }
}

/// Run all corrections on one alignment.
///
/// `contig_seq` is the forward contig; it is reverse-complemented here for
/// reverse-strand alignments. Splice sites must already be annotated.
pub fn correct_blocks(
    aln: &mut Alignment,
    motifs: &SpliceMotifs,
    target_seq: &[u8],
    contig_seq: &[u8],
    max_unaligned_diff: i64,
) -> Result<CorrectionReport, Error> {
    let mut report = CorrectionReport::default();
    if aln.block_count() < 2 || motifs.is_empty() {
        return Ok(report);
    }

    let aligned_query = if aln.strand.is_forward() {
        contig_seq.to_vec()
    } else {
        reverse_complement(contig_seq)
    };

    report.unaligned = correct_unaligned(aln, target_seq, &aligned_query, max_unaligned_diff)?;
    report.single = correct_single_gaps(aln, motifs, target_seq)?;
    report.neighbor = correct_neighbor_gaps(aln, motifs, target_seq)?;
    Ok(report)
}
