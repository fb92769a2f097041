// Normalized partial alignment of a contig, independent of the source format
pub mod cigar;
pub mod score;

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::coords::CoordPair;
use crate::error::{CoordError, Error};

pub use score::{calc_identity, calc_score};

/// Strand of the contig relative to the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strand {
    Forward,
    Reverse,
}

impl Strand {
    pub fn is_forward(self) -> bool {
        self == Strand::Forward
    }

    pub fn symbol(self) -> char {
        match self {
            Strand::Forward => '+',
            Strand::Reverse => '-',
        }
    }
}

impl FromStr for Strand {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "+" => Ok(Strand::Forward),
            "-" => Ok(Strand::Reverse),
            _ => Err(format!("invalid strand '{s}'; expected '+' or '-'")),
        }
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// The three parallel per-block sequences of an alignment.
///
/// Target and query blocks are both increasing; query blocks are on the
/// aligned strand of the contig. There is one splice site per gap. The
/// lists can only be replaced together, through a validated constructor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blocks {
    target: Vec<CoordPair>,
    query: Vec<CoordPair>,
    splice_sites: Vec<String>,
}

impl Blocks {
    /// Blocks with no splice site annotation yet.
    pub fn new(target: Vec<CoordPair>, query: Vec<CoordPair>) -> Result<Self, Error> {
        let sites = vec![String::new(); target.len().saturating_sub(1)];
        Self::with_splice_sites(target, query, sites)
    }

    pub fn with_splice_sites(
        target: Vec<CoordPair>,
        query: Vec<CoordPair>,
        splice_sites: Vec<String>,
    ) -> Result<Self, Error> {
        if target.is_empty() {
            return Err(Error::Alignment("alignment has no blocks".into()));
        }
        if target.len() != query.len() || splice_sites.len() + 1 != target.len() {
            return Err(Error::Alignment(format!(
                "block lists differ in length: {} target, {} query, {} splice sites",
                target.len(),
                query.len(),
                splice_sites.len()
            )));
        }
        check_increasing(&target)?;
        check_increasing(&query)?;
        Ok(Self {
            target,
            query,
            splice_sites,
        })
    }

    pub fn target(&self) -> &[CoordPair] {
        &self.target
    }

    pub fn query(&self) -> &[CoordPair] {
        &self.query
    }

    pub fn splice_sites(&self) -> &[String] {
        &self.splice_sites
    }

    pub fn count(&self) -> usize {
        self.target.len()
    }

    /// True when query blocks `i` and `i + 1` abut.
    pub fn query_contiguous(&self, i: usize) -> bool {
        self.query[i + 1].min() - self.query[i].max() == 1
    }

    pub fn target_contiguous(&self, i: usize) -> bool {
        self.target[i + 1].min() - self.target[i].max() == 1
    }

    pub fn into_parts(self) -> (Vec<CoordPair>, Vec<CoordPair>, Vec<String>) {
        (self.target, self.query, self.splice_sites)
    }
}

fn check_increasing(blocks: &[CoordPair]) -> Result<(), CoordError> {
    for (i, pair) in blocks.windows(2).enumerate() {
        if pair[0].min() > pair[1].min() {
            return Err(CoordError::OutOfOrder { index: i + 1 });
        }
        if pair[0].max() >= pair[1].min() {
            return Err(CoordError::OverlappingBlocks { index: i + 1 });
        }
    }
    Ok(())
}

/// Raw fields of an alignment before identity and score are derived.
///
/// Coordinates are 1-based and closed. `query_start`/`query_end` are on the
/// forward strand of the contig.
#[derive(Debug, Clone)]
pub struct AlignmentParts {
    pub query: String,
    pub query_len: i64,
    pub query_start: i64,
    pub query_end: i64,
    pub strand: Strand,
    pub target: String,
    pub target_len: i64,
    pub target_start: i64,
    pub target_end: i64,
    pub matches: i64,
    pub mismatch: i64,
    pub repmatch: i64,
    pub n_count: i64,
    pub qnuminsert: i64,
    pub qbaseinsert: i64,
    pub tnuminsert: i64,
    pub tbaseinsert: i64,
    pub num_bases_aligned: i64,
    pub blocks: Blocks,
}

/// One partial alignment of a contig to a target sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct Alignment {
    pub query: String,
    pub query_len: i64,
    pub query_start: i64,
    pub query_end: i64,
    pub strand: Strand,
    pub target: String,
    pub target_len: i64,
    pub target_start: i64,
    pub target_end: i64,
    pub matches: i64,
    pub mismatch: i64,
    pub repmatch: i64,
    pub n_count: i64,
    pub qnuminsert: i64,
    pub qbaseinsert: i64,
    pub tnuminsert: i64,
    pub tbaseinsert: i64,
    pub num_bases_aligned: i64,
    pub identity: f64,
    pub score: i64,
    blocks: Blocks,
}

impl Alignment {
    pub fn new(parts: AlignmentParts) -> Result<Self, Error> {
        if parts.query_end < parts.query_start || parts.target_end < parts.target_start {
            return Err(Error::Alignment(format!(
                "{}: inverted span (query {}-{}, target {}-{})",
                parts.query, parts.query_start, parts.query_end, parts.target_start, parts.target_end
            )));
        }

        let qspan = parts.query_end - parts.query_start + 1;
        let tspan = parts.target_end - parts.target_start + 1;
        let identity = calc_identity(
            qspan,
            tspan,
            parts.qnuminsert,
            parts.mismatch,
            parts.num_bases_aligned,
        );
        let score = calc_score(
            parts.matches,
            parts.qnuminsert,
            parts.tnuminsert,
            parts.query_len,
        );

        Ok(Self {
            query: parts.query,
            query_len: parts.query_len,
            query_start: parts.query_start,
            query_end: parts.query_end,
            strand: parts.strand,
            target: parts.target,
            target_len: parts.target_len,
            target_start: parts.target_start,
            target_end: parts.target_end,
            matches: parts.matches,
            mismatch: parts.mismatch,
            repmatch: parts.repmatch,
            n_count: parts.n_count,
            qnuminsert: parts.qnuminsert,
            qbaseinsert: parts.qbaseinsert,
            tnuminsert: parts.tnuminsert,
            tbaseinsert: parts.tbaseinsert,
            num_bases_aligned: parts.num_bases_aligned,
            identity,
            score,
            blocks: parts.blocks,
        })
    }

    pub fn blocks(&self) -> &Blocks {
        &self.blocks
    }

    pub fn block_count(&self) -> usize {
        self.blocks.count()
    }

    /// Swap in a rebuilt block triple.
    pub fn replace_blocks(&mut self, blocks: Blocks) {
        self.blocks = blocks;
    }

    /// The contig interval covered by this alignment, oriented by strand.
    pub fn query_span(&self) -> Result<CoordPair, CoordError> {
        Ok(
            CoordPair::from_bounds(self.query_start, self.query_end, self.strand.is_forward())?
                .with_name(self.query.as_str()),
        )
    }

    pub fn target_span(&self) -> Result<CoordPair, CoordError> {
        Ok(
            CoordPair::from_bounds(self.target_start, self.target_end, self.strand.is_forward())?
                .with_name(self.target.as_str()),
        )
    }

    /// Every contig base is accounted for by this one alignment.
    pub fn is_perfect(&self) -> bool {
        self.query_len > 0 && self.matches + self.mismatch == self.query_len
    }
}

/// Group alignments by contig, keeping first-seen contig order.
pub fn index_by_query(alignments: Vec<Alignment>) -> Vec<(String, Vec<Alignment>)> {
    let mut order: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<(String, Vec<Alignment>)> = Vec::new();
    for aln in alignments {
        match order.get(&aln.query) {
            Some(&i) => groups[i].1.push(aln),
            None => {
                order.insert(aln.query.clone(), groups.len());
                groups.push((aln.query.clone(), vec![aln]));
            }
        }
    }
    groups
}

#[cfg(test)]
pub(crate) mod testutil {
    use super::*;

    /// Single-block forward alignment covering `start..=end` of a contig.
    pub fn span(query: &str, query_len: i64, start: i64, end: i64, identity: f64) -> Alignment {
        let len = end - start + 1;
        let blocks = Blocks::new(
            vec![CoordPair::new(1000 + start, 1000 + end)],
            vec![CoordPair::new(start, end)],
        )
        .unwrap();
        let mut aln = Alignment::new(AlignmentParts {
            query: query.to_string(),
            query_len,
            query_start: start,
            query_end: end,
            strand: Strand::Forward,
            target: "chr1".to_string(),
            target_len: 1_000_000,
            target_start: 1000 + start,
            target_end: 1000 + end,
            matches: len,
            mismatch: 0,
            repmatch: 0,
            n_count: 0,
            qnuminsert: 0,
            qbaseinsert: 0,
            tnuminsert: 0,
            tbaseinsert: 0,
            num_bases_aligned: len,
            blocks,
        })
        .unwrap();
        aln.identity = identity;
        aln
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn b(min: i64, max: i64) -> CoordPair {
        CoordPair::new(min, max)
    }

    #[test]
    fn blocks_require_parallel_lengths() {
        assert!(Blocks::new(vec![b(1, 10)], vec![]).is_err());
        assert!(Blocks::new(vec![], vec![]).is_err());
        assert!(Blocks::with_splice_sites(
            vec![b(1, 10), b(20, 30)],
            vec![b(1, 10), b(11, 21)],
            vec![]
        )
        .is_err());

        let blocks = Blocks::new(vec![b(1, 10), b(20, 30)], vec![b(1, 10), b(11, 21)]).unwrap();
        assert_eq!(blocks.splice_sites(), &[String::new()]);
        assert!(blocks.query_contiguous(0));
        assert!(!blocks.target_contiguous(0));
    }

    #[test]
    fn blocks_reject_overlap_and_order() {
        let err = Blocks::new(vec![b(1, 10), b(10, 30)], vec![b(1, 10), b(11, 31)]).unwrap_err();
        assert!(matches!(err, Error::Coord(CoordError::OverlappingBlocks { index: 1 })));

        let err = Blocks::new(vec![b(20, 30), b(1, 10)], vec![b(1, 10), b(11, 21)]).unwrap_err();
        assert!(matches!(err, Error::Coord(CoordError::OutOfOrder { index: 1 })));
    }

    #[test]
    fn identity_and_score_at_construction() {
        let aln = testutil::span("c1", 200, 1, 100, 0.0);
        let fresh = Alignment::new(AlignmentParts {
            query: "c1".into(),
            query_len: 200,
            query_start: 1,
            query_end: 100,
            strand: Strand::Forward,
            target: "chr1".into(),
            target_len: 0,
            target_start: 1001,
            target_end: 1100,
            matches: 100,
            mismatch: 0,
            repmatch: 0,
            n_count: 0,
            qnuminsert: 0,
            qbaseinsert: 0,
            tnuminsert: 0,
            tbaseinsert: 0,
            num_bases_aligned: 100,
            blocks: aln.blocks().clone(),
        })
        .unwrap();
        assert!((fresh.identity - 1.0).abs() < 1e-12);
        assert_eq!(fresh.score, 50);
        assert!(!fresh.is_perfect());
    }

    #[test]
    fn inverted_span_rejected() {
        let aln = testutil::span("c1", 200, 1, 100, 1.0);
        let parts = AlignmentParts {
            query: "c1".into(),
            query_len: 200,
            query_start: 100,
            query_end: 1,
            strand: Strand::Forward,
            target: "chr1".into(),
            target_len: 0,
            target_start: 1001,
            target_end: 1100,
            matches: 100,
            mismatch: 0,
            repmatch: 0,
            n_count: 0,
            qnuminsert: 0,
            qbaseinsert: 0,
            tnuminsert: 0,
            tbaseinsert: 0,
            num_bases_aligned: 100,
            blocks: aln.blocks().clone(),
        };
        assert!(matches!(Alignment::new(parts), Err(Error::Alignment(_))));
    }

    #[test]
    fn query_span_follows_strand() {
        let mut aln = testutil::span("c1", 100, 11, 60, 1.0);
        aln.strand = Strand::Reverse;
        let span = aln.query_span().unwrap();
        assert_eq!((span.start(), span.end()), (60, 11));
        assert_eq!(span.name(), Some("c1"));
    }

    #[test]
    fn grouping_keeps_first_seen_order() {
        let alns = vec![
            testutil::span("b", 100, 1, 50, 1.0),
            testutil::span("a", 100, 1, 50, 1.0),
            testutil::span("b", 100, 51, 100, 1.0),
        ];
        let groups = index_by_query(alns);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, "b");
        assert_eq!(groups[0].1.len(), 2);
        assert_eq!(groups[1].0, "a");
    }

    #[test]
    fn strand_parse() {
        assert_eq!("+".parse::<Strand>().unwrap(), Strand::Forward);
        assert_eq!("-".parse::<Strand>().unwrap(), Strand::Reverse);
        assert!(".".parse::<Strand>().is_err());
        assert_eq!(Strand::Reverse.to_string(), "-");
    }
}
