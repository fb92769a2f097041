// Candidate report and chosen-contig FASTA writers
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::alignment::Alignment;
use crate::classify::{AlignmentCategory, FusionJunction};
use crate::coords::CoordPair;
use crate::error::Error;

const FASTA_LINE_WIDTH: usize = 60;

/// Column names of the candidate report.
pub const CANDIDATE_COLUMNS: [&str; 21] = [
    "contig",
    "category",
    "contig_length",
    "target1",
    "strand1",
    "query1",
    "target_span1",
    "identity1",
    "score1",
    "target2",
    "strand2",
    "query2",
    "target_span2",
    "identity2",
    "score2",
    "contig_breakpoint",
    "breakpoint1",
    "breakpoint2",
    "overlap",
    "footprint1",
    "footprint2",
];

/// `{dir}/{prefix}.{suffix}`
pub fn output_path(dir: &Path, prefix: &str, suffix: &str) -> PathBuf {
    dir.join(format!("{prefix}.{suffix}"))
}

/// One classified pair, upstream alignment first.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub category: AlignmentCategory,
    pub upstream: Alignment,
    pub downstream: Alignment,
    pub junction: Option<FusionJunction>,
}

fn join_blocks(blocks: &[CoordPair]) -> String {
    blocks
        .iter()
        .map(|b| format!("{}-{}", b.min(), b.max()))
        .collect::<Vec<_>>()
        .join(",")
}

/// Writer for `{prefix}.candidates.tsv`
pub struct CandidateWriter {
    writer: BufWriter<File>,
    path: PathBuf,
}

impl CandidateWriter {
    /// Create the file and write the header line.
    pub fn create(path: impl Into<PathBuf>) -> Result<Self, Error> {
        let path = path.into();
        let file = File::create(&path).map_err(|e| Error::io(e, &path))?;
        let mut writer = Self {
            writer: BufWriter::new(file),
            path,
        };
        let header = format!("#{}", CANDIDATE_COLUMNS.join("\t"));
        writeln!(writer.writer, "{header}").map_err(|e| Error::io(e, &writer.path))?;
        Ok(writer)
    }

    pub fn write_candidate(&mut self, candidate: &Candidate) -> Result<(), Error> {
        let up = &candidate.upstream;
        let down = &candidate.downstream;
        let (contig_bp, bp1, bp2, overlap, fp1, fp2) = match &candidate.junction {
            Some(j) => (
                j.contig_breakpoint.to_string(),
                j.upstream.breakpoint.to_string(),
                j.downstream.breakpoint.to_string(),
                j.overlap.to_string(),
                join_blocks(&j.upstream.footprint),
                join_blocks(&j.downstream.footprint),
            ),
            None => (
                ".".to_string(),
                ".".to_string(),
                ".".to_string(),
                ".".to_string(),
                ".".to_string(),
                ".".to_string(),
            ),
        };

        writeln!(
            self.writer,
            "{}\t{}\t{}\t{}\t{}\t{}-{}\t{}-{}\t{:.4}\t{}\t{}\t{}\t{}-{}\t{}-{}\t{:.4}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            up.query,
            candidate.category,
            up.query_len,
            up.target,
            up.strand,
            up.query_start,
            up.query_end,
            up.target_start,
            up.target_end,
            up.identity,
            up.score,
            down.target,
            down.strand,
            down.query_start,
            down.query_end,
            down.target_start,
            down.target_end,
            down.identity,
            down.score,
            contig_bp,
            bp1,
            bp2,
            overlap,
            fp1,
            fp2,
        )
        .map_err(|e| Error::io(e, &self.path))
    }

    pub fn finish(mut self) -> Result<(), Error> {
        self.writer.flush().map_err(|e| Error::io(e, &self.path))
    }
}

/// Write named sequences as FASTA, wrapped at 60 bases.
pub fn write_fasta<'a, I>(path: &Path, records: I) -> Result<usize, Error>
where
    I: IntoIterator<Item = (&'a str, &'a [u8])>,
{
    let file = File::create(path).map_err(|e| Error::io(e, path))?;
    let mut writer = BufWriter::new(file);
    let mut count = 0;
    for (name, seq) in records {
        writeln!(writer, ">{name}").map_err(|e| Error::io(e, path))?;
        for line in seq.chunks(FASTA_LINE_WIDTH) {
            writer.write_all(line).map_err(|e| Error::io(e, path))?;
            writer.write_all(b"\n").map_err(|e| Error::io(e, path))?;
        }
        count += 1;
    }
    writer.flush().map_err(|e| Error::io(e, path))?;
    Ok(count)
}
