// BLAT PSL reader
use std::io::BufRead;
use std::path::Path;

use crate::alignment::{Alignment, AlignmentParts, Blocks, Strand};
use crate::coords::CoordPair;
use crate::error::Error;

/// One PSL line. Coordinates are 0-based half-open as written by BLAT.
#[derive(Debug, Clone, PartialEq)]
pub struct PslRecord {
    pub matches: i64,
    pub mis_matches: i64,
    pub rep_matches: i64,
    pub n_count: i64,
    pub q_num_insert: i64,
    pub q_base_insert: i64,
    pub t_num_insert: i64,
    pub t_base_insert: i64,
    pub strand: Strand,
    pub q_name: String,
    pub q_size: i64,
    pub q_start: i64,
    pub q_end: i64,
    pub t_name: String,
    pub t_size: i64,
    pub t_start: i64,
    pub t_end: i64,
    pub block_sizes: Vec<i64>,
    /// Block starts on the aligned strand of the query.
    pub q_starts: Vec<i64>,
    pub t_starts: Vec<i64>,
}

fn int(field: &str, name: &str) -> Result<i64, String> {
    field
        .parse::<i64>()
        .map_err(|e| format!("invalid {name} '{field}': {e}"))
}

fn int_list(field: &str, name: &str) -> Result<Vec<i64>, String> {
    field
        .split(',')
        .filter(|s| !s.is_empty())
        .map(|s| int(s, name))
        .collect()
}

/// Parse one tab- or space-separated PSL line of 21 columns.
pub fn parse_psl_line(line: &str) -> Result<PslRecord, String> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 21 {
        return Err(format!("expected 21 columns, found {}", fields.len()));
    }

    // BLAT writes "++"/"+-" for translated searches; the first character is the query strand
    let strand_field = fields[8];
    let strand = strand_field
        .get(..1)
        .ok_or_else(|| "empty strand".to_string())?
        .parse::<Strand>()?;

    let block_count = int(fields[17], "blockCount")?;
    let record = PslRecord {
        matches: int(fields[0], "matches")?,
        mis_matches: int(fields[1], "misMatches")?,
        rep_matches: int(fields[2], "repMatches")?,
        n_count: int(fields[3], "nCount")?,
        q_num_insert: int(fields[4], "qNumInsert")?,
        q_base_insert: int(fields[5], "qBaseInsert")?,
        t_num_insert: int(fields[6], "tNumInsert")?,
        t_base_insert: int(fields[7], "tBaseInsert")?,
        strand,
        q_name: fields[9].to_string(),
        q_size: int(fields[10], "qSize")?,
        q_start: int(fields[11], "qStart")?,
        q_end: int(fields[12], "qEnd")?,
        t_name: fields[13].to_string(),
        t_size: int(fields[14], "tSize")?,
        t_start: int(fields[15], "tStart")?,
        t_end: int(fields[16], "tEnd")?,
        block_sizes: int_list(fields[18], "blockSizes")?,
        q_starts: int_list(fields[19], "qStarts")?,
        t_starts: int_list(fields[20], "tStarts")?,
    };

    let n = block_count as usize;
    if block_count < 1
        || record.block_sizes.len() != n
        || record.q_starts.len() != n
        || record.t_starts.len() != n
    {
        return Err(format!(
            "blockCount {} does not match {} sizes, {} qStarts, {} tStarts",
            block_count,
            record.block_sizes.len(),
            record.q_starts.len(),
            record.t_starts.len()
        ));
    }
    Ok(record)
}

fn is_header_start(line: &str) -> bool {
    matches!(line.split_whitespace().next(), Some("psLayout") | Some("match"))
}

/// Read all records from a PSL file, with or without the psLayout header.
///
/// Each record line yields its own result; only I/O failures end the read.
pub fn read_psl(path: &Path) -> Result<Vec<Result<PslRecord, Error>>, Error> {
    let reader = super::open_text(path)?;
    let mut records = Vec::new();
    let mut in_header = false;

    for (line_num, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| Error::io(e, path))?;
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }
        if in_header {
            if line.starts_with("---") {
                in_header = false;
            }
            continue;
        }
        if records.is_empty() && is_header_start(&line) {
            in_header = true;
            continue;
        }
        records.push(parse_psl_line(&line).map_err(|m| Error::parse("PSL", line_num + 1, m)));
    }
    Ok(records)
}

impl PslRecord {
    pub fn into_alignment(self) -> Result<Alignment, Error> {
        let mut target_blocks = Vec::with_capacity(self.block_sizes.len());
        let mut query_blocks = Vec::with_capacity(self.block_sizes.len());
        for ((&size, &qs), &ts) in self
            .block_sizes
            .iter()
            .zip(&self.q_starts)
            .zip(&self.t_starts)
        {
            if size < 1 {
                return Err(Error::Alignment(format!(
                    "{}: block of size {size}",
                    self.q_name
                )));
            }
            target_blocks.push(CoordPair::from_bounds(ts + 1, ts + size, true)?);
            query_blocks.push(CoordPair::from_bounds(qs + 1, qs + size, true)?);
        }

        Alignment::new(AlignmentParts {
            query: self.q_name,
            query_len: self.q_size,
            query_start: self.q_start + 1,
            query_end: self.q_end,
            strand: self.strand,
            target: self.t_name,
            target_len: self.t_size,
            target_start: self.t_start + 1,
            target_end: self.t_end,
            matches: self.matches,
            mismatch: self.mis_matches,
            repmatch: self.rep_matches,
            n_count: self.n_count,
            qnuminsert: self.q_num_insert,
            qbaseinsert: self.q_base_insert,
            tnuminsert: self.t_num_insert,
            tbaseinsert: self.t_base_insert,
            num_bases_aligned: self.matches + self.mis_matches + self.rep_matches,
            blocks: Blocks::new(target_blocks, query_blocks)?,
        })
    }
}
