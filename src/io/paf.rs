// minimap2 PAF reader
use std::io::BufRead;
use std::path::Path;

use crate::alignment::cigar::{parse_cigar, walk_cigar};
use crate::alignment::{Alignment, AlignmentParts, Blocks, Strand};
use crate::coords::CoordPair;
use crate::error::Error;

/// One PAF line. Coordinates are 0-based half-open on the forward strand.
#[derive(Debug, Clone, PartialEq)]
pub struct PafRecord {
    pub query_name: String,
    pub query_len: i64,
    pub query_start: i64,
    pub query_end: i64,
    pub strand: Strand,
    pub target_name: String,
    pub target_len: i64,
    pub target_start: i64,
    pub target_end: i64,
    /// Residue matches (column 10).
    pub match_len: i64,
    /// Alignment block length (column 11).
    pub block_len: i64,
    pub mapq: u8,
    /// `key -> "type:value"` for every SAM-like tag except `cg`.
    pub tags: Vec<(String, String)>,
    pub cigar: Option<String>,
}

impl PafRecord {
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn int_tag(&self, key: &str) -> Result<Option<i64>, Error> {
        match self.tag(key) {
            None => Ok(None),
            Some(v) => {
                let value = v.strip_prefix("i:").unwrap_or(v);
                value.parse::<i64>().map(Some).map_err(|e| {
                    Error::Alignment(format!("{}: invalid {key} tag '{v}': {e}", self.query_name))
                })
            }
        }
    }

    /// Primary alignments, or records carrying no `tp` tag at all.
    pub fn is_primary(&self) -> bool {
        self.tag("tp").map_or(true, |tp| tp == "A:P")
    }

    pub fn into_alignment(self) -> Result<Alignment, Error> {
        let mismatch = self.int_tag("NM")?.unwrap_or(0);
        let qnuminsert = self.int_tag("XI")?.unwrap_or(0);
        let tnuminsert = self.int_tag("XT")?.unwrap_or(0);

        let (target_blocks, query_blocks, qbaseinsert, tbaseinsert) = match &self.cigar {
            Some(cigar) => {
                let ops = parse_cigar(cigar)
                    .map_err(|m| Error::Alignment(format!("{}: {m}", self.query_name)))?;
                let aligned_start = match self.strand {
                    Strand::Forward => self.query_start + 1,
                    Strand::Reverse => self.query_len - self.query_end + 1,
                };
                let walk = walk_cigar(&ops, aligned_start, self.target_start + 1);
                let ends_at = walk.target_blocks.last().map(|b| b.max());
                if ends_at != Some(self.target_end) {
                    return Err(Error::Alignment(format!(
                        "{}: CIGAR '{cigar}' does not end at target position {}",
                        self.query_name, self.target_end
                    )));
                }
                (
                    walk.target_blocks,
                    walk.query_blocks,
                    walk.qbaseinsert,
                    walk.tbaseinsert,
                )
            }
            None => {
                let query_block = match self.strand {
                    Strand::Forward => CoordPair::from_bounds(self.query_start + 1, self.query_end, true)?,
                    Strand::Reverse => CoordPair::from_bounds(
                        self.query_len - self.query_end + 1,
                        self.query_len - self.query_start,
                        true,
                    )?,
                };
                let target_block = CoordPair::from_bounds(self.target_start + 1, self.target_end, true)?;
                (vec![target_block], vec![query_block], 0, 0)
            }
        };

        Alignment::new(AlignmentParts {
            query: self.query_name,
            query_len: self.query_len,
            query_start: self.query_start + 1,
            query_end: self.query_end,
            strand: self.strand,
            target: self.target_name,
            target_len: self.target_len,
            target_start: self.target_start + 1,
            target_end: self.target_end,
            matches: self.match_len,
            mismatch,
            repmatch: 0,
            n_count: 0,
            qnuminsert,
            qbaseinsert,
            tnuminsert,
            tbaseinsert,
            num_bases_aligned: self.match_len,
            blocks: Blocks::new(target_blocks, query_blocks)?,
        })
    }
}

/// Parse one PAF line: 12 mandatory columns then optional tags.
pub fn parse_paf_line(line: &str) -> Result<PafRecord, String> {
    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() < 12 {
        return Err(format!("expected at least 12 columns, found {}", fields.len()));
    }
    let int = |i: usize, name: &str| -> Result<i64, String> {
        fields[i]
            .parse::<i64>()
            .map_err(|e| format!("invalid {name} '{}': {e}", fields[i]))
    };

    let mut tags = Vec::new();
    let mut cigar = None;
    for field in &fields[12..] {
        let Some((key, value)) = field.split_once(':') else {
            continue;
        };
        if key == "cg" {
            cigar = Some(value.strip_prefix("Z:").unwrap_or(value).to_string());
        } else {
            tags.push((key.to_string(), value.to_string()));
        }
    }

    let record = PafRecord {
        query_name: fields[0].to_string(),
        query_len: int(1, "query length")?,
        query_start: int(2, "query start")?,
        query_end: int(3, "query end")?,
        strand: fields[4].parse::<Strand>()?,
        target_name: fields[5].to_string(),
        target_len: int(6, "target length")?,
        target_start: int(7, "target start")?,
        target_end: int(8, "target end")?,
        match_len: int(9, "residue matches")?,
        block_len: int(10, "block length")?,
        mapq: fields[11]
            .parse::<u8>()
            .map_err(|e| format!("invalid mapping quality '{}': {e}", fields[11]))?,
        tags,
        cigar,
    };

    if record.query_start > record.query_end || record.target_start > record.target_end {
        return Err("invalid alignment range".to_string());
    }
    Ok(record)
}

/// Read primary records from a PAF file.
///
/// Lines that fail to parse are returned as errors in place.
pub fn read_paf(path: &Path) -> Result<Vec<Result<PafRecord, Error>>, Error> {
    let reader = super::open_text(path)?;
    let mut records = Vec::new();
    for (line_num, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| Error::io(e, path))?;
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }
        match parse_paf_line(&line) {
            Ok(record) if !record.is_primary() => {}
            parsed => records.push(parsed.map_err(|m| Error::parse("PAF", line_num + 1, m))),
        }
    }
    Ok(records)
}
