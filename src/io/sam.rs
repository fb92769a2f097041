// SAM reader for minimap2 contig alignments
use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;

use crate::alignment::cigar::{parse_cigar, walk_cigar};
use crate::alignment::{Alignment, AlignmentParts, Blocks, Strand};
use crate::error::Error;
use crate::genome::SequenceMap;

const FLAG_UNMAPPED: u16 = 0x4;
const FLAG_REVERSE: u16 = 0x10;
const FLAG_SECONDARY: u16 = 0x100;

/// The SAM columns needed to rebuild an alignment.
#[derive(Debug, Clone, PartialEq)]
pub struct SamRecord {
    pub qname: String,
    pub flag: u16,
    pub rname: String,
    /// 1-based leftmost target position.
    pub pos: i64,
    pub mapq: u8,
    pub cigar: String,
    /// Target length from the `@SQ` header, when present.
    pub target_len: Option<i64>,
    pub tags: Vec<String>,
}

impl SamRecord {
    pub fn is_reverse(&self) -> bool {
        self.flag & FLAG_REVERSE != 0
    }

    fn int_tag(&self, key: &str) -> Result<Option<i64>, Error> {
        let prefix = format!("{key}:i:");
        match self.tags.iter().find_map(|t| t.strip_prefix(prefix.as_str())) {
            None => Ok(None),
            Some(v) => v.parse::<i64>().map(Some).map_err(|e| {
                Error::Alignment(format!("{}: invalid {key} tag '{v}': {e}", self.qname))
            }),
        }
    }

    /// Records worth normalizing: mapped, not secondary, not `tp:A:S`.
    pub fn is_usable(&self) -> bool {
        self.flag & (FLAG_UNMAPPED | FLAG_SECONDARY) == 0
            && self.rname != "*"
            && self.cigar != "*"
            && !self.tags.iter().any(|t| t.starts_with("tp:A:") && t != "tp:A:P")
    }

    pub fn into_alignment(self, contigs: &SequenceMap) -> Result<Alignment, Error> {
        let ops = parse_cigar(&self.cigar)
            .map_err(|m| Error::Alignment(format!("{}: {m}", self.qname)))?;
        // SEQ and CIGAR run along the target, i.e. on the aligned strand of the contig
        let walk = walk_cigar(&ops, 1, self.pos);

        let strand = if self.is_reverse() {
            Strand::Reverse
        } else {
            Strand::Forward
        };
        let query_len = contigs
            .get(&self.qname)
            .map(|s| s.len() as i64)
            .unwrap_or(walk.query_len);

        let clip_before = match strand {
            Strand::Forward => walk.leading_clip,
            Strand::Reverse => walk.trailing_clip,
        };
        let consumed = walk.aligned + walk.qbaseinsert;
        let query_start = clip_before + 1;
        let query_end = clip_before + consumed;

        let target_end = walk
            .target_blocks
            .last()
            .map(|b| b.max())
            .ok_or_else(|| Error::Alignment(format!("{}: CIGAR has no aligned bases", self.qname)))?;

        let mismatch = if walk.has_diff_op {
            walk.diffs
        } else {
            let nm = self.int_tag("NM")?.unwrap_or(0);
            (nm - walk.qbaseinsert - walk.tbaseinsert).max(0)
        };
        let matches = walk.aligned - mismatch;

        Alignment::new(AlignmentParts {
            query: self.qname,
            query_len,
            query_start,
            query_end,
            strand,
            target: self.rname,
            target_len: self.target_len.unwrap_or(0),
            target_start: self.pos,
            target_end,
            matches,
            mismatch,
            repmatch: 0,
            n_count: 0,
            qnuminsert: walk.qbaseinsert,
            qbaseinsert: walk.qbaseinsert,
            tnuminsert: walk.tbaseinsert,
            tbaseinsert: walk.tbaseinsert,
            num_bases_aligned: matches,
            blocks: Blocks::new(walk.target_blocks, walk.query_blocks)?,
        })
    }
}

/// Parse one SAM alignment line (11 mandatory columns then tags).
pub fn parse_sam_line(line: &str) -> Result<SamRecord, String> {
    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() < 11 {
        return Err(format!("expected at least 11 columns, found {}", fields.len()));
    }
    Ok(SamRecord {
        qname: fields[0].to_string(),
        flag: fields[1]
            .parse::<u16>()
            .map_err(|e| format!("invalid FLAG '{}': {e}", fields[1]))?,
        rname: fields[2].to_string(),
        pos: fields[3]
            .parse::<i64>()
            .map_err(|e| format!("invalid POS '{}': {e}", fields[3]))?,
        mapq: fields[4]
            .parse::<u8>()
            .map_err(|e| format!("invalid MAPQ '{}': {e}", fields[4]))?,
        cigar: fields[5].to_string(),
        target_len: None,
        tags: fields[11..].iter().map(|s| s.to_string()).collect(),
    })
}

fn parse_sq_header(line: &str) -> Option<(String, i64)> {
    let mut name = None;
    let mut len = None;
    for field in line.split('\t').skip(1) {
        if let Some(v) = field.strip_prefix("SN:") {
            name = Some(v.to_string());
        } else if let Some(v) = field.strip_prefix("LN:") {
            len = v.parse::<i64>().ok();
        }
    }
    Some((name?, len?))
}

/// Read usable alignment records from a SAM file.
///
/// Lines that fail to parse are returned as errors in place.
pub fn read_sam(path: &Path) -> Result<Vec<Result<SamRecord, Error>>, Error> {
    let reader = super::open_text(path)?;
    let mut target_lens: HashMap<String, i64> = HashMap::new();
    let mut records = Vec::new();

    for (line_num, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| Error::io(e, path))?;
        if line.trim().is_empty() {
            continue;
        }
        if line.starts_with("@SQ") {
            if let Some((name, len)) = parse_sq_header(&line) {
                target_lens.insert(name, len);
            }
            continue;
        }
        if line.starts_with('@') {
            continue;
        }
        let mut record = match parse_sam_line(&line) {
            Ok(record) => record,
            Err(m) => {
                records.push(Err(Error::parse("SAM", line_num + 1, m)));
                continue;
            }
        };
        if !record.is_usable() {
            continue;
        }
        record.target_len = target_lens.get(&record.rname).copied();
        records.push(Ok(record));
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn record(flag: u16, cigar: &str, tags: &str) -> SamRecord {
        let line = format!("ctg1\t{flag}\tchr5\t1001\t60\t{cigar}\t*\t0\t0\t*\t*\t{tags}");
        parse_sam_line(&line).unwrap()
    }

    fn bounds(blocks: &[crate::coords::CoordPair]) -> Vec<(i64, i64)> {
        blocks.iter().map(|c| (c.min(), c.max())).collect()
    }

    #[test]
    fn forward_with_leading_clip() {
        let aln = record(0, "20S60M2I18M", "NM:i:5")
            .into_alignment(&SequenceMap::default())
            .unwrap();
        assert_eq!(aln.query_len, 100);
        assert_eq!((aln.query_start, aln.query_end), (21, 100));
        assert_eq!((aln.target_start, aln.target_end), (1001, 1078));
        assert_eq!(aln.mismatch, 3);
        assert_eq!(aln.matches, 75);
        assert_eq!(aln.qnuminsert, 2);
        assert_eq!(bounds(aln.blocks().query()), vec![(21, 80), (83, 100)]);
        assert_eq!(bounds(aln.blocks().target()), vec![(1001, 1060), (1061, 1078)]);
    }

    #[test]
    fn reverse_uses_trailing_clip() {
        let aln = record(16, "60M40S", "NM:i:0")
            .into_alignment(&SequenceMap::default())
            .unwrap();
        assert_eq!(aln.strand, Strand::Reverse);
        assert_eq!((aln.query_start, aln.query_end), (41, 100));
        assert_eq!(bounds(aln.blocks().query()), vec![(1, 60)]);
    }

    #[test]
    fn contig_length_from_sequences() {
        let mut contigs = SequenceMap::default();
        contigs.insert("ctg1", b"ACGT".repeat(50));
        let aln = record(0, "50M", "").into_alignment(&contigs).unwrap();
        assert_eq!(aln.query_len, 200);
        assert_eq!(aln.score, 25);
        assert!(!aln.is_perfect());
    }

    #[test]
    fn explicit_mismatch_ops() {
        let aln = record(0, "10=2X8=", "NM:i:9")
            .into_alignment(&SequenceMap::default())
            .unwrap();
        assert_eq!(aln.mismatch, 2);
        assert_eq!(aln.matches, 18);
    }

    #[test]
    fn usability_flags() {
        assert!(record(0, "50M", "tp:A:P").is_usable());
        assert!(record(2048, "50M", "").is_usable());
        assert!(!record(4, "50M", "").is_usable());
        assert!(!record(256, "50M", "").is_usable());
        assert!(!record(0, "50M", "tp:A:S").is_usable());
    }

    #[test]
    fn read_with_header() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "@HD\tVN:1.6").unwrap();
        writeln!(file, "@SQ\tSN:chr5\tLN:180000").unwrap();
        writeln!(file, "ctg1\t0\tchr5\t1001\t60\t50M\t*\t0\t0\t*\t*\tNM:i:0").unwrap();
        writeln!(file, "ctg1\t256\tchr5\t5001\t0\t50M\t*\t0\t0\t*\t*\tNM:i:0").unwrap();
        writeln!(file, "ctg2\t4\t*\t0\t0\t*\t*\t0\t0\t*\t*").unwrap();

        let records = read_sam(file.path()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].as_ref().unwrap().target_len, Some(180000));
    }
}
