// Alignment file readers (PSL, PAF, SAM) and shared text input
pub mod paf;
pub mod psl;
pub mod sam;

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use log::warn;

use crate::alignment::Alignment;
use crate::error::Error;
use crate::genome::SequenceMap;
use crate::params::InputMethod;

/// Open a text file for line reading, decompressing `.gz`/`.gzip` input.
pub fn open_text(path: &Path) -> Result<Box<dyn BufRead + Send>, Error> {
    let path_str = path.to_string_lossy();
    let is_gzipped = path_str.ends_with(".gz") || path_str.ends_with(".gzip");

    let file = File::open(path).map_err(|e| Error::io(e, path))?;
    if is_gzipped {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Read every alignment from `path` in the given source format.
///
/// `contigs` supplies contig lengths where the format does not carry them.
/// Records that fail to parse or normalize are logged and skipped; the
/// second value is how many were skipped.
pub fn read_alignments(
    method: InputMethod,
    path: &Path,
    contigs: &SequenceMap,
) -> Result<(Vec<Alignment>, usize), Error> {
    let built: Vec<Result<Alignment, Error>> = match method {
        InputMethod::Blat => psl::read_psl(path)?
            .into_iter()
            .map(|r| r.and_then(|r| r.into_alignment()))
            .collect(),
        InputMethod::Minimap2Paf => paf::read_paf(path)?
            .into_iter()
            .map(|r| r.and_then(|r| r.into_alignment()))
            .collect(),
        InputMethod::Minimap2Sam => sam::read_sam(path)?
            .into_iter()
            .map(|r| r.and_then(|r| r.into_alignment(contigs)))
            .collect(),
    };

    let mut alignments = Vec::with_capacity(built.len());
    let mut rejected = 0;
    for result in built {
        match result {
            Ok(aln) => alignments.push(aln),
            Err(e) => {
                warn!("skipping alignment record: {e}");
                rejected += 1;
            }
        }
    }
    Ok((alignments, rejected))
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn open_plain_and_gzip() {
        let dir = TempDir::new().unwrap();

        let plain = dir.path().join("a.txt");
        std::fs::write(&plain, "line1\nline2\n").unwrap();
        let lines: Vec<String> = open_text(&plain).unwrap().lines().map(|l| l.unwrap()).collect();
        assert_eq!(lines, vec!["line1", "line2"]);

        let gz = dir.path().join("a.txt.gz");
        let mut enc = GzEncoder::new(std::fs::File::create(&gz).unwrap(), Compression::default());
        enc.write_all(b"line1\nline2\n").unwrap();
        enc.finish().unwrap();
        let lines: Vec<String> = open_text(&gz).unwrap().lines().map(|l| l.unwrap()).collect();
        assert_eq!(lines, vec!["line1", "line2"]);
    }

    #[test]
    fn missing_file_reports_path() {
        let err = open_text(Path::new("/nonexistent/aln.psl")).err().unwrap();
        assert!(err.to_string().contains("/nonexistent/aln.psl"));
    }

    #[test]
    fn malformed_record_is_skipped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("aln.psl");
        let good = "50\t0\t0\t0\t0\t0\t0\t0\t+\tctg1\t100\t0\t50\tchr1\t5000\t1000\t1050\t1\t50,\t0,\t1000,";
        // blockCount says 2 but only one block is listed
        let bad = good.replace("\t1\t50,", "\t2\t50,");
        std::fs::write(&path, format!("{good}\n{bad}\n")).unwrap();

        let (alignments, rejected) =
            read_alignments(InputMethod::Blat, &path, &SequenceMap::default()).unwrap();
        assert_eq!(alignments.len(), 1);
        assert_eq!(alignments[0].query, "ctg1");
        assert_eq!(rejected, 1);
    }
}
