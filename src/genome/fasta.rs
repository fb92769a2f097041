use std::collections::HashSet;
use std::io::BufRead;
use std::path::Path;

use crate::error::Error;
use crate::io::open_text;

/// A single named sequence from a FASTA file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FastaRecord {
    pub name: String,
    pub sequence: Vec<u8>,
}

/// Parse FASTA files (plain or gzip) into named sequences.
///
/// - Names are the header text up to the first whitespace
/// - Bases are upper-cased; control characters and spaces are skipped
/// - A name seen twice is an error
pub fn parse_fasta_files<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<FastaRecord>, Error> {
    let mut records = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for path in paths {
        let path = path.as_ref();
        let reader = open_text(path)?;

        let mut current_name: Option<String> = None;
        let mut current_seq: Vec<u8> = Vec::new();

        for (line_num, line_result) in reader.lines().enumerate() {
            let line = line_result.map_err(|e| Error::io(e, path))?;

            if line.is_empty() {
                continue;
            }

            if let Some(stripped) = line.strip_prefix('>') {
                if let Some(name) = current_name.take() {
                    records.push(FastaRecord {
                        name,
                        sequence: std::mem::take(&mut current_seq),
                    });
                }

                let name = stripped
                    .split_whitespace()
                    .next()
                    .ok_or_else(|| {
                        Error::Fasta(format!(
                            "empty sequence name at {}:{}",
                            path.display(),
                            line_num + 1
                        ))
                    })?
                    .to_string();

                if !seen.insert(name.clone()) {
                    return Err(Error::Fasta(format!(
                        "duplicate sequence name '{name}' at {}:{}",
                        path.display(),
                        line_num + 1
                    )));
                }
                current_name = Some(name);
            } else {
                if current_name.is_none() {
                    return Err(Error::Fasta(format!(
                        "sequence data before first header at {}:{}",
                        path.display(),
                        line_num + 1
                    )));
                }

                current_seq.extend(
                    line.bytes()
                        .filter(|&b| b > b' ')
                        .map(|b| b.to_ascii_uppercase()),
                );
            }
        }

        if let Some(name) = current_name {
            records.push(FastaRecord {
                name,
                sequence: current_seq,
            });
        }
    }

    if records.is_empty() {
        return Err(Error::Fasta("no sequences found in FASTA files".to_string()));
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn parse_single_sequence() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, ">contig1").unwrap();
        writeln!(file, "ACGT").unwrap();
        writeln!(file, "NNNN").unwrap();

        let records = parse_fasta_files(&[file.path()]).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "contig1");
        assert_eq!(records[0].sequence, b"ACGTNNNN".to_vec());
    }

    #[test]
    fn parse_multiple_sequences() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, ">chr1 some comment").unwrap();
        writeln!(file, "ACG").unwrap();
        writeln!(file, ">chr2").unwrap();
        writeln!(file, "TGA").unwrap();

        let records = parse_fasta_files(&[file.path()]).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "chr1");
        assert_eq!(records[0].sequence, b"ACG".to_vec());
        assert_eq!(records[1].name, "chr2");
        assert_eq!(records[1].sequence, b"TGA".to_vec());
    }

    #[test]
    fn uppercases_and_strips_whitespace() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, ">test").unwrap();
        writeln!(file, "aaCc gGtT\r").unwrap();

        let records = parse_fasta_files(&[file.path()]).unwrap();
        assert_eq!(records[0].sequence, b"AACCGGTT".to_vec());
    }

    #[test]
    fn duplicate_name_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, ">a").unwrap();
        writeln!(file, "AC").unwrap();
        writeln!(file, ">a").unwrap();
        writeln!(file, "GT").unwrap();

        let err = parse_fasta_files(&[file.path()]).unwrap_err();
        assert!(err.to_string().contains("duplicate sequence name 'a'"));
    }

    #[test]
    fn empty_file_error() {
        let file = NamedTempFile::new().unwrap();
        let result = parse_fasta_files(&[file.path()]);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("no sequences"));
    }

    #[test]
    fn sequence_before_header_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "ACGT").unwrap();

        let result = parse_fasta_files(&[file.path()]);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("sequence data before first header"));
    }
}
