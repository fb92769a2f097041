pub mod fasta;

use std::collections::HashMap;
use std::path::Path;

use crate::error::Error;

use fasta::parse_fasta_files;

/// Immutable lookup from sequence name to upper-case bases.
///
/// Loaded once per run and shared by reference across workers.
#[derive(Debug, Clone, Default)]
pub struct SequenceMap {
    sequences: HashMap<String, Vec<u8>>,
    /// Names in file order.
    order: Vec<String>,
}

impl SequenceMap {
    pub fn load<P: AsRef<Path>>(paths: &[P]) -> Result<Self, Error> {
        let mut map = Self::default();
        for record in parse_fasta_files(paths)? {
            map.insert(record.name, record.sequence);
        }
        Ok(map)
    }

    pub fn insert(&mut self, name: impl Into<String>, sequence: Vec<u8>) {
        let name = name.into();
        if self.sequences.insert(name.clone(), sequence).is_none() {
            self.order.push(name);
        }
    }

    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.sequences.get(name).map(|s| s.as_slice())
    }

    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(|s| s.as_str())
    }
}

/// Bases `min..=max` (1-based, closed) of `seq`.
pub fn subsequence(seq: &[u8], min: i64, max: i64) -> Result<&[u8], Error> {
    if min < 1 || max < min - 1 || max as usize > seq.len() {
        return Err(Error::Sequence(format!(
            "range {min}-{max} outside sequence of length {}",
            seq.len()
        )));
    }
    Ok(&seq[(min - 1) as usize..max as usize])
}

pub fn complement(base: u8) -> u8 {
    match base {
        b'A' => b'T',
        b'T' => b'A',
        b'G' => b'C',
        b'C' => b'G',
        b'a' => b't',
        b't' => b'a',
        b'g' => b'c',
        b'c' => b'g',
        other => other,
    }
}

pub fn reverse_complement(seq: &[u8]) -> Vec<u8> {
    seq.iter().rev().map(|&b| complement(b)).collect()
}
