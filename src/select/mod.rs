//! Best-subset selection of partial alignments per contig.
//!
//! Every combination of up to `max_combination` alignments is scored by
//! summed identity plus weighted contig coverage, minus weighted overlap and
//! a per-alignment size penalty.

pub mod parallel;

use crate::alignment::Alignment;
use crate::error::Error;

pub use parallel::{select_all, ContigSelection};

/// Weights and ceiling for combination scoring.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionConfig {
    pub max_combination: usize,
    pub inclusion_weight: f64,
    pub overlap_weight: f64,
    pub size_weight: f64,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            max_combination: 3,
            inclusion_weight: 1.0,
            overlap_weight: 1.0,
            size_weight: 1.0,
        }
    }
}

/// Lexicographic `k`-subsets of `0..n`, produced lazily.
#[derive(Debug, Clone)]
pub struct Combinations {
    n: usize,
    indices: Vec<usize>,
    started: bool,
    done: bool,
}

impl Combinations {
    pub fn new(n: usize, k: usize) -> Self {
        Self {
            n,
            indices: (0..k).collect(),
            started: false,
            done: k == 0 || k > n,
        }
    }
}

impl Iterator for Combinations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Vec<usize>> {
        if self.done {
            return None;
        }
        if !self.started {
            self.started = true;
            return Some(self.indices.clone());
        }

        let k = self.indices.len();
        // rightmost index that can still advance
        let Some(i) = (0..k).rev().find(|&i| self.indices[i] < self.n - k + i) else {
            self.done = true;
            return None;
        };
        self.indices[i] += 1;
        for j in i + 1..k {
            self.indices[j] = self.indices[j - 1] + 1;
        }
        Some(self.indices.clone())
    }
}

/// Contig positions covered by at least one span and by at least two.
///
/// Spans are closed `(min, max)` pairs.
pub fn coverage(spans: &[(i64, i64)]) -> (i64, i64) {
    let mut events: Vec<(i64, i32)> = Vec::with_capacity(spans.len() * 2);
    for &(min, max) in spans {
        events.push((min, 1));
        events.push((max + 1, -1));
    }
    events.sort_unstable();

    let (mut included, mut overlapped) = (0, 0);
    let mut depth = 0;
    let mut last = 0;
    for (pos, delta) in events {
        let len = pos - last;
        if depth >= 1 {
            included += len;
        }
        if depth >= 2 {
            overlapped += len;
        }
        depth += delta;
        last = pos;
    }
    (included, overlapped)
}

/// The winning combination for one contig.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionOutcome {
    pub contig: String,
    pub alignments: Vec<Alignment>,
    pub score: f64,
    pub k: usize,
    pub combinations_evaluated: usize,
    /// A single alignment explained the whole contig.
    pub perfect: bool,
}

fn combination_score(chosen: &[&Alignment], query_len: i64, config: &SelectionConfig) -> f64 {
    let identity_sum: f64 = chosen.iter().map(|a| a.identity).sum();
    let spans: Vec<(i64, i64)> = chosen.iter().map(|a| (a.query_start, a.query_end)).collect();
    let (included, overlapped) = coverage(&spans);
    let (inclusion, overlap) = if query_len > 0 {
        (
            included as f64 / query_len as f64,
            overlapped as f64 / query_len as f64,
        )
    } else {
        (0.0, 0.0)
    };
    identity_sum + config.inclusion_weight * inclusion
        - config.overlap_weight * overlap
        - config.size_weight * chosen.len() as f64
}

/// Choose the best-scoring combination of one contig's alignments.
///
/// Ties keep the earliest combination found, so smaller sets win. A single
/// alignment that accounts for the whole contig ends the search at once.
pub fn select_best(alignments: &[Alignment], config: &SelectionConfig) -> Result<SelectionOutcome, Error> {
    let first = alignments
        .first()
        .ok_or_else(|| Error::Alignment("no alignments to select from".into()))?;
    let query_len = first.query_len;
    if let Some(other) = alignments.iter().find(|a| a.query_len != query_len || a.query != first.query) {
        return Err(Error::Alignment(format!(
            "{}: inconsistent contig in group ({} of length {}, expected length {query_len})",
            first.query, other.query, other.query_len
        )));
    }

    let n = alignments.len();
    let ceiling = config.max_combination.min(n);
    let mut best: Option<(f64, Vec<usize>)> = None;
    let mut evaluated = 0;

    for k in 1..=ceiling {
        for combo in Combinations::new(n, k) {
            evaluated += 1;
            if k == 1 && alignments[combo[0]].is_perfect() {
                let score = combination_score(&[&alignments[combo[0]]], query_len, config);
                return Ok(SelectionOutcome {
                    contig: first.query.clone(),
                    alignments: vec![alignments[combo[0]].clone()],
                    score,
                    k: 1,
                    combinations_evaluated: evaluated,
                    perfect: true,
                });
            }
            let chosen: Vec<&Alignment> = combo.iter().map(|&i| &alignments[i]).collect();
            let score = combination_score(&chosen, query_len, config);
            if best.as_ref().map_or(true, |(s, _)| score > *s) {
                best = Some((score, combo));
            }
        }
    }

    let (score, combo) = best.ok_or_else(|| {
        Error::Alignment(format!("{}: no combination evaluated", first.query))
    })?;
    Ok(SelectionOutcome {
        contig: first.query.clone(),
        k: combo.len(),
        alignments: combo.iter().map(|&i| alignments[i].clone()).collect(),
        score,
        combinations_evaluated: evaluated,
        perfect: false,
    })
}
