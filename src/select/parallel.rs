// Static-partition worker pool for per-contig selection
use std::thread;

use log::debug;

use super::{select_best, SelectionConfig, SelectionOutcome};
use crate::alignment::Alignment;
use crate::error::Error;

/// The selection result for one contig group.
#[derive(Debug)]
pub struct ContigSelection {
    pub contig: String,
    pub result: Result<SelectionOutcome, Error>,
}

/// Split `n` items into `workers` contiguous ranges whose sizes differ by at most one.
fn partition(n: usize, workers: usize) -> Vec<std::ops::Range<usize>> {
    let workers = workers.clamp(1, n.max(1));
    let chunk = n / workers;
    let remainder = n % workers;
    let mut ranges = Vec::with_capacity(workers);
    let mut start = 0;
    for w in 0..workers {
        let len = chunk + usize::from(w < remainder);
        ranges.push(start..start + len);
        start += len;
    }
    ranges
}

fn select_range(groups: &[(String, Vec<Alignment>)], config: &SelectionConfig) -> Vec<ContigSelection> {
    groups
        .iter()
        .map(|(contig, alignments)| ContigSelection {
            contig: contig.clone(),
            result: select_best(alignments, config),
        })
        .collect()
}

/// Run [`select_best`] over every contig group on `threads` workers.
///
/// Each worker takes one contiguous share of `groups`. Results are
/// concatenated in worker order; a failing contig does not affect others.
pub fn select_all(
    groups: &[(String, Vec<Alignment>)],
    config: &SelectionConfig,
    threads: usize,
) -> Vec<ContigSelection> {
    let ranges = partition(groups.len(), threads);
    if ranges.len() <= 1 {
        return select_range(groups, config);
    }
    debug!("selecting {} contigs on {} workers", groups.len(), ranges.len());

    thread::scope(|scope| {
        let handles: Vec<_> = ranges
            .into_iter()
            .map(|range| {
                let share = &groups[range];
                scope.spawn(move || select_range(share, config))
            })
            .collect();

        let mut results = Vec::with_capacity(groups.len());
        for handle in handles {
            match handle.join() {
                Ok(part) => results.extend(part),
                Err(panic) => std::panic::resume_unwind(panic),
            }
        }
        results
    })
}
