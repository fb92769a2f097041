// End-to-end detection run: read, select, correct, filter, classify, write
use std::collections::HashSet;
use std::path::PathBuf;

use log::{debug, info, warn};

use crate::alignment::{index_by_query, Alignment};
use crate::classify::{classify_pair, derive_junction, group_alignments, ContigGroups, PairThresholds};
use crate::error::Error;
use crate::genome::SequenceMap;
use crate::io::read_alignments;
use crate::output::{output_path, write_fasta, Candidate, CandidateWriter};
use crate::params::Parameters;
use crate::select::select_all;
use crate::splice::{annotate_splice_sites, correct_blocks, SpliceMotifs};
use crate::stats::RunStats;

/// Everything a run produced, after the output files were written.
#[derive(Debug)]
pub struct RunReport {
    pub stats: RunStats,
    pub groups: ContigGroups,
    pub candidates: Vec<Candidate>,
    pub candidates_path: PathBuf,
    pub fasta_path: PathBuf,
}

/// Identity and score cut-offs applied after selection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionFilter {
    pub min_identity: f64,
    pub min_score_each: i64,
    pub min_score_total: i64,
}

impl SelectionFilter {
    /// Drop low-identity alignments, then accept the contig only if every
    /// remaining score and the summed score clear their thresholds.
    pub fn apply(&self, mut alignments: Vec<Alignment>) -> Option<Vec<Alignment>> {
        alignments.retain(|a| a.identity > self.min_identity);
        if alignments.is_empty() {
            return None;
        }
        let total: i64 = alignments.iter().map(|a| a.score).sum();
        let each_ok = alignments.iter().all(|a| a.score > self.min_score_each);
        (each_ok && total > self.min_score_total).then_some(alignments)
    }
}

/// Correct the blocks of one selected alignment against the reference.
///
/// Returns the number of block edits. On failure the alignment is left as it was.
fn correct_alignment(
    aln: &mut Alignment,
    reference: &SequenceMap,
    contigs: &SequenceMap,
    motifs: &SpliceMotifs,
    max_unaligned_diff: i64,
) -> Result<usize, Error> {
    let target_seq = reference
        .get(&aln.target)
        .ok_or_else(|| Error::Sequence(format!("target '{}' not in reference", aln.target)))?;
    let contig_seq = contigs
        .get(&aln.query)
        .ok_or_else(|| Error::Sequence(format!("contig '{}' not in assembly", aln.query)))?;

    let mut work = aln.clone();
    annotate_splice_sites(&mut work, target_seq)?;
    let report = correct_blocks(&mut work, motifs, target_seq, contig_seq, max_unaligned_diff)?;
    *aln = work;
    Ok(report.total())
}

/// Pair each classified pair with its category and junction.
fn classify_pairs(
    pairs: &[(Alignment, Alignment)],
    thresholds: &PairThresholds,
    stats: &mut RunStats,
) -> Vec<Candidate> {
    let mut candidates = Vec::new();
    for (up, down) in pairs {
        let category = match classify_pair(up, down, thresholds) {
            Ok(Some(category)) => category,
            Ok(None) => {
                stats.unclassified_pairs += 1;
                continue;
            }
            Err(e) => {
                warn!("{}: cannot classify pair: {e}", up.query);
                stats.unclassified_pairs += 1;
                continue;
            }
        };
        let junction = derive_junction(up, down, category).unwrap_or_else(|e| {
            warn!("{}: no junction for {category} pair: {e}", up.query);
            None
        });
        stats.record_category(category);
        candidates.push(Candidate {
            category,
            upstream: up.clone(),
            downstream: down.clone(),
            junction,
        });
    }
    candidates
}

pub fn run_pipeline(params: &Parameters) -> Result<RunReport, Error> {
    let mut stats = RunStats::new();

    info!("Loading contigs from {}", params.assembly.display());
    let contigs = SequenceMap::load(&[&params.assembly])?;
    info!("Loaded {} contigs", contigs.len());

    info!("Reading {} alignments from {}", params.method, params.input.display());
    let (alignments, rejected) = read_alignments(params.method, &params.input, &contigs)?;
    stats.alignments_read = alignments.len() + rejected;
    stats.alignments_rejected = rejected;

    let mut groups = index_by_query(alignments);
    stats.contigs = groups.len();
    groups.retain(|(contig, alns)| {
        let keep = alns.len() <= params.max_alignment_count;
        if !keep {
            debug!("{contig}: {} alignments exceed the limit", alns.len());
        }
        keep
    });
    stats.contigs_over_limit = stats.contigs - groups.len();

    // ── Selection ───────────────────────────────────────────────────────
    let config = params.selection_config();
    info!(
        "Selecting alignment combinations for {} contigs on {} threads",
        groups.len(),
        params.threads
    );
    let mut selected: Vec<Vec<Alignment>> = Vec::with_capacity(groups.len());
    for selection in select_all(&groups, &config, params.threads) {
        match selection.result {
            Ok(outcome) => {
                stats.combinations_evaluated += outcome.combinations_evaluated;
                if outcome.perfect {
                    stats.perfect_matches += 1;
                }
                selected.push(outcome.alignments);
            }
            Err(e) => {
                warn!("{}: selection failed: {e}", selection.contig);
                stats.contigs_failed += 1;
            }
        }
    }
    if selected.is_empty() && stats.contigs_failed > 0 {
        return Err(Error::NoContigResolved {
            failed: stats.contigs_failed,
        });
    }

    // ── Splice correction ───────────────────────────────────────────────
    if let Some(reference_path) = &params.reference {
        info!("Loading reference from {}", reference_path.display());
        let reference = SequenceMap::load(&[reference_path])?;
        let motifs = params.motifs()?;
        info!("Correcting block boundaries with motifs {motifs}");
        for aln in selected.iter_mut().flatten() {
            match correct_alignment(aln, &reference, &contigs, &motifs, params.max_unaligned_diff) {
                Ok(0) => {}
                Ok(n) => {
                    stats.alignments_corrected += 1;
                    stats.block_corrections += n;
                }
                Err(e) => warn!("{}: splice correction skipped: {e}", aln.query),
            }
        }
    }

    // ── Filtering and grouping ──────────────────────────────────────────
    let filter = SelectionFilter {
        min_identity: params.min_identity_fract,
        min_score_each: params.min_score_each,
        min_score_total: params.min_score_total,
    };
    let before = selected.len();
    let selected: Vec<Vec<Alignment>> = selected.into_iter().filter_map(|a| filter.apply(a)).collect();
    stats.contigs_filtered = before - selected.len();

    let groups = group_alignments(selected);
    stats.singles = groups.singles.len();
    stats.gap_alignments = groups.gap_alignments.len();
    stats.pairs = groups.pairs.len();
    stats.multiples = groups.multiples.len();

    // ── Classification ──────────────────────────────────────────────────
    let candidates = classify_pairs(&groups.pairs, &params.pair_thresholds(), &mut stats);

    // ── Output ──────────────────────────────────────────────────────────
    std::fs::create_dir_all(&params.output).map_err(|e| Error::io(e, &params.output))?;
    let candidates_path = output_path(&params.output, &params.prefix, "candidates.tsv");
    let fasta_path = output_path(&params.output, &params.prefix, "chosen.fasta");

    let mut writer = CandidateWriter::create(&candidates_path)?;
    for candidate in &candidates {
        writer.write_candidate(candidate)?;
    }
    writer.finish()?;

    let mut seen = HashSet::new();
    let chosen: Vec<(&str, &[u8])> = candidates
        .iter()
        .map(|c| c.upstream.query.as_str())
        .filter(|name| seen.insert(*name))
        .filter_map(|name| contigs.get(name).map(|seq| (name, seq)))
        .collect();
    let written = write_fasta(&fasta_path, chosen)?;
    info!(
        "Wrote {} candidates to {} and {written} contigs to {}",
        candidates.len(),
        candidates_path.display(),
        fasta_path.display()
    );

    stats.print_summary();
    Ok(RunReport {
        stats,
        groups,
        candidates,
        candidates_path,
        fasta_path,
    })
}
