// Per-stage counters for a detection run
use log::info;

use crate::classify::AlignmentCategory;

#[derive(Default, Debug, Clone, PartialEq)]
pub struct RunStats {
    /// Records read from the alignment file
    pub alignments_read: usize,
    /// Records rejected while normalizing
    pub alignments_rejected: usize,
    pub contigs: usize,
    /// Contigs with more records than `max_alignment_count`
    pub contigs_over_limit: usize,
    /// Contigs whose selection failed
    pub contigs_failed: usize,
    pub perfect_matches: usize,
    pub combinations_evaluated: usize,
    pub alignments_corrected: usize,
    pub block_corrections: usize,
    /// Contigs dropped by the identity/score filters
    pub contigs_filtered: usize,
    pub singles: usize,
    pub gap_alignments: usize,
    pub pairs: usize,
    pub multiples: usize,
    /// Pair count per category, in `AlignmentCategory::ALL` order
    pub categories: [usize; 6],
    pub unclassified_pairs: usize,
}

impl RunStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_category(&mut self, category: AlignmentCategory) {
        if let Some(i) = AlignmentCategory::ALL.iter().position(|c| *c == category) {
            self.categories[i] += 1;
        }
    }

    pub fn candidates(&self) -> usize {
        self.categories.iter().sum()
    }

    /// Print summary statistics to log
    pub fn print_summary(&self) {
        info!("=== Run Summary ===");
        info!(
            "Alignments read: {} ({} rejected)",
            self.alignments_read, self.alignments_rejected
        );
        info!(
            "Contigs: {} ({} over the alignment limit, {} failed)",
            self.contigs, self.contigs_over_limit, self.contigs_failed
        );
        info!(
            "Combinations evaluated: {} ({} perfect single matches)",
            self.combinations_evaluated, self.perfect_matches
        );
        if self.alignments_corrected > 0 {
            info!(
                "Splice corrections: {} across {} alignments",
                self.block_corrections, self.alignments_corrected
            );
        }
        info!("Contigs removed by identity/score filters: {}", self.contigs_filtered);
        info!(
            "Singles: {}, gapped singles: {}, pairs: {}, multiples: {}",
            self.singles, self.gap_alignments, self.pairs, self.multiples
        );
        for (category, count) in AlignmentCategory::ALL.iter().zip(self.categories) {
            if count > 0 {
                info!("  {category}: {count}");
            }
        }
        info!(
            "Fusion candidates: {} ({} pairs unclassified)",
            self.candidates(),
            self.unclassified_pairs
        );
    }
}
