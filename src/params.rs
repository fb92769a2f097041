use std::path::PathBuf;

use clap::Parser;

use crate::classify::PairThresholds;
use crate::error::Error;
use crate::select::SelectionConfig;
use crate::splice::SpliceMotifs;

// ---------------------------------------------------------------------------
// Input method enum
// ---------------------------------------------------------------------------

/// Aligner that produced the input, which fixes the record format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMethod {
    /// BLAT PSL
    Blat,
    Minimap2Sam,
    Minimap2Paf,
}

impl std::str::FromStr for InputMethod {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "blat" => Ok(Self::Blat),
            "minimap2sam" => Ok(Self::Minimap2Sam),
            "minimap2paf" => Ok(Self::Minimap2Paf),
            _ => Err(format!(
                "unknown method '{s}'; expected 'blat', 'minimap2sam' or 'minimap2paf'"
            )),
        }
    }
}

impl std::fmt::Display for InputMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Blat => write!(f, "blat"),
            Self::Minimap2Sam => write!(f, "minimap2sam"),
            Self::Minimap2Paf => write!(f, "minimap2paf"),
        }
    }
}

// ---------------------------------------------------------------------------
// Parameters struct
// ---------------------------------------------------------------------------

/// denovofusion command-line parameters.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "denovofusion",
    about = "Gene-fusion candidate discovery from assembled contig alignments",
    version
)]
pub struct Parameters {
    // ── Input ───────────────────────────────────────────────────────────
    /// Aligner used: blat, minimap2sam or minimap2paf
    #[arg(short = 'm', long = "method")]
    pub method: InputMethod,

    /// Alignment file (PSL, SAM or PAF; may be gzipped)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,

    /// Assembled contigs (FASTA)
    #[arg(short = 'a', long = "assembly")]
    pub assembly: PathBuf,

    /// Reference genome (FASTA); enables splice-junction correction
    #[arg(short = 'R', long = "reference")]
    pub reference: Option<PathBuf>,

    // ── Output ──────────────────────────────────────────────────────────
    /// Output directory
    #[arg(short = 'o', long = "output", default_value = ".")]
    pub output: PathBuf,

    /// Prefix of output file names
    #[arg(short = 'p', long = "prefix", default_value = "denovofusion")]
    pub prefix: String,

    // ── Selection ───────────────────────────────────────────────────────
    /// Contigs with more alignments than this are skipped
    #[arg(short = 'c', long = "max-alignment-count", default_value_t = 100)]
    pub max_alignment_count: usize,

    /// Largest number of alignments combined per contig
    #[arg(short = 'n', long = "max-pair-combination", default_value_t = 3)]
    pub max_pair_combination: usize,

    /// Weight of the contig fraction covered by a combination
    #[arg(short = 'I', long = "inclusion-fraction-weight", default_value_t = 1.0)]
    pub inclusion_fraction_weight: f64,

    /// Weight of the contig fraction covered more than once
    #[arg(short = 'O', long = "overlap-fraction-weight", default_value_t = 1.0)]
    pub overlap_fraction_weight: f64,

    /// Penalty per alignment in a combination
    #[arg(short = 'S', long = "size-weight", default_value_t = 1.0)]
    pub size_weight: f64,

    // ── Filters ─────────────────────────────────────────────────────────
    /// Selected alignments must have identity above this fraction
    #[arg(short = 'd', long = "min-identity-fract", default_value_t = 0.95)]
    pub min_identity_fract: f64,

    /// Each selected alignment must score above this
    #[arg(short = 'e', long = "min-score-each", default_value_t = 10)]
    pub min_score_each: i64,

    /// Summed score of a contig's alignments must exceed this
    #[arg(short = 's', long = "min-score-total", default_value_t = 95)]
    pub min_score_total: i64,

    // ── Classification ──────────────────────────────────────────────────
    /// Largest contig overlap between a pair, in bases
    #[arg(short = 'l', long = "max-overlap-size", default_value_t = 8)]
    pub max_overlap_size: i64,

    /// Largest contig gap between a pair, in bases
    #[arg(short = 'f', long = "max-gap-size", default_value_t = 2)]
    pub max_gap_size: i64,

    // ── Splice correction ───────────────────────────────────────────────
    /// Differences allowed when absorbing an unaligned stretch
    #[arg(long = "max-unaligned-diff", default_value_t = 5)]
    pub max_unaligned_diff: i64,

    /// Accepted splice-site motifs (donor + acceptor dinucleotides)
    #[arg(
        long = "splice-motifs",
        value_delimiter = ',',
        default_values_t = vec!["GTAG".to_string(), "GCAG".to_string(), "ATAC".to_string()]
    )]
    pub splice_motifs: Vec<String>,

    // ── Run ─────────────────────────────────────────────────────────────
    /// Number of worker threads
    #[arg(short = 'q', long = "threads", default_value_t = 4)]
    pub threads: usize,
}

impl Parameters {
    pub fn selection_config(&self) -> SelectionConfig {
        SelectionConfig {
            max_combination: self.max_pair_combination,
            inclusion_weight: self.inclusion_fraction_weight,
            overlap_weight: self.overlap_fraction_weight,
            size_weight: self.size_weight,
        }
    }

    pub fn pair_thresholds(&self) -> PairThresholds {
        PairThresholds {
            max_overlap: self.max_overlap_size,
            max_gap: self.max_gap_size,
        }
    }

    pub fn motifs(&self) -> Result<SpliceMotifs, Error> {
        SpliceMotifs::new(&self.splice_motifs)
    }

    /// Validate parameter combinations that clap alone cannot enforce.
    pub fn validate(&self) -> Result<(), Error> {
        if self.max_pair_combination == 0 {
            return Err(Error::Parameter("--max-pair-combination must be >= 1".into()));
        }

        if self.threads == 0 {
            return Err(Error::Parameter("--threads must be >= 1".into()));
        }

        let weights = [
            ("--inclusion-fraction-weight", self.inclusion_fraction_weight),
            ("--overlap-fraction-weight", self.overlap_fraction_weight),
            ("--size-weight", self.size_weight),
        ];
        if let Some((name, _)) = weights.iter().find(|(_, w)| !w.is_finite()) {
            return Err(Error::Parameter(format!("{name} must be a finite number")));
        }

        if !(0.0..=1.0).contains(&self.min_identity_fract) {
            return Err(Error::Parameter(
                "--min-identity-fract must be between 0 and 1".into(),
            ));
        }

        if self.max_overlap_size < 0 || self.max_gap_size < 0 {
            return Err(Error::Parameter(
                "--max-overlap-size and --max-gap-size must be >= 0".into(),
            ));
        }

        if self.max_unaligned_diff < 0 {
            return Err(Error::Parameter("--max-unaligned-diff must be >= 0".into()));
        }

        self.motifs()?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    /// Helper: parse a command line (without program name).
    fn parse(args: &[&str]) -> Parameters {
        let mut full = vec!["denovofusion"];
        full.extend_from_slice(args);
        Parameters::parse_from(full)
    }

    const REQUIRED: [&str; 6] = ["-m", "blat", "-i", "aln.psl", "-a", "contigs.fa"];

    #[test]
    fn defaults() {
        let p = parse(&REQUIRED);
        assert_eq!(p.method, InputMethod::Blat);
        assert_eq!(p.input, PathBuf::from("aln.psl"));
        assert_eq!(p.assembly, PathBuf::from("contigs.fa"));
        assert_eq!(p.reference, None);
        assert_eq!(p.output, PathBuf::from("."));
        assert_eq!(p.prefix, "denovofusion");
        assert_eq!(p.max_alignment_count, 100);
        assert_eq!(p.min_identity_fract, 0.95);
        assert_eq!(p.min_score_each, 10);
        assert_eq!(p.min_score_total, 95);
        assert_eq!(p.max_pair_combination, 3);
        assert_eq!(p.max_overlap_size, 8);
        assert_eq!(p.max_gap_size, 2);
        assert_eq!(p.max_unaligned_diff, 5);
        assert_eq!(p.threads, 4);
        assert_eq!(p.splice_motifs, vec!["GTAG", "GCAG", "ATAC"]);
        assert!(p.validate().is_ok());
        assert_eq!(p.selection_config(), SelectionConfig::default());
        assert_eq!(p.pair_thresholds(), PairThresholds::default());
    }

    #[test]
    fn typical_command() {
        let p = parse(&[
            "--method",
            "minimap2paf",
            "--input",
            "aln.paf.gz",
            "--assembly",
            "trinity.fa",
            "--reference",
            "hg38.fa",
            "-o",
            "/out",
            "-p",
            "sample1",
            "-n",
            "2",
            "-S",
            "0.5",
            "-l",
            "12",
            "-f",
            "5",
            "-q",
            "16",
            "--splice-motifs",
            "GTAG,GCAG",
        ]);
        assert_eq!(p.method, InputMethod::Minimap2Paf);
        assert_eq!(p.reference, Some(PathBuf::from("hg38.fa")));
        assert_eq!(p.output, PathBuf::from("/out"));
        assert_eq!(p.prefix, "sample1");
        assert_eq!(p.selection_config().max_combination, 2);
        assert_eq!(p.selection_config().size_weight, 0.5);
        assert_eq!(
            p.pair_thresholds(),
            PairThresholds {
                max_overlap: 12,
                max_gap: 5
            }
        );
        assert_eq!(p.threads, 16);
        assert_eq!(p.motifs().unwrap().len(), 2);
    }

    #[test]
    fn method_names() {
        assert_eq!("minimap2sam".parse::<InputMethod>().unwrap(), InputMethod::Minimap2Sam);
        assert!("bwa".parse::<InputMethod>().is_err());
        assert_eq!(InputMethod::Minimap2Paf.to_string(), "minimap2paf");
        assert!(Parameters::try_parse_from(["denovofusion", "-m", "bwa", "-i", "a", "-a", "b"]).is_err());
    }

    #[test]
    fn validate_combination_ceiling() {
        let mut args = REQUIRED.to_vec();
        args.extend_from_slice(&["-n", "0"]);
        let err = parse(&args).validate().unwrap_err();
        assert!(err.to_string().contains("--max-pair-combination"));
    }

    #[test]
    fn validate_threads() {
        let mut args = REQUIRED.to_vec();
        args.extend_from_slice(&["-q", "0"]);
        assert!(parse(&args).validate().is_err());
    }

    #[test]
    fn validate_identity_range() {
        let mut args = REQUIRED.to_vec();
        args.extend_from_slice(&["-d", "1.5"]);
        let err = parse(&args).validate().unwrap_err();
        assert!(err.to_string().contains("--min-identity-fract"));
    }

    #[test]
    fn validate_weights_finite() {
        let mut args = REQUIRED.to_vec();
        args.extend_from_slice(&["-O", "inf"]);
        let err = parse(&args).validate().unwrap_err();
        assert!(err.to_string().contains("--overlap-fraction-weight"));
    }

    #[test]
    fn validate_motifs() {
        let mut args = REQUIRED.to_vec();
        args.extend_from_slice(&["--splice-motifs", "GTAG,GTNAG"]);
        let err = parse(&args).validate().unwrap_err();
        assert!(err.to_string().contains("GTNAG"));
    }
}
