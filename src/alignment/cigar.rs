// CIGAR operations shared by the SAM and PAF (cg:Z:) readers
use std::fmt;

use crate::coords::CoordPair;

/// CIGAR operation with its length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CigarOp {
    /// M: match/mismatch
    Match(u32),
    /// =: exact match
    Equal(u32),
    /// X: mismatch
    Diff(u32),
    /// I: insertion to the target
    Ins(u32),
    /// D: deletion from the target
    Del(u32),
    /// N: skipped target region
    RefSkip(u32),
    /// S: soft clip
    SoftClip(u32),
    /// H: hard clip
    HardClip(u32),
}

impl CigarOp {
    pub fn op_char(&self) -> char {
        match self {
            CigarOp::Match(_) => 'M',
            CigarOp::Equal(_) => '=',
            CigarOp::Diff(_) => 'X',
            CigarOp::Ins(_) => 'I',
            CigarOp::Del(_) => 'D',
            CigarOp::RefSkip(_) => 'N',
            CigarOp::SoftClip(_) => 'S',
            CigarOp::HardClip(_) => 'H',
        }
    }

    pub fn len(&self) -> u32 {
        match self {
            CigarOp::Match(n)
            | CigarOp::Equal(n)
            | CigarOp::Diff(n)
            | CigarOp::Ins(n)
            | CigarOp::Del(n)
            | CigarOp::RefSkip(n)
            | CigarOp::SoftClip(n)
            | CigarOp::HardClip(n) => *n,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn from_parts(len: u32, op: char) -> Option<Self> {
        Some(match op {
            'M' => CigarOp::Match(len),
            '=' => CigarOp::Equal(len),
            'X' => CigarOp::Diff(len),
            'I' => CigarOp::Ins(len),
            'D' => CigarOp::Del(len),
            'N' => CigarOp::RefSkip(len),
            'S' => CigarOp::SoftClip(len),
            'H' => CigarOp::HardClip(len),
            _ => return None,
        })
    }
}

impl fmt::Display for CigarOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.len(), self.op_char())
    }
}

/// Parse a CIGAR string such as `10S50M2I30M`.
pub fn parse_cigar(cigar: &str) -> Result<Vec<CigarOp>, String> {
    let mut ops = Vec::new();
    let mut len: Option<u32> = None;
    for c in cigar.chars() {
        if let Some(d) = c.to_digit(10) {
            let n = len.unwrap_or(0);
            len = Some(
                n.checked_mul(10)
                    .and_then(|n| n.checked_add(d))
                    .ok_or_else(|| format!("CIGAR length overflow in '{cigar}'"))?,
            );
            continue;
        }
        let n = len
            .take()
            .ok_or_else(|| format!("CIGAR operation '{c}' without length in '{cigar}'"))?;
        let op = CigarOp::from_parts(n, c)
            .ok_or_else(|| format!("unknown CIGAR operation '{c}' in '{cigar}'"))?;
        ops.push(op);
    }
    if len.is_some() {
        return Err(format!("trailing length without operation in '{cigar}'"));
    }
    if ops.is_empty() {
        return Err("empty CIGAR".to_string());
    }
    Ok(ops)
}

/// Blocks and counts derived from walking a CIGAR.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CigarWalk {
    /// Target blocks, increasing.
    pub target_blocks: Vec<CoordPair>,
    /// Query blocks on the aligned strand, increasing.
    pub query_blocks: Vec<CoordPair>,
    /// Bases clipped before the first aligned column, in CIGAR order.
    pub leading_clip: i64,
    /// Bases clipped after the last aligned column.
    pub trailing_clip: i64,
    /// Total query length implied by the CIGAR, hard clips included.
    pub query_len: i64,
    /// Aligned columns (M/=/X).
    pub aligned: i64,
    /// Columns explicitly marked `X`.
    pub diffs: i64,
    pub has_diff_op: bool,
    pub qnuminsert: i64,
    pub qbaseinsert: i64,
    pub tnuminsert: i64,
    pub tbaseinsert: i64,
}

/// Walk `ops` from 1-based positions `query_start` (aligned strand, clips
/// included) and `target_start`.
///
/// A new block starts after every insertion, deletion or skip, so adjacent
/// blocks are never both contiguous on query and target.
pub fn walk_cigar(ops: &[CigarOp], query_start: i64, target_start: i64) -> CigarWalk {
    let mut walk = CigarWalk::default();
    let mut qpos = query_start;
    let mut tpos = target_start;
    let mut open: Option<(i64, i64, i64)> = None; // (qstart, tstart, len)
    let mut seen_aligned = false;

    let close = |open: &mut Option<(i64, i64, i64)>, walk: &mut CigarWalk| {
        if let Some((qs, ts, len)) = open.take() {
            walk.query_blocks.push(CoordPair::new(qs, qs + len - 1));
            walk.target_blocks.push(CoordPair::new(ts, ts + len - 1));
        }
    };

    for op in ops {
        let n = op.len() as i64;
        walk.query_len += match op {
            CigarOp::Del(_) | CigarOp::RefSkip(_) => 0,
            _ => n,
        };
        match op {
            CigarOp::Match(_) | CigarOp::Equal(_) | CigarOp::Diff(_) => {
                if n == 0 {
                    continue;
                }
                seen_aligned = true;
                match open.as_mut() {
                    Some((_, _, len)) => *len += n,
                    None => open = Some((qpos, tpos, n)),
                }
                if let CigarOp::Diff(_) = op {
                    walk.has_diff_op = true;
                    walk.diffs += n;
                }
                walk.aligned += n;
                qpos += n;
                tpos += n;
            }
            CigarOp::Ins(_) => {
                close(&mut open, &mut walk);
                walk.qnuminsert += 1;
                walk.qbaseinsert += n;
                qpos += n;
            }
            CigarOp::Del(_) => {
                close(&mut open, &mut walk);
                walk.tnuminsert += 1;
                walk.tbaseinsert += n;
                tpos += n;
            }
            CigarOp::RefSkip(_) => {
                close(&mut open, &mut walk);
                tpos += n;
            }
            CigarOp::SoftClip(_) | CigarOp::HardClip(_) => {
                close(&mut open, &mut walk);
                if seen_aligned {
                    walk.trailing_clip += n;
                } else {
                    walk.leading_clip += n;
                }
                qpos += n;
            }
        }
    }
    close(&mut open, &mut walk);
    walk
}
