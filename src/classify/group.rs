use crate::alignment::Alignment;

/// Surviving alignments per contig, split by how many were selected.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContigGroups {
    /// One single-block alignment.
    pub singles: Vec<Alignment>,
    /// One alignment with several blocks.
    pub gap_alignments: Vec<Alignment>,
    /// Two alignments, ordered by contig start.
    pub pairs: Vec<(Alignment, Alignment)>,
    pub multiples: Vec<Vec<Alignment>>,
}

impl ContigGroups {
    pub fn contig_count(&self) -> usize {
        self.singles.len() + self.gap_alignments.len() + self.pairs.len() + self.multiples.len()
    }
}

pub fn group_alignments(selected: Vec<Vec<Alignment>>) -> ContigGroups {
    let mut groups = ContigGroups::default();
    for mut alignments in selected {
        alignments.sort_by_key(|a| (a.query_start, a.query_end));
        match alignments.len() {
            0 => {}
            1 => {
                let single = alignments.remove(0);
                if single.block_count() > 1 {
                    groups.gap_alignments.push(single);
                } else {
                    groups.singles.push(single);
                }
            }
            2 => {
                let second = alignments.remove(1);
                let first = alignments.remove(0);
                groups.pairs.push((first, second));
            }
            _ => groups.multiples.push(alignments),
        }
    }
    groups
}
