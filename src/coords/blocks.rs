// Block lists: ordered, non-overlapping runs of CoordPair
use super::CoordPair;
use crate::error::CoordError;

fn check_order(blocks: &[CoordPair]) -> Result<(), CoordError> {
    for (index, pair) in blocks.windows(2).enumerate() {
        if pair[0].min() > pair[1].min() {
            return Err(CoordError::OutOfOrder { index: index + 1 });
        }
    }
    Ok(())
}

/// Trim or pad an ordered block list to exactly `target_length` positions,
/// counting from the left end (`from_left`) or from the right end.
///
/// Whole blocks are kept while they fit, the block straddling the target is
/// cut, and a shortfall is made up by extending the outermost kept block.
pub fn cut_or_extend_blocks(
    blocks: &[CoordPair],
    target_length: i64,
    from_left: bool,
) -> Result<Vec<CoordPair>, CoordError> {
    check_order(blocks)?;
    if target_length < 0 {
        return Err(CoordError::InvalidSpan {
            min: 1,
            max: target_length,
        });
    }

    let mut remaining = target_length;
    let mut output: Vec<CoordPair> = Vec::with_capacity(blocks.len());
    let ordered: Box<dyn Iterator<Item = &CoordPair>> = if from_left {
        Box::new(blocks.iter())
    } else {
        Box::new(blocks.iter().rev())
    };

    for block in ordered {
        if remaining == 0 {
            break;
        }
        if remaining > block.span() {
            output.push(block.clone());
            remaining -= block.span();
        } else {
            let part = if from_left {
                CoordPair::from_bounds(block.min(), block.min() + remaining - 1, block.pos_strand())?
            } else {
                CoordPair::from_bounds(block.max() - remaining + 1, block.max(), block.pos_strand())?
            };
            remaining -= part.span();
            output.push(part);
        }
    }

    if remaining > 0 {
        let last = output
            .last_mut()
            .ok_or(CoordError::ExtensionUnsatisfiable { remaining })?;
        if from_left {
            last.move_max(remaining)?;
        } else {
            last.move_min(-remaining)?;
        }
    }

    if !from_left {
        output.reverse();
    }
    Ok(output)
}

/// Collapse touching blocks (`a.max + 1 == b.min`) into single runs.
///
/// Overlapping or unordered input is rejected rather than repaired.
pub fn merge_adjacent_blocks(blocks: &[CoordPair]) -> Result<Vec<CoordPair>, CoordError> {
    let mut output: Vec<CoordPair> = Vec::with_capacity(blocks.len());
    for (index, block) in blocks.iter().enumerate() {
        let Some(back) = output.last_mut() else {
            output.push(block.clone());
            continue;
        };
        if back.min() > block.min() {
            return Err(CoordError::OutOfOrder { index });
        }
        if back.max() < block.min() - 1 {
            output.push(block.clone());
        } else if back.max() == block.min() - 1 {
            back.set_max(block.max())?;
        } else {
            return Err(CoordError::OverlappingBlocks { index });
        }
    }
    Ok(output)
}
