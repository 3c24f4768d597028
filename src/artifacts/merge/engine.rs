use crate::artifacts::merge::diff::{DiffAlgorithm, Edit, MyersDiff};
use crate::artifacts::merge::eol::{EolDetection, EolStyle, detect_eol, split_lines};
use crate::artifacts::merge::{
    BlockPreview, MergeBlock, MergeBlockType, MergeChoice, MergeDecider, MergeOperation,
    MergeOptions, debug_log,
};

/// Line blocks of two buffers together with their detected line endings
#[derive(Debug, Clone)]
pub struct LineDiff<'c> {
    pub blocks: Vec<MergeBlock<&'c [u8]>>,
    pub mine_eol: EolDetection,
    pub theirs_eol: EolDetection,
}

impl<'c> LineDiff<'c> {
    pub fn compute(mine: &'c [u8], theirs: &'c [u8]) -> Self {
        let mine_eol = detect_eol(mine);
        let theirs_eol = detect_eol(theirs);
        let mine_lines = split_lines(mine, mine_eol.style);
        let theirs_lines = split_lines(theirs, theirs_eol.style);

        LineDiff {
            blocks: build_blocks(&mine_lines, &theirs_lines),
            mine_eol,
            theirs_eol,
        }
    }

    pub fn has_changes(&self) -> bool {
        self.blocks
            .iter()
            .any(|block| block.kind != MergeBlockType::Keep)
    }
}

/// Group a Myers edit script of mine into theirs into aligned blocks
pub fn build_blocks<T: Eq + Clone>(mine: &[T], theirs: &[T]) -> Vec<MergeBlock<T>> {
    let edits = MyersDiff::new(mine, theirs).diff();

    let mut blocks = Vec::new();
    let mut pending: Option<(bool, MergeBlock<T>)> = None;
    let (mut mine_index, mut theirs_index) = (0, 0);

    for edit in edits {
        let keep = matches!(edit, Edit::Equal { .. });
        if pending
            .as_ref()
            .is_some_and(|(pending_keep, _)| *pending_keep != keep)
            && let Some((_, block)) = pending.take()
        {
            blocks.push(block);
        }

        let (_, block) = pending.get_or_insert_with(|| {
            (
                keep,
                MergeBlock {
                    kind: MergeBlockType::Keep,
                    mine: Vec::new(),
                    theirs: Vec::new(),
                    mine_start: mine_index,
                    theirs_start: theirs_index,
                },
            )
        });

        match edit {
            Edit::Equal { value } => {
                block.mine.push(value.clone());
                block.theirs.push(value);
                mine_index += 1;
                theirs_index += 1;
            }
            Edit::Delete { value } => {
                block.mine.push(value);
                mine_index += 1;
            }
            Edit::Insert { value } => {
                block.theirs.push(value);
                theirs_index += 1;
            }
        }
    }
    if let Some((_, block)) = pending {
        blocks.push(block);
    }

    for block in blocks.iter_mut() {
        block.kind = match (block.mine.is_empty(), block.theirs.is_empty()) {
            _ if block.mine == block.theirs => MergeBlockType::Keep,
            (true, false) => MergeBlockType::Insert,
            (false, true) => MergeBlockType::Remove,
            _ => MergeBlockType::Replace,
        };
    }

    blocks
}

/// Merge theirs into mine at line granularity, then per single-line
/// replacement at character granularity.
///
/// Identical inputs always come back unchanged.
pub fn merge(
    mine: &[u8],
    theirs: &[u8],
    options: &MergeOptions,
    decider: &mut dyn MergeDecider,
) -> Vec<u8> {
    let diff = LineDiff::compute(mine, theirs);
    let newline = choose_eol(&diff, options.use_remote_eol);

    let mut lines: Vec<Vec<u8>> = Vec::new();
    for block in &diff.blocks {
        debug_log!(
            "line block {:?} at {}: -{} +{}",
            block.kind,
            block.mine_start,
            block.mine.len(),
            block.theirs.len()
        );

        let char_merge = block.kind == MergeBlockType::Replace
            && block.mine.len() == 1
            && block.theirs.len() == 1
            && !options.line_operation.contains(MergeOperation::ASK);

        if char_merge {
            lines.push(merge_line(
                block.mine[0],
                block.theirs[0],
                block.mine_start,
                options.char_operation,
                decider,
            ));
        } else {
            let resolved = resolve_block(block, options.line_operation, decider, false, |lines| {
                lines
                    .iter()
                    .map(|line| String::from_utf8_lossy(line).to_string())
                    .collect::<Vec<_>>()
                    .join("\n")
            });
            lines.extend(resolved.into_iter().map(<[u8]>::to_vec));
        }
    }

    lines.join(newline.as_bytes())
}

fn choose_eol(diff: &LineDiff, use_remote_eol: bool) -> EolStyle {
    for (side, detection) in [("mine", diff.mine_eol), ("theirs", diff.theirs_eol)] {
        if detection.mixed {
            tracing::warn!(
                "Inconsistent line endings in {}; using dominant {}",
                side,
                detection.style.unwrap_or(EolStyle::Lf)
            );
        }
    }

    match (diff.mine_eol.style, diff.theirs_eol.style) {
        (Some(mine), Some(theirs)) if mine != theirs => {
            let chosen = if use_remote_eol { theirs } else { mine };
            tracing::warn!(
                "Differing line endings: mine {} and theirs {}; using {}",
                mine,
                theirs,
                chosen
            );
            chosen
        }
        (Some(mine), Some(theirs)) => {
            if use_remote_eol {
                theirs
            } else {
                mine
            }
        }
        (Some(mine), None) => mine,
        (None, Some(theirs)) => theirs,
        (None, None) => EolStyle::Lf,
    }
}

/// Merge two versions of a single line character by character
fn merge_line(
    mine: &[u8],
    theirs: &[u8],
    line: usize,
    operation: MergeOperation,
    decider: &mut dyn MergeDecider,
) -> Vec<u8> {
    match (std::str::from_utf8(mine), std::str::from_utf8(theirs)) {
        (Ok(mine), Ok(theirs)) => {
            let mine = mine.chars().collect::<Vec<_>>();
            let theirs = theirs.chars().collect::<Vec<_>>();
            merge_units(&mine, &theirs, line, operation, decider, |chars| {
                chars.iter().collect()
            })
            .into_iter()
            .collect::<String>()
            .into_bytes()
        }
        _ => merge_units(mine, theirs, line, operation, decider, |bytes| {
            String::from_utf8_lossy(bytes).to_string()
        }),
    }
}

fn merge_units<T: Eq + Clone>(
    mine: &[T],
    theirs: &[T],
    line: usize,
    operation: MergeOperation,
    decider: &mut dyn MergeDecider,
    preview: impl Fn(&[T]) -> String,
) -> Vec<T> {
    build_blocks(mine, theirs)
        .into_iter()
        .flat_map(|mut block| {
            block.mine_start = line;
            resolve_block(&block, operation, decider, true, &preview)
        })
        .collect()
}

/// Apply a policy to one block, asking the decider for `ASK`
fn resolve_block<T: Clone>(
    block: &MergeBlock<T>,
    operation: MergeOperation,
    decider: &mut dyn MergeDecider,
    intra_line: bool,
    preview: impl Fn(&[T]) -> String,
) -> Vec<T> {
    if block.kind == MergeBlockType::Keep {
        return block.mine.clone();
    }

    if operation.contains(MergeOperation::ASK) {
        let choice = decider.resolve_block(&BlockPreview {
            kind: block.kind,
            mine: preview(&block.mine),
            theirs: preview(&block.theirs),
            mine_start: block.mine_start,
            intra_line,
        });
        debug_log!("block at {} resolved as {:?}", block.mine_start, choice);

        return match choice {
            MergeChoice::Mine => block.mine.clone(),
            MergeChoice::Theirs => block.theirs.clone(),
            MergeChoice::Both => [block.mine.as_slice(), block.theirs.as_slice()].concat(),
        };
    }

    match block.kind {
        MergeBlockType::Keep => block.mine.clone(),
        MergeBlockType::Insert if operation.contains(MergeOperation::INSERT) => {
            block.theirs.clone()
        }
        MergeBlockType::Insert => Vec::new(),
        MergeBlockType::Remove if operation.contains(MergeOperation::REMOVE) => Vec::new(),
        MergeBlockType::Remove => block.mine.clone(),
        MergeBlockType::Replace if operation == MergeOperation::BOTH => block.theirs.clone(),
        MergeBlockType::Replace if operation.contains(MergeOperation::INSERT) => {
            [block.mine.as_slice(), block.theirs.as_slice()].concat()
        }
        MergeBlockType::Replace => Vec::new(),
    }
}
