use crate::areas::repository::Repository;
use crate::artifacts::branch::revision::Revision;
use crate::artifacts::changes::ChangeKind;
use crate::artifacts::config::patterns::split_path;
use crate::artifacts::merge::engine::LineDiff;
use crate::artifacts::merge::{MergeBlock, MergeBlockType};
use crate::commands::porcelain::PathFilters;
use crate::errors::RepoResult;
use colored::Colorize;
use std::io::Write;

impl Repository {
    /// Show line differences of modified text files against a revision
    pub fn diff(&self, revision: Option<&str>, filters: &PathFilters) -> RepoResult<()> {
        self.require_offline()?;

        let (branch, revision) =
            Revision::try_parse(revision.unwrap_or_default())?.resolve(self)?;
        let changes = self.scan_against(branch, revision, filters, true)?;
        let rules = self.ignore_rules()?;

        for (kind, path, _) in changes.entries() {
            if kind != ChangeKind::Modified {
                writeln!(self.writer(), "{} {}", kind, path)?;
                continue;
            }
            let Some(info) = changes.modifications.get(path) else {
                continue;
            };

            let Some(old) = self.read_versioned(branch, revision, info)? else {
                writeln!(self.writer(), "{} {} (content unavailable)", kind, path)?;
                continue;
            };
            let new = self.workspace().read_file(path)?;
            let (_, name) = split_path(path);
            if !rules.is_text(name, &old) || !rules.is_text(name, &new) {
                writeln!(self.writer(), "BIN {}", path)?;
                continue;
            }

            let diff = LineDiff::compute(&old, &new);
            let eol = diff
                .theirs_eol
                .style
                .or(diff.mine_eol.style)
                .map(|style| style.to_string())
                .unwrap_or_else(|| "no EOL".to_string());
            writeln!(self.writer(), "{}", format!("DIF {}  <{}>", path, eol).bold())?;
            for block in &diff.blocks {
                self.print_diff_block(block)?;
            }
        }

        Ok(())
    }

    fn print_diff_block(&self, block: &MergeBlock<&[u8]>) -> RepoResult<()> {
        let removed = |offset: usize, line: &[u8]| {
            format!(
                "- | {:04} |{}|",
                block.mine_start + offset + 1,
                String::from_utf8_lossy(line)
            )
        };
        let added = |offset: usize, line: &[u8]| {
            format!(
                "+ | {:04} |{}|",
                block.theirs_start + offset + 1,
                String::from_utf8_lossy(line)
            )
        };

        match block.kind {
            MergeBlockType::Keep => {}
            MergeBlockType::Insert | MergeBlockType::Remove | MergeBlockType::Replace => {
                for (offset, line) in block.mine.iter().enumerate() {
                    writeln!(self.writer(), "{}", removed(offset, line).red())?;
                }
                for (offset, line) in block.theirs.iter().enumerate() {
                    writeln!(self.writer(), "{}", added(offset, line).green())?;
                }
            }
        }

        Ok(())
    }
}
