use crate::areas::repository::Repository;
use crate::artifacts::branch::format_millis;
use crate::commands::porcelain::PathFilters;
use crate::errors::RepoResult;
use colored::Colorize;
use std::io::Write;

impl Repository {
    pub fn status(&self) -> RepoResult<()> {
        self.require_offline()?;

        let state = self.state().clone();
        let current = state.flags.branch;
        let mode = match (state.flags.track, state.flags.picky) {
            (true, _) => "track",
            (_, true) => "picky",
            _ => "simple",
        };
        let mut flags = Vec::new();
        if state.flags.strict {
            flags.push("strict");
        }
        if state.flags.compress {
            flags.push("compressed");
        }
        writeln!(
            self.writer(),
            "Offline repository at {} in {} mode{}",
            self.path().display(),
            mode,
            if flags.is_empty() {
                String::new()
            } else {
                format!(" ({})", flags.join(", "))
            }
        )?;

        let last = self.last_revision(current)?;
        let changes = self.scan_against(current, last, &PathFilters::default(), false)?;
        if changes.is_empty() {
            writeln!(self.writer(), "File tree is unchanged vs. b{}/r{:02}", current, last)?;
        } else {
            writeln!(
                self.writer(),
                "{}",
                format!(
                    "File tree has changes vs. b{}/r{:02} (+{:02}/-{:02}/~{:02})",
                    current,
                    last,
                    changes.additions.len(),
                    changes.deletions.len(),
                    changes.modifications.len()
                )
                .yellow()
            )?;
        }

        writeln!(self.writer(), "Branches:")?;
        for (number, branch) in &state.branches {
            let commits = self.commits_of(*number)?.len();
            writeln!(
                self.writer(),
                "{} b{:02}{} @{} ({}) with {} commit{}",
                if *number == current { "*" } else { " " },
                number,
                branch
                    .name
                    .as_ref()
                    .map(|name| format!(" '{}'", name))
                    .unwrap_or_default(),
                format_millis(branch.ctime),
                if branch.in_sync { "in sync" } else { "dirty" },
                commits,
                if commits == 1 { "" } else { "s" }
            )?;
        }

        if !state.is_simple_mode()
            && let Some(branch) = state.branches.get(&current)
        {
            writeln!(self.writer(), "Tracked patterns: {}", branch.tracked.join(", "))?;
            writeln!(self.writer(), "Untracked patterns: {}", branch.untracked.join(", "))?;
        }
        if !state.flags.tags.is_empty() {
            writeln!(self.writer(), "Tags: {}", state.flags.tags.join(", "))?;
        }

        Ok(())
    }
}
