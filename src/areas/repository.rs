use crate::areas::metadata::{METADATA_FOLDER, Metadata, RepositoryRecord};
use crate::areas::store::{METADATA_FILE, Store};
use crate::areas::workspace::Workspace;
use crate::artifacts::branch::{BranchInfo, CommitInfo, RepoFlags};
use crate::artifacts::changes::detector::{ChangeDetector, FindOptions};
use crate::artifacts::changes::sequence::compute_sequential_path_set;
use crate::artifacts::changes::{PathInfo, PathMap};
use crate::artifacts::config::patterns::{IgnoreRules, TrackingPatterns, normalize_pattern};
use crate::artifacts::config::{Config, ConfigLayer};
use crate::errors::{RepoError, RepoResult};
use bytes::Bytes;
use std::cell::{Ref, RefCell, RefMut};
use std::collections::BTreeMap;
use std::path::Path;

/// Everything loaded from the repository metadata file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepositoryState {
    pub flags: RepoFlags,
    pub branches: BTreeMap<usize, BranchInfo>,
    pub local_config: ConfigLayer,
}

impl From<RepositoryRecord> for RepositoryState {
    fn from(RepositoryRecord(flags, branches, local_config): RepositoryRecord) -> Self {
        RepositoryState {
            flags,
            branches: branches
                .into_iter()
                .map(|branch| (branch.number, branch))
                .collect(),
            local_config,
        }
    }
}

impl RepositoryState {
    fn to_record(&self) -> RepositoryRecord {
        RepositoryRecord(
            self.flags.clone(),
            self.branches.values().cloned().collect(),
            self.local_config.clone(),
        )
    }

    /// Neither tracking nor picky: every file in the tree is versioned
    pub fn is_simple_mode(&self) -> bool {
        !(self.flags.track || self.flags.picky)
    }
}

/// Which files a scan looks at, derived from branch patterns and command options
#[derive(Debug, Clone, Default)]
pub struct ScanScope {
    pub consider_only: Option<TrackingPatterns>,
    pub dont_consider: Option<TrackingPatterns>,
}

impl ScanScope {
    pub fn find_options(&self) -> FindOptions<'_> {
        FindOptions {
            consider_only: self.consider_only.as_ref(),
            dont_consider: self.dont_consider.as_ref(),
            ..FindOptions::default()
        }
    }
}

pub struct Repository {
    path: Box<Path>,
    writer: RefCell<Box<dyn std::io::Write>>,
    workspace: Workspace,
    metadata: Metadata,
    store: Store,
    global_config: ConfigLayer,
    state: RefCell<RepositoryState>,
}

impl Repository {
    pub fn new(path: &Path, writer: Box<dyn std::io::Write>) -> anyhow::Result<Self> {
        let path = path.canonicalize()?;
        let metadata_path = path.join(METADATA_FOLDER);

        let metadata = Metadata::new(metadata_path.clone().into_boxed_path());
        let state = if metadata.exists() {
            RepositoryState::from(metadata.load_repository())
        } else {
            RepositoryState::default()
        };

        Ok(Repository {
            workspace: Workspace::new(path.clone().into_boxed_path()),
            store: Store::new(metadata_path.into_boxed_path()),
            metadata,
            path: path.into_boxed_path(),
            writer: RefCell::new(writer),
            global_config: ConfigLayer::load_global(),
            state: RefCell::new(state),
        })
    }

    /// Open the closest enclosing offline repository, or `start` itself when
    /// none of its ancestors has one
    pub fn discover(start: &Path, writer: Box<dyn std::io::Write>) -> anyhow::Result<Self> {
        let start = start.canonicalize()?;
        let root = start
            .ancestors()
            .find(|dir| dir.join(METADATA_FOLDER).join(METADATA_FILE).is_file())
            .unwrap_or(start.as_path())
            .to_path_buf();
        tracing::debug!("Using repository root {}", root.display());

        Self::new(&root, writer)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn writer(&'_ self) -> RefMut<'_, Box<dyn std::io::Write>> {
        self.writer.borrow_mut()
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn state(&self) -> Ref<'_, RepositoryState> {
        self.state.borrow()
    }

    pub fn state_mut(&self) -> RefMut<'_, RepositoryState> {
        self.state.borrow_mut()
    }

    pub fn global_config(&self) -> &ConfigLayer {
        &self.global_config
    }

    pub fn config(&self) -> Config {
        Config::resolve(&self.global_config, &self.state().local_config)
    }

    pub fn is_offline(&self) -> bool {
        self.metadata.exists()
    }

    pub fn require_offline(&self) -> RepoResult<()> {
        if self.is_offline() && !self.state().branches.is_empty() {
            return Ok(());
        }

        Err(RepoError::user(
            "No offline repository found. Use 'sos offline' to start working offline",
        ))
    }

    pub fn save_state(&self) -> RepoResult<()> {
        let record = self.state().to_record();
        self.metadata.save_repository(&record)?;

        Ok(())
    }

    pub fn ignore_rules(&self) -> RepoResult<IgnoreRules> {
        IgnoreRules::try_from_config(&self.config())
            .map_err(|error| RepoError::user(format!("{:#}", error)))
    }

    pub fn current_branch(&self) -> usize {
        self.state().flags.branch
    }

    pub fn branch_info(&self, branch: usize) -> RepoResult<BranchInfo> {
        self.state()
            .branches
            .get(&branch)
            .cloned()
            .ok_or_else(|| RepoError::user(format!("Unknown branch b{}", branch)))
    }

    pub fn update_branch(
        &self,
        branch: usize,
        update: impl FnOnce(&mut BranchInfo),
    ) -> RepoResult<()> {
        let mut state = self.state_mut();
        let info = state
            .branches
            .get_mut(&branch)
            .ok_or_else(|| RepoError::user(format!("Unknown branch b{}", branch)))?;
        update(info);

        Ok(())
    }

    pub fn commits_of(&self, branch: usize) -> RepoResult<BTreeMap<usize, CommitInfo>> {
        Ok(self.metadata.load_commits(branch)?)
    }

    pub fn last_revision(&self, branch: usize) -> RepoResult<usize> {
        self.commits_of(branch)?
            .keys()
            .next_back()
            .copied()
            .ok_or_else(|| RepoError::integrity(format!("Branch b{} has no commits", branch)))
    }

    /// Path map of `branch` as of `revision`, deletions already applied
    pub fn path_set(&self, branch: usize, revision: usize) -> RepoResult<PathMap> {
        Ok(compute_sequential_path_set(&self.metadata, branch, revision)?)
    }

    pub fn detector<'r>(&'r self, rules: &'r IgnoreRules) -> ChangeDetector<'r> {
        ChangeDetector::new(
            &self.workspace,
            &self.store,
            rules,
            self.state().flags.compress,
        )
    }

    /// Tracked (or untracked) patterns of `branch`; `None` in simple mode
    pub fn tracking_patterns(
        &self,
        branch: usize,
        negative: bool,
    ) -> RepoResult<Option<Vec<String>>> {
        if self.state().is_simple_mode() {
            return Ok(None);
        }
        let info = self.branch_info(branch)?;

        Ok(Some(if negative { info.untracked } else { info.tracked }))
    }

    /// Combine branch tracking patterns with `--only`/`--except` options.
    ///
    /// In tracking modes `--only` narrows the tracked patterns to those also
    /// given on the command line.
    pub fn scan_scope(
        &self,
        branches: &[usize],
        only: &[String],
        except: &[String],
    ) -> RepoResult<ScanScope> {
        let only = only
            .iter()
            .map(|pattern| normalize_pattern(pattern))
            .collect::<Vec<_>>();
        let mut except = except
            .iter()
            .map(|pattern| normalize_pattern(pattern))
            .collect::<Vec<_>>();

        let mut tracked: Option<Vec<String>> = None;
        for branch in branches {
            if let Some(patterns) = self.tracking_patterns(*branch, false)? {
                let union = tracked.get_or_insert_with(Vec::new);
                for pattern in patterns {
                    if !union.contains(&pattern) {
                        union.push(pattern);
                    }
                }
            }
            for pattern in self.tracking_patterns(*branch, true)?.unwrap_or_default() {
                if !except.contains(&pattern) {
                    except.push(pattern);
                }
            }
        }

        let consider_only = match (tracked, only.is_empty()) {
            (None, true) => None,
            (None, false) => Some(only),
            (Some(tracked), true) => Some(tracked),
            (Some(tracked), false) => Some(
                tracked
                    .into_iter()
                    .filter(|pattern| only.contains(pattern))
                    .collect(),
            ),
        };

        let parse = |patterns: Vec<String>| {
            TrackingPatterns::try_parse(&patterns)
                .map_err(|error| RepoError::user(format!("{:#}", error)))
        };

        Ok(ScanScope {
            consider_only: consider_only.map(parse).transpose()?,
            dont_consider: (!except.is_empty()).then(|| parse(except)).transpose()?,
        })
    }

    /// Contents of a versioned file; `None` when the blob cannot be read
    pub fn read_versioned(
        &self,
        branch: usize,
        revision: usize,
        info: &PathInfo,
    ) -> RepoResult<Option<Bytes>> {
        if info.size.unwrap_or_default() == 0 {
            return Ok(Some(Bytes::new()));
        }

        Ok(self.store.read_or_copy(
            branch,
            revision,
            &info.name_hash,
            self.state().flags.compress,
            None,
        )?)
    }

    /// Write a versioned file back into the working tree with its recorded mtime
    pub fn restore_file(
        &self,
        branch: usize,
        revision: usize,
        path: &str,
        info: &PathInfo,
    ) -> RepoResult<()> {
        if info.size.unwrap_or_default() == 0 {
            self.workspace.write_file(path, &[])?;
        } else {
            let target = self.workspace.absolute(path);
            let restored = self.store.read_or_copy(
                branch,
                revision,
                &info.name_hash,
                self.state().flags.compress,
                Some(&target),
            )?;
            if restored.is_none() {
                tracing::warn!("Could not restore {} from b{}/r{}", path, branch, revision);
                return Ok(());
            }
        }
        self.workspace.set_mtime(path, info.mtime)?;

        Ok(())
    }
}
