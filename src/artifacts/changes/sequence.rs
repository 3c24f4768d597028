use crate::areas::metadata::Metadata;
use crate::artifacts::changes::PathMap;

/// Replays the commits of a branch, yielding the path map after each revision.
///
/// Revision 0 is loaded when the iterator is created, so a broken branch is
/// reported before anything is yielded.
pub struct SequentialPathSets<'m> {
    metadata: &'m Metadata,
    branch: usize,
    last_revision: usize,
    next_revision: usize,
    paths: PathMap,
    pending_first: bool,
}

impl<'m> SequentialPathSets<'m> {
    pub fn try_new(
        metadata: &'m Metadata,
        branch: usize,
        last_revision: usize,
    ) -> anyhow::Result<Self> {
        let mut paths = metadata.load_paths(branch, 0)?;
        paths.retain(|_, info| !info.is_deleted());

        Ok(SequentialPathSets {
            metadata,
            branch,
            last_revision,
            next_revision: 1,
            paths,
            pending_first: true,
        })
    }

    /// Replay everything and return the final path map
    pub fn replay_all(mut self) -> anyhow::Result<PathMap> {
        while self.advance().transpose()?.is_some() {}

        Ok(self.paths)
    }

    /// Apply the next revision's delta in place
    fn advance(&mut self) -> Option<anyhow::Result<usize>> {
        if self.pending_first {
            self.pending_first = false;
            return Some(Ok(0));
        }
        if self.next_revision > self.last_revision {
            return None;
        }

        let revision = self.next_revision;
        self.next_revision += 1;

        let delta = match self.metadata.load_paths(self.branch, revision) {
            Ok(delta) => delta,
            Err(error) => {
                self.next_revision = self.last_revision + 1;
                return Some(Err(error));
            }
        };
        for (path, info) in delta {
            if info.is_deleted() {
                self.paths.remove(&path);
            } else {
                self.paths.insert(path, info);
            }
        }

        Some(Ok(revision))
    }
}

impl Iterator for SequentialPathSets<'_> {
    type Item = anyhow::Result<(usize, PathMap)>;

    fn next(&mut self) -> Option<Self::Item> {
        self.advance()
            .map(|step| step.map(|revision| (revision, self.paths.clone())))
    }
}

/// The path map of `branch` as of `revision`
pub fn compute_sequential_path_set(
    metadata: &Metadata,
    branch: usize,
    revision: usize,
) -> anyhow::Result<PathMap> {
    SequentialPathSets::try_new(metadata, branch, revision)?.replay_all()
}
