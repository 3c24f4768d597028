use crate::areas::repository::Repository;
use crate::artifacts::branch::{BRANCH_REVISION_REGEX, BranchInfo, CommitInfo, NUMBER_REGEX};
use crate::errors::{RepoError, RepoResult};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

static BRANCH_REVISION: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(BRANCH_REVISION_REGEX));
static NUMBER: LazyLock<Result<Regex, regex::Error>> = LazyLock::new(|| Regex::new(NUMBER_REGEX));

fn compiled(pattern: &'static LazyLock<Result<Regex, regex::Error>>) -> RepoResult<&'static Regex> {
    pattern
        .as_ref()
        .map_err(|error| RepoError::Io(error.clone().into()))
}

/// Branch half of a revision string
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BranchSelector {
    Current,
    /// A branch number or name
    Named(String),
}

/// Revision half of a revision string
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevisionSelector {
    Last,
    /// Absolute, or counted from the end when negative
    Index(isize),
    /// A commit message, usually a tag
    Named(String),
}

/// A parsed revision string.
///
/// Supported forms:
/// - `""` or `/`: last revision of the current branch
/// - `/N`: revision `N` of the current branch, `N` may be negative or a tag
/// - `name/` and `name/N`: last or `N`th revision of branch `name` (name or number)
/// - `X`: branch `X` if such a branch exists, otherwise revision `X` of the current branch
///
/// ```ignore
/// let revision = Revision::try_parse("trunk/-2")?;
/// let (branch, revision) = revision.resolve(&repository)?;
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Revision {
    Explicit {
        branch: BranchSelector,
        revision: RevisionSelector,
    },
    /// A single token that is either a branch or a revision of the current branch
    Bare(String),
}

impl Revision {
    pub fn try_parse(argument: &str) -> RepoResult<Self> {
        let argument = argument.trim();
        if argument.is_empty() || argument == "/" {
            return Ok(Revision::Explicit {
                branch: BranchSelector::Current,
                revision: RevisionSelector::Last,
            });
        }

        match compiled(&BRANCH_REVISION)?.captures(argument) {
            Some(captures) => {
                let branch = match &captures[1] {
                    "" => BranchSelector::Current,
                    name => BranchSelector::Named(name.to_string()),
                };
                let revision = captures[2].split('/').next().unwrap_or_default();

                Ok(Revision::Explicit {
                    branch,
                    revision: Self::parse_revision(revision)?,
                })
            }
            None => Ok(Revision::Bare(argument.to_string())),
        }
    }

    fn parse_revision(revision: &str) -> RepoResult<RevisionSelector> {
        if revision.is_empty() {
            return Ok(RevisionSelector::Last);
        }
        if Self::is_number(revision)? {
            return revision
                .parse::<isize>()
                .map(RevisionSelector::Index)
                .map_err(|_| RepoError::user(format!("Revision number out of range: {}", revision)));
        }

        Ok(RevisionSelector::Named(revision.to_string()))
    }

    fn is_number(value: &str) -> RepoResult<bool> {
        Ok(compiled(&NUMBER)?.is_match(value))
    }

    /// Resolve against the repository's branches and the target branch's commits
    pub fn resolve(&self, repository: &Repository) -> RepoResult<(usize, usize)> {
        let state = repository.state();
        self.resolve_with(&state.branches, state.flags.branch, |branch| {
            repository.commits_of(branch)
        })
    }

    pub fn resolve_with(
        &self,
        branches: &BTreeMap<usize, BranchInfo>,
        current: usize,
        commits_of: impl Fn(usize) -> RepoResult<BTreeMap<usize, CommitInfo>>,
    ) -> RepoResult<(usize, usize)> {
        let (branch, revision) = match self {
            Revision::Explicit { branch, revision } => {
                let branch = match branch {
                    BranchSelector::Current => current,
                    BranchSelector::Named(name) => find_branch(branches, name)?
                        .ok_or_else(|| RepoError::user(format!("Unknown branch label '{}'", name)))?,
                };
                (branch, revision.clone())
            }
            Revision::Bare(token) => match find_branch(branches, token)? {
                Some(branch) => (branch, RevisionSelector::Last),
                None if Self::is_number(token)? => (current, Self::parse_revision(token)?),
                None => {
                    return Err(RepoError::user(format!(
                        "Unknown branch label or wrong number format '{}'",
                        token
                    )));
                }
            },
        };

        if !branches.contains_key(&branch) {
            return Err(RepoError::user(format!("Unknown branch b{}", branch)));
        }

        let commits = commits_of(branch)?;
        let revision = resolve_revision(&commits, &revision).ok_or_else(|| {
            RepoError::user(format!(
                "Unknown revision {} in branch b{}",
                describe(&revision),
                branch
            ))
        })?;

        Ok((branch, revision))
    }

    /// Resolve only the branch part, for operations that address whole branches
    pub fn resolve_branch(
        &self,
        branches: &BTreeMap<usize, BranchInfo>,
        current: usize,
    ) -> RepoResult<usize> {
        let branch = match self {
            Revision::Explicit {
                branch: BranchSelector::Current,
                ..
            } => Some(current),
            Revision::Explicit {
                branch: BranchSelector::Named(name),
                ..
            }
            | Revision::Bare(name) => find_branch(branches, name)?,
        };

        branch
            .filter(|branch| branches.contains_key(branch))
            .ok_or_else(|| RepoError::user("Unknown branch"))
    }
}

/// A branch number when the token is numeric, otherwise the branch carrying that name
fn find_branch(branches: &BTreeMap<usize, BranchInfo>, token: &str) -> RepoResult<Option<usize>> {
    if Revision::is_number(token)? {
        return Ok(token
            .parse::<usize>()
            .ok()
            .filter(|number| branches.contains_key(number)));
    }

    Ok(branches
        .values()
        .find(|branch| branch.name.as_deref() == Some(token))
        .map(|branch| branch.number))
}

fn resolve_revision(
    commits: &BTreeMap<usize, CommitInfo>,
    selector: &RevisionSelector,
) -> Option<usize> {
    let count = commits.len() as isize;
    match selector {
        RevisionSelector::Last => commits.keys().next_back().copied(),
        RevisionSelector::Index(index) => {
            let index = if *index < 0 { count + index } else { *index };
            (index >= 0 && commits.contains_key(&(index as usize))).then_some(index as usize)
        }
        RevisionSelector::Named(name) => commits
            .values()
            .find(|commit| commit.message.as_deref() == Some(name.as_str()))
            .map(|commit| commit.number),
    }
}

fn describe(selector: &RevisionSelector) -> String {
    match selector {
        RevisionSelector::Last => "last".to_string(),
        RevisionSelector::Index(index) => index.to_string(),
        RevisionSelector::Named(name) => format!("'{}'", name),
    }
}
