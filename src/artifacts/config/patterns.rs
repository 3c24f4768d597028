use crate::artifacts::config::Config;
use anyhow::Context;
use glob::Pattern;

pub const SLASH: char = '/';

/// A compiled list of file-name globs with fnmatch semantics
#[derive(Debug, Clone, Default)]
pub struct PatternList {
    patterns: Vec<Pattern>,
}

impl PatternList {
    pub fn compile<S: AsRef<str>>(sources: &[S]) -> anyhow::Result<Self> {
        let patterns = sources
            .iter()
            .map(|source| {
                Pattern::new(source.as_ref())
                    .with_context(|| format!("Invalid glob pattern '{}'", source.as_ref()))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        Ok(PatternList { patterns })
    }

    pub fn matches(&self, name: &str) -> bool {
        self.patterns.iter().any(|pattern| pattern.matches(name))
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// Directory and file ignore rules, each with a whitelist that overrides it
#[derive(Debug, Clone, Default)]
pub struct IgnoreRules {
    dirs: PatternList,
    dirs_whitelist: PatternList,
    files: PatternList,
    files_whitelist: PatternList,
    text_type: PatternList,
    bin_type: PatternList,
}

impl IgnoreRules {
    pub fn try_from_config(config: &Config) -> anyhow::Result<Self> {
        Ok(IgnoreRules {
            dirs: PatternList::compile(&config.ignore_dirs)?,
            dirs_whitelist: PatternList::compile(&config.ignore_dirs_whitelist)?,
            files: PatternList::compile(&config.ignores)?,
            files_whitelist: PatternList::compile(&config.ignores_whitelist)?,
            text_type: PatternList::compile(&config.text_type)?,
            bin_type: PatternList::compile(&config.bin_type)?,
        })
    }

    pub fn ignores_dir(&self, name: &str) -> bool {
        self.dirs.matches(name) && !self.dirs_whitelist.matches(name)
    }

    pub fn ignores_file(&self, name: &str) -> bool {
        self.files.matches(name) && !self.files_whitelist.matches(name)
    }

    /// Binary globs win over text globs; unmatched names are sniffed for NUL bytes
    pub fn is_text(&self, name: &str, content: &[u8]) -> bool {
        let file_name = split_path(name).1;
        if self.bin_type.matches(file_name) {
            return false;
        }
        if self.text_type.matches(file_name) {
            return true;
        }

        !content.iter().take(8192).any(|byte| *byte == 0)
    }
}

/// Strip a leading `./` and split a relative path into its directory and file name.
/// Files in the repository root have an empty directory.
pub fn split_path(path: &str) -> (&str, &str) {
    let path = path.strip_prefix("./").unwrap_or(path);
    match path.rfind(SLASH) {
        Some(index) => (&path[..index], &path[index + 1..]),
        None => ("", path),
    }
}

pub fn join_path(dir: &str, name: &str) -> String {
    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{}{}{}", dir, SLASH, name)
    }
}

/// A `dir/glob` tracking pattern: the directory part is compared literally,
/// the glob is matched against the file name only
#[derive(Debug, Clone)]
pub struct TrackingPattern {
    source: String,
    dir: String,
    glob: Pattern,
}

impl TrackingPattern {
    pub fn try_parse(source: &str) -> anyhow::Result<Self> {
        let source = normalize_pattern(source);
        let (dir, glob) = split_path(&source);
        let glob = Pattern::new(glob)
            .with_context(|| format!("Invalid tracking pattern '{}'", source))?;

        Ok(TrackingPattern {
            dir: dir.to_string(),
            source: source.clone(),
            glob,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn dir(&self) -> &str {
        &self.dir
    }

    pub fn matches_name(&self, name: &str) -> bool {
        self.glob.matches(name)
    }

    pub fn matches(&self, path: &str) -> bool {
        let (dir, name) = split_path(path);
        dir == self.dir && self.glob.matches(name)
    }
}

pub fn normalize_pattern(source: &str) -> String {
    let source = source.replace('\\', "/");
    let mut source = source.as_str();
    while let Some(rest) = source.strip_prefix("./") {
        source = rest;
    }

    source.to_string()
}

/// A set of tracking patterns; `None` at call sites means "no restriction"
#[derive(Debug, Clone, Default)]
pub struct TrackingPatterns {
    patterns: Vec<TrackingPattern>,
}

impl TrackingPatterns {
    pub fn try_parse<S: AsRef<str>>(sources: &[S]) -> anyhow::Result<Self> {
        let patterns = sources
            .iter()
            .map(|source| TrackingPattern::try_parse(source.as_ref()))
            .collect::<anyhow::Result<Vec<_>>>()?;

        Ok(TrackingPatterns { patterns })
    }

    pub fn matches(&self, path: &str) -> bool {
        self.patterns.iter().any(|pattern| pattern.matches(path))
    }

    /// Whether any pattern targeting `dir` matches `name`
    pub fn matches_in_dir(&self, dir: &str, name: &str) -> bool {
        self.patterns
            .iter()
            .any(|pattern| pattern.dir() == dir && pattern.matches_name(name))
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrackingPattern> {
        self.patterns.iter()
    }
}
