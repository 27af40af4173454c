use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use tracing::warn;

use crate::error::{Error, Result};

/// How a set of patterns is applied to a path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// Patterns without a `/` are matched against the file name only
    Basename,
    /// Patterns are matched against the full repository-relative path
    FullPath,
}

/// Compiled set of glob patterns.
///
/// Bare patterns like `*.ts` match on the basename (`src/foo.ts` matches).
/// Patterns carrying a path component like `app/**/*.ts` match the whole
/// path, with `*` never crossing a `/`. A set mixing both styles cannot be
/// expressed in a single pass, so it is compiled in full-path mode and a
/// warning is logged.
#[derive(Debug, Clone)]
pub struct Matcher {
    set: GlobSet,
    mode: MatchMode,
}

impl Matcher {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let mode = Self::detect_mode(patterns);

        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let pattern = pattern.as_ref();
            let glob = GlobBuilder::new(pattern)
                .literal_separator(mode == MatchMode::FullPath)
                .build()
                .map_err(|e| {
                    Error::configuration(format!("invalid glob pattern `{}`: {}", pattern, e))
                })?;
            builder.add(glob);
        }

        let set = builder
            .build()
            .map_err(|e| Error::configuration(format!("failed to compile glob set: {}", e)))?;

        Ok(Self { set, mode })
    }

    fn detect_mode<S: AsRef<str>>(patterns: &[S]) -> MatchMode {
        let nested = patterns
            .iter()
            .filter(|p| p.as_ref().contains('/'))
            .count();

        if nested == 0 {
            MatchMode::Basename
        } else {
            if nested != patterns.len() {
                let patterns: Vec<&str> = patterns.iter().map(|p| p.as_ref()).collect();
                warn!(
                    ?patterns,
                    "Mixing bare file name patterns with path patterns; matching full paths only"
                );
            }
            MatchMode::FullPath
        }
    }

    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    /// Does a single repository-relative path match any pattern?
    pub fn is_match(&self, path: &str) -> bool {
        match self.mode {
            MatchMode::FullPath => self.set.is_match(path),
            MatchMode::Basename => {
                let name = path.rsplit('/').next().unwrap_or(path);
                self.set.is_match(name)
            }
        }
    }

    /// Keep the paths matching any pattern, preserving input order
    pub fn filter<S: AsRef<str>>(&self, paths: &[S]) -> Vec<String> {
        paths
            .iter()
            .map(AsRef::as_ref)
            .filter(|path| self.is_match(path))
            .map(str::to_string)
            .collect()
    }
}

/// Return the subset of `paths` matching any of `patterns`
pub fn match_paths<P: AsRef<str>, S: AsRef<str>>(paths: &[P], patterns: &[S]) -> Result<Vec<String>> {
    Ok(Matcher::new(patterns)?.filter(paths))
}
