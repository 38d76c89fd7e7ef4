use std::path::{Component, Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use regex::Regex;

use crate::transform::TransformError;

/// File extensions that may contain `className` objects or `cn`/`cva` calls
pub const SUPPORTED_EXTENSIONS: [&str; 8] = ["tsx", "ts", "jsx", "js", "mts", "cts", "mjs", "cjs"];

const DEPENDENCY_DIR: &str = "node_modules";

/// A compiled list of include or exclude patterns
///
/// Patterns wrapped in forward slashes are regular expressions, everything else is a glob.
/// Example: "src/**/*.tsx" is a glob, "/components/ui/" is a regex
#[derive(Debug, Clone)]
struct PatternList {
  globs: GlobSet,
  regexes: Vec<Regex>,
}

impl PatternList {
  fn new(patterns: &[String]) -> Result<Self, TransformError> {
    let mut globs = GlobSetBuilder::new();
    let mut regexes = vec![];

    for pattern in patterns {
      if pattern.len() > 1 && pattern.starts_with('/') && pattern.ends_with('/') {
        let regex = Regex::new(&pattern[1..pattern.len() - 1]).map_err(|err| {
          TransformError::InvalidPattern {
            pattern: pattern.clone(),
            message: err.to_string(),
          }
        })?;
        regexes.push(regex);
      } else {
        let glob = Glob::new(pattern).map_err(|err| TransformError::InvalidPattern {
          pattern: pattern.clone(),
          message: err.to_string(),
        })?;
        globs.add(glob);
      }
    }

    let globs = globs.build().map_err(|err| TransformError::InvalidPattern {
      pattern: patterns.join(", "),
      message: err.to_string(),
    })?;

    Ok(Self { globs, regexes })
  }

  fn is_empty(&self) -> bool {
    self.globs.is_empty() && self.regexes.is_empty()
  }

  fn is_match(&self, candidates: &[&Path]) -> bool {
    candidates.iter().any(|path| {
      self.globs.is_match(path) || {
        let path = path.to_string_lossy();
        self.regexes.iter().any(|regex| regex.is_match(&path))
      }
    })
  }
}

/// Decides which files the build tool hands to the transform
///
/// Build tools pass absolute module ids while patterns are usually written relative to
/// the project, so patterns are also tried against the path relative to `root`.
/// Without a root, an absolute path is tried with each of its leading components removed:
/// "/home/app/src/button.tsx" is matched as "home/app/src/button.tsx", "app/src/button.tsx",
/// "src/button.tsx" and "button.tsx".
#[derive(Debug, Clone)]
pub struct FileFilter {
  include: PatternList,
  exclude: PatternList,
  root: Option<PathBuf>,
}

impl FileFilter {
  pub fn new(include: &[String], exclude: &[String]) -> Result<Self, TransformError> {
    Ok(Self {
      include: PatternList::new(include)?,
      exclude: PatternList::new(exclude)?,
      root: None,
    })
  }

  pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
    self.root = Some(root.into());
    self
  }

  /// Every form of `path` the patterns are tried against, the path as given first
  fn match_candidates<'p>(&self, path: &'p Path) -> Vec<&'p Path> {
    let mut candidates = vec![path];

    if let Some(root) = &self.root {
      if let Ok(relative) = path.strip_prefix(root) {
        candidates.push(relative);
      }
      return candidates;
    }

    if path.is_absolute() {
      let mut components = path.components();
      while components.next().is_some() {
        let rest = components.as_path();
        if rest.as_os_str().is_empty() {
          break;
        }
        candidates.push(rest);
      }
    }

    candidates
  }

  /// A file is eligible when it has a script extension, does not live in a dependency
  /// directory, matches the include list (an empty list includes everything) and does
  /// not match the exclude list
  pub fn is_eligible(&self, path: impl AsRef<Path>) -> bool {
    let path = path.as_ref();

    let has_supported_extension = path
      .extension()
      .and_then(|extension| extension.to_str())
      .is_some_and(|extension| SUPPORTED_EXTENSIONS.contains(&extension));
    if !has_supported_extension || is_dependency_path(path) {
      return false;
    }

    let candidates = self.match_candidates(path);
    if !self.include.is_empty() && !self.include.is_match(&candidates) {
      return false;
    }

    !self.exclude.is_match(&candidates)
  }
}

fn is_dependency_path(path: &Path) -> bool {
  path
    .components()
    .any(|component| matches!(component, Component::Normal(name) if name == DEPENDENCY_DIR))
}
