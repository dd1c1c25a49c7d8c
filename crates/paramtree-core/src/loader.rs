//! File and stream loading.
//!
//! Input is read line by line, each line classified with
//! [`parse_line`](crate::parse_line) and applied to the scope the load was
//! started from. `include` directives load nested files into that same
//! scope.

use std::fs::File;
use std::io::{BufRead, BufReader, Cursor};
use std::path::{Path, PathBuf};

use metrics::counter;
use tracing::{debug, info, warn};

use crate::counters;
use crate::error::{ParamError, ParamResult};
use crate::parser::{parse_line, Directive};
use crate::tree::{ParamTree, ScopeId, ScopeMut};

/// Maximum nesting of `include` directives.
pub const MAX_INCLUDE_DEPTH: usize = 32;

const STREAM_ORIGIN: &str = "<stream>";

/// Options threaded through a whole load, includes included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    /// Treat a re-declared key as an error instead of an override.
    pub fail_on_existing: bool,
    /// Retry an include relative to the working directory when it cannot be
    /// opened relative to the including file.
    pub cwd_fallback: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            fail_on_existing: false,
            cwd_fallback: true,
        }
    }
}

impl LoadOptions {
    /// Options where the first declaration of a key wins and later ones fail.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            fail_on_existing: true,
            ..Self::default()
        }
    }

    /// Set whether re-declared keys fail.
    #[must_use]
    pub fn with_fail_on_existing(mut self, fail_on_existing: bool) -> Self {
        self.fail_on_existing = fail_on_existing;
        self
    }

    /// Set whether includes fall back to the working directory.
    #[must_use]
    pub fn with_cwd_fallback(mut self, cwd_fallback: bool) -> Self {
        self.cwd_fallback = cwd_fallback;
        self
    }
}

struct Loader<'a> {
    tree: &'a mut ParamTree,
    scope: ScopeId,
    options: LoadOptions,
}

impl Loader<'_> {
    fn load_file(&mut self, path: &Path, depth: usize) -> ParamResult<()> {
        if depth > MAX_INCLUDE_DEPTH {
            return Err(ParamError::IncludeDepth {
                path: path.to_path_buf(),
                depth,
            });
        }

        let file = open(path)?;
        let lines = self.load_reader(BufReader::new(file), Some(path), depth)?;

        counter!(counters::FILES_LOADED).increment(1);
        info!(path = %path.display(), lines, depth, "loaded parameter file");
        Ok(())
    }

    fn load_reader(&mut self, reader: impl BufRead, origin: Option<&Path>, depth: usize) -> ParamResult<usize> {
        let base_dir = origin.and_then(Path::parent);
        let mut count = 0;

        for (index, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| {
                ParamError::io(origin.unwrap_or_else(|| Path::new(STREAM_ORIGIN)), e)
            })?;
            count = index + 1;

            let result = parse_line(&line).and_then(|directive| self.apply(directive, base_dir, depth));
            if let Err(err) = result {
                return Err(match origin {
                    Some(path) => err.at(path, count),
                    None => err.at(STREAM_ORIGIN, count),
                });
            }
        }

        counter!(counters::LINES_PARSED).increment(count as u64);
        Ok(count)
    }

    fn apply(&mut self, directive: Directive<'_>, base_dir: Option<&Path>, depth: usize) -> ParamResult<()> {
        match directive {
            Directive::Blank | Directive::Comment => Ok(()),
            Directive::SetVariable { name, value } => {
                self.tree.set_variable(self.scope, name, value);
                Ok(())
            }
            Directive::Assign { key, value } => {
                self.tree
                    .write(self.scope, key, value, self.options.fail_on_existing)
            }
            Directive::Include { path } => {
                let resolved = self.resolve_include(Path::new(path), base_dir)?;
                self.load_file(&resolved, depth + 1)
            }
            Directive::Unset { key } => {
                self.tree.remove(self.scope, key);
                Ok(())
            }
        }
    }

    // Prefer the including file's directory; fall back to the working
    // directory when allowed.
    fn resolve_include(&self, path: &Path, base_dir: Option<&Path>) -> ParamResult<PathBuf> {
        let candidate = match base_dir {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path.to_path_buf(),
        };

        if candidate.is_file() || !self.options.cwd_fallback || candidate == path {
            return Ok(candidate);
        }

        warn!(
            include = %path.display(),
            tried = %candidate.display(),
            "include not found next to parent file, trying working directory"
        );
        Ok(path.to_path_buf())
    }
}

fn open(path: &Path) -> ParamResult<File> {
    debug!(path = %path.display(), "opening parameter file");
    File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ParamError::not_found(path),
        _ => ParamError::io(path, e),
    })
}

impl ScopeMut<'_> {
    fn loader(&mut self, options: LoadOptions) -> Loader<'_> {
        Loader {
            tree: &mut *self.tree,
            scope: self.id,
            options,
        }
    }

    /// Load a parameter file into this scope.
    ///
    /// Includes are resolved relative to the including file's directory.
    ///
    /// # Errors
    ///
    /// Returns [`ParamError::NotFound`] if the file cannot be opened. Errors
    /// raised by a line are wrapped in [`ParamError::At`] with the file and
    /// line number, once per include level.
    pub fn parse_file(&mut self, path: impl AsRef<Path>, options: LoadOptions) -> ParamResult<()> {
        self.loader(options).load_file(path.as_ref(), 0)
    }

    /// Load parameter text from a reader into this scope.
    ///
    /// Relative includes are resolved against the working directory.
    ///
    /// # Errors
    ///
    /// Same as [`parse_file`](Self::parse_file), with `<stream>` as the path.
    pub fn parse_stream(&mut self, reader: impl BufRead, options: LoadOptions) -> ParamResult<()> {
        let lines = self.loader(options).load_reader(reader, None, 0)?;
        debug!(lines, "loaded parameter stream");
        Ok(())
    }

    /// Load parameter text from a string into this scope.
    ///
    /// # Errors
    ///
    /// See [`parse_stream`](Self::parse_stream).
    pub fn parse_str(&mut self, text: &str, options: LoadOptions) -> ParamResult<()> {
        self.parse_stream(Cursor::new(text), options)
    }

    /// Apply a single line to this scope.
    ///
    /// # Errors
    ///
    /// Returns the error raised by the directive, without a location.
    pub fn parse_line(&mut self, line: &str, options: LoadOptions) -> ParamResult<()> {
        let directive = parse_line(line)?;
        self.loader(options).apply(directive, None, 0)
    }
}
