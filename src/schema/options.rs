//! Schema parsing options.

/// Default limit on how deeply schema definitions may nest.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Options controlling how schema JSON is parsed.
///
/// # Example
/// ```
/// use contrail::ParseOptions;
///
/// let opts = ParseOptions::new().strict().with_max_depth(32);
/// assert!(opts.strict);
/// assert_eq!(opts.max_depth, 32);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseOptions {
    /// Whether naming-rule violations fail the parse (default: false).
    ///
    /// Names, namespaces and enum symbols must match `[A-Za-z_][A-Za-z0-9_]*`
    /// and field orders must be `ascending`, `descending` or `ignore`. In
    /// permissive mode violations are logged as warnings instead, which keeps
    /// schemas written by lenient producers readable.
    pub strict: bool,

    /// Maximum nesting depth of schema definitions (default: 128).
    ///
    /// Documents nested deeper than this are rejected instead of exhausting
    /// the stack.
    pub max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            strict: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ParseOptions {
    /// Create options with default settings (permissive mode).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether to use strict validation.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Enable strict validation.
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    /// Set the maximum nesting depth.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}
