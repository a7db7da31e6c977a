//! Filename patterns identifying serialized Bags.

use std::path::Path;

use globset::{Glob, GlobSet, GlobSetBuilder};

/// The fixed set of globs a Bag filename must match.
///
/// Matching is case-sensitive and applies to the base name only; the
/// patterns are mutually exclusive by extension, so evaluation order
/// carries no priority.
pub const BAG_PATTERNS: [&str; 4] = ["*.zip", "*.tgz", "*.tar.gz", "*.7z"];

/// Compiled matcher over [`BAG_PATTERNS`].
#[derive(Debug, Clone)]
pub struct BagPatterns {
    set: GlobSet,
}

impl BagPatterns {
    pub fn new() -> Self {
        let mut builder = GlobSetBuilder::new();
        for pattern in BAG_PATTERNS {
            // Patterns are literals; compilation cannot fail.
            builder.add(Glob::new(pattern).expect("static Bag pattern"));
        }
        Self {
            set: builder.build().expect("static Bag pattern set"),
        }
    }

    /// Whether the base name of `path` matches any Bag pattern.
    pub fn matches(&self, path: &Path) -> bool {
        path.file_name().is_some_and(|name| self.set.is_match(name))
    }
}

impl Default for BagPatterns {
    fn default() -> Self {
        Self::new()
    }
}
