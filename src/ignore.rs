// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Ignore pattern matching.
//!
//! Determine which entries of the dotfiles tree are eligible for management
//! at all. Patterns match whole entry base names, with `*` standing in for
//! any sequence of characters. There is no support for path-segment
//! wildcards nor negation; a pattern either matches a single path segment in
//! full, or it does not match at all.
//!
//! # Rule Sources
//!
//! The rule set is assembled from three places, in order:
//!
//! 1. The contents of the ignore file (`.symdotignore` at the top-level of
//!    the dotfiles tree), one pattern per line with blank lines dropped. When
//!    this file is present its patterns __replace__ the built-in default set
//!    entirely. When absent, the default set of common VCS/tooling artifacts
//!    is used instead.
//! 2. Explicitly supplied exclude patterns, always appended.
//! 3. The Git directory name and the ignore file itself, always appended.
//!    These two cannot be overridden.
//!
//! The rule set is compiled once per invocation and is immutable afterwards.

use glob::{Pattern, PatternError};

/// Fallback pattern set used when the dotfiles tree carries no ignore file.
const DEFAULT_PATTERNS: &[&str] = &[
    ".git",
    ".gitignore",
    ".gitmodules",
    ".gitattributes",
    "*.swp",
    "*.swo",
    ".DS_Store",
    "Thumbs.db",
    "node_modules",
    "target",
    "*.lock",
    "LICENSE",
    "README.md",
];

/// Entries excluded no matter what the rule sources say.
///
/// The Git directory and the ignore file marking the tree as a symdot
/// project are never eligible for management.
const ALWAYS_EXCLUDED: &[&str] = &[".git", ".symdotignore"];

/// Compiled ignore rule set.
///
/// Holds every pattern compiled down to a whole-name matcher. Construction
/// happens once per command through [`IgnoreSet::compile`]; matching through
/// [`IgnoreSet::is_ignored`] is read-only afterwards.
#[derive(Clone, Debug)]
pub struct IgnoreSet {
    patterns: Vec<Pattern>,
}

impl IgnoreSet {
    /// Compile ignore rule set from explicit excludes and ignore file content.
    ///
    /// # Errors
    ///
    /// - Return [`IgnoreError::BadPattern`] if any pattern fails to compile.
    pub fn compile(
        explicit_excludes: impl IntoIterator<Item = impl Into<String>>,
        ignore_file_content: Option<&str>,
    ) -> Result<Self> {
        let mut raw: Vec<String> = match ignore_file_content {
            // INVARIANT: File content replaces the default set, never merges.
            Some(content) => content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_owned)
                .collect(),
            None => DEFAULT_PATTERNS.iter().map(|&s| s.to_owned()).collect(),
        };
        raw.extend(explicit_excludes.into_iter().map(Into::into));
        raw.extend(ALWAYS_EXCLUDED.iter().map(|&s| s.to_owned()));

        let patterns = raw
            .iter()
            .map(|rule| compile_pattern(rule))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { patterns })
    }

    /// Check if entry base name matches any compiled pattern.
    ///
    /// Matching is whole-name and case-sensitive. Callers are expected to
    /// pass a single path segment, not a full relative path.
    pub fn is_ignored(&self, name: impl AsRef<str>) -> bool {
        let name = name.as_ref();
        self.patterns.iter().any(|pattern| pattern.matches(name))
    }
}

/// Compile one raw rule into a whole-name pattern.
///
/// A single trailing path separator is stripped so that directory-style
/// rules like "node_modules/" still match the bare entry name.
fn compile_pattern(rule: &str) -> Result<Pattern> {
    let rule = rule.strip_suffix('/').unwrap_or(rule);
    Pattern::new(rule).map_err(|source| IgnoreError::BadPattern {
        source,
        rule: rule.to_owned(),
    })
}

/// Ignore rule compilation error types.
#[derive(Debug, thiserror::Error)]
pub enum IgnoreError {
    /// Rule does not compile down to a valid pattern.
    #[error("ignore rule {rule:?} is not a valid pattern")]
    BadPattern {
        #[source]
        source: PatternError,
        rule: String,
    },
}

/// Friendly result alias :3
pub type Result<T, E = IgnoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use simple_test_case::test_case;

    #[test_case(".git", true; "git directory")]
    #[test_case("README.md", true; "readme in defaults")]
    #[test_case(".symdotignore", true; "ignore file itself")]
    #[test_case("init.vim.swp", true; "editor swap file")]
    #[test_case("Cargo.lock", true; "lock file")]
    #[test_case(".bashrc", false; "ordinary dotfile")]
    #[test_case("gitconfig", false; "no substring match on git")]
    #[test]
    fn default_rule_set(name: &str, expect: bool) -> anyhow::Result<()> {
        let rules = IgnoreSet::compile(Vec::<String>::new(), None)?;
        assert_eq!(rules.is_ignored(name), expect);

        Ok(())
    }

    #[test]
    fn ignore_file_replaces_defaults() -> anyhow::Result<()> {
        let content = indoc! {r#"
            bootstrap.sh

            node_modules
        "#};
        let rules = IgnoreSet::compile(Vec::<String>::new(), Some(content))?;

        assert!(rules.is_ignored("bootstrap.sh"));
        assert!(rules.is_ignored("node_modules"));
        // Defaults are gone once a file is supplied.
        assert!(!rules.is_ignored(".DS_Store"));
        assert!(!rules.is_ignored("Cargo.lock"));

        Ok(())
    }

    #[test]
    fn mandatory_rules_survive_ignore_file() -> anyhow::Result<()> {
        let rules = IgnoreSet::compile(Vec::<String>::new(), Some("bootstrap.sh"))?;

        assert!(rules.is_ignored(".git"));
        assert!(rules.is_ignored(".symdotignore"));
        // The readme is only a default, so replacement drops it.
        assert!(!rules.is_ignored("README.md"));

        Ok(())
    }

    #[test]
    fn explicit_excludes_always_append() -> anyhow::Result<()> {
        let rules = IgnoreSet::compile(["*.bak"], Some("bootstrap.sh"))?;

        assert!(rules.is_ignored("bashrc.bak"));
        assert!(rules.is_ignored("bootstrap.sh"));

        Ok(())
    }

    #[test_case("*.vim", "init.vim", true; "star prefix")]
    #[test_case("init*", "init.vim", true; "star suffix")]
    #[test_case("*", "anything", true; "lone star")]
    #[test_case("node_modules/", "node_modules", true; "trailing separator stripped")]
    #[test_case("*.vim", "init.viM", false; "case sensitive")]
    #[test_case("init.vim", "initXvim", false; "dot is literal")]
    #[test]
    fn pattern_semantics(rule: &str, name: &str, expect: bool) -> anyhow::Result<()> {
        let rules = IgnoreSet::compile([rule], Some(""))?;
        assert_eq!(rules.is_ignored(name), expect);

        Ok(())
    }

    #[test]
    fn bad_pattern_refuses_to_compile() {
        let result = IgnoreSet::compile(["[unclosed"], Some(""));
        assert!(matches!(result, Err(IgnoreError::BadPattern { .. })));
    }
}
