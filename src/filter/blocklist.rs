//! Block list of sinkholed domains.
//!
//! Loaded once at startup from an optional line-delimited file and read-only
//! afterwards; the resolver answers any listed name with a synthetic NXDOMAIN
//! instead of resolving it.

use std::fs;
use std::io;
use std::path::Path;

use rustc_hash::FxHashSet;

/// A set of blocked domain names.
///
/// Matching is exact: entries are compared byte-for-byte against decoded
/// question names, which carry no trailing dot. There is no case folding and
/// no subdomain walk, so `ads.example` blocks neither `ADS.example` nor
/// `sub.ads.example`.
pub struct Blocklist {
    domains: FxHashSet<String>,
}

impl Blocklist {
    /// An empty list; nothing is blocked.
    pub fn empty() -> Self {
        Self {
            domains: FxHashSet::default(),
        }
    }

    /// Reads a block list from a plain-text file, one domain per line.
    pub fn from_file(path: impl AsRef<Path>) -> io::Result<Self> {
        Ok(Self::from_lines(fs::read_to_string(path)?.lines()))
    }

    /// Builds a block list from lines already in memory.
    ///
    /// Surrounding whitespace is trimmed; blank lines and `#` comments are
    /// skipped. Everything else is taken verbatim.
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let domains = lines
            .into_iter()
            .filter_map(|line| {
                let line = line.as_ref().trim();
                if line.is_empty() || line.starts_with('#') {
                    return None;
                }
                Some(line.to_string())
            })
            .collect();

        Self { domains }
    }

    /// Check if a domain is blocked.
    pub fn contains(&self, domain: &str) -> bool {
        self.domains.contains(domain)
    }

    /// Returns the number of domains in the block list.
    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }
}

impl Default for Blocklist {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_lines_skips_blanks_and_comments() {
        let list =
            Blocklist::from_lines(["# ad networks", "", "  ads.example  ", "tracker.example"]);

        assert_eq!(list.len(), 2);
        assert!(list.contains("ads.example"));
        assert!(list.contains("tracker.example"));
    }

    #[test]
    fn contains_matches_exactly() {
        let list = Blocklist::from_lines(["ads.example"]);

        assert!(list.contains("ads.example"));
        // No subdomain walk, no case folding, no trailing-dot normalization.
        assert!(!list.contains("sub.ads.example"));
        assert!(!list.contains("ADS.example"));
        assert!(!list.contains("ads.example."));
    }

    #[test]
    fn empty_list_blocks_nothing() {
        let list = Blocklist::empty();

        assert!(list.is_empty());
        assert!(!list.contains("ads.example"));
        assert!(!list.contains(""));
    }

    #[test]
    fn from_file_reads_one_domain_per_line() {
        let path = std::env::temp_dir().join(format!("sinkhole-blocklist-{}", std::process::id()));
        fs::write(&path, "ads.example\n# comment\ntracker.example\n").unwrap();

        let list = Blocklist::from_file(&path).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(list.len(), 2);
        assert!(list.contains("tracker.example"));
    }

    #[test]
    fn from_file_reports_missing_files() {
        assert!(Blocklist::from_file("/nonexistent/blocklist.txt").is_err());
    }
}
