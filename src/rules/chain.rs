use std::fmt;
use std::fs::Metadata;
use std::path::Path;

use super::Rule;
use crate::error::SyncError;

/// Receives side effects of chain evaluation.
///
/// `on_match` fires for the rule that excluded a path; `on_error` fires when a
/// rule fails internally, after which evaluation moves on to the next rule.
pub trait ChainObserver: Send + Sync {
    fn on_match(&self, _path: &Path, _rule: &Rule) {}
    fn on_error(&self, _path: &Path, _rule: &Rule, _error: &SyncError) {}
}

/// Default observer: writes rule activity to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl ChainObserver for TracingObserver {
    fn on_match(&self, path: &Path, rule: &Rule) {
        tracing::debug!("{} ignored by {}", path.display(), rule.name());
    }

    fn on_error(&self, path: &Path, rule: &Rule, error: &SyncError) {
        tracing::warn!("{} failed on {}: {}", rule.name(), path.display(), error);
    }
}

/// Ordered sequence of rules combined by logical OR.
///
/// Evaluation walks from head to tail and stops at the first match. A chain
/// with no rules ignores nothing.
#[derive(Debug, Clone, Default)]
pub struct RuleChain {
    rules: Vec<Rule>,
}

impl RuleChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// The chain a sync pass uses for `root`: dotfiles, irregular types, the
    /// root `.gitignore`, then one rule per user pattern.
    pub fn standard<S: AsRef<str>>(root: &Path, patterns: &[S]) -> Result<Self, SyncError> {
        let chain = Self::new()
            .with(Rule::Dotfile)
            .with(Rule::Irregular)
            .with(Rule::vcs_ignore(root)?)
            .with_all(Rule::patterns(patterns)?);
        tracing::debug!("Rule chain for {}: {}", root.display(), chain);
        Ok(chain)
    }

    /// Append a rule at the tail.
    pub fn with(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Append several rules at the tail, keeping their order.
    pub fn with_all(mut self, rules: impl IntoIterator<Item = Rule>) -> Self {
        self.rules.extend(rules);
        self
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Returns the first rule that excludes `path`, if any.
    pub fn first_match(
        &self,
        path: &Path,
        metadata: &Metadata,
        observer: &dyn ChainObserver,
    ) -> Option<&Rule> {
        for rule in &self.rules {
            match rule.evaluate(path, metadata) {
                Ok(true) => {
                    observer.on_match(path, rule);
                    return Some(rule);
                }
                Ok(false) => {}
                Err(e) => observer.on_error(path, rule, &e),
            }
        }
        None
    }

    pub fn is_ignored(
        &self,
        path: &Path,
        metadata: &Metadata,
        observer: &dyn ChainObserver,
    ) -> bool {
        self.first_match(path, metadata, observer).is_some()
    }
}

impl fmt::Display for RuleChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.rules.iter().map(Rule::name).collect();
        write!(f, "{}", names.join(" | "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use std::sync::Mutex;
    use tempfile::TempDir;

    #[derive(Default)]
    struct Recorder {
        matches: Mutex<Vec<(PathBuf, String)>>,
        errors: Mutex<Vec<(PathBuf, String)>>,
    }

    impl ChainObserver for Recorder {
        fn on_match(&self, path: &Path, rule: &Rule) {
            self.matches.lock().unwrap().push((path.to_path_buf(), rule.name()));
        }

        fn on_error(&self, path: &Path, rule: &Rule, _error: &SyncError) {
            self.errors.lock().unwrap().push((path.to_path_buf(), rule.name()));
        }
    }

    fn hidden_js(temp_dir: &TempDir) -> (PathBuf, Metadata) {
        let path = temp_dir.path().join(".tool.js");
        fs::write(&path, "x").unwrap();
        let meta = fs::symlink_metadata(&path).unwrap();
        (path, meta)
    }

    #[test]
    fn test_empty_chain_ignores_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let (path, meta) = hidden_js(&temp_dir);
        assert!(!RuleChain::new().is_ignored(&path, &meta, &TracingObserver));
    }

    #[test]
    fn test_order_only_changes_which_rule_reports() {
        let temp_dir = TempDir::new().unwrap();
        let (path, meta) = hidden_js(&temp_dir);

        let dot_first = RuleChain::new()
            .with(Rule::Dotfile)
            .with(Rule::pattern(r"\.js$").unwrap());
        let regex_first = RuleChain::new()
            .with(Rule::pattern(r"\.js$").unwrap())
            .with(Rule::Dotfile);

        let recorder = Recorder::default();
        assert!(dot_first.is_ignored(&path, &meta, &recorder));
        assert!(regex_first.is_ignored(&path, &meta, &recorder));

        let matches = recorder.matches.lock().unwrap();
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].1, "dotfile");
        assert_eq!(matches[1].1, r"pattern(\.js$)");
    }

    #[test]
    fn test_rule_error_is_reported_and_evaluation_continues() {
        let root = TempDir::new().unwrap();
        let elsewhere = TempDir::new().unwrap();
        let path = elsewhere.path().join("notes.md");
        fs::write(&path, "x").unwrap();
        let meta = fs::symlink_metadata(&path).unwrap();

        let chain = RuleChain::new()
            .with(Rule::vcs_ignore(root.path()).unwrap())
            .with(Rule::pattern(r"\.md$").unwrap());

        let recorder = Recorder::default();
        let rule = chain.first_match(&path, &meta, &recorder).unwrap();
        assert_eq!(rule.name(), r"pattern(\.md$)");
        assert_eq!(recorder.errors.lock().unwrap().len(), 1);
        assert_eq!(recorder.errors.lock().unwrap()[0].1, "gitignore");
    }

    #[test]
    fn test_standard_chain_layout() {
        let temp_dir = TempDir::new().unwrap();
        let chain = RuleChain::standard(temp_dir.path(), &["a", "b"]).unwrap();
        assert_eq!(chain.len(), 5);
        assert_eq!(
            chain.to_string(),
            "dotfile | irregular-type | gitignore | pattern(a) | pattern(b)"
        );
    }

    #[test]
    fn test_standard_chain_rejects_bad_pattern() {
        let temp_dir = TempDir::new().unwrap();
        let err = RuleChain::standard(temp_dir.path(), &["*bad"]).unwrap_err();
        assert!(matches!(err, SyncError::InvalidPattern { .. }));
    }
}
