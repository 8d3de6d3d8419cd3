//! Two-phase synchronization of a document set.
//!
//! Each document moves through
//! `parse hierarchy -> upsert ancestors -> convert -> upsert leaf`.
//!
//! Phase 1 runs sequentially and upserts every distinct ancestor prefix
//! once, parent before child, so concurrent leaves never race to create the
//! same ancestor. Phase 2 converts and upserts the leaves on a bounded
//! worker pool.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use rayon::prelude::*;
use tracing::{error, info, warn};
use wikisync_config::Config;
use wikisync_confluence::{ContentApi, PageId, PageUpserter, UpsertAction, UpsertOutcome};
use wikisync_renderer::Converter;

use crate::error::{HierarchyError, SyncError, error_chain};
use crate::hierarchy::{HierarchyChain, HierarchyParser};
use crate::report::{DocumentReport, DocumentStatus, SyncReport};
use crate::scanner::Scanner;

/// What happens after a document-level failure.
///
/// Skips (malformed filenames) never stop a run and run-fatal errors
/// (unreachable backend, rejected credentials, stale versions) always do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Report the document as failed and keep going.
    ContinueOnError,
    /// Stop at the first failed document.
    FailFast,
}

impl FailurePolicy {
    /// Policy for the `sync.continue_on_error` setting.
    #[must_use]
    pub fn from_continue_on_error(continue_on_error: bool) -> Self {
        if continue_on_error {
            Self::ContinueOnError
        } else {
            Self::FailFast
        }
    }
}

/// Ancestor prefix -> page ID, or the error that prevented it.
type AncestorPages = HashMap<Vec<String>, Result<PageId, String>>;

/// Converted ancestor content per hierarchy level.
struct Placeholders {
    levels: Vec<String>,
    fallback: String,
}

impl Placeholders {
    fn for_level(&self, level: usize) -> &str {
        level
            .checked_sub(1)
            .and_then(|index| self.levels.get(index))
            .unwrap_or(&self.fallback)
    }
}

/// Document that passed hierarchy parsing.
struct PlannedDocument {
    index: usize,
    path: PathBuf,
    chain: HierarchyChain,
    /// Ancestor writes issued while this document was planned.
    ancestor_writes: usize,
}

/// Synchronizes documents to a Confluence space.
pub struct Synchronizer<'a, A: ContentApi + ?Sized> {
    api: &'a A,
    space: String,
    source_dir: PathBuf,
    extensions: Vec<String>,
    placeholder: String,
    placeholders: Vec<String>,
    version_message: Option<String>,
    workers: usize,
    policy: FailurePolicy,
    parser: HierarchyParser,
    converter: Converter,
}

impl<'a, A: ContentApi + ?Sized> Synchronizer<'a, A> {
    /// Create a synchronizer for the configured space and source directory.
    #[must_use]
    pub fn new(api: &'a A, config: &Config) -> Self {
        let sync = &config.sync_resolved;
        Self {
            api,
            space: config.confluence.space_key.clone(),
            source_dir: sync.source_dir.clone(),
            extensions: sync.extensions.clone(),
            placeholder: sync.placeholder.clone(),
            placeholders: sync.placeholders.clone(),
            version_message: sync.version_message.clone(),
            workers: sync.workers.max(1),
            policy: FailurePolicy::from_continue_on_error(sync.continue_on_error),
            parser: HierarchyParser::from_config(&config.hierarchy, &sync.extensions),
            converter: Converter::new(),
        }
    }

    /// Override the failure policy from the configuration.
    #[must_use]
    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Scan the source directory and synchronize every document found.
    ///
    /// # Errors
    ///
    /// Returns an error if the source directory cannot be scanned or the run
    /// cannot start (see [`Synchronizer::sync_paths`]). Failures while
    /// processing documents are recorded in the report.
    pub fn run(&self) -> Result<SyncReport, SyncError> {
        let scanner = Scanner::new(self.source_dir.clone(), self.extensions.clone());
        let paths = scanner.scan()?;
        info!(
            "Found {} document(s) in {}",
            paths.len(),
            self.source_dir.display()
        );
        self.sync_paths(&paths)
    }

    /// Synchronize the given documents, in order.
    ///
    /// # Errors
    ///
    /// Returns an error if a placeholder text cannot be converted or the
    /// worker pool cannot be created. An error that stops the run midway is
    /// stored in [`SyncReport::abort`].
    pub fn sync_paths(&self, paths: &[PathBuf]) -> Result<SyncReport, SyncError> {
        let placeholders = self.convert_placeholders()?;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .build()?;
        let upserter =
            PageUpserter::new(self.api).with_version_message(self.version_message.clone());

        let mut report = SyncReport {
            documents: paths
                .iter()
                .map(|path| DocumentReport {
                    path: path.clone(),
                    titles: Vec::new(),
                    status: DocumentStatus::NotAttempted,
                })
                .collect(),
            ..SyncReport::default()
        };

        let mut planned = Vec::new();
        for (index, path) in paths.iter().enumerate() {
            match self.parser.parse(&display_name(path)) {
                Ok(chain) => {
                    report.documents[index].titles = chain.titles().to_vec();
                    planned.push(PlannedDocument {
                        index,
                        path: path.clone(),
                        chain,
                        ancestor_writes: 0,
                    });
                }
                Err(err) => {
                    warn!("Skipping {}: {err}", path.display());
                    report.documents[index].status = DocumentStatus::Skipped {
                        reason: err.to_string(),
                    };
                }
            }
        }
        let mut planned = reject_title_clashes(planned, &mut report);

        // Phase 1: ancestors, sequential
        let mut ancestors = AncestorPages::new();
        for doc in &mut planned {
            let result = self.sync_ancestors(
                &upserter,
                &doc.chain,
                &placeholders,
                &mut ancestors,
                &mut report,
            );
            match result {
                Ok(writes) => doc.ancestor_writes = writes,
                Err(err) => {
                    report.documents[doc.index].status = DocumentStatus::Failed {
                        error: error_chain(&err),
                    };
                    report.abort = Some(err);
                    break;
                }
            }
        }
        if report.abort.is_some() {
            log_summary(&report);
            return Ok(report);
        }

        // Phase 2: leaves, on the pool
        let abort = AtomicBool::new(false);
        let fatal: Mutex<Option<SyncError>> = Mutex::new(None);
        let results: Vec<(usize, DocumentStatus)> = pool.install(|| {
            planned
                .par_iter()
                .map(|doc| {
                    let status = self.sync_leaf(&upserter, doc, &ancestors, &abort, &fatal);
                    (doc.index, status)
                })
                .collect()
        });

        for (index, status) in results {
            if let DocumentStatus::Synced { action, .. } = &status {
                report.count(*action);
            }
            report.documents[index].status = status;
        }
        report.abort = fatal.into_inner().unwrap_or_else(PoisonError::into_inner);

        log_summary(&report);
        Ok(report)
    }

    /// Upsert every ancestor prefix of `chain` not handled yet.
    ///
    /// Returns the number of writes issued. Non-fatal failures are recorded
    /// in `ancestors`; an error is returned only when the run must stop.
    fn sync_ancestors(
        &self,
        upserter: &PageUpserter<'_, A>,
        chain: &HierarchyChain,
        placeholders: &Placeholders,
        ancestors: &mut AncestorPages,
        report: &mut SyncReport,
    ) -> Result<usize, SyncError> {
        let titles = chain.ancestors();
        let mut writes = 0;

        for depth in 1..=titles.len() {
            let prefix = &titles[..depth];
            if ancestors.contains_key(prefix) {
                continue;
            }

            let parent = if depth == 1 {
                None
            } else {
                match ancestors.get(&titles[..depth - 1]) {
                    Some(Ok(id)) => Some(id.clone()),
                    Some(Err(message)) => {
                        let message = message.clone();
                        ancestors.insert(prefix.to_vec(), Err(message));
                        continue;
                    }
                    None => None,
                }
            };

            let title = &titles[depth - 1];
            let content = placeholders.for_level(depth);
            match upserter.upsert(&self.space, title, content, parent.as_ref()) {
                Ok(outcome) => {
                    log_outcome(title, &outcome);
                    report.count(outcome.action);
                    if outcome.is_write() {
                        writes += 1;
                    }
                    ancestors.insert(prefix.to_vec(), Ok(outcome.id));
                }
                Err(err) => {
                    let err = SyncError::from(err);
                    let message = error_chain(&err);
                    error!("Ancestor '{title}' failed: {message}");
                    ancestors.insert(prefix.to_vec(), Err(message));
                    if err.is_fatal() || self.policy == FailurePolicy::FailFast {
                        return Err(err);
                    }
                }
            }
        }

        Ok(writes)
    }

    fn convert_placeholders(&self) -> Result<Placeholders, SyncError> {
        let convert = |markdown: &str, field: String| {
            self.converter
                .convert(markdown)
                .map_err(|source| SyncError::Conversion {
                    path: PathBuf::from(field),
                    source,
                })
        };
        let levels = self
            .placeholders
            .iter()
            .enumerate()
            .map(|(index, markdown)| convert(markdown, format!("sync.placeholders[{index}]")))
            .collect::<Result<_, _>>()?;
        Ok(Placeholders {
            levels,
            fallback: convert(&self.placeholder, "sync.placeholder".to_owned())?,
        })
    }

    /// Convert and upsert one leaf page under its ancestors.
    fn sync_leaf(
        &self,
        upserter: &PageUpserter<'_, A>,
        doc: &PlannedDocument,
        ancestors: &AncestorPages,
        abort: &AtomicBool,
        fatal: &Mutex<Option<SyncError>>,
    ) -> DocumentStatus {
        if abort.load(Ordering::SeqCst) {
            return DocumentStatus::NotAttempted;
        }

        let parent = match ancestors.get(doc.chain.ancestors()) {
            Some(Ok(id)) => id,
            Some(Err(message)) => {
                return DocumentStatus::Failed {
                    error: format!("ancestor page not synced: {message}"),
                };
            }
            None => return DocumentStatus::NotAttempted,
        };

        match self.sync_document(upserter, &doc.path, doc.chain.leaf(), parent) {
            Ok(outcome) => {
                log_outcome(doc.chain.leaf(), &outcome);
                DocumentStatus::Synced {
                    writes: doc.ancestor_writes + usize::from(outcome.is_write()),
                    leaf_id: outcome.id,
                    action: outcome.action,
                }
            }
            Err(err) => {
                let message = error_chain(&err);
                error!("{}: {message}", doc.path.display());
                if err.is_fatal() || self.policy == FailurePolicy::FailFast {
                    abort.store(true, Ordering::SeqCst);
                    let mut slot = fatal.lock().unwrap_or_else(PoisonError::into_inner);
                    if slot.is_none() {
                        *slot = Some(err);
                    }
                }
                DocumentStatus::Failed { error: message }
            }
        }
    }

    fn sync_document(
        &self,
        upserter: &PageUpserter<'_, A>,
        path: &Path,
        title: &str,
        parent: &PageId,
    ) -> Result<UpsertOutcome, SyncError> {
        let raw = fs::read_to_string(path).map_err(|source| SyncError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let content = self
            .converter
            .convert(&raw)
            .map_err(|source| SyncError::Conversion {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(upserter.upsert(&self.space, title, &content, Some(parent))?)
    }
}

/// Skip leaves whose title is taken by an ancestor or an earlier leaf.
///
/// Titles are unique within a space, so either clash would make every run
/// write the same page twice with different content.
fn reject_title_clashes(
    planned: Vec<PlannedDocument>,
    report: &mut SyncReport,
) -> Vec<PlannedDocument> {
    let ancestor_titles: HashSet<&str> = planned
        .iter()
        .flat_map(|doc| doc.chain.ancestors())
        .map(String::as_str)
        .collect();

    let mut leaf_owners: HashMap<String, String> = HashMap::new();
    let mut rejected = Vec::new();
    for doc in &planned {
        let title = doc.chain.leaf();
        let filename = display_name(&doc.path);
        let clash = if ancestor_titles.contains(title) {
            Some(HierarchyError::LeafIsAncestor {
                filename,
                title: title.to_owned(),
            })
        } else if let Some(first) = leaf_owners.get(title) {
            Some(HierarchyError::DuplicateLeaf {
                filename,
                title: title.to_owned(),
                first: first.clone(),
            })
        } else {
            leaf_owners.insert(title.to_owned(), filename);
            None
        };
        if let Some(err) = clash {
            warn!("Skipping {}: {err}", doc.path.display());
            report.documents[doc.index].status = DocumentStatus::Skipped {
                reason: err.to_string(),
            };
            rejected.push(doc.index);
        }
    }

    planned
        .into_iter()
        .filter(|doc| !rejected.contains(&doc.index))
        .collect()
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn log_outcome(title: &str, outcome: &UpsertOutcome) {
    match outcome.action {
        UpsertAction::Created => info!("Created '{title}' ({})", outcome.id),
        UpsertAction::Updated { from, to } => {
            info!("Updated '{title}' ({}) v{from} -> v{to}", outcome.id);
        }
        UpsertAction::Unchanged => info!("Unchanged '{title}' ({})", outcome.id),
    }
}

fn log_summary(report: &SyncReport) {
    info!(
        created = report.created,
        updated = report.updated,
        unchanged = report.unchanged,
        skipped = report.skipped(),
        failed = report.failed(),
        not_attempted = report.not_attempted(),
        "Synchronization finished"
    );
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;
    use tempfile::TempDir;
    use wikisync_config::{Config, HierarchyConfig, SyncConfig};
    use wikisync_confluence::{MockContentApi, MockFailure};

    use super::*;

    fn config(dir: &Path) -> Config {
        let mut config = Config::default();
        config.confluence.space_key = "DOCS".to_owned();
        config.hierarchy = HierarchyConfig::default();
        config.sync_resolved = SyncConfig {
            source_dir: dir.to_path_buf(),
            ..SyncConfig::default()
        };
        config
    }

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_failure_policy_from_setting() {
        assert_eq!(
            FailurePolicy::from_continue_on_error(true),
            FailurePolicy::ContinueOnError
        );
        assert_eq!(
            FailurePolicy::from_continue_on_error(false),
            FailurePolicy::FailFast
        );
    }

    #[test]
    fn test_builds_hierarchy() {
        let temp = TempDir::new().unwrap();
        let path = write(temp.path(), "BCP_Data-Platform_Databricks.md", "# Databricks");
        let api = MockContentApi::new();
        let config = config(temp.path());

        let report = Synchronizer::new(&api, &config).sync_paths(&[path]).unwrap();

        assert!(report.is_success());
        assert_eq!(report.created, 3);
        let root = api.page("DOCS", "BCP").unwrap();
        let middle = api.page("DOCS", "Data Platform").unwrap();
        let leaf = api.page("DOCS", "Databricks").unwrap();
        assert_eq!(api.parent_of(&root.id), None);
        assert_eq!(api.parent_of(&middle.id), Some(root.id.clone()));
        assert_eq!(api.parent_of(&leaf.id), Some(middle.id.clone()));
        assert_eq!(
            leaf.storage(),
            Some("<h1><strong>Databricks</strong></h1>")
        );
        assert_eq!(
            root.storage(),
            Some("<p>This page groups related documents.</p>")
        );
        assert_eq!(
            report.documents[0].status,
            DocumentStatus::Synced {
                leaf_id: leaf.id,
                action: UpsertAction::Created,
                writes: 3,
            }
        );
    }

    #[test]
    fn test_shared_ancestors_upserted_once() {
        let temp = TempDir::new().unwrap();
        let a = write(temp.path(), "Team_Guides_One.md", "one");
        let b = write(temp.path(), "Team_Guides_Two.md", "two");
        let api = MockContentApi::new();
        let config = config(temp.path());

        let report = Synchronizer::new(&api, &config).sync_paths(&[a, b]).unwrap();

        assert_eq!(report.created, 4);
        assert_eq!(api.page_count(), 4);
        // One read per distinct page
        assert_eq!(api.reads(), 4);
    }

    #[test]
    fn test_malformed_filename_skipped_without_backend_calls() {
        let temp = TempDir::new().unwrap();
        let path = write(temp.path(), "single-segment.md", "text");
        let api = MockContentApi::new();
        let config = config(temp.path());

        let report = Synchronizer::new(&api, &config).sync_paths(&[path]).unwrap();

        assert_eq!(report.skipped(), 1);
        assert!(report.is_success());
        assert_eq!(api.reads(), 0);
        assert_eq!(api.writes(), 0);
    }

    #[test]
    fn test_second_run_writes_nothing() {
        let temp = TempDir::new().unwrap();
        let path = write(temp.path(), "A_B.md", "- [x] done");
        let api = MockContentApi::new();
        let config = config(temp.path());
        let sync = Synchronizer::new(&api, &config);

        sync.sync_paths(std::slice::from_ref(&path)).unwrap();
        let writes = api.writes();
        let report = sync.sync_paths(&[path]).unwrap();

        assert_eq!(api.writes(), writes);
        assert_eq!(report.unchanged, 2);
        assert!(matches!(
            report.documents[0].status,
            DocumentStatus::Synced { writes: 0, .. }
        ));
    }

    #[test]
    fn test_changed_leaf_is_updated() {
        let temp = TempDir::new().unwrap();
        let path = write(temp.path(), "A_B.md", "v1");
        let api = MockContentApi::new();
        let config = config(temp.path());
        let sync = Synchronizer::new(&api, &config);

        sync.sync_paths(std::slice::from_ref(&path)).unwrap();
        fs::write(&path, "v2").unwrap();
        let report = sync.sync_paths(&[path]).unwrap();

        assert_eq!(report.updated, 1);
        assert_eq!(report.unchanged, 1);
        let leaf = api.page("DOCS", "B").unwrap();
        assert_eq!(leaf.version.number, 2);
        assert_eq!(leaf.storage(), Some("<p>v2</p>"));
    }

    #[test]
    fn test_conversion_error_continues() {
        let temp = TempDir::new().unwrap();
        let bad = write(temp.path(), "A_Bad.md", "::: info\nunclosed");
        let good = write(temp.path(), "A_Good.md", "fine");
        let api = MockContentApi::new();
        let config = config(temp.path());

        let report = Synchronizer::new(&api, &config)
            .sync_paths(&[bad, good])
            .unwrap();

        assert_eq!(report.failed(), 1);
        assert_eq!(report.synced(), 1);
        assert!(report.abort.is_none());
        assert!(!report.is_success());
        let DocumentStatus::Failed { error } = &report.documents[0].status else {
            panic!("expected failure");
        };
        assert!(error.contains("unclosed `::: info` callout opened at line 1"));
        assert!(api.page("DOCS", "Good").is_some());
    }

    #[test]
    fn test_fail_fast_stops_at_first_error() {
        let temp = TempDir::new().unwrap();
        let bad = write(temp.path(), "A_Bad.md", "::: tip\nunclosed");
        let good = write(temp.path(), "A_Good.md", "fine");
        let api = MockContentApi::new();
        let config = config(temp.path());

        let report = Synchronizer::new(&api, &config)
            .with_policy(FailurePolicy::FailFast)
            .sync_paths(&[bad, good])
            .unwrap();

        assert_eq!(report.failed(), 1);
        assert_eq!(report.not_attempted(), 1);
        assert!(matches!(report.abort, Some(SyncError::Conversion { .. })));
        assert!(api.page("DOCS", "Good").is_none());
    }

    #[test]
    fn test_fatal_error_stops_regardless_of_policy() {
        let temp = TempDir::new().unwrap();
        let first = write(temp.path(), "A_First.md", "one");
        let second = write(temp.path(), "A_Second.md", "two");
        let api = MockContentApi::new().with_failure("First", MockFailure::Authentication);
        let config = config(temp.path());

        let report = Synchronizer::new(&api, &config)
            .sync_paths(&[first, second])
            .unwrap();

        assert_eq!(report.failed(), 1);
        assert_eq!(report.not_attempted(), 1);
        let err = report.into_result().unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_unavailable_ancestor_aborts_run() {
        let temp = TempDir::new().unwrap();
        let first = write(temp.path(), "A_First.md", "one");
        let second = write(temp.path(), "B_Second.md", "two");
        let api = MockContentApi::new().with_failure("A", MockFailure::Unavailable);
        let config = config(temp.path());

        let report = Synchronizer::new(&api, &config)
            .with_policy(FailurePolicy::ContinueOnError)
            .sync_paths(&[first, second])
            .unwrap();

        assert_eq!(report.failed(), 1);
        assert_eq!(report.not_attempted(), 1);
        assert_eq!(api.writes(), 0);
        let err = report.into_result().unwrap_err();
        assert!(err.is_fatal());
        assert!(error_chain(&err).contains("connection refused"));
    }

    #[test]
    fn test_stale_version_aborts_run() {
        let temp = TempDir::new().unwrap();
        let alpha = write(temp.path(), "A_Alpha.md", "new");
        let beta = write(temp.path(), "A_Beta.md", "beta");
        let api = MockContentApi::new()
            .with_page("DOCS", "Alpha", "<p>old</p>")
            .with_failure("Alpha", MockFailure::Conflict);
        let mut config = config(temp.path());
        config.sync_resolved.workers = 1;

        let report = Synchronizer::new(&api, &config)
            .with_policy(FailurePolicy::ContinueOnError)
            .sync_paths(&[alpha, beta])
            .unwrap();

        assert!(matches!(
            report.documents[0].status,
            DocumentStatus::Failed { .. }
        ));
        assert_eq!(report.documents[1].status, DocumentStatus::NotAttempted);
        assert!(api.page("DOCS", "Beta").is_none());
        let err = report.into_result().unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_placeholder_per_level() {
        let temp = TempDir::new().unwrap();
        let path = write(temp.path(), "Root_Group_Doc.md", "body");
        let api = MockContentApi::new();
        let mut config = config(temp.path());
        config.sync_resolved.placeholder = "Nested level".to_owned();
        config.sync_resolved.placeholders = vec!["Top level".to_owned()];

        let report = Synchronizer::new(&api, &config).sync_paths(&[path]).unwrap();

        assert!(report.is_success());
        let root = api.page("DOCS", "Root").unwrap();
        let group = api.page("DOCS", "Group").unwrap();
        assert_eq!(root.storage(), Some("<p>Top level</p>"));
        assert_eq!(group.storage(), Some("<p>Nested level</p>"));
    }

    #[test]
    fn test_invalid_level_placeholder_names_field() {
        let temp = TempDir::new().unwrap();
        let path = write(temp.path(), "A_B.md", "body");
        let api = MockContentApi::new();
        let mut config = config(temp.path());
        config.sync_resolved.placeholders = vec!["::: note\nopen".to_owned()];

        let err = Synchronizer::new(&api, &config)
            .sync_paths(&[path])
            .unwrap_err();

        let SyncError::Conversion { path, .. } = err else {
            panic!("expected conversion error");
        };
        assert_eq!(path, PathBuf::from("sync.placeholders[0]"));
        assert_eq!(api.reads(), 0);
    }

    #[test]
    fn test_leaf_title_used_as_ancestor_is_skipped() {
        let temp = TempDir::new().unwrap();
        let leaf = write(temp.path(), "A_B.md", "leaf content");
        let nested = write(temp.path(), "A_B_C.md", "nested");
        let api = MockContentApi::new();
        let config = config(temp.path());
        let sync = Synchronizer::new(&api, &config);

        let report = sync
            .sync_paths(&[leaf.clone(), nested.clone()])
            .unwrap();

        assert_eq!(report.skipped(), 1);
        assert_eq!(report.synced(), 1);
        let DocumentStatus::Skipped { reason } = &report.documents[0].status else {
            panic!("expected skip");
        };
        assert!(reason.contains("also an ancestor page"));
        assert_eq!(api.page_count(), 3);
        assert_eq!(
            api.page("DOCS", "B").unwrap().storage(),
            Some("<p>This page groups related documents.</p>")
        );

        let writes = api.writes();
        sync.sync_paths(&[leaf, nested]).unwrap();
        assert_eq!(api.writes(), writes);
    }

    #[test]
    fn test_duplicate_leaf_title_keeps_first() {
        let temp = TempDir::new().unwrap();
        let first = write(temp.path(), "X_Same.md", "first");
        let second = write(temp.path(), "Y_Same.md", "second");
        let api = MockContentApi::new();
        let config = config(temp.path());

        let report = Synchronizer::new(&api, &config)
            .sync_paths(&[first, second])
            .unwrap();

        assert_eq!(report.synced(), 1);
        let DocumentStatus::Skipped { reason } = &report.documents[1].status else {
            panic!("expected skip");
        };
        assert!(reason.contains("already used by 'X_Same.md'"));
        assert_eq!(api.page("DOCS", "Same").unwrap().storage(), Some("<p>first</p>"));
        assert!(api.page("DOCS", "Y").is_none());
    }

    #[test]
    fn test_failed_ancestor_fails_its_documents_only() {
        let temp = TempDir::new().unwrap();
        let a = write(temp.path(), "Broken_One.md", "one");
        let b = write(temp.path(), "Broken_Two.md", "two");
        let c = write(temp.path(), "Fine_Three.md", "three");
        let api = MockContentApi::new().with_failure("Broken", MockFailure::Http(500));
        let config = config(temp.path());

        let report = Synchronizer::new(&api, &config)
            .sync_paths(&[a, b, c])
            .unwrap();

        assert_eq!(report.failed(), 2);
        assert_eq!(report.synced(), 1);
        assert!(api.page("DOCS", "One").is_none());
        assert!(api.page("DOCS", "Three").is_some());
    }

    #[test]
    fn test_unreadable_document_is_document_error() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("A_Missing.md");
        let api = MockContentApi::new();
        let config = config(temp.path());

        let report = Synchronizer::new(&api, &config)
            .sync_paths(&[missing])
            .unwrap();

        assert_eq!(report.failed(), 1);
        assert!(report.abort.is_none());
    }

    #[test]
    fn test_parallel_workers_sync_everything() {
        let temp = TempDir::new().unwrap();
        let paths: Vec<PathBuf> = (0..12)
            .map(|n| write(temp.path(), &format!("Root_Group-{}_Doc-{n}.md", n % 3), "body"))
            .collect();
        let api = MockContentApi::new();
        let mut config = config(temp.path());
        config.sync_resolved.workers = 4;

        let report = Synchronizer::new(&api, &config).sync_paths(&paths).unwrap();

        assert!(report.is_success());
        assert_eq!(report.synced(), 12);
        // Root + 3 groups + 12 leaves
        assert_eq!(api.page_count(), 16);
        assert_eq!(report.created, 16);
    }
}
