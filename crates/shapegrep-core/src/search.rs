//! Search orchestration across files and queries.
//!
//! Each file is processed independently: size guard, read, shallow
//! pre-filter, parse, then structural matching for every plausible query.
//! Workers accumulate local batches that are merged once all files are done;
//! the final ordering comes from a sort, never from scheduling.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{MatchError, QueryError, SearchError};
use crate::grammar::{Grammar, GrammarSet, ParseLimits};
use crate::matcher::scan_tree;
use crate::mode::{CaseSensitivity, Mode};
use crate::node::Span;
use crate::prefilter;
use crate::query::Query;
use crate::text::TextQuery;

/// Kind reported for text-mode matches.
pub const TEXT_MATCH_KIND: &str = "text";

/// Options controlling one search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchSettings {
    /// Matching strictness.
    pub mode: Mode,
    /// Case handling for token comparisons.
    pub case: CaseSensitivity,
    /// Files above this many bytes are reported instead of searched.
    pub max_file_size: Option<u64>,
    /// Upper bound on the time spent parsing one file.
    pub file_timeout: Option<Duration>,
    /// Worker count; `0` uses one worker per available core.
    pub threads: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            mode: Mode::default(),
            case: CaseSensitivity::default(),
            max_file_size: None,
            file_timeout: None,
            threads: 0,
        }
    }
}

/// Best-effort cancellation shared between a search and its caller.
///
/// Once cancelled, no new file is started. Files already in progress finish.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    /// Creates a token that is not cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Returns whether cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// One match in one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    /// File containing the match.
    pub path: PathBuf,
    /// Matched range.
    pub span: Span,
    /// Source text of the matched range.
    pub code: String,
    /// Type tag of the matched node, or [`TEXT_MATCH_KIND`].
    pub kind: String,
    /// Lowest index of the queries that produced this match.
    pub query_index: usize,
}

/// Counters describing one search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchStats {
    /// Files supplied by the caller.
    pub files_total: usize,
    /// Files parsed and matched.
    pub files_searched: usize,
    /// Files rejected by the shallow pre-filter.
    pub files_skipped: usize,
    /// Files never started because the search was cancelled.
    pub files_cancelled: usize,
    /// Files that produced an error record.
    pub files_failed: usize,
    /// Candidate nodes examined.
    pub candidates: usize,
    /// Matches after deduplication.
    pub matches: usize,
    /// Wall-clock duration in milliseconds.
    pub elapsed_ms: u64,
}

/// Everything a search produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResults {
    /// Matches sorted by path, then start and end offset.
    pub matches: Vec<Match>,
    /// Per-file failures sorted by path.
    pub errors: Vec<MatchError>,
    /// Queries that could not be prepared.
    pub query_errors: Vec<QueryError>,
    /// Counters.
    pub stats: SearchStats,
}

impl SearchResults {
    /// Returns whether any error of either kind was recorded.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty() || !self.query_errors.is_empty()
    }
}

/// Searches `paths` for matches of any of `queries`.
///
/// Queries are prepared once per grammar that occurs in `paths`. Invalid
/// queries are dropped and recorded in [`SearchResults::query_errors`];
/// unreadable, oversized or unparsable files are recorded in
/// [`SearchResults::errors`]. Neither aborts the search.
#[must_use]
pub fn search(
    grammars: &dyn GrammarSet,
    queries: &[String],
    paths: &[PathBuf],
    settings: &SearchSettings,
    cancel: &CancellationToken,
) -> SearchResults {
    let started = Instant::now();
    let mut query_errors = Vec::new();

    let plan = if settings.mode.is_structural() {
        Plan::Structural(plan_structural(grammars, queries, paths, settings, &mut query_errors))
    } else {
        Plan::Text(plan_text(queries, settings, &mut query_errors))
    };

    let batch = run_pool(settings.threads, || {
        paths
            .par_iter()
            .fold(Batch::default, |mut batch, path| {
                let outcome = process_file(&plan, path, settings, cancel);
                batch.absorb(path, outcome);
                batch
            })
            .reduce(Batch::default, Batch::merge)
    });

    finish(batch, query_errors, paths.len(), started)
}

/// Queries prepared for one grammar.
struct Prepared<'g> {
    grammar: &'g dyn Grammar,
    queries: Vec<Query>,
}

enum Plan<'g> {
    Structural(StructuralPlan<'g>),
    Text(Vec<TextQuery>),
}

struct StructuralPlan<'g> {
    grammars: &'g dyn GrammarSet,
    prepared: Vec<Prepared<'g>>,
}

impl StructuralPlan<'_> {
    fn for_path(&self, path: &Path) -> Option<&Prepared<'_>> {
        let grammar = self.grammars.grammar_for(path)?;
        self.prepared
            .iter()
            .find(|prepared| prepared.grammar.name() == grammar.name())
    }
}

fn plan_structural<'g>(
    grammars: &'g dyn GrammarSet,
    queries: &[String],
    paths: &[PathBuf],
    settings: &SearchSettings,
    query_errors: &mut Vec<QueryError>,
) -> StructuralPlan<'g> {
    let usable: Vec<(usize, &String)> = queries
        .iter()
        .enumerate()
        .filter(|(index, source)| {
            if source.trim().is_empty() {
                query_errors.push(QueryError::new(
                    *index,
                    None,
                    &SearchError::EmptyQuery { index: *index },
                ));
                return false;
            }
            true
        })
        .collect();

    let mut prepared: Vec<Prepared<'g>> = Vec::new();
    for grammar in paths.iter().filter_map(|path| grammars.grammar_for(path)) {
        if prepared
            .iter()
            .any(|existing| existing.grammar.name() == grammar.name())
        {
            continue;
        }

        let mut ready = Vec::new();
        for (index, source) in &usable {
            match Query::prepare(*index, source, grammar, settings.case) {
                Ok(query) => ready.push(query),
                Err(error) => {
                    warn!(query = index, grammar = grammar.name(), %error, "dropped query");
                    query_errors.push(QueryError::new(*index, Some(grammar.name()), &error));
                }
            }
        }
        prepared.push(Prepared {
            grammar,
            queries: ready,
        });
    }

    StructuralPlan { grammars, prepared }
}

fn plan_text(
    queries: &[String],
    settings: &SearchSettings,
    query_errors: &mut Vec<QueryError>,
) -> Vec<TextQuery> {
    queries
        .iter()
        .enumerate()
        .filter_map(|(index, source)| {
            TextQuery::prepare(index, source, settings.case)
                .map_err(|error| {
                    warn!(query = index, %error, "dropped query");
                    query_errors.push(QueryError::new(index, None, &error));
                })
                .ok()
        })
        .collect()
}

fn run_pool<T, F>(threads: usize, work: F) -> T
where
    T: Send,
    F: FnOnce() -> T + Send,
{
    if threads == 0 {
        return work();
    }
    match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
        Ok(pool) => pool.install(work),
        Err(error) => {
            warn!(threads, %error, "falling back to the global worker pool");
            work()
        }
    }
}

/// What happened to one file.
enum FileOutcome {
    Cancelled,
    Skipped,
    Searched {
        matches: Vec<Match>,
        candidates: usize,
        failures: Vec<SearchError>,
    },
    Failed(SearchError),
}

fn process_file(
    plan: &Plan<'_>,
    path: &Path,
    settings: &SearchSettings,
    cancel: &CancellationToken,
) -> FileOutcome {
    if cancel.is_cancelled() {
        return FileOutcome::Cancelled;
    }
    match search_file(plan, path, settings) {
        Ok(outcome) => outcome,
        Err(error) => FileOutcome::Failed(error),
    }
}

fn search_file(
    plan: &Plan<'_>,
    path: &Path,
    settings: &SearchSettings,
) -> Result<FileOutcome, SearchError> {
    let structural = match plan {
        Plan::Structural(structural) => {
            let prepared = structural
                .for_path(path)
                .ok_or(SearchError::UnsupportedLanguage)?;
            Some(prepared)
        }
        Plan::Text(_) => None,
    };

    if let Some(limit) = settings.max_file_size {
        let size = fs::metadata(path)?.len();
        if size > limit {
            return Err(SearchError::FileTooLarge { size, limit });
        }
    }
    let source = fs::read_to_string(path)?;

    match (plan, structural) {
        (Plan::Text(queries), _) => Ok(search_text(queries, path, &source)),
        (Plan::Structural(_), Some(prepared)) => search_tree(prepared, path, &source, settings),
        (Plan::Structural(_), None) => Err(SearchError::UnsupportedLanguage),
    }
}

fn search_tree(
    prepared: &Prepared<'_>,
    path: &Path,
    source: &str,
    settings: &SearchSettings,
) -> Result<FileOutcome, SearchError> {
    let plausible = prefilter::candidates(source, &prepared.queries);
    if plausible.is_empty() {
        return Ok(FileOutcome::Skipped);
    }

    let limits = ParseLimits {
        timeout: settings.file_timeout,
    };
    let root = prepared
        .grammar
        .parse_file(source, limits)
        .map_err(SearchError::FileParse)?;

    let mut matches = Vec::new();
    let mut candidates = 0;
    let mut failures = Vec::new();
    for query in plausible {
        let scan = scan_tree(prepared.grammar, settings.mode, &root, query);
        candidates += scan.candidates;
        failures.extend(scan.failures);
        matches.extend(scan.matches.into_iter().map(|found| Match {
            path: path.to_path_buf(),
            code: slice(source, &found.span),
            span: found.span,
            kind: found.kind,
            query_index: query.index(),
        }));
    }

    Ok(FileOutcome::Searched {
        matches,
        candidates,
        failures,
    })
}

fn search_text(queries: &[TextQuery], path: &Path, source: &str) -> FileOutcome {
    let plausible: Vec<&TextQuery> = queries
        .iter()
        .filter(|query| query.may_match(source))
        .collect();
    if plausible.is_empty() {
        return FileOutcome::Skipped;
    }

    let matches = plausible
        .into_iter()
        .flat_map(|query| {
            query.find_all(source).into_iter().map(|span| Match {
                path: path.to_path_buf(),
                code: slice(source, &span),
                span,
                kind: TEXT_MATCH_KIND.to_owned(),
                query_index: query.index(),
            })
        })
        .collect();

    FileOutcome::Searched {
        matches,
        candidates: 0,
        failures: Vec::new(),
    }
}

fn slice(source: &str, span: &Span) -> String {
    source.get(span.byte_range()).unwrap_or_default().to_owned()
}

/// Per-worker accumulation of file outcomes.
#[derive(Default)]
struct Batch {
    matches: Vec<Match>,
    errors: Vec<MatchError>,
    stats: SearchStats,
}

impl Batch {
    fn absorb(&mut self, path: &Path, outcome: FileOutcome) {
        match outcome {
            FileOutcome::Cancelled => self.stats.files_cancelled += 1,
            FileOutcome::Skipped => {
                debug!(path = %path.display(), "skipped by pre-filter");
                self.stats.files_skipped += 1;
            }
            FileOutcome::Searched {
                matches,
                candidates,
                failures,
            } => {
                debug!(
                    path = %path.display(),
                    matches = matches.len(),
                    candidates,
                    "searched file"
                );
                self.stats.files_searched += 1;
                self.stats.candidates += candidates;
                self.matches.extend(matches);
                self.errors
                    .extend(failures.iter().map(|failure| MatchError::new(path, failure)));
            }
            FileOutcome::Failed(error) => {
                warn!(path = %path.display(), %error, "file failed");
                self.stats.files_failed += 1;
                self.errors.push(MatchError::new(path, &error));
            }
        }
    }

    fn merge(mut self, other: Self) -> Self {
        self.matches.extend(other.matches);
        self.errors.extend(other.errors);
        self.stats.files_searched += other.stats.files_searched;
        self.stats.files_skipped += other.stats.files_skipped;
        self.stats.files_cancelled += other.stats.files_cancelled;
        self.stats.files_failed += other.stats.files_failed;
        self.stats.candidates += other.stats.candidates;
        self
    }
}

fn finish(
    batch: Batch,
    query_errors: Vec<QueryError>,
    files_total: usize,
    started: Instant,
) -> SearchResults {
    let Batch {
        mut matches,
        mut errors,
        mut stats,
    } = batch;

    matches.sort_by(|left, right| {
        (&left.path, left.span.start_byte, left.span.end_byte, left.query_index).cmp(&(
            &right.path,
            right.span.start_byte,
            right.span.end_byte,
            right.query_index,
        ))
    });
    matches.dedup_by(|later, earlier| {
        later.path == earlier.path
            && later.span.start_byte == earlier.span.start_byte
            && later.span.end_byte == earlier.span.end_byte
    });
    errors.sort_by(|left, right| left.path.cmp(&right.path));

    stats.files_total = files_total;
    stats.matches = matches.len();
    stats.elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

    info!(
        files = stats.files_total,
        searched = stats.files_searched,
        skipped = stats.files_skipped,
        failed = stats.files_failed,
        cancelled = stats.files_cancelled,
        matches = stats.matches,
        elapsed_ms = stats.elapsed_ms,
        "search finished"
    );

    SearchResults {
        matches,
        errors,
        query_errors,
        stats,
    }
}
