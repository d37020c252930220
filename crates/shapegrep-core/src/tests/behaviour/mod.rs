//! Behaviour-driven development (BDD) step definitions for shapegrep-core scenarios.

use std::cell::RefCell;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

use rstest::fixture;
use rstest_bdd_macros::{given, then, when};
use tempfile::TempDir;

use super::support::SexpGrammars;
use crate::{
    CancellationToken, CaseSensitivity, ErrorKind, Mode, SearchResults, SearchSettings, search,
};

mod scenarios;

// =============================================================================
// Test World
// =============================================================================

/// State shared across BDD steps.
struct TestWorld {
    /// Scratch directory holding the scenario's files.
    dir: TempDir,
    /// Files written so far, in declaration order.
    paths: Vec<PathBuf>,
    /// Queries combined with OR.
    queries: Vec<String>,
    /// Settings for the next search.
    settings: SearchSettings,
    /// Results of the last search.
    results: Option<SearchResults>,
}

impl Default for TestWorld {
    fn default() -> Self {
        Self {
            dir: TempDir::new().expect("temporary directory"),
            paths: Vec::new(),
            queries: Vec::new(),
            settings: SearchSettings::default(),
            results: None,
        }
    }
}

impl TestWorld {
    fn results(&self) -> &SearchResults {
        self.results
            .as_ref()
            .expect("search should run before assertions")
    }

    fn matched_code(&self) -> Vec<&str> {
        self.results()
            .matches
            .iter()
            .map(|found| found.code.as_str())
            .collect()
    }
}

#[fixture]
fn world() -> RefCell<TestWorld> {
    RefCell::new(TestWorld::default())
}

/// Strips surrounding double quotes from a string if present.
fn strip_quotes(s: &str) -> &str {
    s.trim_matches('"')
}

// =============================================================================
// Given Steps
// =============================================================================

#[given("a file {name} containing {content}")]
fn given_file(world: &RefCell<TestWorld>, name: String, content: String) {
    let mut w = world.borrow_mut();
    let path = w.dir.path().join(strip_quotes(&name));
    fs::write(&path, strip_quotes(&content)).expect("write scenario file");
    w.paths.push(path);
}

#[given("the query {query}")]
fn given_query(world: &RefCell<TestWorld>, query: String) {
    world
        .borrow_mut()
        .queries
        .push(strip_quotes(&query).to_owned());
}

#[given("the {mode} mode")]
fn given_mode(world: &RefCell<TestWorld>, mode: String) {
    world.borrow_mut().settings.mode = Mode::from_str(strip_quotes(&mode)).expect("mode");
}

#[given("case-insensitive matching")]
fn given_case_insensitive(world: &RefCell<TestWorld>) {
    world.borrow_mut().settings.case = CaseSensitivity::Insensitive;
}

// =============================================================================
// When Steps
// =============================================================================

#[when("the search runs")]
fn when_search_runs(world: &RefCell<TestWorld>) {
    let mut w = world.borrow_mut();
    let results = search(
        &SexpGrammars,
        &w.queries,
        &w.paths,
        &w.settings,
        &CancellationToken::new(),
    );
    w.results = Some(results);
}

// =============================================================================
// Then Steps
// =============================================================================

#[then("the search finds {count} matches")]
fn then_match_count(world: &RefCell<TestWorld>, count: usize) {
    let w = world.borrow();
    assert_eq!(
        w.results().matches.len(),
        count,
        "unexpected matches: {:?}",
        w.matched_code()
    );
}

#[then("no matches are found")]
fn then_no_matches(world: &RefCell<TestWorld>) {
    let w = world.borrow();
    assert!(
        w.results().matches.is_empty(),
        "expected no matches, got {:?}",
        w.matched_code()
    );
}

#[then("a match covers {code}")]
fn then_match_covers(world: &RefCell<TestWorld>, code: String) {
    let w = world.borrow();
    let expected = strip_quotes(&code).replace("\\n", "\n");
    assert!(
        w.matched_code().contains(&expected.as_str()),
        "no match covers {expected:?}, got {:?}",
        w.matched_code()
    );
}

#[then("the file {name} reports a {kind} error")]
fn then_file_reports(world: &RefCell<TestWorld>, name: String, kind: String) {
    let w = world.borrow();
    let expected = ErrorKind::from_str(strip_quotes(&kind)).expect("error kind");
    let path = w.dir.path().join(strip_quotes(&name));
    assert!(
        w.results()
            .errors
            .iter()
            .any(|error| error.path == path && error.kind == expected),
        "expected a {expected} error for {}, got {:?}",
        path.display(),
        w.results().errors
    );
}

#[then("no errors are reported")]
fn then_no_errors(world: &RefCell<TestWorld>) {
    let w = world.borrow();
    assert!(!w.results().has_errors(), "{:?}", w.results().errors);
}
