//! Unit tests for search orchestration.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use insta::assert_snapshot;
use rstest::{fixture, rstest};
use tempfile::TempDir;

use super::support::{SLOW_MARKER, SexpGrammar, SexpGrammars, file_root, prepared};
use crate::{
    CancellationToken, CaseSensitivity, ErrorKind, Mode, SearchResults, SearchSettings,
    prefilter, scan_tree, search,
};

// =============================================================================
// Fixtures
// =============================================================================

struct Workspace {
    dir: TempDir,
    paths: Vec<PathBuf>,
}

impl Workspace {
    fn add(&mut self, name: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, content).unwrap_or_else(|error| panic!("write {name}: {error}"));
        self.paths.push(path.clone());
        path
    }

    fn search(&self, queries: &[&str], settings: &SearchSettings) -> SearchResults {
        let queries: Vec<String> = queries.iter().map(|query| (*query).to_owned()).collect();
        search(
            &SexpGrammars,
            &queries,
            &self.paths,
            settings,
            &CancellationToken::new(),
        )
    }

    fn relative(&self, path: &Path) -> String {
        path.strip_prefix(self.dir.path())
            .unwrap_or(path)
            .display()
            .to_string()
    }
}

#[fixture]
fn workspace() -> Workspace {
    Workspace {
        dir: TempDir::new().unwrap_or_else(|error| panic!("tempdir: {error}")),
        paths: Vec::new(),
    }
}

fn include() -> SearchSettings {
    SearchSettings::default()
}

// =============================================================================
// Merging and ordering
// =============================================================================

#[rstest]
fn matches_are_sorted_by_path_then_offset(mut workspace: Workspace) {
    workspace.add("b.sx", "(call callee=ident:log) (call callee=ident:log)");
    workspace.add("a.sx", "(call callee=ident:log)");

    let results = workspace.search(&["(call callee=ident:log)"], &include());

    let found: Vec<_> = results
        .matches
        .iter()
        .map(|found| (workspace.relative(&found.path), found.span.start_byte))
        .collect();
    assert_eq!(
        found,
        vec![
            (String::from("a.sx"), 0),
            (String::from("b.sx"), 0),
            (String::from("b.sx"), 24),
        ]
    );
    assert_eq!(results.stats.matches, 3);
}

#[rstest]
fn queries_combine_with_or_and_deduplicate(mut workspace: Workspace) {
    workspace.add("a.sx", "(call callee=ident:log) (call callee=ident:warn)");

    let results = workspace.search(
        &["(call callee=ident:warn)", "(call callee=ident:$$)"],
        &include(),
    );

    let found: Vec<_> = results
        .matches
        .iter()
        .map(|found| (found.code.as_str(), found.query_index))
        .collect();
    assert_eq!(
        found,
        [("(call callee=ident:log)", 1), ("(call callee=ident:warn)", 0)]
    );
}

#[rstest]
fn worker_count_does_not_change_results(mut workspace: Workspace) {
    for index in 0..12 {
        workspace.add(
            &format!("file{index:02}.sx"),
            "(call callee=ident:log (args ident:a)) (call callee=ident:log)",
        );
    }

    let sequential = workspace.search(
        &["(call callee=ident:log)"],
        &SearchSettings {
            threads: 1,
            ..include()
        },
    );
    let parallel = workspace.search(
        &["(call callee=ident:log)"],
        &SearchSettings {
            threads: 4,
            ..include()
        },
    );

    assert_eq!(sequential.matches, parallel.matches);
    assert_eq!(parallel.matches.len(), 24);
}

// =============================================================================
// Error isolation
// =============================================================================

#[rstest]
fn broken_file_does_not_hide_other_matches(mut workspace: Workspace) {
    let broken = workspace.add("broken.sx", "(call callee=ident:log");
    workspace.add("fine.sx", "(call callee=ident:log)");

    let results = workspace.search(&["(call callee=ident:log)"], &include());

    assert_eq!(results.matches.len(), 1);
    let [error] = results.errors.as_slice() else {
        panic!("expected one error, got {:?}", results.errors);
    };
    assert_eq!(error.path, broken);
    assert_eq!(error.kind, ErrorKind::FileParse);
    assert_eq!(results.stats.files_failed, 1);
}

#[rstest]
fn invalid_query_is_reported_apart_from_file_errors(mut workspace: Workspace) {
    workspace.add("a.sx", "(call callee=ident:log)");

    let results = workspace.search(&["(call", "(call callee=ident:log)", "  "], &include());

    assert_eq!(results.matches.len(), 1);
    assert!(results.errors.is_empty());
    let reported: Vec<_> = results
        .query_errors
        .iter()
        .map(|error| (error.index, error.grammar.as_deref()))
        .collect();
    assert_eq!(reported, [(2, None), (0, Some("sexp"))]);
}

#[rstest]
fn oversized_files_are_reported(mut workspace: Workspace) {
    workspace.add("big.sx", "(call callee=ident:log) (call callee=ident:log)");

    let results = workspace.search(
        &["(call callee=ident:log)"],
        &SearchSettings {
            max_file_size: Some(10),
            ..include()
        },
    );

    assert!(results.matches.is_empty());
    assert_eq!(
        results.errors.first().map(|error| error.kind),
        Some(ErrorKind::FileTooLarge)
    );
}

#[rstest]
fn slow_parses_time_out(mut workspace: Workspace) {
    workspace.add("slow.sx", &format!("(call callee=ident:log) {SLOW_MARKER}"));

    let results = workspace.search(
        &["(call callee=ident:log)"],
        &SearchSettings {
            file_timeout: Some(Duration::from_millis(5)),
            ..include()
        },
    );

    let [error] = results.errors.as_slice() else {
        panic!("expected one error, got {:?}", results.errors);
    };
    assert_eq!(error.kind, ErrorKind::FileParse);
    assert_snapshot!(error.message.as_str(), @"failed to parse file: parsing exceeded the 5ms time limit");
}

#[rstest]
fn unsupported_files_are_reported(mut workspace: Workspace) {
    workspace.add("notes.txt", "(call callee=ident:log)");

    let results = workspace.search(&["(call callee=ident:log)"], &include());

    assert_eq!(
        results.errors.first().map(|error| error.kind),
        Some(ErrorKind::UnsupportedLanguage)
    );
}

#[rstest]
fn cancelled_search_starts_no_files(mut workspace: Workspace) {
    workspace.add("a.sx", "(call callee=ident:log)");
    workspace.add("b.sx", "(call callee=ident:log)");
    let cancel = CancellationToken::new();
    cancel.cancel();

    let results = search(
        &SexpGrammars,
        &[String::from("(call callee=ident:log)")],
        &workspace.paths,
        &include(),
        &cancel,
    );

    assert!(results.matches.is_empty());
    assert!(results.errors.is_empty());
    assert_eq!(results.stats.files_cancelled, 2);
}

// =============================================================================
// Pre-filter
// =============================================================================

#[rstest]
fn prefiltered_files_are_skipped(mut workspace: Workspace) {
    workspace.add("hit.sx", "(call callee=ident:log)");
    workspace.add("miss.sx", "(call callee=ident:warn)");

    let results = workspace.search(&["(call callee=ident:log)"], &include());

    assert_eq!(results.stats.files_searched, 1);
    assert_eq!(results.stats.files_skipped, 1);
}

#[rstest]
#[case("(call callee=ident:log)", "(call callee=ident:logger)")]
#[case("(import ident:$$x str:REACT)", "(import ident:Foo str:react)")]
#[case("(jsx name=ident:on$$)", "(jsx name=ident:handleClick)")]
#[case("(list ident:A ident:B)", "(list ident:B ident:A)")]
#[case("(list ident:A ident:B)", "(list ident:A)")]
fn rejected_files_never_match(#[case] query: &str, #[case] file: &str) {
    let root = file_root(file);
    for case in [CaseSensitivity::Sensitive, CaseSensitivity::Insensitive] {
        let prepared_query = prepared(query, case);
        for mode in [Mode::Exact, Mode::Include, Mode::IncludeWithOrder] {
            let scan = scan_tree(&SexpGrammar, mode, &root, &prepared_query);
            if !prefilter::may_match(file, &prepared_query) {
                assert!(scan.matches.is_empty(), "{query} matched {file} in {mode}");
            }
        }
    }
}

// =============================================================================
// Text mode
// =============================================================================

#[rstest]
fn text_mode_searches_raw_text(mut workspace: Workspace) {
    workspace.add("a.sx", "; TODO: parse me\n(call callee=ident:log");

    let results = workspace.search(
        &["todo:"],
        &SearchSettings {
            mode: Mode::Text,
            case: CaseSensitivity::Insensitive,
            ..include()
        },
    );

    assert!(results.errors.is_empty(), "text mode never parses files");
    let found: Vec<_> = results
        .matches
        .iter()
        .map(|found| (found.code.as_str(), found.kind.as_str()))
        .collect();
    assert_eq!(found, [("TODO:", "text")]);
}

// =============================================================================
// Serialisation
// =============================================================================

#[rstest]
fn results_serialise_to_json(mut workspace: Workspace) {
    workspace.add("a.sx", "(call\n  callee=ident:log)");

    let mut results = workspace.search(&["(call callee=ident:log)"], &include());
    results.stats.elapsed_ms = 0;
    for found in &mut results.matches {
        found.path = PathBuf::from("a.sx");
    }

    let json = serde_json::to_string_pretty(&results)
        .unwrap_or_else(|error| panic!("serialise: {error}"));
    assert_snapshot!(json, @r#"
    {
      "matches": [
        {
          "path": "a.sx",
          "span": {
            "start_byte": 0,
            "end_byte": 25,
            "start": {
              "line": 0,
              "column": 0
            },
            "end": {
              "line": 1,
              "column": 19
            }
          },
          "code": "(call\n  callee=ident:log)",
          "kind": "call",
          "query_index": 0
        }
      ],
      "errors": [],
      "query_errors": [],
      "stats": {
        "files_total": 1,
        "files_searched": 1,
        "files_skipped": 0,
        "files_cancelled": 0,
        "files_failed": 0,
        "candidates": 1,
        "matches": 1,
        "elapsed_ms": 0
      }
    }
    "#);
}
