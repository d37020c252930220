//! Scenario bindings for the `shapegrep-core` BDD feature file.

use std::cell::RefCell;

use rstest::fixture;
use rstest_bdd_macros::scenario;

use super::TestWorld;

/// Fixture providing the shared BDD world.
#[fixture]
fn world() -> RefCell<TestWorld> {
    super::world()
}

#[scenario(
    path = "tests/features/search.feature",
    name = "Exact mode rejects extra children"
)]
fn exact_rejects_extra_children(world: RefCell<TestWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/search.feature",
    name = "Include mode ignores child order"
)]
fn include_ignores_order(world: RefCell<TestWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/search.feature",
    name = "Include with order keeps query order"
)]
fn include_with_order_keeps_order(world: RefCell<TestWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/search.feature",
    name = "Literal children are placed before wildcards"
)]
fn literals_before_wildcards(world: RefCell<TestWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/search.feature",
    name = "Multi-statement queries span the matched statements"
)]
fn multi_statement_span(world: RefCell<TestWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/search.feature",
    name = "Case-insensitive matching folds identifiers and strings"
)]
fn case_insensitive_folding(world: RefCell<TestWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/search.feature",
    name = "A broken file does not stop the search"
)]
fn broken_file_isolated(world: RefCell<TestWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/search.feature",
    name = "Several queries are combined"
)]
fn queries_combined(world: RefCell<TestWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/search.feature",
    name = "Text mode matches raw text"
)]
fn text_mode_raw(world: RefCell<TestWorld>) {
    drop(world);
}
