//! Command-line runtime for shapegrep.
//!
//! The runtime splits configuration flags from search arguments, loads the
//! layered configuration, installs telemetry, expands the search roots into
//! files, runs the search and renders the results. It is exercised both from
//! the binary entrypoint and from tests where configuration loading and IO
//! streams are substituted.
//!
//! Exit status is `0` when anything matched, `1` when nothing matched and
//! `2` when the invocation failed or every query was rejected.

use std::ffi::OsString;
use std::fs;
use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use clap::error::ErrorKind as ClapErrorKind;
use shapegrep_config::Config;
use shapegrep_core::{CancellationToken, CaseSensitivity, SearchResults, SearchSettings, search};
use shapegrep_syntax::LanguageRegistry;
use tracing::debug;

mod cli;
mod config;
mod discovery;
mod errors;
pub mod output;
mod telemetry;

use cli::Cli;
use config::{ConfigLoader, OrthoConfigLoader, search_arguments, split_config_arguments};
use discovery::{FileFilter, discover};
use errors::AppError;
pub use output::{OutputFormat, ResolvedOutputFormat};
pub use telemetry::TelemetryError;

const EXIT_NO_MATCHES: u8 = 1;
const EXIT_FAILURE: u8 = 2;

/// Bundles the IO streams provided to the CLI runtime.
pub(crate) struct IoStreams<'a, W: Write, E: Write> {
    pub(crate) stdout: &'a mut W,
    pub(crate) stderr: &'a mut E,
    stdout_is_terminal: bool,
}

impl<'a, W: Write, E: Write> IoStreams<'a, W, E> {
    pub(crate) const fn new(stdout: &'a mut W, stderr: &'a mut E, stdout_is_terminal: bool) -> Self {
        Self {
            stdout,
            stderr,
            stdout_is_terminal,
        }
    }
}

/// How a completed invocation ended.
enum Outcome {
    /// Help or version text was printed.
    Informational,
    /// A search ran to completion.
    Searched {
        results: SearchResults,
        query_count: usize,
    },
}

struct CliRunner<'a, 'io, W: Write, E: Write, L: ConfigLoader> {
    io: &'a mut IoStreams<'io, W, E>,
    loader: &'a L,
}

impl<'a, 'io, W, E, L> CliRunner<'a, 'io, W, E, L>
where
    W: Write,
    E: Write,
    L: ConfigLoader,
{
    const fn new(io: &'a mut IoStreams<'io, W, E>, loader: &'a L) -> Self {
        Self { io, loader }
    }

    fn run<I>(&mut self, args: I) -> ExitCode
    where
        I: IntoIterator<Item = OsString>,
    {
        match self.try_run(args) {
            Ok(Outcome::Informational) => ExitCode::SUCCESS,
            Ok(Outcome::Searched {
                results,
                query_count,
            }) => exit_code_for(&results, query_count),
            Err(error) => {
                let _ignored = writeln!(self.io.stderr, "shapegrep: {error}");
                ExitCode::from(EXIT_FAILURE)
            }
        }
    }

    fn try_run<I>(&mut self, args: I) -> Result<Outcome, AppError>
    where
        I: IntoIterator<Item = OsString>,
    {
        let arguments: Vec<OsString> = args.into_iter().collect();
        let split = split_config_arguments(&arguments);

        let cli = match Cli::try_parse_from(search_arguments(&arguments, &split)) {
            Ok(cli) => cli,
            Err(error)
                if matches!(
                    error.kind(),
                    ClapErrorKind::DisplayHelp | ClapErrorKind::DisplayVersion
                ) =>
            {
                write!(self.io.stdout, "{}", error.render())?;
                return Ok(Outcome::Informational);
            }
            Err(error) => return Err(AppError::CliUsage(error)),
        };
        let config = self.loader.load(&split.config_arguments)?;
        telemetry::initialise(&config)?;

        let queries = collect_queries(&cli)?;
        let registry = LanguageRegistry::new();
        let files = discover(&cli.search_roots(), &FileFilter::new(&registry, cli.mode))?;
        debug!(queries = queries.len(), files = files.len(), mode = %cli.mode, "starting search");

        let results = search(
            &registry,
            &queries,
            &files,
            &search_settings(&cli, &config),
            &CancellationToken::new(),
        );

        let format = cli.output.resolve(self.io.stdout_is_terminal);
        output::write_results(&mut *self.io.stdout, &results, format)?;
        output::write_problems(&mut *self.io.stderr, &results)?;
        Ok(Outcome::Searched {
            results,
            query_count: queries.len(),
        })
    }
}

/// Gathers inline queries followed by the contents of each query file.
fn collect_queries(cli: &Cli) -> Result<Vec<String>, AppError> {
    let mut queries = cli.queries.clone();
    for path in &cli.query_files {
        let text = fs::read_to_string(path).map_err(|source| AppError::ReadQueryFile {
            path: path.clone(),
            source,
        })?;
        queries.push(text);
    }
    if queries.is_empty() {
        return Err(AppError::MissingQuery);
    }
    Ok(queries)
}

fn search_settings(cli: &Cli, config: &Config) -> SearchSettings {
    SearchSettings {
        mode: cli.mode,
        case: CaseSensitivity::from_insensitive_flag(cli.case_insensitive),
        max_file_size: config.max_file_size(),
        file_timeout: config.file_timeout(),
        threads: config.threads(),
    }
}

/// Matches win over errors; with no match, a fully rejected query set fails.
fn exit_code_for(results: &SearchResults, query_count: usize) -> ExitCode {
    if !results.matches.is_empty() {
        ExitCode::SUCCESS
    } else if all_queries_rejected(results, query_count) {
        ExitCode::from(EXIT_FAILURE)
    } else {
        ExitCode::from(EXIT_NO_MATCHES)
    }
}

/// Returns whether every query failed to prepare for at least one grammar.
fn all_queries_rejected(results: &SearchResults, query_count: usize) -> bool {
    query_count > 0
        && (0..query_count).all(|index| {
            results
                .query_errors
                .iter()
                .any(|error| error.index == index)
        })
}

/// Runs the CLI using the provided arguments and IO handles.
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E, stdout_is_terminal: bool) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    let mut io = IoStreams::new(stdout, stderr, stdout_is_terminal);
    run_with_loader(args, &mut io, &OrthoConfigLoader)
}

/// Runs the CLI with a custom configuration loader.
pub(crate) fn run_with_loader<I, W, E, L>(args: I, io: &mut IoStreams<'_, W, E>, loader: &L) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
    L: ConfigLoader,
{
    CliRunner::new(io, loader).run(args)
}
