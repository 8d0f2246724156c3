//! Command dispatch: arguments in, exit code out

use std::io;

use clap::{Command, CommandFactory};
use clap_complete::{generate, Generator};
use tracing::{debug, info, instrument};

use crate::cli::args::Cli;
use crate::cli::output;
use crate::cli::CliResult;
use crate::config::Settings;
use crate::exitcode;
use crate::infrastructure::di::ServiceContainer;

fn print_completions<G: Generator>(gen: G, cmd: &mut Command) {
    generate(gen, cmd, cmd.get_name().to_string(), &mut io::stdout());
}

/// Run the selected operation and return the process exit code.
#[instrument(skip(cli))]
pub fn execute_command(cli: &Cli) -> CliResult<i32> {
    if let Some(shell) = cli.completion {
        debug!("completion: {:?}", shell);
        print_completions(shell, &mut Cli::command());
        return Ok(exitcode::OK);
    }

    let request = cli.request()?;
    debug!("request: {:?}", request);

    let case_dir = request.dict.parent();
    let settings = Settings::load(case_dir)?;
    let container = ServiceContainer::new(settings);

    let outcome = container.dictionary.execute(&request)?;
    if let Some(text) = &outcome.output {
        output::data(text)?;
    }
    if let Some(path) = &outcome.written {
        info!("wrote {}", path.display());
    }

    if outcome.found {
        Ok(exitcode::OK)
    } else {
        Ok(exitcode::NOT_FOUND)
    }
}
