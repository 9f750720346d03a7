mod cli;
mod commands;
mod context;
mod error;
mod output;
mod store;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};
use crate::context::Context;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    let color = output::should_color(cli.global.color);
    match run(cli).await {
        Ok(()) => {}
        // Nothing was changed; not a failure
        Err(CliError::Warning { message }) => {
            eprintln!("{}", output::notice(&message, color));
        }
        Err(err) => {
            let code = err.exit_code();
            eprintln!("{:?}", miette::Report::new(err));
            std::process::exit(code);
        }
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Config commands work without a usable inventory
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        // Shell completions generation
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "switchyard", &mut std::io::stdout());
            Ok(())
        }

        // Everything else acts on switches as a configured user
        cmd => {
            let ctx = Context::build(&cli.global)?;
            tracing::debug!(command = ?cmd, user = %ctx.request.user.name, "dispatching command");
            let result = commands::dispatch(cmd, &ctx).await;
            // Counters are kept even when the command failed
            if let Err(e) = ctx.finish() {
                tracing::warn!(error = %e, "cannot save usage counters");
            }
            result
        }
    }
}
