use clap::Parser;
use steam_importer::cli::{Cli, run_cli};
use steam_importer::output::OutputFormatter;
use steam_importer::prompt::TerminalPrompt;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut prompt = TerminalPrompt::stdio();
    if let Err(e) = run_cli(cli.command, cli.config.as_deref(), &mut prompt) {
        OutputFormatter::error(&e.to_string());
        std::process::exit(1);
    }
}

/// Logs go to stderr. `RUST_LOG` overrides the `-v` level.
fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
