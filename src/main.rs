use std::process;

use modgraph::cli::{Args, Command};
use tracing_subscriber::EnvFilter;

fn main() {
    let args = Args::parse_args();
    init_logging(&args);

    let command = Command::from_args(args);
    process::exit(command.run());
}

/// Log to stderr; `RUST_LOG` overrides the level picked from the flags
fn init_logging(args: &Args) {
    let default_level = if args.quiet {
        "error"
    } else if args.verbose {
        "info"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(!args.no_colors && std::env::var("NO_COLOR").is_err())
        .init();
}
