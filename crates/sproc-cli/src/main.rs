use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

mod cli;

use cli::args::Cli;
use cli::commands::{dispatch, exit_codes};

const LOG_ENV: &str = "SPROC_LOG";

fn init_logging(level: &str, json: bool) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"));

    let builder = fmt()
        .with_env_filter(filter)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_target(true)
        .with_writer(std::io::stderr);

    // a second init (tests, embedding) is harmless
    let _ = if json {
        builder
            .json()
            .with_current_span(false)
            .with_span_list(false)
            .try_init()
    } else {
        builder.try_init()
    };
}

#[tokio::main(flavor = "multi_thread")]
async fn main() {
    let cli = Cli::parse();

    // settings.env is optional; explicit environment variables win
    if cli.env_file.exists() {
        if let Err(e) = dotenvy::from_path(&cli.env_file) {
            eprintln!("warning: failed to load {}: {}", cli.env_file.display(), e);
        }
    }

    let level = cli
        .log_level
        .clone()
        .or_else(|| std::env::var(LOG_ENV).ok())
        .unwrap_or_else(|| "warn".to_string());
    init_logging(&level, cli.log_json);

    let code = match dispatch(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("fatal: {e:?}");
            exit_codes::CONFIG_ERROR
        }
    };
    std::process::exit(code);
}
