use super::args::*;

pub mod doctor;
pub mod run;
pub mod score;

pub mod exit_codes {
    pub const OK: i32 = 0;
    pub const FLAGGED: i32 = 1;
    pub const CONFIG_ERROR: i32 = 2;
}

pub async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    match cli.cmd {
        Command::Run(args) => run::run(args).await,
        Command::Score(args) => score::run(args).await,
        Command::Init(args) => cmd_init(args),
        Command::Doctor(args) => doctor::run(args),
        Command::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(exit_codes::OK)
        }
    }
}

fn cmd_init(args: InitArgs) -> anyhow::Result<i32> {
    if args.config.exists() {
        eprintln!("note: {} already exists (skipped)", args.config.display());
        return Ok(exit_codes::OK);
    }
    if let Some(parent) = args.config.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    if let Err(e) = sproc_core::config::write_sample_config(&args.config) {
        eprintln!("{}", e);
        return Ok(exit_codes::CONFIG_ERROR);
    }
    eprintln!("created {}", args.config.display());
    Ok(exit_codes::OK)
}
