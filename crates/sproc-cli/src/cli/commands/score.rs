use crate::cli::args::ScoreArgs;
use anyhow::Context;
use sproc_core::complexity::{score, split_factors};
use tokio::io::AsyncReadExt;

use super::exit_codes;

pub async fn run(args: ScoreArgs) -> anyhow::Result<i32> {
    let from_stdin = args.file.as_os_str() == "-";

    let definition = if from_stdin {
        let mut buf = String::new();
        tokio::io::stdin()
            .read_to_string(&mut buf)
            .await
            .context("failed to read stdin")?;
        buf
    } else {
        tokio::fs::read_to_string(&args.file)
            .await
            .with_context(|| format!("failed to read {}", args.file.display()))?
    };

    let name = args.name.clone().unwrap_or_else(|| {
        if from_stdin {
            "stdin".to_string()
        } else {
            args.file
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "procedure".to_string())
        }
    });

    let result = score(&name, &definition);

    match args.format.as_str() {
        "json" => {
            let out = serde_json::json!({
                "sp_name": name,
                "complexity": result.complexity,
                "lines_of_code": result.lines_of_code,
                "complexity_factors": result.complexity_factors,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        "text" => {
            println!(
                "{}: {}/10 ({} lines)",
                name, result.complexity, result.lines_of_code
            );
            for f in split_factors(&result.complexity_factors) {
                println!("  - {}", f);
            }
        }
        other => {
            eprintln!("config error: unknown --format '{}' (expected text|json)", other);
            return Ok(exit_codes::CONFIG_ERROR);
        }
    }

    Ok(exit_codes::OK)
}
