use crate::cli::args::DoctorArgs;
use sproc_core::doctor::{doctor, render_text, DoctorOptions};

use super::exit_codes;

pub fn run(args: DoctorArgs) -> anyhow::Result<i32> {
    let report = doctor(&DoctorOptions {
        config_path: args.config.clone(),
        strict: args.strict_config,
    })?;

    if args.format == "json" {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render_text(&report));
    }

    Ok(if report.has_errors() {
        exit_codes::CONFIG_ERROR
    } else {
        exit_codes::OK
    })
}
