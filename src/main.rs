// src/main.rs

use anyhow::Context;
use kabedon_kokoro::{cli, logging, run};

#[tokio::main]
async fn main() {
    match run_main().await {
        Ok(Some(code)) => std::process::exit(code),
        Ok(None) => {}
        Err(err) => {
            eprintln!("kabedon-kokoro error: {err:?}");
            std::process::exit(1);
        }
    }
}

async fn run_main() -> anyhow::Result<Option<i32>> {
    let args = cli::parse();
    if args.help {
        cli::print_help().context("printing usage")?;
        return Ok(Some(1));
    }

    logging::init_logging(args.log_level)?;
    let outcome = run(args).await?;
    Ok(outcome.map(|o| o.exit_code()))
}
