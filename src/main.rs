// src/main.rs

use unitypipe::{cli, logging, run, EXIT_HARD_FAIL};

#[tokio::main]
async fn main() {
    match run_main().await {
        Ok(status) => std::process::exit(status),
        Err(err) => {
            eprintln!("unitypipe error: {err:?}");
            std::process::exit(EXIT_HARD_FAIL);
        }
    }
}

async fn run_main() -> anyhow::Result<i32> {
    let args = cli::parse();
    logging::init_logging(args.log_level)?;
    run(args).await
}
