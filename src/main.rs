// src/main.rs

use arkforge::{cli, logging, run};

#[tokio::main]
async fn main() {
    if let Err(err) = run_main().await {
        eprintln!("arkforge error: {err:?}");
        std::process::exit(1);
    }
}

async fn run_main() -> anyhow::Result<()> {
    let args = cli::parse();
    let dispatch = logging::init_logging(args.log_level, args.json)?;
    run(args, dispatch).await
}
