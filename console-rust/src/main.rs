use clap::Parser;
use dps_client::{transport::ReqwestTransport, Session};
use dps_console::{Cli, Console, Step};
use std::{error::Error, sync::Arc};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let session = Arc::new(Session::new(
        cli.open_store(),
        Arc::new(ReqwestTransport::default()),
        &cli.default_base,
    ));
    if let Some(base) = &cli.base {
        session.set_base(base);
    }
    tracing::debug!(base = %session.base(), "session ready");

    let console = Console::new(session);
    match cli.command {
        Some(command) => {
            if let Step::Continue(output) = console.execute(command).await {
                println!("{output}");
            }
        }
        None => {
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            console.run(stdin, tokio::io::stdout()).await?;
        }
    }

    Ok(())
}
