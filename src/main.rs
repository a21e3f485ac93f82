use clap::Parser;
use repo_cache_proxy::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli::bootstrap(cli.config.as_deref())?;

    match cli.command {
        Command::Key(args) => cli::key::run(args, &config),
        Command::Check => cli::check::run(&config).await,
        Command::Inspect(args) => cli::inspect::run(args, &config).await,
    }
}
