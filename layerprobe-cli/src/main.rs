//! layerprobe CLI -- 디렉토리 트리 구성 요소 검사 명령줄 도구

mod cli;
mod commands;
mod error;
mod logging;
mod output;

use clap::Parser;
use colored::Colorize;

use layerprobe_core::config::LayerprobeConfig;

use crate::cli::{Cli, Commands};
use crate::error::CliError;
use crate::output::OutputWriter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let writer = OutputWriter::new(cli.output);

    // config 명령은 설정 파일 자체를 다루므로 여기서 미리 로드하지 않음
    if let Commands::Config(args) = cli.command {
        return commands::config::execute(args, &cli.config, &writer).await;
    }

    let mut config = LayerprobeConfig::load_or_default(&cli.config).await?;
    if let Some(level) = &cli.log_level {
        config.general.log_level = level.clone();
    }
    if let Err(e) = logging::init_tracing(&config.general) {
        eprintln!("{} {}", "warning:".yellow().bold(), e);
    }

    match cli.command {
        Commands::Inspect(args) => commands::inspect::execute(args, config, &writer).await,
        Commands::Analyzers => commands::analyzers::execute(&config, &writer),
        Commands::Blob(args) => commands::blob::execute(args, &config, &writer).await,
        Commands::Config(_) => Ok(()),
    }
}
