use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use common::config::{load_config, render_config, ImporterConfig, CONFIG_PATHS};
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[clap(
    name = "importer",
    about = "Pull a Magento database dump or media archive from a remote host over SSH",
    version
)]
struct Cli {
    /// Enable debug logging
    #[clap(short, long, global = true)]
    verbose: bool,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Download the database, the media files, or both
    #[clap(subcommand)]
    Import(cms::cli::ImportCommands),

    /// Show the effective configuration
    Config {
        /// Output format
        #[clap(long, value_enum, default_value_t = ConfigFormat::Text)]
        format: ConfigFormat,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ConfigFormat {
    Text,
    Toml,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    if let Err(e) = env_logger::Builder::from_default_env()
        .format_timestamp(None)
        .format_level(true)
        .format_module_path(false)
        .format_indent(Some(4))
        .filter_level(level)
        .try_init()
    {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands) -> Result<()> {
    let config = load_config()?;

    match command {
        Commands::Import(import) => {
            let summary = cms::cli::commands::import(import, &config).await?;
            log::debug!("Import finished: {:?}", summary);
        }
        Commands::Config { format } => match format {
            ConfigFormat::Toml => println!("{}", render_config(&config)?),
            ConfigFormat::Text => print_config(&config),
        },
    }
    Ok(())
}

fn print_config(config: &ImporterConfig) {
    println!("Importer Configuration:");
    println!("  Search paths: {}", CONFIG_PATHS.join(", "));
    println!("  SSH:");
    println!("    Port: {}", config.ssh.port);
    println!(
        "    User: {}",
        config.ssh.user.as_deref().unwrap_or("<not set>")
    );
    println!("    Key path: {}", config.ssh.key_path);
    println!("  Import:");
    println!(
        "    Root: {}",
        config
            .import
            .root
            .as_deref()
            .unwrap_or("/home/<user>/public_html")
    );
    println!("    Output directory: {}", config.import.output_dir);
    println!("  Estimate:");
    println!(
        "    Dump compression ratio: {}",
        config.estimate.dump_compression_ratio
    );
    println!(
        "    Media compression ratio: {}",
        config.estimate.media_compression_ratio
    );
}
