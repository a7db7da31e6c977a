use clap::Parser;
use std::path::PathBuf;

use bagwatch::{DirectoryWatcher, Settings, SubprocessIndexer, logging};

#[derive(Parser)]
#[command(name = "bagwatch", version)]
#[command(about = "Watches a directory for newly arrived serialized Bags and triggers an external indexer")]
struct Cli {
    /// Directory to watch recursively. Defaults to the current directory.
    path: Option<PathBuf>,

    /// Indexer executable to run for each new Bag (overrides config)
    #[arg(short = 'x', long)]
    indexer: Option<PathBuf>,

    /// Interpreter the indexer runs under, e.g. "php" (overrides config)
    #[arg(long)]
    interpreter: Option<PathBuf>,

    /// Settings file to use instead of discovering .bagwatch/settings.toml
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    show_config: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let mut settings = match &cli.config {
        Some(path) => {
            if !path.is_file() {
                eprintln!("Configuration error: {} does not exist", path.display());
                std::process::exit(1);
            }
            match Settings::load_from(path) {
                Ok(settings) => settings,
                Err(e) => {
                    eprintln!("Configuration error: {e}");
                    std::process::exit(1);
                }
            }
        }
        None => Settings::load().unwrap_or_else(|e| {
            eprintln!("Configuration error: {e}");
            eprintln!("Using default configuration.");
            Settings::default()
        }),
    };

    if let Some(indexer) = cli.indexer {
        settings.indexer.command = Some(indexer);
    }
    if let Some(interpreter) = cli.interpreter {
        settings.indexer.interpreter = Some(interpreter);
    }

    logging::init_with_config(&settings.logging);

    if cli.show_config {
        match toml::to_string_pretty(&settings) {
            Ok(rendered) => println!("{rendered}"),
            Err(e) => {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        }
        return;
    }

    let Some(command) = settings.indexer.command.clone() else {
        eprintln!("No indexer configured.");
        eprintln!("Set indexer.command in .bagwatch/settings.toml or pass --indexer.");
        std::process::exit(1);
    };

    let indexer = SubprocessIndexer::new(command, settings.indexer.interpreter.clone());

    let mut builder = DirectoryWatcher::builder().indexer(Box::new(indexer));
    if let Some(path) = cli.path {
        builder = builder.root(path);
    }

    let watcher = match builder.build() {
        Ok(watcher) => watcher,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = watcher.watch().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
