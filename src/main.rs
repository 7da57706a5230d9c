use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use docwatch::{logging, FileSource, Overrides, Settings, VersionControl, Watcher};

#[derive(Parser, Debug)]
#[command(name = "docwatch")]
#[command(about = "Watch a documentation file and auto-commit it to git on every change")]
struct Args {
    /// File to watch [default: CLAUDE.md]
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Polling interval (e.g. "1s", "500ms") [default: 1s]
    #[arg(short, long)]
    interval: Option<String>,

    /// Git program to run [default: git]
    #[arg(long)]
    git: Option<String>,

    /// Directory to run git in [default: the watched file's directory]
    #[arg(short, long)]
    workdir: Option<PathBuf>,

    /// Optional TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Don't suggest a push command after each commit
    #[arg(long)]
    no_push_hint: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.verbose);

    let overrides = Overrides {
        file: args.file,
        interval: args.interval,
        git: args.git,
        workdir: args.workdir,
        no_push_hint: args.no_push_hint,
    };
    let settings = Settings::load(args.config.as_deref(), &overrides)?;
    let options = settings.watch_options()?;

    let vcs: Arc<dyn VersionControl> = Arc::new(settings.git_cli()?);
    let source = Box::new(FileSource::new(&settings.file));
    let mut watcher = Watcher::new(&settings.file, source, vcs, options);

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(watcher.run(async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for interrupt: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Interrupt received, shutting down");
    }));

    Ok(())
}
