use clap::{Parser, Subcommand};
use loot_cli::{CliContext, commands, logging};
use loot_core::context::AppConfig;
use std::io::Write;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Startup options; each overrides the stored config for this run only.
#[derive(Parser)]
#[command(version, about = "Torchlight Infinite loot tracker")]
struct Args {
    /// Path of the game's UE_game.log
    #[arg(long)]
    log: Option<PathBuf>,
    /// Apply the trade tax to valuations
    #[arg(long)]
    tax: bool,
    /// Price catalog JSON file
    #[arg(long)]
    catalog: Option<PathBuf>,
    /// Start watching the log immediately
    #[arg(long)]
    watch: bool,
}

#[tokio::main]
async fn main() -> Result<(), String> {
    let args = Args::parse();
    let _log_guard = logging::init();

    let mut config = AppConfig::load();
    if let Some(log) = args.log {
        config.log_path = Some(log);
    }
    if args.tax {
        config.tax_enabled = true;
    }
    if let Some(catalog) = args.catalog {
        config.catalog_path = catalog;
    }
    let ctx = CliContext::new(config);

    if args.watch
        && let Err(err) = commands::watch(&ctx, None, 0).await
    {
        println!("{err}");
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        prompt()?;
        let line = tokio::select! {
            line = lines.next_line() => line.map_err(|e| e.to_string())?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match respond(line, &ctx).await {
            Ok(true) => break,
            Ok(false) => {}
            Err(err) => println!("{err}"),
        }
    }

    ctx.tasks.lock().await.stop_all()?;
    Ok(())
}

fn prompt() -> Result<(), String> {
    write!(std::io::stdout(), "> ").map_err(|e| e.to_string())?;
    std::io::stdout().flush().map_err(|e| e.to_string())
}

#[derive(Parser)]
#[command(no_binary_name = true, disable_version_flag = true)]
struct Repl {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Tail the game log
    Watch {
        #[arg(short, long)]
        path: Option<String>,
        /// Print a status line every N polls
        #[arg(short, long, default_value_t = 0)]
        every: u32,
    },
    /// Stop tailing
    Stop,
    /// Wait for an in-game bag sort to set the baseline
    Init,
    Reset,
    /// Reload the price catalog from disk
    Reload,
    Stats {
        /// Currency, Ashes, Compass, Glow or Others
        #[arg(short, long)]
        category: Option<String>,
    },
    Bag,
    Pending,
    /// Process a complete log file once
    Replay {
        #[arg(short, long)]
        path: String,
        /// Wait for a bag sort dump instead of bootstrapping from the first writes
        #[arg(long)]
        sorted: bool,
    },
    Config,
    SetLog {
        #[arg(short, long)]
        path: String,
    },
    Tax {
        #[arg(value_parser = ["on", "off"])]
        state: String,
    },
    Exit,
}

async fn respond(line: &str, ctx: &CliContext) -> Result<bool, String> {
    let args = shlex::split(line).ok_or("error: Invalid quoting")?;
    let cli = Repl::try_parse_from(args).map_err(|e| e.to_string())?;

    match cli.command {
        Commands::Watch { path, every } => commands::watch(ctx, path, every).await?,
        Commands::Stop => commands::stop(ctx).await?,
        Commands::Init => commands::start_initialization(ctx).await?,
        Commands::Reset => commands::reset(ctx).await?,
        Commands::Reload => commands::reload_catalog(ctx).await?,
        Commands::Stats { category } => commands::show_stats(ctx, category.as_deref()).await?,
        Commands::Bag => commands::show_bag(ctx).await?,
        Commands::Pending => commands::show_pending(ctx).await?,
        Commands::Replay { path, sorted } => commands::replay(ctx, &path, sorted).await?,
        Commands::Config => commands::show_config(ctx).await?,
        Commands::SetLog { path } => commands::set_log(ctx, &path).await?,
        Commands::Tax { state } => commands::set_tax(ctx, state == "on").await?,
        Commands::Exit => {
            commands::exit()?;
            return Ok(true);
        }
    }
    Ok(false)
}
