use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use reelscript::cli::{Cli, Commands};
use reelscript::config::Config;
use reelscript::pipeline::ScriptPipeline;
use reelscript::utils;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "reelscript=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Credentials may live in a local .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Check for required external tools (non-fatal; they may still appear)
    let missing_deps = utils::check_dependencies().await;
    if !missing_deps.is_empty() {
        eprintln!("⚠️  Dependency check warnings:");
        for dep in missing_deps {
            eprintln!("   • {}", dep);
        }
        eprintln!("   (Continuing anyway - tools may be available)");
    }

    let config = Config::load().await?;

    match cli.command {
        Commands::Run { urls, url } => {
            let pipeline = ScriptPipeline::new(&config)?;

            match url {
                Some(single) => {
                    tracing::info!("Processing single URL: {}", single);
                    match pipeline.process_video(&single).await {
                        Some(path) => println!("Script generated: {}", path.display()),
                        None => println!("Processing failed (see log for details)"),
                    }
                }
                None => {
                    let urls_file = urls.unwrap_or_else(|| config.app.urls_file.clone());
                    pipeline.run_batch(&urls_file).await?;
                }
            }
        }
        Commands::Config { show } => {
            if show {
                config.display();
            } else {
                println!("Configuration file:");
                println!("  {}", Config::config_path()?.display());
            }
        }
    }

    Ok(())
}
