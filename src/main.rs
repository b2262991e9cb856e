use anyhow::Context;
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use urdf_analyzer::config::{AnalyzerConfig, CliArgs};
use urdf_analyzer::pipeline::Analyzer;

fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    // Init tracing; RUST_LOG overrides the verbosity flag
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if args.verbose {
            EnvFilter::new("urdf_analyzer=debug")
        } else {
            EnvFilter::new("urdf_analyzer=info")
        }
    });
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if args.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    let config: AnalyzerConfig = args.into();

    // Configure rayon thread pool
    if let Some(threads) = config.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("Failed to configure rayon thread pool")?;
    }

    match Analyzer::run(&config) {
        Ok(result) => {
            for path in &result.files_written {
                println!("Wrote {}", path.display());
            }
            if !result.files_written.is_empty() {
                println!(
                    "Done: {} rows in {:.2}s",
                    result.rows,
                    result.duration.as_secs_f64()
                );
            }
            Ok(())
        }
        Err(e) => {
            error!(%e, "Analysis failed");
            Err(anyhow::anyhow!(e)).context("urdf-analyzer failed")
        }
    }
}
