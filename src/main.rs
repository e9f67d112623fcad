use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{error, info};

use detention_importer::config::FeedConfig;
use detention_importer::infra::feed_client::ReqwestFeedClient;
use detention_importer::logging;
use detention_importer::output::OutputFormat;
use detention_importer::pipeline::processing::classify::RuleSet;
use detention_importer::pipeline::{clean_file, ImportJob, ImportRequest};

#[derive(Parser)]
#[command(name = "detention_importer")]
#[command(about = "Detention incident-report importer")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the month-indexed dataset from an incident export
    Import {
        /// Incident export (CSV)
        incidents: PathBuf,
        /// Where to write the dataset
        output: PathBuf,
        /// Optional events export (CSV) merged into the dataset
        events: Option<PathBuf>,
        /// Plain JSON or a define(...) module
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
        /// Feed client settings (defaults to ./importer.toml when present)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Write the processed incident rows back out as CSV
    Clean {
        /// Incident export (CSV)
        input: PathBuf,
        /// Cleaned CSV to write
        output: PathBuf,
    },
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let rules = RuleSet::standard()?;

    match cli.command {
        Commands::Import {
            incidents,
            output,
            events,
            format,
            config,
        } => {
            println!("🔄 Running import...");
            let feed_config = FeedConfig::load(config.as_deref())?;
            let feed = ReqwestFeedClient::new(feed_config)?;
            let job = ImportJob::new(rules, Box::new(feed));

            let request = ImportRequest {
                incidents,
                events,
                output,
                format,
            };
            let summary = job.run(&request).await?;

            println!("\n📊 Import results:");
            println!("   Rows read: {}", summary.rows_read);
            println!("   Incidents kept: {}", summary.incidents_kept);
            println!("   Rows dropped: {}", summary.rows_dropped);
            println!("   Events: {}", summary.events);
            println!(
                "   Feed matches: {} ({} unmatched)",
                summary.feed_matched, summary.feed_unmatched
            );
            println!("   Records: {} across {} months", summary.records, summary.months);
            println!("   Output file: {}", summary.output_file);
            if !summary.id_collisions.is_empty() {
                println!("\n⚠️  Ids overwritten during merge:");
                for id in &summary.id_collisions {
                    println!("   - {}", id);
                }
            }
        }
        Commands::Clean { input, output } => {
            println!("🔨 Cleaning {}...", input.display());
            let summary = clean_file(&input, &output, &rules)?;
            println!(
                "✅ Wrote {} rows ({} dropped) to {}",
                summary.rows_written,
                summary.rows_dropped,
                output.display()
            );
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    logging::init_logging();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => info!("Run completed"),
        Err(e) => {
            error!("Run failed: {:#}", e);
            eprintln!("❌ {:#}", e);
            std::process::exit(1);
        }
    }
}
