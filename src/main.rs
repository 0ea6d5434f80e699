use anyhow::Context;
use clap::{Parser, Subcommand};
use event_radar::config::Config;
use event_radar::logging::init_logging;
use event_radar::observability::init_metrics;
use event_radar::server::{start_server, AppState, ProviderList, SearchParams};
use serde_json::json;
use tracing::info;

#[derive(Parser)]
#[command(name = "event_radar")]
#[command(about = "Multi-source event search with resilient AI summaries")]
#[command(version)]
struct Cli {
    /// Directory for the rolling JSON log files
    #[arg(long, default_value = "logs", global = true)]
    log_dir: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP façade
    Serve {
        #[arg(long, default_value_t = 3000)]
        port: u16,
    },
    /// Run one aggregation and print the merged events as JSON
    Search {
        #[arg(long)]
        city: Option<String>,
        #[arg(long)]
        keyword: Option<String>,
        #[arg(long)]
        country_code: Option<String>,
        #[arg(long)]
        start_date: Option<String>,
        #[arg(long)]
        end_date: Option<String>,
        /// Providers to query (comma-separated). Available: ticketmaster,
        /// eventbrite, seatgeek, konzertkasse, reservix
        #[arg(long)]
        providers: Option<String>,
        #[arg(long)]
        tone: Option<String>,
        /// Also summarize the first events
        #[arg(long)]
        summary: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    init_logging(&cli.log_dir);

    let config = Config::load().context("loading configuration")?;
    let state = AppState::from_config(&config).context("building services")?;

    match cli.command {
        Commands::Serve { port } => {
            init_metrics();
            info!("Starting event_radar on port {}", port);
            start_server(state, port).await?;
        }
        Commands::Search {
            city,
            keyword,
            country_code,
            start_date,
            end_date,
            providers,
            tone,
            summary,
        } => {
            let query = SearchParams {
                keyword,
                city,
                country_code,
                start_date,
                end_date,
                providers: providers.map(ProviderList::Csv),
                tone,
            }
            .into_query();

            let events = state.aggregator.aggregate(&query).await;
            let output = if summary {
                let head = &events[..events.len().min(state.summary_event_limit)];
                let result = state.summarizer.summarize(head, &query.user_context()).await;
                json!({ "events": events, "summary": result })
            } else {
                json!({ "events": events })
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }
    Ok(())
}
