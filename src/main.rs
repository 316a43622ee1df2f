use std::{path::PathBuf, sync::Arc};

use clap::{Parser, Subcommand};

use content_etl::{
    analysis::summarize,
    api::{create_router, AppState},
    config::Config,
    db::create_pool,
    pipeline::{DirectorySink, EtlPipeline, ExportReport, ExportStatus},
    sources::{collect_into, JsonFileSource},
    telemetry::init_tracing,
};

#[derive(Parser, Debug)]
#[command(name = "content-etl", about = "Movie & TV metadata ETL and reporting export")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Stage, normalize, define views and export (default)
    Run,
    /// Stage, normalize and define views without exporting
    Stage,
    /// Export the current gold views
    Export,
    /// Replace the raw store with a collector JSON dump
    Import {
        /// JSON array of content records
        path: PathBuf,
    },
    /// Print descriptive statistics over the raw store
    Summary,
    /// Serve the reporting API
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing("content_etl=info")?;

    let cli = Cli::parse();
    let config = Config::from_env()?;

    let pool = create_pool(&config.database_url, config.max_connections).await?;
    let pipeline = EtlPipeline::new(pool, &config.raw_content_table)?;
    let sink = DirectorySink::new(config.export_dir.clone());

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => {
            let report = pipeline.run(&sink).await?;
            print_export(&report.export);
        }
        Command::Stage => {
            let report = pipeline.run_stage().await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Export => {
            let report = pipeline.export(&sink).await;
            print_export(&report);
        }
        Command::Import { path } => {
            let source = JsonFileSource::new(path);
            let stored = collect_into(&source, pipeline.raw_store()).await?;
            println!("Stored {} records in {}", stored, pipeline.raw_store().table());
        }
        Command::Summary => {
            let records = pipeline.raw_store().load_all().await?;
            println!("{}", serde_json::to_string_pretty(&summarize(&records))?);
        }
        Command::Serve => {
            let state = AppState::new(pipeline, Arc::new(sink));
            let app = create_router(state);

            let addr = config.bind_addr();
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!(addr = %addr, "Server listening");
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}

fn print_export(report: &ExportReport) {
    for export in &report.views {
        match &export.status {
            ExportStatus::Written { path, rows } => {
                println!("{:<20} {:>6} rows  {}", export.view.name(), rows, path.display())
            }
            ExportStatus::Skipped { reason } => {
                println!("{:<20} skipped: {}", export.view.name(), reason)
            }
        }
    }
}
