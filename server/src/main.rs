use anyhow::Context;
use clap::Parser;
use gui_bridge::bridge::DatasetBridge;
use gui_bridge::model::BridgeModel;
use ridercore::HourSelection;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;
use workflow::config::WorkflowConfig;
use workflow::runner::Runner;

mod generator;
mod gui_bridge;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Ridership dataset server and offline summarizer")]
struct Args {
    /// Load a workflow config from YAML
    #[arg(long)]
    workflow: Option<PathBuf>,
    /// JSON dataset to load; a synthetic dataset is generated when omitted
    #[arg(long)]
    dataset: Option<PathBuf>,
    /// Number of stations to synthesize
    #[arg(long, default_value_t = 120)]
    stations: usize,
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Write the loaded dataset to this path as JSON
    #[arg(long)]
    write: Option<PathBuf>,
    /// Summarize the dataset and append the summary to the report file
    #[arg(long, default_value_t = false)]
    offline: bool,
    /// With --offline, also list the busiest stations at this hour (0-23)
    #[arg(long)]
    hour: Option<String>,
    /// Keep the HTTP bridge alive for viewers
    #[arg(long, default_value_t = false)]
    serve: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let workflow_config = if let Some(path) = args.workflow {
        WorkflowConfig::load(path)?
    } else {
        WorkflowConfig::from_args(args.dataset, args.stations, args.seed)
    };

    let runner = Runner::new(workflow_config.clone());
    let store = runner.load_store()?;
    let result = runner.execute(&store);

    if let Some(path) = args.write {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string(store.records()).context("serializing dataset")?;
        fs::write(&path, json).with_context(|| format!("writing dataset {}", path.display()))?;
        println!("Wrote {} records to {}", store.len(), path.display());
    }

    if args.offline {
        println!(
            "Offline run -> records {}, stations {}, whole-day max {}, hourly max {}, default hour {}",
            result.record_count,
            result.station_count,
            result.whole_day_scale.max,
            result.hourly_scale.max,
            result.default_hour
        );
        for (transport, count) in &result.stations_per_type {
            println!("  {transport}: {count} stations");
        }
        for (rank, station) in result.busiest.iter().enumerate() {
            println!(
                "  #{} {} ({}) {} riders",
                rank + 1,
                station.name,
                station.transport,
                station.count
            );
        }

        if let Some(input) = &args.hour {
            let hour = HourSelection::parse(input);
            println!("Busiest at hour {hour}:");
            let busiest = runner.busiest_at(&store, hour);
            if busiest.is_empty() {
                println!("  no records");
            }
            for station in busiest {
                println!(
                    "  {} ({}) {} riders",
                    station.name, station.transport, station.count
                );
            }
        }

        let report_path = &workflow_config.report_path;
        if let Some(parent) = report_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(report_path)
            .with_context(|| format!("opening report {}", report_path.display()))?;
        file.write_all(result.report_line().as_bytes())?;
    }

    if args.serve {
        let model = BridgeModel::new(store, workflow_config.session.clone(), result);
        let bridge = DatasetBridge::spawn(Arc::new(model), workflow_config.bind)?;
        bridge.publish_status("HTTP bridge running (Ctrl+C to stop)...");
        let runtime = TokioBuilder::new_current_thread()
            .enable_all()
            .build()
            .context("creating runtime for signal handling")?;
        runtime.block_on(async {
            signal::ctrl_c().await.context("awaiting Ctrl+C to exit")?;
            Ok::<(), anyhow::Error>(())
        })?;
    }

    Ok(())
}
