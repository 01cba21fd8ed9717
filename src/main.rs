//! Strata CLI
//!
//! Command-line interface for inventory snapshots:
//! - Reassemble or pack chunked snapshots
//! - Run discovery against a store fixture
//! - Browse an inventory dump as a tree

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use strata::config::{generate_default_config, Config, LoggingConfig};
use strata::discovery::{DiscoveryReport, SeriesDiscovery};
use strata::inventory::{InventoryDump, InventoryIndex, ResourceTree};
use strata::snapshot::{split_snapshot, AssembledDocument, Assembler, DataPoint};
use strata::store::MemorySeriesStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "strata")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Inventory snapshot reassembly and indexing")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: search standard locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Store fixture, overrides [store] fixture
    #[arg(long, global = true)]
    pub fixture: Option<PathBuf>,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Reassemble a snapshot from a JSON array of data points (newest first)
    Assemble {
        /// Path to the data points file
        path: PathBuf,
    },

    /// Encode a snapshot document into data points
    Pack {
        /// Path to the document file
        path: PathBuf,
        /// Largest compressed payload per data point
        #[arg(long, default_value = "4096")]
        max_chunk_bytes: usize,
        /// Master timestamp (default: now)
        #[arg(short, long)]
        time: Option<String>,
    },

    /// List the metric types of a feed
    MetricTypes {
        tenant: String,
        /// Feed id (default: [discovery] feed)
        #[arg(long)]
        feed: Option<String>,
        /// Point in time to read (default: now). Supports: "now", ISO 8601, Unix ms
        #[arg(long)]
        as_of: Option<String>,
    },

    /// List the metrics of a metric type across a feed's resources
    MetricsForType {
        tenant: String,
        metric_type: String,
        #[arg(long)]
        feed: Option<String>,
        #[arg(long)]
        as_of: Option<String>,
    },

    /// List tenants holding inventory for a feed
    Tenants {
        #[arg(long)]
        feed: Option<String>,
    },

    /// Print the resource tree of an inventory dump
    Tree {
        /// Path to the inventory dump (JSON)
        path: PathBuf,
        /// Resource to start from (default: every top-level resource)
        resource: Option<String>,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    init_logging(&config.logging);

    let json = match cli.format.as_str() {
        "json" => true,
        "table" => false,
        other => bail!("Unknown output format: {}. Use: table, json", other),
    };

    match cli.command {
        Commands::Assemble { path } => {
            let points: Vec<DataPoint> = read_json(&path)?;
            let assembler = Assembler::new(config.assembler.to_limits());
            let doc = assembler
                .assemble(&points)
                .with_context(|| format!("Failed to reassemble {:?}", path))?;

            if json {
                println!("{}", serde_json::to_string_pretty(&doc)?);
            } else {
                println!("Root:     {} ({})", doc.root.id(), doc.root.kind());
                println!("Entities: {}", doc.entity_count());
                println!("Metric types indexed:   {}", doc.metric_types_index.len());
                println!("Resource types indexed: {}", doc.resource_types_index.len());
            }
        }

        Commands::Pack {
            path,
            max_chunk_bytes,
            time,
        } => {
            let doc: AssembledDocument = read_json(&path)?;
            let timestamp = parse_timestamp(time.as_deref())?;
            let points = split_snapshot(&doc, max_chunk_bytes, timestamp)?;

            // Points are data; always emit JSON
            println!("{}", serde_json::to_string_pretty(&points)?);
        }

        Commands::MetricTypes {
            tenant,
            feed,
            as_of,
        } => {
            let discovery = build_discovery(&config, cli.fixture.as_deref())?;
            let feed = resolve_feed(feed, &config)?;
            let as_of = parse_timestamp(as_of.as_deref())?;

            let report = discovery.metric_type_series(&tenant, &feed, as_of).await?;
            print_failures(&report);

            if json {
                let items: Vec<_> = report.items().collect();
                println!("{}", serde_json::to_string_pretty(&items)?);
            } else {
                println!("{:<30} {:<15} {:<12}", "METRIC TYPE", "UNIT", "DATA TYPE");
                println!("{}", "-".repeat(57));
                for mt in report.items() {
                    println!(
                        "{:<30} {:<15} {:<12}",
                        mt.id,
                        format!("{:?}", mt.unit),
                        format!("{:?}", mt.metric_data_type)
                    );
                }
            }
        }

        Commands::MetricsForType {
            tenant,
            metric_type,
            feed,
            as_of,
        } => {
            let discovery = build_discovery(&config, cli.fixture.as_deref())?;
            let feed = resolve_feed(feed, &config)?;
            let as_of = parse_timestamp(as_of.as_deref())?;

            let report = discovery
                .resource_series_for_type(&tenant, &feed, &metric_type, as_of)
                .await?;
            print_failures(&report);

            if json {
                let items: Vec<_> = report.items().collect();
                println!("{}", serde_json::to_string_pretty(&items)?);
            } else {
                println!("{:<30} {:<30}", "METRIC", "NAME");
                println!("{}", "-".repeat(60));
                for metric in report.items() {
                    println!(
                        "{:<30} {:<30}",
                        metric.id,
                        metric.name.as_deref().unwrap_or("-")
                    );
                }
            }
        }

        Commands::Tenants { feed } => {
            let discovery = build_discovery(&config, cli.fixture.as_deref())?;
            let feed = resolve_feed(feed, &config)?;

            let tenants = discovery.tenants_with_feed(&feed).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&tenants)?);
            } else {
                for tenant in tenants {
                    println!("{}", tenant);
                }
            }
        }

        Commands::Tree { path, resource } => {
            let dump: InventoryDump = read_json(&path)?;
            let index = InventoryIndex::new();
            index.ingest(dump)?;
            index.rebuild_indices()?;

            let trees = match resource {
                Some(id) => match index.load_subtree_by_id(&id)? {
                    Some(tree) => vec![tree],
                    None => bail!("Resource not found: {}", id),
                },
                None => index
                    .get_all_top_resources()
                    .iter()
                    .map(|root| index.load_subtree(root))
                    .collect::<Result<Vec<_>, _>>()?,
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&trees)?);
            } else {
                for tree in &trees {
                    print_tree(tree);
                }
                let stats = index.stats();
                println!();
                println!(
                    "{} resources, {} metrics, {} resource types",
                    stats.resources, stats.metrics, stats.resource_types
                );
            }
        }

        Commands::Config { output } => {
            let content = generate_default_config();

            if let Some(path) = output {
                std::fs::write(&path, &content)?;
                println!("Config written to {:?}", path);
            } else {
                println!("{}", content);
            }
        }
    }

    Ok(())
}

fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("strata={}", config.level)));
    let registry = tracing_subscriber::registry().with(filter);

    // Logs go to stderr; stdout carries command output
    if config.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn build_discovery(config: &Config, fixture: Option<&Path>) -> Result<SeriesDiscovery> {
    let Some(path) = fixture.or(config.store.fixture.as_deref()) else {
        bail!("No store fixture configured. Use --fixture or set [store] fixture");
    };

    let store = MemorySeriesStore::from_fixture(path)?;
    tracing::info!(fixture = ?path, "Loaded series store");

    Ok(
        SeriesDiscovery::new(Arc::new(store), config.discovery.to_discovery_config())
            .with_assembler(Assembler::new(config.assembler.to_limits())),
    )
}

fn resolve_feed(feed: Option<String>, config: &Config) -> Result<String> {
    feed.or_else(|| config.discovery.feed.clone())
        .context("No feed given. Use --feed or set [discovery] feed")
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {:?}", path))
}

fn parse_timestamp(value: Option<&str>) -> Result<i64> {
    match value {
        None | Some("now") => Ok(Utc::now().timestamp_millis()),
        Some(s) => {
            if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
                Ok(dt.timestamp_millis())
            } else if let Ok(ts) = s.parse::<i64>() {
                Ok(ts)
            } else {
                bail!("Invalid timestamp format: {}", s)
            }
        }
    }
}

fn print_failures<T>(report: &DiscoveryReport<T>) {
    for failure in report.failures() {
        eprintln!("warning: {}", failure);
    }
}

fn print_tree(tree: &ResourceTree) {
    for node in tree.nodes() {
        let indent = "  ".repeat(node.depth);
        println!(
            "{}{} [{}] {}",
            indent, node.resource.id, node.resource.type_id, node.resource.name
        );
        for metric in &node.metrics {
            println!("{}  · {} ({})", indent, metric.id, metric.metric_type);
        }
    }
}
