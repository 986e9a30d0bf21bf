//! Pathway inspector - decode propagated headers and compute tag hashes
//!
//! Usage:
//!   pathway-inspect decode DVyLQiJhUPkAACo2/pyXFwBl91P+nJcX
//!   pathway-inspect hash --type kafka --direction out --topic orders
//!   pathway-inspect --config monitoring.toml hash --type rabbitmq --exchange ex --has-routing-key

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use pathway_codec::EncodedPathway;
use pathway_config::MonitoringConfig;
use pathway_monitoring::init_logging;
use pathway_types::{base_hash, Direction, TagKey, TagSet};
use std::path::PathBuf;
use serde_json::{json, Value};
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "pathway-inspect")]
#[command(about = "Inspect data-streams pathway headers and tag hashes")]
#[command(version)]
struct Args {
    /// Monitoring config file; its log_level applies unless --log-level is given
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long)]
    log_level: Option<String>,

    /// Enable JSON logging format
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decode a base64 pathway header value
    Decode { header: String },

    /// Print the three hashes of a tag set
    Hash {
        #[arg(long = "type")]
        edge_type: String,
        /// in | out
        #[arg(long)]
        direction: Option<String>,
        #[arg(long)]
        topic: Option<String>,
        #[arg(long)]
        bus: Option<String>,
        #[arg(long)]
        exchange: Option<String>,
        #[arg(long)]
        subscription: Option<String>,
        #[arg(long)]
        dataset_name: Option<String>,
        #[arg(long)]
        dataset_namespace: Option<String>,
        /// `--manual` alone means true
        #[arg(long, num_args = 0..=1, default_missing_value = "true")]
        manual: Option<bool>,
        #[arg(long)]
        group: Option<String>,
        #[arg(long)]
        consumer_group: Option<String>,
        #[arg(long)]
        partition: Option<String>,
        #[arg(long)]
        kafka_cluster_id: Option<String>,
        /// `--has-routing-key` alone means true
        #[arg(long, num_args = 0..=1, default_missing_value = "true")]
        has_routing_key: Option<bool>,
        /// Also print the hashes seeded with this service's base hash
        #[arg(long)]
        service: Option<String>,
        #[arg(long, requires = "service")]
        env: Option<String>,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = MonitoringConfig::load(args.config.as_deref())?;
    init_logging(log_level(&args, &config), args.json_logs)?;
    debug!("{:?}", args.command);

    let output = run(args.command)?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn log_level<'a>(args: &'a Args, config: &'a MonitoringConfig) -> &'a str {
    args.log_level.as_deref().unwrap_or(&config.log_level)
}

fn run(command: Command) -> Result<Value> {
    match command {
        Command::Decode { header } => {
            let decoded = EncodedPathway::from_header_value(&header)?;
            Ok(json!({
                "hash": decoded.hash,
                "pathway_start_ns": decoded.pathway_start_ns,
                "edge_start_ns": decoded.edge_start_ns,
                "pathway_start_ms": decoded.pathway_start_ns / 1_000_000,
                "edge_latency_since_start_ns":
                    decoded.edge_start_ns.saturating_sub(decoded.pathway_start_ns),
            }))
        }
        Command::Hash {
            edge_type,
            direction,
            topic,
            bus,
            exchange,
            subscription,
            dataset_name,
            dataset_namespace,
            manual,
            group,
            consumer_group,
            partition,
            kafka_cluster_id,
            has_routing_key,
            service,
            env,
        } => {
            let direction = match direction.as_deref() {
                None => None,
                Some(value) => match Direction::parse(value) {
                    Some(direction) => Some(direction),
                    None => bail!("direction must be 'in' or 'out', got '{}'", value),
                },
            };

            let mut builder = TagSet::builder(edge_type)
                .maybe_direction(direction)
                .maybe(TagKey::Topic, topic.as_deref())
                .maybe(TagKey::Bus, bus.as_deref())
                .maybe(TagKey::Exchange, exchange.as_deref())
                .maybe(TagKey::Subscription, subscription.as_deref())
                .maybe(TagKey::DatasetName, dataset_name.as_deref())
                .maybe(TagKey::DatasetNamespace, dataset_namespace.as_deref())
                .maybe(TagKey::Group, group.as_deref())
                .maybe(TagKey::ConsumerGroup, consumer_group.as_deref())
                .maybe(TagKey::Partition, partition.as_deref())
                .maybe(TagKey::KafkaClusterId, kafka_cluster_id.as_deref());
            if let Some(manual) = manual {
                builder = builder.manual(manual);
            }
            if let Some(has_routing_key) = has_routing_key {
                builder = builder.has_routing_key(has_routing_key);
            }
            let tags = builder.build();

            let mut output = json!({
                "tags": tags.iter().map(|(_, tag)| tag).collect::<Vec<_>>(),
                "hash": tags.hash(),
                "aggregation_hash": tags.aggregation_hash(),
                "complete_hash": tags.complete_hash(),
                "non_null_size": tags.non_null_size(),
            });
            if let Some(service) = service {
                let base = base_hash(&service, env.as_deref());
                let seeded = tags.hashes_from(base);
                output["service"] = json!({
                    "base_hash": base,
                    "hash": seeded.hash,
                    "aggregation_hash": seeded.aggregation_hash,
                    "complete_hash": seeded.complete_hash,
                });
            }
            Ok(output)
        }
    }
}
