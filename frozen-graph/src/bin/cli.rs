use std::{fs::File, io::BufReader, path::PathBuf};

use anyhow::Context;
use clap::Parser;
use frozen_graph::{Graph, execution_order, find_weight_roots};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(version, about = "Inspect a frozen computation graph")]
struct Args {
    /// Path to the graph description (IR-shaped JSON).
    graph: PathBuf,

    /// Entry node to sequence from; may be given several times. Defaults to
    /// every node no other node feeds into.
    #[arg(short = 'H', long = "head")]
    heads: Vec<String>,

    /// Increase log verbosity.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_filter = if args.verbose { "debug" } else { "info" };
    let subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set global subscriber");

    let file = File::open(&args.graph)
        .with_context(|| format!("opening graph file {}", args.graph.display()))?;
    let graph: Graph =
        serde_json::from_reader(BufReader::new(file)).context("decoding graph description")?;

    let heads = if args.heads.is_empty() {
        graph
            .source_nodes()
            .into_iter()
            .map(str::to_owned)
            .collect()
    } else {
        args.heads
    };
    anyhow::ensure!(
        !heads.is_empty(),
        "graph has no source nodes and no --head was given"
    );

    let order = execution_order(&graph, &heads)?;
    for &name in &order {
        let node = graph.node(name)?;
        let roots = find_weight_roots(&graph, node);
        if roots.is_empty() {
            println!("{name} [{}]", node.op_type());
        } else {
            println!("{name} [{}] weights: {}", node.op_type(), roots.join(", "));
        }
    }
    Ok(())
}
