mod cli_main;

use std::path::Path;

use clap::Parser;
use tracing::info;
use tracing_subscriber::FmtSubscriber;

use cli_main::{Cli, Commands};
use pathex::config::ResolveConfig;
use pathex::graph::AssemblyGraph;
use pathex::io::text::{load_graph, load_seed_paths};
use pathex::io::ContigWriter;
use pathex::path::CoverageMap;
use pathex::resolve::PathExtendResolver;

fn main() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(tracing::Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("Setting tracing default failed");

    let cli = Cli::parse();

    match cli.command {
        Commands::Resolve {
            graph,
            paths,
            output_dir,
            config,
            max_overlap,
            min_edge_len,
        } => {
            resolve(
                &graph,
                paths.as_deref(),
                &output_dir,
                config.as_deref(),
                max_overlap,
                min_edge_len,
            );
        }
        Commands::Stats { graph, paths } => {
            stats(&graph, paths.as_deref());
        }
    }
}

fn resolve(
    graph_path: &str,
    seed_path: Option<&str>,
    output_dir: &str,
    config_path: Option<&str>,
    max_overlap: Option<usize>,
    min_edge_len: Option<usize>,
) {
    let mut config = match config_path {
        Some(p) => ResolveConfig::load(Path::new(p)).expect("Failed to load config"),
        None => ResolveConfig::default(),
    };
    if let Some(value) = max_overlap {
        config.max_overlap = value;
    }
    if let Some(value) = min_edge_len {
        config.min_edge_len = value;
    }

    let graph = load_graph(Path::new(graph_path)).expect("Failed to load graph");
    info!(
        "Loaded graph: {} edges, k = {}",
        graph.edges().len(),
        graph.k()
    );

    let resolver = PathExtendResolver::new(&graph);
    let mut paths = match seed_path {
        Some(p) => load_seed_paths(Path::new(p), &graph).expect("Failed to load seed paths"),
        None => resolver.make_simple_seeds(),
    };
    info!("Resolving {} path pairs", paths.size());
    let mut coverage = CoverageMap::from_container(&paths);

    std::fs::create_dir_all(output_dir).expect("Failed to create output directory");
    let out_dir = Path::new(output_dir);
    let writer = ContigWriter::new(&graph);
    resolver
        .remove_overlaps(
            &mut paths,
            &mut coverage,
            config.max_overlap,
            config.max_repeat_length,
            &writer,
            out_dir,
        )
        .expect("Failed to write snapshot");
    resolver.add_uncovered_edges(&mut paths, &mut coverage);
    resolver.remove_mate_pair_ends(&mut paths, &mut coverage, config.min_edge_len);
    writer
        .write_paths(&paths, &out_dir.join("final.fasta"))
        .expect("Failed to write final contigs");

    let live = (0..paths.size()).filter(|&i| !paths.get(i).is_empty()).count();
    info!(
        "Resolution complete: {} of {} path pairs survive",
        live,
        paths.size()
    );
}

fn stats(graph_path: &str, seed_path: Option<&str>) {
    let graph = load_graph(Path::new(graph_path)).expect("Failed to load graph");
    let edges = graph.edges();
    let total_len: usize = edges.iter().map(|e| e.length()).sum();
    let cyclic = edges.iter().filter(|&&e| graph.in_cycle(e)).count();
    println!("edges: {}", edges.len());
    println!("total edge length: {}", total_len);
    println!("edges on cycles: {}", cyclic);

    if let Some(p) = seed_path {
        let paths = load_seed_paths(Path::new(p), &graph).expect("Failed to load seed paths");
        let coverage = CoverageMap::from_container(&paths);
        let covered = edges.iter().filter(|&&e| coverage.is_covered(e)).count();
        println!("path pairs: {}", paths.size());
        println!("covered edges: {} / {}", covered, edges.len());
    }
}
