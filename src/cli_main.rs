use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "pathex", version, about = "De Bruijn graph path resolution", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve seed paths into a non-redundant set of contig paths
    Resolve {
        /// Input graph description (K/E/L records)
        #[arg(short, long)]
        graph: String,

        /// Seed paths, one per line of edge ids; single-edge seeds are
        /// generated from the graph when omitted
        #[arg(short, long)]
        paths: Option<String>,

        /// Directory for FASTA snapshots between passes
        #[arg(short, long)]
        output_dir: String,

        /// Optional JSON config overriding the defaults
        #[arg(long)]
        config: Option<String>,

        /// Comparator tolerance in nucleotides (overrides config)
        #[arg(long)]
        max_overlap: Option<usize>,

        /// Trim trailing edges shorter than this before the final write
        #[arg(long)]
        min_edge_len: Option<usize>,
    },

    /// Print edge and path statistics for a graph and seed set
    Stats {
        /// Input graph description
        #[arg(short, long)]
        graph: String,

        /// Seed paths, one per line of edge ids
        #[arg(short, long)]
        paths: Option<String>,
    },
}
