pub mod fasta;
pub mod text;

pub use fasta::{ContigWriter, FastaWriter};
