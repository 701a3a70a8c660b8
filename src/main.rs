//! CLI entry point for batch screenshot annotation

use clap::Parser;
use panelstamp::io::cli::{Cli, FileProcessor, init_tracing};

fn main() -> panelstamp::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.quiet);
    let processor = FileProcessor::new(cli);
    processor.process()
}
