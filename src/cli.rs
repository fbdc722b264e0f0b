use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "chapsplit")]
#[command(about = "Split a PDF into one file per chapter from a table of page ranges")]
#[command(version)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where the chapter ranges come from
#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct RangeSource {
    /// Chapter ranges, 1-based and inclusive (e.g., "3-20,21-76,907-end")
    #[arg(short, long)]
    pub ranges: Option<String>,

    /// TOML or JSON file holding the chapter table
    #[arg(short, long)]
    pub table: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write one PDF per chapter range
    Split {
        /// PDF file to split
        path: PathBuf,

        #[command(flatten)]
        source: RangeSource,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,

        /// Artifact name prefix; files are named <prefix>_<n>.pdf
        /// [default: the table's prefix, else "chapter"]
        #[arg(short, long)]
        prefix: Option<String>,

        /// Keep processing the remaining ranges after a failure
        #[arg(short, long)]
        keep_going: bool,

        /// Replace artifacts that already exist
        #[arg(short, long)]
        force: bool,

        /// Number of ranges to write concurrently
        #[arg(short, long, default_value = "1")]
        jobs: usize,

        /// Print the run report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate chapter ranges and show the planned files without writing
    Check {
        /// PDF file to check against
        path: PathBuf,

        #[command(flatten)]
        source: RangeSource,

        /// Output directory the files would be written to
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,

        /// Artifact name prefix
        #[arg(short, long)]
        prefix: Option<String>,

        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run as MCP server on stdin/stdout
    Mcp,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_split_args() {
        let cli = Cli::try_parse_from([
            "chapsplit", "-v", "split", "book.pdf", "-r", "1-3,4-end", "-o", "out", "-k", "-j", "4",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 1);
        match cli.command {
            Commands::Split {
                source,
                keep_going,
                jobs,
                force,
                ..
            } => {
                assert_eq!(source.ranges.as_deref(), Some("1-3,4-end"));
                assert!(source.table.is_none());
                assert!(keep_going);
                assert!(!force);
                assert_eq!(jobs, 4);
            }
            _ => panic!("expected split"),
        }
    }

    #[test]
    fn test_range_source_is_required_and_exclusive() {
        assert!(Cli::try_parse_from(["chapsplit", "split", "book.pdf"]).is_err());
        assert!(Cli::try_parse_from([
            "chapsplit", "check", "book.pdf", "-r", "1-2", "-t", "chapters.toml"
        ])
        .is_err());
    }
}
