use clap::Parser;
use std::path::PathBuf;

/// Search a word corpus for five-word combinations whose letters are
/// pairwise disjoint. Running with no arguments executes the full pipeline
/// against the reference word lists and writes the navigable result
/// artifact.
#[derive(Parser, Debug)]
#[command(name = "wordclique")]
#[command(about = "Finds five-word combinations with pairwise disjoint letters", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Recompute every stage, ignoring cached values
    #[arg(long)]
    pub force: bool,

    /// Worker threads for stage composition (0 = all cores)
    #[arg(short, long, default_value = "0")]
    pub jobs: usize,

    /// Compose stages sequentially
    #[arg(long)]
    pub no_parallel: bool,

    /// Output path for the navigable result artifact
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Also dump every stage map to this path
    #[arg(long)]
    pub dump_maps: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_arguments_is_valid() {
        let cli = Cli::try_parse_from(["wordclique"]).unwrap();
        assert!(!cli.force);
        assert_eq!(cli.jobs, 0);
        assert!(cli.output.is_none());
    }

    #[test]
    fn test_flags_parse() {
        let cli = Cli::try_parse_from([
            "wordclique",
            "--force",
            "--jobs",
            "4",
            "--no-parallel",
            "--output",
            "out.json",
        ])
        .unwrap();
        assert!(cli.force);
        assert_eq!(cli.jobs, 4);
        assert!(cli.no_parallel);
        assert_eq!(cli.output, Some(PathBuf::from("out.json")));
    }
}
