use clap::Parser;
use std::path::PathBuf;

/// Visual reaction-time test: ten arrow stimuli, one key press each.
#[derive(Parser, Debug)]
#[command(name = "visual-reaction-test")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// TOML settings file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory the results CSV is written to (overrides the settings file)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Seed for deck order, delays and participant id (reproducible sessions)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Enable debug-level logging
    #[arg(short, long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_overrides() {
        let cli = Cli::parse_from([
            "visual-reaction-test",
            "--seed",
            "17",
            "-o",
            "out",
            "-v",
        ]);
        assert_eq!(cli.seed, Some(17));
        assert_eq!(cli.output_dir, Some(PathBuf::from("out")));
        assert!(cli.verbose);
        assert!(cli.config.is_none());
    }
}
