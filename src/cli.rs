use std::path::PathBuf;

use clap::Parser;

/// Verify a trained MOS-X model against held-out predictors.
#[derive(Parser, Debug)]
#[command(
    name = "mosx-verify",
    version,
    about = "Score a trained MOS-X model and plot verification diagnostics"
)]
pub struct Cli {
    /// Path to the site TOML configuration file.
    pub config: PathBuf,

    /// Clip rain at zero and zero it where the raw-model rain predictors are dry.
    #[arg(short = 't', long)]
    pub naive_rain_correction: bool,

    /// Also produce ensemble member forecasts (enables ensemble scores).
    #[arg(short, long)]
    pub ensemble: bool,

    /// Average the rain-tuned and untuned rain forecasts.
    #[arg(short, long)]
    pub rain_post_average: bool,

    /// Plot a learning curve over the combined training and test data.
    #[arg(short = 'L', long)]
    pub learning_curve: bool,

    /// Plot ensemble spread against skill (requires --ensemble).
    #[arg(short = 'S', long)]
    pub spread_skill: bool,

    /// Plot the observation rank histogram (requires --ensemble).
    #[arg(short = 'H', long)]
    pub rank_histogram: bool,

    /// Plot the forecast error distribution.
    #[arg(short = 'E', long)]
    pub error_distribution: bool,

    /// Write the score table as JSON to this path.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Whether any figure was requested.
    pub fn wants_plots(&self) -> bool {
        self.learning_curve || self.spread_skill || self.rank_histogram || self.error_distribution
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_short_flags() {
        let cli = Cli::try_parse_from(["mosx-verify", "-teS", "-vv", "site.toml"]).unwrap();
        assert!(cli.naive_rain_correction);
        assert!(cli.ensemble);
        assert!(cli.spread_skill);
        assert!(!cli.rank_histogram);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config, PathBuf::from("site.toml"));
        assert!(cli.wants_plots());
    }

    #[test]
    fn parses_long_flags() {
        let cli = Cli::try_parse_from([
            "mosx-verify",
            "--rain-post-average",
            "--learning-curve",
            "--rank-histogram",
            "--error-distribution",
            "--output",
            "scores.json",
            "site.toml",
        ])
        .unwrap();
        assert!(cli.rain_post_average && cli.learning_curve);
        assert!(cli.rank_histogram && cli.error_distribution);
        assert_eq!(cli.output, Some(PathBuf::from("scores.json")));
    }

    #[test]
    fn config_is_required() {
        assert!(Cli::try_parse_from(["mosx-verify", "-e"]).is_err());
    }

    #[test]
    fn no_flags_means_no_plots() {
        let cli = Cli::try_parse_from(["mosx-verify", "site.toml"]).unwrap();
        assert!(!cli.wants_plots());
    }
}
