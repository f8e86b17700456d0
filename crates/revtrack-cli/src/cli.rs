use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "revtrack",
    about = "Show what changed in a document since the last time you asked",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Directory documents and patches are resolved against
    #[arg(long, global = true, default_value = ".")]
    pub root: PathBuf,

    /// Configuration file (defaults to revtrack.toml in the root, if present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Diff a document against its previous version and advance its patch
    Calculate(CalculateArgs),
    /// Print the reconstructed previous version of a document
    Previous(PreviousArgs),
    /// Print the effective configuration
    Config,
}

#[derive(Args)]
pub struct CalculateArgs {
    /// Document path, relative to the root
    pub path: String,
    /// Also write the split view as a standalone HTML file
    #[arg(long)]
    pub html: Option<PathBuf>,
}

#[derive(Args)]
pub struct PreviousArgs {
    /// Document path, relative to the root
    pub path: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_calculate() {
        let cli = Cli::try_parse_from(["revtrack", "calculate", "notes/a.md"]).unwrap();
        if let Command::Calculate(args) = cli.command {
            assert_eq!(args.path, "notes/a.md");
            assert!(args.html.is_none());
        } else { panic!("wrong command"); }
        assert_eq!(cli.root, PathBuf::from("."));
        assert_eq!(cli.format, OutputFormat::Text);
    }

    #[test]
    fn parse_calculate_with_html() {
        let cli = Cli::try_parse_from(["revtrack", "calculate", "a.md", "--html", "out.html"]).unwrap();
        if let Command::Calculate(args) = cli.command {
            assert_eq!(args.html, Some(PathBuf::from("out.html")));
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_global_flags_after_command() {
        let cli = Cli::try_parse_from([
            "revtrack", "previous", "a.md", "--root", "/vault", "--format", "json", "-v",
        ])
        .unwrap();
        assert!(matches!(cli.command, Command::Previous(_)));
        assert_eq!(cli.root, PathBuf::from("/vault"));
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(cli.verbose);
    }

    #[test]
    fn parse_config() {
        let cli = Cli::try_parse_from(["revtrack", "--config", "rt.toml", "config"]).unwrap();
        assert!(matches!(cli.command, Command::Config));
        assert_eq!(cli.config, Some(PathBuf::from("rt.toml")));
    }

    #[test]
    fn calculate_requires_path() {
        assert!(Cli::try_parse_from(["revtrack", "calculate"]).is_err());
    }

    #[test]
    fn unknown_format_is_rejected() {
        assert!(Cli::try_parse_from(["revtrack", "--format", "xml", "config"]).is_err());
    }
}
