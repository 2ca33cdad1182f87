//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    build::BuildCommands, completions::CompletionsArgs, init::InitArgs, nav::NavCommands,
    part::PartCommands, project::ProjectCommands, qual::QualCommands, select::SelectCommands,
    timeline::TimelineCommands, tree::TreeArgs,
};
use crate::core::Config;

#[derive(Parser)]
#[command(name = "prodcfg")]
#[command(author, version, about = "Production Configuration Console")]
#[command(
    long_about = "Track production programs, their set/structure/assembly hierarchy, configuration parts and qualification tests from a local workspace."
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(long, short = 'v', global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Workspace root (default: auto-detect by finding .prodcfg/)
    #[arg(long, global = true, env = "PRODCFG_WORKSPACE")]
    pub workspace: Option<PathBuf>,
}

impl GlobalOpts {
    /// Resolve `auto`: the configured default format, else `fallback`
    pub fn format_or(&self, config: &Config, fallback: OutputFormat) -> OutputFormat {
        if self.format != OutputFormat::Auto {
            return self.format;
        }
        config
            .default_format
            .as_deref()
            .and_then(|f| OutputFormat::from_str(f, true).ok())
            .filter(|f| *f != OutputFormat::Auto)
            .unwrap_or(fallback)
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new workspace
    Init(InitArgs),

    /// Production projects
    #[command(subcommand)]
    Project(ProjectCommands),

    /// Sidebar selection (project > set > component > assembly > part)
    #[command(subcommand)]
    Select(SelectCommands),

    /// Location bar: query strings, sections, view mode and history
    #[command(subcommand)]
    Nav(NavCommands),

    /// Show the project hierarchy as the sidebar lays it out
    Tree(TreeArgs),

    /// Configuration parts catalog
    #[command(subcommand)]
    Part(PartCommands),

    /// Qualification tests and part status
    #[command(subcommand)]
    Qual(QualCommands),

    /// Build configuration browser
    #[command(subcommand)]
    Build(BuildCommands),

    /// Project timeline: milestones, health and discussion feed
    #[command(subcommand)]
    Timeline(TimelineCommands),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Automatically detect based on context (yaml for show, tsv for list)
    #[default]
    Auto,
    /// YAML format (full fidelity)
    Yaml,
    /// Tab-separated values (for piping)
    Tsv,
    /// JSON format (for programming)
    Json,
    /// CSV format (for spreadsheets)
    Csv,
    /// Markdown tables
    Md,
    /// Just IDs, one per line
    Id,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn opts(format: OutputFormat) -> GlobalOpts {
        GlobalOpts {
            format,
            quiet: false,
            verbose: 0,
            workspace: None,
        }
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_explicit_format_wins() {
        let config = Config {
            default_format: Some("csv".to_string()),
            ..Default::default()
        };
        assert_eq!(opts(OutputFormat::Json).format_or(&config, OutputFormat::Tsv), OutputFormat::Json);
    }

    #[test]
    fn test_auto_uses_configured_default() {
        let config = Config {
            default_format: Some("md".to_string()),
            ..Default::default()
        };
        assert_eq!(opts(OutputFormat::Auto).format_or(&config, OutputFormat::Tsv), OutputFormat::Md);
        assert_eq!(
            opts(OutputFormat::Auto).format_or(&Config::default(), OutputFormat::Yaml),
            OutputFormat::Yaml
        );
    }

    #[test]
    fn test_verbose_counts() {
        let cli = Cli::try_parse_from(["prodcfg", "-vv", "tree"]).unwrap();
        assert_eq!(cli.global.verbose, 2);
    }
}
