//! `prodcfg init` command - Initialize a new workspace

use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::{Path, PathBuf};

use crate::core::workspace::{Workspace, WorkspaceError};

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Directory to initialize (default: current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Reinitialize even if .prodcfg/ already exists (state and catalogs are reset)
    #[arg(long)]
    pub force: bool,

    /// Start with no projects and empty catalogs instead of the sample data
    #[arg(long)]
    pub empty: bool,
}

pub fn run(args: InitArgs) -> Result<()> {
    let path = if args.path.as_os_str() == "." {
        std::env::current_dir().into_diagnostic()?
    } else {
        args.path.clone()
    };

    if !path.exists() {
        std::fs::create_dir_all(&path).into_diagnostic()?;
        println!(
            "{} Created directory {}",
            style("✓").green(),
            style(path.display()).cyan()
        );
    }

    let seed = !args.empty;
    let workspace = if args.force {
        Workspace::init_force(&path, seed)
    } else {
        Workspace::init(&path, seed)
    };

    match workspace {
        Ok(workspace) => {
            println!(
                "{} Initialized prodcfg workspace at {}",
                style("✓").green(),
                style(workspace.root().display()).cyan()
            );
            println!();
            println!("Created workspace structure:");
            print_structure(workspace.root());
            println!();
            println!("Next steps:");
            if seed {
                println!("  {} List the sample projects", style("prodcfg project list").yellow());
                println!("  {} Browse the project hierarchy", style("prodcfg tree").yellow());
            } else {
                println!("  {} Create your first project", style("prodcfg project new").yellow());
            }
            println!("  {} List configuration parts", style("prodcfg part list").yellow());
            Ok(())
        }
        Err(WorkspaceError::AlreadyExists(path)) => {
            println!(
                "{} prodcfg workspace already exists at {}",
                style("!").yellow(),
                style(path.display()).cyan()
            );
            println!();
            println!("Use {} to reinitialize", style("prodcfg init --force").yellow());
            Ok(())
        }
        Err(e) => Err(miette::miette!("{}", e)),
    }
}

fn print_structure(root: &Path) {
    let entries = [
        ".prodcfg/",
        ".prodcfg/config.yaml",
        ".prodcfg/state.yaml",
        ".prodcfg/catalogs.yaml",
    ];

    for entry in entries {
        if root.join(entry).exists() {
            let prefix = if entry.ends_with('/') { "📁" } else { "📄" };
            println!("  {} {}", prefix, style(entry).dim());
        }
    }
}
