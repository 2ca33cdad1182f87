//! `prodcfg tree` command - Project hierarchy as the sidebar shows it

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::open_session;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::selection::Level;
use crate::shell::{Navigator, TreeLine};

#[derive(clap::Args, Debug)]
pub struct TreeArgs {
    /// Expand every project, not only the active one
    #[arg(long, short = 'a')]
    pub all: bool,

    /// Stop at this level (project, set, component, assembly)
    #[arg(long)]
    pub depth: Option<Level>,
}

pub fn run(args: TreeArgs, global: &GlobalOpts) -> Result<()> {
    let session = open_session(global)?;
    let state = session.store.state();
    let navigator = Navigator::new(&state, session.config.auto_expand_first_set());

    let max_depth = args
        .depth
        .and_then(|level| Level::all().iter().position(|l| *l == level))
        .unwrap_or(usize::MAX);

    let mut lines = Vec::new();
    let mut project_open = false;
    for line in Navigator::hierarchy(&state) {
        if line.depth == 0 {
            project_open = args.all || navigator.is_open(&line.id);
        } else if !project_open {
            continue;
        }
        if line.depth <= max_depth {
            lines.push(line);
        }
    }

    match global.format_or(&session.config, OutputFormat::Tsv) {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&lines).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&lines).into_diagnostic()?);
        }
        OutputFormat::Id => {
            for line in &lines {
                println!("{}", line.id);
            }
        }
        _ => {
            if lines.is_empty() {
                println!("No projects found.");
                return Ok(());
            }
            for line in &lines {
                print_line(line);
            }
        }
    }
    Ok(())
}

fn print_line(line: &TreeLine) {
    let indent = "  ".repeat(line.depth);
    let marker = if line.selected {
        style("●").green().to_string()
    } else {
        style("○").dim().to_string()
    };
    let label = match line.level {
        Level::Project => style(&line.label).bold().to_string(),
        _ if line.selected => style(&line.label).cyan().to_string(),
        _ => line.label.clone(),
    };
    let id = if line.level == Level::Project || line.level == Level::Set {
        format!(" {}", style(&line.id).dim())
    } else {
        String::new()
    };
    println!("{}{} {}{} {}", indent, marker, label, id, style(format!("[{}]", line.status)).dim());
}
