//! `prodcfg build` command - Build configuration browser

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{open_session, save_session};
use crate::cli::table::{CellValue, ColumnDef, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::url;
use crate::editors::build::BUILD_COLUMNS;
use crate::editors::{BuildNode, BuildPart};

#[derive(Subcommand, Debug)]
pub enum BuildCommands {
    /// Show the build tree and the parts of the selected node
    Show(ShowArgs),
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Project (default: the location's project, else the active one)
    #[arg(long, short = 'p')]
    pub project: Option<String>,

    /// Node to open
    #[arg(long, short = 'n')]
    pub node: Option<String>,
}

const KEYS: [&str; 7] = ["id", "name", "qty", "order", "status", "hw", "qc"];
const WIDTHS: [usize; 7] = [12, 28, 5, 10, 14, 10, 10];

pub fn run(cmd: BuildCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        BuildCommands::Show(args) => run_show(args, global),
    }
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = open_session(global)?;
    let url_project = args
        .project
        .clone()
        .or_else(|| url::decode(&session.sync.location().query).project);
    let actions = session
        .editors
        .build
        .mount(url_project.as_deref(), &session.store.state());
    let state = session.store.dispatch_batch(actions);
    session.sync.sync(&state);

    if let Some(ref node) = args.node {
        if !session.editors.build.select_node(node) {
            return Err(miette::miette!("Build node not found: {}", node));
        }
    }
    save_session(&session)?;

    let browser = &session.editors.build;
    let Some(configuration) = browser.configuration() else {
        println!("No build configuration for this project.");
        return Ok(());
    };
    let current = browser.current_node();
    let parts: &[BuildPart] = current.map(|n| n.parts.as_slice()).unwrap_or(&[]);

    let format = global.format_or(&session.config, OutputFormat::Tsv);
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(parts).into_diagnostic()?);
            return Ok(());
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(parts).into_diagnostic()?);
            return Ok(());
        }
        OutputFormat::Tsv | OutputFormat::Auto => {
            println!("{}", style(&configuration.project_name).bold());
            let current_id = current.map(|n| n.id.as_str());
            for root in browser.tree() {
                root.walk(0, &mut |node, depth| print_node(node, depth, current_id));
            }
            println!();
            if let Some(node) = current {
                println!("{}: {}", style("Parts of").bold(), style(&node.label).cyan());
            }
        }
        _ => {}
    }

    if parts.is_empty() {
        if matches!(format, OutputFormat::Tsv | OutputFormat::Auto) {
            println!("No parts on this node.");
        }
        return Ok(());
    }

    let columns: Vec<ColumnDef> = KEYS
        .iter()
        .zip(BUILD_COLUMNS.iter())
        .zip(WIDTHS.iter())
        .map(|((key, header), width)| ColumnDef::new(*key, *header, *width))
        .collect();
    let rows: Vec<TableRow> = parts
        .iter()
        .map(|part| {
            KEYS.iter()
                .zip(part.cells())
                .fold(TableRow::new(part.id.clone()), |row, (key, value)| {
                    let cell = if *key == "id" {
                        CellValue::Id(value)
                    } else {
                        CellValue::text(value)
                    };
                    row.cell(*key, cell)
                })
        })
        .collect();
    TableFormatter::new(&columns, "part").output(&rows, format)
}

fn print_node(node: &BuildNode, depth: usize, current: Option<&str>) {
    let indent = "  ".repeat(depth);
    let marker = if current == Some(node.id.as_str()) {
        style("●").green().to_string()
    } else {
        style("○").dim().to_string()
    };
    let badge = node
        .badge
        .as_deref()
        .map(|b| format!(" {}", style(format!("[{}]", b)).yellow()))
        .unwrap_or_default();
    let count = if node.parts.is_empty() {
        String::new()
    } else {
        format!(" {}", style(format!("({} parts)", node.parts.len())).dim())
    };
    println!("{}{} {}{}{}", indent, marker, node.label, badge, count);
}
