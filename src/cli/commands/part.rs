//! `prodcfg part` command - Configuration parts catalog

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{open_session, or_dash, report_validation, save_session};
use crate::cli::table::{CellValue, ColumnDef, TableConfig, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::entity::{PartLevel, PartStatus};
use crate::core::url;
use crate::core::workspace::Session;
use crate::editors::PartDraft;
use crate::entities::Part;

#[derive(Subcommand, Debug)]
pub enum PartCommands {
    /// List parts of the selected set
    List(ListArgs),

    /// List the sets of the project's catalog
    Sets(ScopeArgs),

    /// Add a part to the selected set
    New(NewArgs),

    /// Select a part of the selected set
    Select(SelectArgs),

    /// Show a part's details
    Show(ShowArgs),
}

/// Which project and set the editor opens on
#[derive(clap::Args, Debug, Default)]
pub struct ScopeArgs {
    /// Project (default: the location's project, else the active one)
    #[arg(long, short = 'p')]
    pub project: Option<String>,

    /// Set within the project (default: the editor's current set)
    #[arg(long, short = 's')]
    pub set: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    pub scope: ScopeArgs,

    /// List parts of every set
    #[arg(long, short = 'a')]
    pub all: bool,

    /// Only parts with this status
    #[arg(long)]
    pub status: Option<PartStatus>,

    /// Wrap long names at this width instead of truncating
    #[arg(long, short = 'w')]
    pub wrap: Option<usize>,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    #[command(flatten)]
    pub scope: ScopeArgs,

    /// Part id (e.g. P-1001)
    #[arg(long)]
    pub id: Option<String>,

    #[arg(long, short = 'n')]
    pub name: Option<String>,

    #[arg(long)]
    pub short_name: Option<String>,

    #[arg(long, short = 'c')]
    pub category: Option<String>,

    #[arg(long = "type", short = 't')]
    pub part_type: Option<String>,

    /// L1 (system) to L4 (sub-assembly)
    #[arg(long, short = 'l')]
    pub level: Option<PartLevel>,

    #[arg(long)]
    pub owner: Option<String>,

    #[arg(long, default_value = "draft")]
    pub status: PartStatus,
}

#[derive(clap::Args, Debug)]
pub struct SelectArgs {
    #[command(flatten)]
    pub scope: ScopeArgs,

    /// Part id
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    #[command(flatten)]
    pub scope: ScopeArgs,

    /// Part id (default: the selected part)
    pub id: Option<String>,
}

const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("id", "ID", 12),
    ColumnDef::new("name", "NAME", 32),
    ColumnDef::new("category", "CATEGORY", 14),
    ColumnDef::new("type", "TYPE", 14),
    ColumnDef::new("level", "LEVEL", 6),
    ColumnDef::new("owner", "OWNER", 16),
    ColumnDef::new("status", "STATUS", 14),
];

const ALL_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("set", "SET", 20),
    ColumnDef::new("id", "ID", 12),
    ColumnDef::new("name", "NAME", 32),
    ColumnDef::new("category", "CATEGORY", 14),
    ColumnDef::new("type", "TYPE", 14),
    ColumnDef::new("level", "LEVEL", 6),
    ColumnDef::new("owner", "OWNER", 16),
    ColumnDef::new("status", "STATUS", 14),
];

const SET_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("id", "ID", 20),
    ColumnDef::new("name", "NAME", 28),
    ColumnDef::new("parts", "PARTS", 6),
    ColumnDef::new("description", "DESCRIPTION", 48),
];

pub fn run(cmd: PartCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        PartCommands::List(args) => run_list(args, global),
        PartCommands::Sets(args) => run_sets(args, global),
        PartCommands::New(args) => run_new(args, global),
        PartCommands::Select(args) => run_select(args, global),
        PartCommands::Show(args) => run_show(args, global),
    }
}

/// Open the configuration editor on the requested scope
fn mount(session: &mut Session, scope: &ScopeArgs) -> Result<()> {
    let url_project = scope
        .project
        .clone()
        .or_else(|| url::decode(&session.sync.location().query).project);
    let actions = session
        .editors
        .configuration
        .mount(url_project.as_deref(), &session.store.state());
    let state = session.store.dispatch_batch(actions);
    session.sync.sync(&state);

    if let Some(ref set_id) = scope.set {
        if !session.editors.configuration.select_set(set_id) {
            return Err(miette::miette!("Set not found in this project's catalog: {}", set_id));
        }
    }
    Ok(())
}

fn part_row(part: &Part) -> TableRow {
    TableRow::new(part.id.clone())
        .cell("id", CellValue::Id(part.id.clone()))
        .cell("name", CellValue::text(part.display_name()))
        .cell("category", CellValue::optional(part.category.as_deref()))
        .cell("type", CellValue::optional(part.part_type.as_deref()))
        .cell(
            "level",
            part.level.map_or(CellValue::Empty, |l| CellValue::Text(l.to_string())),
        )
        .cell("owner", CellValue::text(part.owner.clone()))
        .cell("status", CellValue::PartStatus(part.status))
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = open_session(global)?;
    mount(&mut session, &args.scope)?;
    save_session(&session)?;

    let editor = &session.editors.configuration;
    let keep = |part: &Part| args.status.map_or(true, |s| part.status == s);
    let format = global.format_or(&session.config, OutputFormat::Tsv);

    let (parts, columns): (Vec<(&str, &Part)>, &[ColumnDef]) = if args.all {
        let parts = editor
            .available_sets()
            .iter()
            .flat_map(|set| set.parts.iter().map(move |p| (set.name.as_str(), p)))
            .filter(|(_, p)| keep(p))
            .collect();
        (parts, ALL_COLUMNS)
    } else {
        let set_name = editor.selected_set().map_or("", |s| s.name.as_str());
        let parts = editor
            .visible_parts()
            .iter()
            .filter(|p| keep(p))
            .map(|p| (set_name, p))
            .collect();
        (parts, COLUMNS)
    };

    match format {
        OutputFormat::Json => {
            let parts: Vec<&Part> = parts.iter().map(|(_, p)| *p).collect();
            println!("{}", serde_json::to_string_pretty(&parts).into_diagnostic()?);
            Ok(())
        }
        OutputFormat::Yaml => {
            let parts: Vec<&Part> = parts.iter().map(|(_, p)| *p).collect();
            print!("{}", serde_yml::to_string(&parts).into_diagnostic()?);
            Ok(())
        }
        _ => {
            if format == OutputFormat::Tsv && !global.quiet {
                print_scope(&session);
            }
            if parts.is_empty() {
                if format == OutputFormat::Tsv {
                    println!("No parts found.");
                }
                return Ok(());
            }
            let rows: Vec<TableRow> = parts
                .iter()
                .map(|(set_name, part)| part_row(part).cell("set", CellValue::text(*set_name)))
                .collect();
            let config = args.wrap.map_or_else(TableConfig::default, TableConfig::with_wrap);
            TableFormatter::new(columns, "part")
                .with_config(config)
                .output(&rows, format)
        }
    }
}

fn print_scope(session: &Session) {
    let editor = &session.editors.configuration;
    let project = editor.selection().project.as_deref().unwrap_or("-");
    let set = editor.selected_set().map_or("-", |s| s.name.as_str());
    println!(
        "{}: {}  {}: {}",
        style("Project").bold(),
        style(project).cyan(),
        style("Set").bold(),
        style(set).cyan()
    );
    println!();
}

fn run_sets(args: ScopeArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = open_session(global)?;
    mount(&mut session, &args)?;
    save_session(&session)?;

    let sets = session.editors.configuration.available_sets();
    match global.format_or(&session.config, OutputFormat::Tsv) {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(sets).into_diagnostic()?);
            Ok(())
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(sets).into_diagnostic()?);
            Ok(())
        }
        format => {
            let rows: Vec<TableRow> = sets
                .iter()
                .map(|set| {
                    TableRow::new(set.id.clone())
                        .cell("id", CellValue::Id(set.id.clone()))
                        .cell("name", CellValue::text(set.name.clone()))
                        .cell("parts", CellValue::Number(set.parts.len()))
                        .cell("description", CellValue::optional(set.description.as_deref()))
                })
                .collect();
            TableFormatter::new(SET_COLUMNS, "set").output(&rows, format)
        }
    }
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = open_session(global)?;
    mount(&mut session, &args.scope)?;

    let draft = PartDraft {
        id: args.id.unwrap_or_default(),
        name: args.name.unwrap_or_default(),
        short_name: args.short_name.unwrap_or_default(),
        category: args.category.unwrap_or_default(),
        part_type: args.part_type.unwrap_or_default(),
        level: args.level,
        owner: args.owner.unwrap_or_default(),
        status: args.status,
    };
    let part_id = session
        .editors
        .configuration
        .add_part(draft)
        .map(|part| part.id.clone())
        .map_err(report_validation)?;
    save_session(&session)?;

    let set = session
        .editors
        .configuration
        .selected_set()
        .map_or("-", |s| s.name.as_str());
    println!(
        "{} Added part {} to {}",
        style("✓").green(),
        style(&part_id).cyan(),
        style(set).yellow()
    );
    Ok(())
}

fn run_select(args: SelectArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = open_session(global)?;
    mount(&mut session, &args.scope)?;

    if !session.editors.configuration.select_part(&args.id) {
        return Err(miette::miette!(
            "Part {} is not in the selected set. Pick its set with --set.",
            args.id
        ));
    }
    save_session(&session)?;

    if !global.quiet {
        println!("{} Selected part {}", style("✓").green(), style(&args.id).cyan());
    }
    Ok(())
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = open_session(global)?;
    mount(&mut session, &args.scope)?;
    save_session(&session)?;

    let editor = &session.editors.configuration;
    let part = match args.id.as_deref() {
        Some(id) => editor
            .selection()
            .project
            .as_deref()
            .and_then(|p| editor.catalog().get(p))
            .and_then(|c| c.locate_part(id))
            .map(|(_, part)| part),
        None => editor.selected_part(),
    }
    .ok_or_else(|| miette::miette!("Part not found. Pass a part id or select one first."))?;

    match global.format_or(&session.config, OutputFormat::Yaml) {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(part).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(part).into_diagnostic()?);
        }
        OutputFormat::Id => println!("{}", part.id),
        _ => {
            println!("{}", style("─".repeat(60)).dim());
            println!("{}: {}", style("ID").bold(), style(&part.id).cyan());
            println!("{}: {}", style("Name").bold(), style(part.display_name()).yellow());
            println!("{}: {}", style("Short name").bold(), or_dash(&part.short_name));
            println!("{}: {}", style("Category").bold(), part.category.as_deref().unwrap_or("-"));
            println!("{}: {}", style("Type").bold(), part.part_type.as_deref().unwrap_or("-"));
            match part.level {
                Some(level) => println!("{}: {} ({})", style("Level").bold(), level, level.describe()),
                None => println!("{}: -", style("Level").bold()),
            }
            println!("{}: {}", style("Owner").bold(), or_dash(&part.owner));
            println!("{}: {}", style("Status").bold(), part.status);
            println!("{}", style("─".repeat(60)).dim());
        }
    }
    Ok(())
}
