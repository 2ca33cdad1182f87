//! `prodcfg project` command - Production project management

use std::path::PathBuf;

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{format_short_id_str, open_session, or_dash, report_validation, save_session};
use crate::cli::table::{CellValue, ColumnDef, TableConfig, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::action::Action;
use crate::core::entity::ProjectStatus;
use crate::core::transport::FileSource;
use crate::editors::wizard::{CATEGORIES, PROJECT_TYPES};
use crate::editors::{ProjectWizard, WizardStep};
use crate::entities::{Project, ProjectPatch};

#[derive(Subcommand, Debug)]
pub enum ProjectCommands {
    /// List projects
    List(ListArgs),

    /// Show a project's details
    Show(ShowArgs),

    /// Create a project through the creation wizard
    New(NewArgs),

    /// Update fields of an existing project
    Update(UpdateArgs),

    /// Make a project the active one
    Activate(ActivateArgs),

    /// List assemblies available for reuse in new projects
    Inventory,

    /// Replace the project list with projects read from a YAML or JSON file
    Load(LoadArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Only projects with this status
    #[arg(long, short = 's')]
    pub status: Option<ProjectStatus>,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Project ID (default: the active project)
    pub id: Option<String>,
}

#[derive(clap::Args, Debug, Default)]
pub struct NewArgs {
    /// Project name
    #[arg(long, short = 'n')]
    pub name: Option<String>,

    /// Short program code (e.g. PX-400)
    #[arg(long, short = 'c')]
    pub code: Option<String>,

    /// Category (Aerial, Ballistic, Naval)
    #[arg(long)]
    pub category: Option<String>,

    /// Project type (Special, Conventional)
    #[arg(long = "type", short = 't')]
    pub project_type: Option<String>,

    /// Short description
    #[arg(long, short = 'd')]
    pub description: Option<String>,

    /// Owner (default: the configured author)
    #[arg(long, short = 'o')]
    pub owner: Option<String>,

    /// Hide the project from reuse and set imports
    #[arg(long)]
    pub hidden: bool,

    /// Replace the draft sets with copies of this project's sets
    #[arg(long, value_name = "PROJECT_ID")]
    pub import_from: Option<String>,

    /// Set name; the first renames the starter set, further ones add sets
    #[arg(long = "set", value_name = "NAME")]
    pub sets: Vec<String>,

    /// Structure for the last set (replaces its placeholder structures)
    #[arg(long = "structure", value_name = "NAME")]
    pub structures: Vec<String>,

    /// Assembly for the last set (replaces its placeholder assemblies)
    #[arg(long = "assembly", value_name = "NAME")]
    pub assemblies: Vec<String>,

    /// Reuse an inventory assembly in the last set, matched by name
    #[arg(long = "reuse", value_name = "NAME")]
    pub reuse: Vec<String>,

    /// Prompt for every field
    #[arg(long, short = 'i')]
    pub interactive: bool,
}

#[derive(clap::Args, Debug)]
pub struct UpdateArgs {
    /// Project ID
    pub id: String,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub code: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(long)]
    pub status: Option<ProjectStatus>,

    #[arg(long)]
    pub owner: Option<String>,

    #[arg(long)]
    pub system: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct LoadArgs {
    /// Project list (.yaml, .yml or .json)
    pub file: PathBuf,
}

#[derive(clap::Args, Debug)]
pub struct ActivateArgs {
    /// Project ID
    pub id: String,
}

const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("id", "ID", 16),
    ColumnDef::new("code", "CODE", 10),
    ColumnDef::new("name", "NAME", 32),
    ColumnDef::new("status", "STATUS", 18),
    ColumnDef::new("owner", "OWNER", 18),
    ColumnDef::new("sets", "SETS", 6),
];

const INVENTORY_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("id", "ID", 28),
    ColumnDef::new("name", "NAME", 28),
    ColumnDef::new("source", "SOURCE", 40),
];

pub fn run(cmd: ProjectCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ProjectCommands::List(args) => run_list(args, global),
        ProjectCommands::Show(args) => run_show(args, global),
        ProjectCommands::New(args) => run_new(args, global),
        ProjectCommands::Update(args) => run_update(args, global),
        ProjectCommands::Activate(args) => run_activate(args, global),
        ProjectCommands::Inventory => run_inventory(global),
        ProjectCommands::Load(args) => run_load(args, global),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let session = open_session(global)?;
    let state = session.store.state();
    let format = global.format_or(&session.config, OutputFormat::Tsv);

    let projects: Vec<&Project> = state
        .projects
        .iter()
        .filter(|p| args.status.map_or(true, |s| p.status == s))
        .collect();

    if projects.is_empty() {
        match format {
            OutputFormat::Json | OutputFormat::Yaml => println!("[]"),
            _ => {
                println!("No projects found.");
                println!();
                println!("Create one with: {}", style("prodcfg project new").yellow());
            }
        }
        return Ok(());
    }

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&projects).into_diagnostic()?);
            Ok(())
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&projects).into_diagnostic()?);
            Ok(())
        }
        _ => {
            let active = state.active_project_id.as_deref();
            let rows: Vec<TableRow> = projects
                .iter()
                .map(|p| {
                    let id = if Some(p.id.as_str()) == active {
                        format!("*{}", format_short_id_str(&p.id))
                    } else {
                        format_short_id_str(&p.id)
                    };
                    TableRow::new(p.id.clone())
                        .cell("id", CellValue::Id(id))
                        .cell("code", CellValue::text(p.code.clone()))
                        .cell("name", CellValue::text(p.name.clone()))
                        .cell("status", CellValue::ProjectStatus(p.status))
                        .cell("owner", CellValue::text(p.owner.clone()))
                        .cell("sets", CellValue::Number(p.sets.len()))
                })
                .collect();
            let config = if global.quiet {
                TableConfig::for_pipe()
            } else {
                TableConfig::default()
            };
            TableFormatter::new(COLUMNS, "project")
                .with_config(config)
                .output(&rows, format)
        }
    }
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let session = open_session(global)?;
    let state = session.store.state();

    let project = match args.id.as_deref() {
        Some(id) => state.project(id),
        None => state.active_project(),
    }
    .ok_or_else(|| match args.id {
        Some(ref id) => miette::miette!("Project not found: {}", id),
        None => miette::miette!("No active project. Use 'prodcfg project activate <ID>' first."),
    })?;

    match global.format_or(&session.config, OutputFormat::Yaml) {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(project).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(project).into_diagnostic()?);
        }
        OutputFormat::Id => {
            println!("{}", project.id);
        }
        _ => print_project(project, state.active_project_id.as_deref() == Some(project.id.as_str())),
    }

    Ok(())
}

fn print_project(project: &Project, active: bool) {
    println!("{}", style("─".repeat(60)).dim());
    println!(
        "{}: {}{}",
        style("ID").bold(),
        style(&project.id).cyan(),
        if active { style(" (active)").green().to_string() } else { String::new() }
    );
    println!("{}: {}", style("Name").bold(), style(&project.name).yellow());
    println!("{}: {}", style("Code").bold(), or_dash(&project.code));
    println!("{}: {}", style("Status").bold(), project.status);
    println!("{}: {}", style("Owner").bold(), or_dash(&project.owner));
    println!("{}: {}", style("System").bold(), or_dash(&project.system));
    if let Some(ref category) = project.category {
        println!("{}: {}", style("Category").bold(), category);
    }
    if let Some(ref project_type) = project.project_type {
        println!("{}: {}", style("Type").bold(), project_type);
    }
    if let Some(visible) = project.visibility {
        println!(
            "{}: {}",
            style("Visible for reuse").bold(),
            if visible { "Yes" } else { "Hidden" }
        );
    }
    println!("{}", style("─".repeat(60)).dim());

    if !project.description.is_empty() {
        println!();
        println!("{}", project.description);
    }

    println!();
    println!("{}", style(format!("Sets ({})", project.sets.len())).bold());
    for set in &project.sets {
        println!(
            "  {} {} {}",
            style(&set.id).cyan(),
            set.name,
            style(format!("[{}]", set.status)).dim()
        );
        for structure in &set.structures {
            println!("    • {} {}", structure.name, style(format!("[{}]", structure.status)).dim());
            for assembly in &structure.assemblies {
                println!("        - {} {}", assembly.name, style(format!("[{}]", assembly.status)).dim());
            }
        }
    }

    let reports: Vec<_> = project.all_qc_reports().collect();
    if !reports.is_empty() {
        println!();
        println!("{}", style(format!("QC Reports ({})", reports.len())).bold());
        for report in reports {
            let date = report
                .date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "-".to_string());
            println!(
                "  {} {} | {} | {} | {}",
                style(&report.id).cyan(),
                report.title,
                report.status,
                or_dash(&report.owner),
                date
            );
        }
    }
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = open_session(global)?;
    let projects = session.store.state().projects.clone();
    let mut wizard = ProjectWizard::new(&projects);

    if args.interactive {
        prompt_basics(&mut wizard)?;
    } else {
        let form = &mut wizard.form;
        form.name = args.name.clone().unwrap_or_default();
        form.code = args.code.clone().unwrap_or_default();
        form.category = args.category.clone().unwrap_or_default();
        form.project_type = args.project_type.clone().unwrap_or_default();
        form.description = args.description.clone().unwrap_or_default();
        form.visibility = !args.hidden;
    }
    wizard.form.owner = args
        .owner
        .clone()
        .unwrap_or_else(|| session.config.author());

    // Basics -> Sets
    wizard.next().map_err(report_validation)?;

    let import_from = if args.interactive {
        prompt_import(&projects)?
    } else {
        args.import_from.clone()
    };
    if let Some(ref from) = import_from {
        let result = wizard.import_sets(&projects, Some(from.as_str()));
        if let Some(alert) = wizard.alert() {
            if !global.quiet {
                println!("{} {}", style("ℹ").blue(), alert);
            }
        }
        result.map_err(|e| miette::miette!("{}", e))?;
    }
    apply_sets(&mut wizard, &args.sets);

    // Sets -> Structures
    wizard.next().map_err(report_validation)?;
    if args.interactive {
        prompt_structures(&mut wizard)?;
    } else {
        apply_structures(&mut wizard, &args)?;
    }

    // Structures -> Review
    let step = wizard.next().map_err(report_validation)?;
    if step == WizardStep::Review && !global.quiet {
        print_review(&wizard);
    }

    if args.interactive {
        let confirmed = dialoguer::Confirm::new()
            .with_prompt("Create project?")
            .default(true)
            .interact()
            .into_diagnostic()?;
        if !confirmed {
            println!("{} Cancelled", style("!").yellow());
            return Ok(());
        }
    }

    let id = wizard
        .submit(&mut session.store, &mut session.sync)
        .map_err(report_validation)?;
    save_session(&session)?;

    println!(
        "{} Created project {}",
        style("✓").green(),
        style(format_short_id_str(&id)).cyan()
    );
    println!("   {}", style(session.sync.location()).dim());
    Ok(())
}

fn prompt_basics(wizard: &mut ProjectWizard) -> Result<()> {
    use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};

    let theme = ColorfulTheme::default();
    let form = &mut wizard.form;
    form.name = Input::with_theme(&theme)
        .with_prompt("Project name")
        .interact_text()
        .into_diagnostic()?;
    form.code = Input::with_theme(&theme)
        .with_prompt("Project code")
        .interact_text()
        .into_diagnostic()?;
    let category = Select::with_theme(&theme)
        .with_prompt("Category")
        .items(&CATEGORIES)
        .default(0)
        .interact()
        .into_diagnostic()?;
    form.category = CATEGORIES[category].to_string();
    let project_type = Select::with_theme(&theme)
        .with_prompt("Project type")
        .items(&PROJECT_TYPES)
        .default(0)
        .interact()
        .into_diagnostic()?;
    form.project_type = PROJECT_TYPES[project_type].to_string();
    form.visibility = Confirm::with_theme(&theme)
        .with_prompt("Show this project for reuse and set imports?")
        .default(true)
        .interact()
        .into_diagnostic()?;
    form.description = Input::with_theme(&theme)
        .with_prompt("Short description")
        .allow_empty(true)
        .interact_text()
        .into_diagnostic()?;
    Ok(())
}

fn prompt_import(projects: &[Project]) -> Result<Option<String>> {
    use dialoguer::{theme::ColorfulTheme, Select};

    if projects.is_empty() {
        return Ok(None);
    }
    let mut items = vec!["Start from the starter set".to_string()];
    items.extend(projects.iter().map(|p| format!("{} ({})", p.name, p.code)));
    let choice = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Import sets from existing project")
        .items(&items)
        .default(0)
        .interact()
        .into_diagnostic()?;
    Ok(choice.checked_sub(1).map(|idx| projects[idx].id.clone()))
}

fn prompt_structures(wizard: &mut ProjectWizard) -> Result<()> {
    use dialoguer::{theme::ColorfulTheme, Input};

    let theme = ColorfulTheme::default();
    let set_ids: Vec<(String, String)> = wizard.sets().iter().map(|s| (s.id.clone(), s.name.clone())).collect();
    for (set_id, set_name) in set_ids {
        let structures: String = Input::with_theme(&theme)
            .with_prompt(format!("Structures for {} (comma separated, blank keeps current)", set_name))
            .allow_empty(true)
            .interact_text()
            .into_diagnostic()?;
        let names = split_names(&structures);
        if !names.is_empty() {
            replace_structures(wizard, &set_id, &names);
        }

        let assemblies: String = Input::with_theme(&theme)
            .with_prompt(format!("Assemblies for {} (comma separated, blank keeps current)", set_name))
            .allow_empty(true)
            .interact_text()
            .into_diagnostic()?;
        let names = split_names(&assemblies);
        if !names.is_empty() {
            replace_assemblies(wizard, &set_id, &names);
        }
    }
    Ok(())
}

fn split_names(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// First name renames the first draft set; the rest are added
fn apply_sets(wizard: &mut ProjectWizard, names: &[String]) {
    for (idx, name) in names.iter().enumerate() {
        let starter = if idx == 0 {
            wizard.sets().first().map(|s| s.id.clone())
        } else {
            None
        };
        let set_id = match starter {
            Some(id) => id,
            None => wizard.add_set().id.clone(),
        };
        if let Some(set) = wizard.set_mut(&set_id) {
            set.name = name.clone();
        }
    }
}

fn apply_structures(wizard: &mut ProjectWizard, args: &NewArgs) -> Result<()> {
    let Some(set_id) = wizard.sets().last().map(|s| s.id.clone()) else {
        return Ok(());
    };
    if !args.structures.is_empty() {
        replace_structures(wizard, &set_id, &args.structures);
    }
    if !args.assemblies.is_empty() {
        replace_assemblies(wizard, &set_id, &args.assemblies);
    }
    for name in &args.reuse {
        let item = wizard
            .inventory()
            .iter()
            .find(|i| i.name.eq_ignore_ascii_case(name.trim()))
            .map(|i| i.id.clone())
            .ok_or_else(|| miette::miette!("No inventory assembly named '{}'", name))?;
        wizard.add_assembly_from_inventory(&set_id, &item);
    }
    Ok(())
}

fn replace_structures(wizard: &mut ProjectWizard, set_id: &str, names: &[String]) {
    if let Some(set) = wizard.set_mut(set_id) {
        set.structures.clear();
    }
    for name in names {
        wizard.add_structure(set_id);
        if let Some(structure) = wizard.set_mut(set_id).and_then(|s| s.structures.last_mut()) {
            structure.name = name.clone();
        }
    }
}

fn replace_assemblies(wizard: &mut ProjectWizard, set_id: &str, names: &[String]) {
    if let Some(set) = wizard.set_mut(set_id) {
        set.assemblies.clear();
    }
    for name in names {
        let Some(assembly_id) = wizard.add_assembly(set_id).map(|a| a.id.clone()) else {
            continue;
        };
        if let Some(assembly) = wizard.set_mut(set_id).and_then(|s| s.assemblies.last_mut()) {
            assembly.name = name.clone();
        }
        wizard.save_to_inventory(set_id, &assembly_id);
    }
}

fn print_review(wizard: &ProjectWizard) {
    let form = &wizard.form;
    println!("{} {}", style(wizard.step().title()).bold(), style(format!("{}%", wizard.progress())).dim());
    println!("  {}: {} ({})", style("Project").bold(), form.name, form.code);
    println!("  {}: {} / {}", style("Category").bold(), form.category, form.project_type);
    println!("  {}: {}", style("Owner").bold(), or_dash(&form.owner));
    println!(
        "  {}: {}",
        style("Visible for reuse").bold(),
        if form.visibility { "Yes" } else { "Hidden" }
    );
    for set in wizard.sets() {
        println!(
            "  {} {}: {} structure(s), {} assembly(ies)",
            style("•").dim(),
            set.name,
            set.structures.len(),
            set.assemblies.len()
        );
    }
    println!();
}

fn run_update(args: UpdateArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = open_session(global)?;
    if session.store.state().project(&args.id).is_none() {
        return Err(miette::miette!("Project not found: {}", args.id));
    }

    let changes = ProjectPatch {
        name: args.name,
        code: args.code,
        description: args.description,
        status: args.status,
        owner: args.owner,
        system: args.system,
        ..Default::default()
    };
    if changes.is_empty() {
        return Err(miette::miette!("Nothing to update. Pass at least one field, e.g. --status in-production"));
    }

    session.store.dispatch(Action::UpdateProject {
        project_id: args.id.clone(),
        changes,
    });
    save_session(&session)?;

    println!("{} Updated project {}", style("✓").green(), style(&args.id).cyan());
    Ok(())
}

fn run_activate(args: ActivateArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = open_session(global)?;
    if session.store.state().project(&args.id).is_none() {
        eprintln!(
            "{} {} is not a known project; it will not resolve until one is added",
            style("!").yellow(),
            args.id
        );
    }

    let state = session.store.dispatch(Action::set_active_project(args.id.clone()));
    session.sync.sync(&state);
    save_session(&session)?;

    if !global.quiet {
        println!("{} Active project is now {}", style("✓").green(), style(&args.id).cyan());
        println!("   {}", style(session.sync.location()).dim());
    }
    Ok(())
}

fn run_load(args: LoadArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = open_session(global)?;
    let source = FileSource::new(&args.file);
    let state = session
        .store
        .load_from(&source)
        .map_err(|e| miette::miette!("Failed to load projects: {}", e))?;
    session.sync.sync(&state);
    save_session(&session)?;

    if !global.quiet {
        println!(
            "{} Loaded {} project(s) from {}",
            style("✓").green(),
            style(state.projects.len()).cyan(),
            style(args.file.display()).dim()
        );
    }
    Ok(())
}

fn run_inventory(global: &GlobalOpts) -> Result<()> {
    let session = open_session(global)?;
    let wizard = ProjectWizard::new(&session.store.state().projects);
    let format = global.format_or(&session.config, OutputFormat::Tsv);

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(wizard.inventory()).into_diagnostic()?);
            Ok(())
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(wizard.inventory()).into_diagnostic()?);
            Ok(())
        }
        _ => {
            let rows: Vec<TableRow> = wizard
                .inventory()
                .iter()
                .map(|item| {
                    TableRow::new(item.id.clone())
                        .cell("id", CellValue::Id(item.id.clone()))
                        .cell("name", CellValue::text(item.name.clone()))
                        .cell("source", CellValue::text(item.source.clone()))
                })
                .collect();
            TableFormatter::new(INVENTORY_COLUMNS, "assembly").output(&rows, format)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_names() {
        assert_eq!(split_names(" Keel, ,Floor Grid "), vec!["Keel", "Floor Grid"]);
        assert!(split_names("").is_empty());
    }

    #[test]
    fn test_apply_sets_renames_then_adds() {
        let mut wizard = ProjectWizard::new(&[]);
        apply_sets(&mut wizard, &["Fuselage".to_string(), "Wings".to_string()]);
        let names: Vec<&str> = wizard.sets().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Fuselage", "Wings"]);
        assert_eq!(wizard.sets()[0].id, "set-1");
    }

    #[test]
    fn test_flags_replace_placeholders_in_last_set() {
        let mut wizard = ProjectWizard::new(&[]);
        let args = NewArgs {
            structures: vec!["Center fuselage".to_string(), "Wing spars".to_string()],
            assemblies: vec!["Keel Beam".to_string()],
            ..Default::default()
        };
        apply_structures(&mut wizard, &args).unwrap();

        let set = &wizard.sets()[0];
        let structures: Vec<&str> = set.structures.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(structures, vec!["Center fuselage", "Wing spars"]);
        assert_eq!(set.assemblies.len(), 1);
        assert_eq!(set.assemblies[0].name, "Keel Beam");
        assert!(wizard.is_in_inventory("keel beam"));
    }

    #[test]
    fn test_unknown_reuse_name_is_an_error() {
        let mut wizard = ProjectWizard::new(&[]);
        let args = NewArgs {
            reuse: vec!["Nope".to_string()],
            ..Default::default()
        };
        assert!(apply_structures(&mut wizard, &args).is_err());
    }
}
