//! `prodcfg select` command - Drive the sidebar selection cascade

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

use crate::cli::helpers::{open_session, save_session};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::selection::{CascadeEngine, Crumb, Level, Selection};
use crate::core::store::AppState;
use crate::shell::tree_view;
use crate::shell::Navigator;

#[derive(Subcommand, Debug)]
pub enum SelectCommands {
    /// Select one level; every deeper level is cleared
    Set(SetArgs),

    /// Clear the whole selection
    Clear,

    /// Show the selection, its breadcrumb and the tree-view row
    Show,
}

#[derive(clap::Args, Debug)]
pub struct SetArgs {
    /// Level to select (project, set, component, assembly, part)
    pub level: Level,

    /// Id at that level (structure and assembly names for component/assembly)
    pub id: String,

    /// Do not pre-select the first set when a project is selected
    #[arg(long)]
    pub no_expand: bool,
}

#[derive(Serialize)]
struct SelectionView<'a> {
    selection: &'a Selection,
    path: Vec<Crumb>,
}

pub fn run(cmd: SelectCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        SelectCommands::Set(args) => run_set(args, global),
        SelectCommands::Clear => run_clear(global),
        SelectCommands::Show => run_show(global),
    }
}

fn run_set(args: SetArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = open_session(global)?;
    let auto_expand = session.config.auto_expand_first_set() && !args.no_expand;
    let mut navigator = Navigator::new(&session.store.state(), auto_expand);

    if args.level == Level::Project {
        navigator.select_project(&mut session.store, &args.id);
    } else {
        navigator.select(&mut session.store, args.level, Some(args.id.clone()));
    }
    let state = session.store.state();
    session.sync.sync(&state);
    save_session(&session)?;

    if !global.quiet {
        print_breadcrumb(&state);
    }
    Ok(())
}

fn run_clear(global: &GlobalOpts) -> Result<()> {
    let mut session = open_session(global)?;
    let navigator = Navigator::new(&session.store.state(), false);
    navigator.clear(&mut session.store);
    save_session(&session)?;

    if !global.quiet {
        println!("{} Selection cleared", style("✓").green());
    }
    Ok(())
}

fn run_show(global: &GlobalOpts) -> Result<()> {
    let session = open_session(global)?;
    let state = session.store.state();
    let view = SelectionView {
        selection: &state.selection,
        path: CascadeEngine::navigator().path(&state.selection, &state.projects),
    };

    match global.format_or(&session.config, OutputFormat::Tsv) {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&view).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&view).into_diagnostic()?);
        }
        OutputFormat::Id => {
            if let Some(last) = view.path.last() {
                println!("{}", last.id);
            }
        }
        _ => {
            print_breadcrumb(&state);
            println!();
            print_tree_view_row(&state.selection);
        }
    }
    Ok(())
}

/// `Atlas Sedan Platform › Chassis Set › Front frame`
fn print_breadcrumb(state: &AppState) {
    let path = CascadeEngine::navigator().path(&state.selection, &state.projects);
    if path.is_empty() {
        println!("{}", style("Nothing selected").dim());
        return;
    }
    let labels: Vec<String> = path
        .iter()
        .map(|crumb| style(&crumb.label).cyan().to_string())
        .collect();
    println!("{}", labels.join(&style(" › ").dim().to_string()));
}

fn print_tree_view_row(selection: &Selection) {
    let Some(row) = tree_view::selection_row(selection) else {
        println!("{}", tree_view::EMPTY_MESSAGE);
        return;
    };
    for (level, value) in row {
        println!("{:<10} {}", style(tree_view::heading(level)).bold(), value);
    }
}
