//! Production tree view: the current selection laid out one level per column

use crate::core::selection::{Level, Selection};

/// Shown in place of an absent level
pub const PLACEHOLDER: &str = "—";

pub const EMPTY_MESSAGE: &str =
    "Please select a project, set, component, and part from the left treeview.";

/// Column header for a level, as the tree view labels it
pub fn heading(level: Level) -> &'static str {
    match level {
        Level::Project => "Project",
        Level::Set => "Set",
        Level::Component => "Component",
        Level::Assembly => "Assembly",
        Level::Part => "Part",
    }
}

/// One cell per level, or `None` when nothing at all is selected
pub fn selection_row(selection: &Selection) -> Option<Vec<(Level, String)>> {
    if selection.is_empty() {
        return None;
    }
    Some(
        Level::all()
            .iter()
            .map(|level| {
                let cell = selection.get(*level).unwrap_or(PLACEHOLDER);
                (*level, cell.to_string())
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_selection_has_no_row() {
        assert!(selection_row(&Selection::default()).is_none());
    }

    #[test]
    fn test_gaps_use_placeholder() {
        let selection = Selection {
            project: Some("proj-001".to_string()),
            assembly: Some("Steering column".to_string()),
            ..Default::default()
        };
        let row = selection_row(&selection).unwrap();
        let cells: Vec<&str> = row.iter().map(|(_, c)| c.as_str()).collect();
        assert_eq!(cells, vec!["proj-001", "—", "—", "Steering column", "—"]);
        assert_eq!(heading(row[2].0), "Component");
    }
}
