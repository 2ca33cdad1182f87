//! Project timeline board
//!
//! One delivery capsule per project: milestones, a health and progress
//! summary, and a discussion feed with the newest update first.

use std::collections::BTreeMap;
use std::fmt;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::core::action::Action;
use crate::core::identity::{new_id, IdPrefix};
use crate::core::store::AppState;
use crate::core::validation::ValidationErrors;
use crate::editors::catalog::mount_project;

/// Roles a comment can be posted under
pub const ROLES: [&str; 5] = ["Contributor", "PMO", "Engineering", "Quality", "Operations"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MilestoneStatus {
    Complete,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "At Risk")]
    AtRisk,
    Upcoming,
}

impl fmt::Display for MilestoneStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MilestoneStatus::Complete => write!(f, "Complete"),
            MilestoneStatus::InProgress => write!(f, "In Progress"),
            MilestoneStatus::AtRisk => write!(f, "At Risk"),
            MilestoneStatus::Upcoming => write!(f, "Upcoming"),
        }
    }
}

/// Delivery health of a project
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Health {
    #[default]
    #[serde(rename = "On Track")]
    OnTrack,
    Guarded,
    Watch,
}

impl fmt::Display for Health {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Health::OnTrack => write!(f, "On Track"),
            Health::Guarded => write!(f, "Guarded"),
            Health::Watch => write!(f, "Watch"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    pub id: String,
    /// Display date as entered ("12 Sep")
    pub date: String,
    pub title: String,
    pub status: MilestoneStatus,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub author: String,
    pub role: String,
    pub text: String,
    /// When it was posted, as shown in the feed
    pub time: String,
}

/// One project's board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timeline {
    pub project_name: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub manager: String,
    #[serde(default)]
    pub stage: String,
    /// Percent complete, 0..=100
    #[serde(default)]
    pub progress: u8,
    #[serde(default)]
    pub health: Health,
    #[serde(default)]
    pub summary: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub focus_areas: Vec<String>,
    #[serde(default)]
    pub milestones: Vec<Milestone>,
    /// Newest first
    #[serde(default)]
    pub comments: Vec<Comment>,
}

impl Timeline {
    /// Milestone count per status, in status order; absent statuses are skipped
    pub fn milestone_counts(&self) -> Vec<(MilestoneStatus, usize)> {
        let mut counts: BTreeMap<MilestoneStatus, usize> = BTreeMap::new();
        for milestone in &self.milestones {
            *counts.entry(milestone.status).or_default() += 1;
        }
        counts.into_iter().collect()
    }
}

/// Form input for a discussion update
#[derive(Debug, Clone, Default)]
pub struct CommentDraft {
    pub author: String,
    /// Blank means "Contributor"
    pub role: Option<String>,
    pub text: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimelineBoard {
    #[serde(default)]
    timelines: BTreeMap<String, Timeline>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    project: Option<String>,
}

impl TimelineBoard {
    pub fn new(timelines: BTreeMap<String, Timeline>) -> Self {
        Self {
            timelines,
            project: None,
        }
    }

    pub fn project(&self) -> Option<&str> {
        self.project.as_deref()
    }

    pub fn timeline(&self) -> Option<&Timeline> {
        self.project.as_deref().and_then(|id| self.timelines.get(id))
    }

    pub fn mount(&mut self, url_project: Option<&str>, state: &AppState) -> Vec<Action> {
        let (project, action) = mount_project(url_project, state, |id| self.timelines.contains_key(id));
        self.project = project;
        action.into_iter().collect()
    }

    /// Validate and prepend an update to the selected project's feed
    pub fn add_comment(&mut self, draft: CommentDraft) -> Result<&Comment, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.timeline().is_none() {
            errors.add("project", "Select a project");
        }
        errors.require("author", Some(draft.author.as_str()), "Name is required");
        errors.require("text", Some(draft.text.as_str()), "Comment is required");

        let role = match draft.role.as_deref().map(str::trim).filter(|r| !r.is_empty()) {
            None => ROLES[0].to_string(),
            Some(raw) => match ROLES.iter().find(|r| r.eq_ignore_ascii_case(raw)) {
                Some(role) => role.to_string(),
                None => {
                    errors.add("role", format!("Role must be one of: {}", ROLES.join(", ")));
                    String::new()
                }
            },
        };
        errors.into_result()?;

        let comment = Comment {
            id: new_id(IdPrefix::Comment),
            author: draft.author.trim().to_string(),
            role,
            text: draft.text.trim().to_string(),
            time: Utc::now().format("%Y-%m-%d %H:%M UTC").to_string(),
        };

        let timeline = self
            .project
            .clone()
            .and_then(|id| self.timelines.get_mut(&id))
            .ok_or_else(|| {
                let mut errors = ValidationErrors::new();
                errors.add("project", "Select a project");
                errors
            })?;
        tracing::debug!(comment = %comment.id, author = %comment.author, "timeline comment added");
        timeline.comments.insert(0, comment);
        timeline.comments.first().ok_or_else(ValidationErrors::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Project;

    fn milestone(id: &str, status: MilestoneStatus) -> Milestone {
        Milestone {
            id: id.to_string(),
            date: "12 Sep".to_string(),
            title: id.to_string(),
            status,
            owner: "PMO".to_string(),
            detail: String::new(),
        }
    }

    fn board() -> TimelineBoard {
        let timeline = Timeline {
            project_name: "Atlas Sedan Platform".to_string(),
            code: "AT-001".to_string(),
            manager: "Eng. Mariam Khan".to_string(),
            stage: "Build & Validation".to_string(),
            progress: 54,
            health: Health::Watch,
            summary: String::new(),
            focus_areas: vec!["Reliability".to_string()],
            milestones: vec![
                milestone("bench", MilestoneStatus::Complete),
                milestone("supply", MilestoneStatus::AtRisk),
                milestone("trials", MilestoneStatus::Upcoming),
                milestone("freeze", MilestoneStatus::Complete),
            ],
            comments: vec![Comment {
                id: "c5".to_string(),
                author: "Supply Chain".to_string(),
                role: "SCM".to_string(),
                text: "Alternate supplier ready.".to_string(),
                time: "6h ago".to_string(),
            }],
        };
        let mut timelines = BTreeMap::new();
        timelines.insert("proj-001".to_string(), timeline);
        TimelineBoard::new(timelines)
    }

    fn mounted() -> TimelineBoard {
        let state = AppState::with_projects(vec![Project::new("proj-001", "Atlas")]);
        let mut board = board();
        board.mount(Some("proj-001"), &state);
        board
    }

    fn draft(author: &str, text: &str) -> CommentDraft {
        CommentDraft {
            author: author.to_string(),
            role: None,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_mount_prefers_query_project() {
        let state = AppState::with_projects(vec![
            Project::new("proj-002", "Skyline"),
            Project::new("proj-001", "Atlas"),
        ]);
        let mut board = board();
        let actions = board.mount(Some("proj-001"), &state);
        assert_eq!(actions, vec![Action::set_active_project("proj-001")]);
        assert_eq!(board.timeline().map(|t| t.code.as_str()), Some("AT-001"));

        // No board for the first store project
        let actions = board.mount(None, &state);
        assert_eq!(actions, vec![Action::set_active_project("proj-002")]);
        assert!(board.timeline().is_none());
    }

    #[test]
    fn test_new_comment_is_prepended() {
        let mut board = mounted();
        board.add_comment(draft("QA Lead", "EMI chamber booked.")).unwrap();
        board.add_comment(draft("Flight Ops", "Pilot brief updated.")).unwrap();

        let authors: Vec<&str> = board
            .timeline()
            .unwrap()
            .comments
            .iter()
            .map(|c| c.author.as_str())
            .collect();
        assert_eq!(authors, vec!["Flight Ops", "QA Lead", "Supply Chain"]);
        assert_eq!(board.timeline().unwrap().comments[0].role, "Contributor");
        assert!(board.timeline().unwrap().comments[0].id.starts_with("cmt-"));
    }

    #[test]
    fn test_blank_author_or_text_rejected() {
        let mut board = mounted();
        let errors = board.add_comment(draft("   ", "")).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get("author"), Some("Name is required"));
        assert_eq!(errors.get("text"), Some("Comment is required"));
        assert_eq!(board.timeline().unwrap().comments.len(), 1);
    }

    #[test]
    fn test_role_must_be_known() {
        let mut board = mounted();
        let mut quality = draft("QA Lead", "Sensors calibrated.");
        quality.role = Some("quality".to_string());
        assert_eq!(board.add_comment(quality).unwrap().role, "Quality");

        let mut unknown = draft("QA Lead", "Sensors calibrated.");
        unknown.role = Some("Marketing".to_string());
        let errors = board.add_comment(unknown).unwrap_err();
        assert!(errors.get("role").is_some());
    }

    #[test]
    fn test_comment_without_project_rejected() {
        let mut board = board();
        let errors = board.add_comment(draft("QA Lead", "Note")).unwrap_err();
        assert_eq!(errors.get("project"), Some("Select a project"));
    }

    #[test]
    fn test_milestone_counts() {
        let board = mounted();
        let counts = board.timeline().unwrap().milestone_counts();
        assert_eq!(
            counts,
            vec![
                (MilestoneStatus::Complete, 2),
                (MilestoneStatus::AtRisk, 1),
                (MilestoneStatus::Upcoming, 1),
            ]
        );
    }
}
