//! Qualification workflow for catalog parts
//!
//! Parts normally move `Draft -> Under Review -> Qualified`, but no stage is
//! enforced: any change between distinct statuses is accepted, including
//! stepping back or creating a part directly as Qualified.

use thiserror::Error;

use crate::core::entity::PartStatus;
use crate::entities::Part;

/// Errors that can occur during workflow operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("Part {0} is already {1}")]
    Unchanged(String, PartStatus),
}

/// Status rules for part qualification
#[derive(Debug, Clone, Copy, Default)]
pub struct QualificationWorkflow;

impl QualificationWorkflow {
    pub fn new() -> Self {
        Self
    }

    /// Move a part to `to`; only a no-op change is rejected
    pub fn transition(&self, part: &mut Part, to: PartStatus) -> Result<PartStatus, WorkflowError> {
        let from = part.status;
        if from == to {
            return Err(WorkflowError::Unchanged(part.id.clone(), to));
        }
        tracing::debug!(part = %part.id, %from, %to, "part status transition");
        part.status = to;
        Ok(from)
    }

    /// Status the part's test record supports
    ///
    /// No tests means Draft. Tests that are all documented and free of NCRs
    /// mean Qualified. Anything in between is Under Review.
    pub fn derive_status(&self, part: &Part) -> PartStatus {
        if part.tests.is_empty() {
            PartStatus::Draft
        } else if part.tests.iter().all(|t| t.has_document() && !t.ncr) {
            PartStatus::Qualified
        } else {
            PartStatus::UnderReview
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::QcTest;

    #[test]
    fn test_transition_updates_part() {
        let wf = QualificationWorkflow::new();
        let mut part = Part::new("P-1", "Servo");
        assert_eq!(wf.transition(&mut part, PartStatus::UnderReview), Ok(PartStatus::Draft));
        assert_eq!(part.status, PartStatus::UnderReview);

        let err = wf.transition(&mut part, PartStatus::UnderReview).unwrap_err();
        assert!(matches!(err, WorkflowError::Unchanged(_, _)));
    }

    #[test]
    fn test_draft_straight_to_qualified() {
        let wf = QualificationWorkflow::new();
        let mut part = Part::new("P-1", "Servo");
        assert_eq!(wf.transition(&mut part, PartStatus::Qualified), Ok(PartStatus::Draft));
        assert_eq!(part.status, PartStatus::Qualified);
    }

    #[test]
    fn test_reverse_transitions_are_legal() {
        let wf = QualificationWorkflow::new();
        let mut part = Part::new("P-1", "Servo");
        part.status = PartStatus::Qualified;
        assert_eq!(wf.transition(&mut part, PartStatus::Draft), Ok(PartStatus::Qualified));
        assert_eq!(wf.transition(&mut part, PartStatus::UnderReview), Ok(PartStatus::Draft));
    }

    #[test]
    fn test_derive_status() {
        let wf = QualificationWorkflow::new();
        let mut part = Part::new("P-1", "Servo");
        assert_eq!(wf.derive_status(&part), PartStatus::Draft);

        part.tests.push(QcTest::new("qt-1", "Load Sweep"));
        assert_eq!(wf.derive_status(&part), PartStatus::UnderReview);

        part.tests[0].document = Some("Servo_Load_Test.xlsx".to_string());
        assert_eq!(wf.derive_status(&part), PartStatus::Qualified);
    }
}
