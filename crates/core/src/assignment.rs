// Speaker-to-session assignments
//
// There is no backend collection for these; a list of pairs is checked as a
// whole before being handed on.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::validation::{is_blank, FieldErrors};

/// A (session, speaker) pair
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    #[serde(default)]
    pub session_id: String,
    #[serde(default)]
    pub speaker_id: String,
}

impl Assignment {
    pub fn new(session_id: impl Into<String>, speaker_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            speaker_id: speaker_id.into(),
        }
    }

    fn is_complete(&self) -> bool {
        !is_blank(&self.session_id) && !is_blank(&self.speaker_id)
    }
}

/// Validate a list of assignments, keyed by position
///
/// Missing selections are reported per field. A pair that appears more than
/// once is flagged on every occurrence under `global`; duplicates are
/// reported, not removed.
pub fn validate_assignments(assignments: &[Assignment]) -> BTreeMap<usize, FieldErrors> {
    let mut result = BTreeMap::new();

    for (index, assignment) in assignments.iter().enumerate() {
        let mut errors = FieldErrors::new();

        if is_blank(&assignment.session_id) {
            errors.insert("session_id", "Seleccione una sesión");
        }
        if is_blank(&assignment.speaker_id) {
            errors.insert("speaker_id", "Seleccione un speaker");
        }

        let occurrences = assignments.iter().filter(|a| *a == assignment).count();
        if occurrences > 1 && assignment.is_complete() {
            errors.insert("global", "Esta combinación ya está asignada");
        }

        if !errors.is_empty() {
            result.insert(index, errors);
        }
    }

    result
}
