use serde::{Deserialize, Serialize};

/// A subject–predicate–object statement, as exchanged with the relation
/// extraction and outcome collaborators.
///
/// Missing parts default to the empty string, which is how an interaction
/// without a caller-supplied target is sent upstream.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RelationTriple {
    pub subject: String,
    pub predicate: String,
    pub object: String,
}

impl RelationTriple {
    pub fn new(
        subject: impl Into<String>,
        predicate: impl Into<String>,
        object: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.subject.is_empty() && self.predicate.is_empty() && self.object.is_empty()
    }
}
