//! Decision state accumulator

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Write-once text fields of a [`DecisionState`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionField {
    Trigger,
    RootCause,
    ScopeDefinition,
    DecisionDrafted,
    Goals,
    DecisionDraftUpdated,
    Alternatives,
    Result,
    ResultComment,
    BestAlternativeResult,
    BestAlternativeResultComment,
}

impl DecisionField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trigger => "trigger",
            Self::RootCause => "root_cause",
            Self::ScopeDefinition => "scope_definition",
            Self::DecisionDrafted => "decision_drafted",
            Self::Goals => "goals",
            Self::DecisionDraftUpdated => "decision_draft_updated",
            Self::Alternatives => "alternatives",
            Self::Result => "result",
            Self::ResultComment => "result_comment",
            Self::BestAlternativeResult => "best_alternative_result",
            Self::BestAlternativeResultComment => "best_alternative_result_comment",
        }
    }
}

impl fmt::Display for DecisionField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

const RESULT_FIELDS: [DecisionField; 4] = [
    DecisionField::Result,
    DecisionField::ResultComment,
    DecisionField::BestAlternativeResult,
    DecisionField::BestAlternativeResultComment,
];

/// Structured four-field answer of the final stage
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultOutput {
    pub result: String,
    pub result_comment: String,
    pub best_alternative_result: String,
    pub best_alternative_result_comment: String,
}

impl ResultOutput {
    pub fn new(
        result: impl Into<String>,
        result_comment: impl Into<String>,
        best_alternative_result: impl Into<String>,
        best_alternative_result_comment: impl Into<String>,
    ) -> Self {
        Self {
            result: result.into(),
            result_comment: result_comment.into(),
            best_alternative_result: best_alternative_result.into(),
            best_alternative_result_comment: best_alternative_result_comment.into(),
        }
    }
}

/// Accumulator holding every intermediate and final output of one run.
///
/// Text fields are write-once: [`DecisionState::commit`] refuses to overwrite a
/// field that already holds a value. The complementary information buffer and
/// its counter only grow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecisionState {
    decision_requested: String,
    trigger: String,
    root_cause: String,
    scope_definition: String,
    decision_drafted: String,
    goals: String,
    complementary_info: String,
    complementary_info_num: u32,
    decision_draft_updated: String,
    alternatives: String,
    result: String,
    result_comment: String,
    best_alternative_result: String,
    best_alternative_result_comment: String,
}

impl DecisionState {
    /// Start a run for the given request
    pub fn new(decision_requested: impl Into<String>) -> Self {
        Self {
            decision_requested: decision_requested.into(),
            ..Default::default()
        }
    }

    pub fn decision_requested(&self) -> &str {
        &self.decision_requested
    }

    pub fn trigger(&self) -> &str {
        &self.trigger
    }

    pub fn root_cause(&self) -> &str {
        &self.root_cause
    }

    pub fn scope_definition(&self) -> &str {
        &self.scope_definition
    }

    pub fn decision_drafted(&self) -> &str {
        &self.decision_drafted
    }

    pub fn goals(&self) -> &str {
        &self.goals
    }

    pub fn complementary_info(&self) -> &str {
        &self.complementary_info
    }

    pub fn complementary_info_num(&self) -> u32 {
        self.complementary_info_num
    }

    pub fn decision_draft_updated(&self) -> &str {
        &self.decision_draft_updated
    }

    pub fn alternatives(&self) -> &str {
        &self.alternatives
    }

    pub fn result(&self) -> &str {
        &self.result
    }

    pub fn result_comment(&self) -> &str {
        &self.result_comment
    }

    pub fn best_alternative_result(&self) -> &str {
        &self.best_alternative_result
    }

    pub fn best_alternative_result_comment(&self) -> &str {
        &self.best_alternative_result_comment
    }

    pub fn get(&self, field: DecisionField) -> &str {
        match field {
            DecisionField::Trigger => &self.trigger,
            DecisionField::RootCause => &self.root_cause,
            DecisionField::ScopeDefinition => &self.scope_definition,
            DecisionField::DecisionDrafted => &self.decision_drafted,
            DecisionField::Goals => &self.goals,
            DecisionField::DecisionDraftUpdated => &self.decision_draft_updated,
            DecisionField::Alternatives => &self.alternatives,
            DecisionField::Result => &self.result,
            DecisionField::ResultComment => &self.result_comment,
            DecisionField::BestAlternativeResult => &self.best_alternative_result,
            DecisionField::BestAlternativeResultComment => &self.best_alternative_result_comment,
        }
    }

    fn slot(&mut self, field: DecisionField) -> &mut String {
        match field {
            DecisionField::Trigger => &mut self.trigger,
            DecisionField::RootCause => &mut self.root_cause,
            DecisionField::ScopeDefinition => &mut self.scope_definition,
            DecisionField::DecisionDrafted => &mut self.decision_drafted,
            DecisionField::Goals => &mut self.goals,
            DecisionField::DecisionDraftUpdated => &mut self.decision_draft_updated,
            DecisionField::Alternatives => &mut self.alternatives,
            DecisionField::Result => &mut self.result,
            DecisionField::ResultComment => &mut self.result_comment,
            DecisionField::BestAlternativeResult => &mut self.best_alternative_result,
            DecisionField::BestAlternativeResultComment => {
                &mut self.best_alternative_result_comment
            }
        }
    }

    pub fn is_set(&self, field: DecisionField) -> bool {
        !self.get(field).is_empty()
    }

    /// Write an approved answer into a field that has not been written yet
    pub fn commit(
        &mut self,
        field: DecisionField,
        value: impl Into<String>,
    ) -> Result<(), DomainError> {
        if self.is_set(field) {
            return Err(DomainError::conflict(format!(
                "Decision field '{}' is already set",
                field
            )));
        }
        *self.slot(field) = value.into();
        Ok(())
    }

    /// Commit all four result fields, or none of them
    pub fn commit_result(&mut self, output: ResultOutput) -> Result<(), DomainError> {
        for field in RESULT_FIELDS {
            if self.is_set(field) {
                return Err(DomainError::conflict(format!(
                    "Decision field '{}' is already set",
                    field
                )));
            }
        }

        self.result = output.result;
        self.result_comment = output.result_comment;
        self.best_alternative_result = output.best_alternative_result;
        self.best_alternative_result_comment = output.best_alternative_result_comment;
        Ok(())
    }

    /// Append retrieved information and bump the augmentation counter
    pub fn append_complementary_info(&mut self, info: &str) {
        self.complementary_info.push('\n');
        self.complementary_info.push_str(info);
        self.complementary_info_num += 1;
    }

    /// The committed result as a four-field output, if the run reached it
    pub fn result_output(&self) -> Option<ResultOutput> {
        if self.result.is_empty() {
            return None;
        }
        Some(ResultOutput {
            result: self.result.clone(),
            result_comment: self.result_comment.clone(),
            best_alternative_result: self.best_alternative_result.clone(),
            best_alternative_result_comment: self.best_alternative_result_comment.clone(),
        })
    }
}
