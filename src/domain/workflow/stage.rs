//! Stages of the decision pipeline

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::decision::DecisionField;
use crate::domain::reasoning::AgentRole;

/// One drafting step of the pipeline, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    CaptureQuery,
    IdentifyTrigger,
    AnalyzeRootCause,
    ScopeDefinition,
    Drafting,
    EstablishGoals,
    IdentifyInformationNeeded,
    UpdateDraft,
    GenerationOfAlternatives,
    Result,
}

impl Stage {
    pub const ALL: [Stage; 10] = [
        Self::CaptureQuery,
        Self::IdentifyTrigger,
        Self::AnalyzeRootCause,
        Self::ScopeDefinition,
        Self::Drafting,
        Self::EstablishGoals,
        Self::IdentifyInformationNeeded,
        Self::UpdateDraft,
        Self::GenerationOfAlternatives,
        Self::Result,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::CaptureQuery => "capture_query",
            Self::IdentifyTrigger => "identify_trigger",
            Self::AnalyzeRootCause => "analyze_root_cause",
            Self::ScopeDefinition => "scope_definition",
            Self::Drafting => "drafting",
            Self::EstablishGoals => "establish_goals",
            Self::IdentifyInformationNeeded => "identify_information_needed",
            Self::UpdateDraft => "update_draft",
            Self::GenerationOfAlternatives => "generation_of_alternatives",
            Self::Result => "result",
        }
    }

    /// Name of the paired evaluator node, if the stage has one
    pub fn evaluator_name(&self) -> Option<String> {
        self.agent().map(|_| format!("evaluate_{}", self.name()))
    }

    /// Drafting agent for this stage; capturing the query calls no agent
    pub fn agent(&self) -> Option<AgentRole> {
        match self {
            Self::CaptureQuery => None,
            Self::IdentifyTrigger => Some(AgentRole::IdentifyTrigger),
            Self::AnalyzeRootCause => Some(AgentRole::RootCauseAnalyzer),
            Self::ScopeDefinition => Some(AgentRole::ScopeDefinition),
            Self::Drafting => Some(AgentRole::Drafting),
            Self::EstablishGoals => Some(AgentRole::EstablishGoals),
            Self::IdentifyInformationNeeded => Some(AgentRole::IdentifyInformationNeeded),
            Self::UpdateDraft => Some(AgentRole::DraftUpdate),
            Self::GenerationOfAlternatives => Some(AgentRole::GenerationOfAlternatives),
            Self::Result => Some(AgentRole::Result),
        }
    }

    /// Field committed when the evaluator approves a text answer
    pub fn field(&self) -> Option<DecisionField> {
        match self {
            Self::IdentifyTrigger => Some(DecisionField::Trigger),
            Self::AnalyzeRootCause => Some(DecisionField::RootCause),
            Self::ScopeDefinition => Some(DecisionField::ScopeDefinition),
            Self::Drafting => Some(DecisionField::DecisionDrafted),
            Self::EstablishGoals => Some(DecisionField::Goals),
            Self::UpdateDraft => Some(DecisionField::DecisionDraftUpdated),
            Self::GenerationOfAlternatives => Some(DecisionField::Alternatives),
            Self::CaptureQuery | Self::IdentifyInformationNeeded | Self::Result => None,
        }
    }

    pub fn next(&self) -> Option<Stage> {
        match self {
            Self::CaptureQuery => Some(Self::IdentifyTrigger),
            Self::IdentifyTrigger => Some(Self::AnalyzeRootCause),
            Self::AnalyzeRootCause => Some(Self::ScopeDefinition),
            Self::ScopeDefinition => Some(Self::Drafting),
            Self::Drafting => Some(Self::EstablishGoals),
            Self::EstablishGoals => Some(Self::IdentifyInformationNeeded),
            Self::IdentifyInformationNeeded => Some(Self::UpdateDraft),
            Self::UpdateDraft => Some(Self::GenerationOfAlternatives),
            Self::GenerationOfAlternatives => Some(Self::Result),
            Self::Result => None,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Node visited by the engine, recorded in the run history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "stage", rename_all = "snake_case")]
pub enum Node {
    Stage(Stage),
    Evaluator(Stage),
    RetrieveInformation,
    End,
}

impl Node {
    pub fn name(&self) -> String {
        match self {
            Self::Stage(stage) => stage.name().to_string(),
            Self::Evaluator(stage) => format!("evaluate_{}", stage.name()),
            Self::RetrieveInformation => "retrieve_information_needed".to_string(),
            Self::End => "end".to_string(),
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
