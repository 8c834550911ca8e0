use std::fmt;

use serde::{Deserialize, Serialize};

/// Agent invoked by the workflow; each drafting role has a paired evaluator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentRole {
    IdentifyTrigger,
    RootCauseAnalyzer,
    ScopeDefinition,
    Drafting,
    EstablishGoals,
    IdentifyInformationNeeded,
    RetrieveInformationNeeded,
    DraftUpdate,
    GenerationOfAlternatives,
    Result,
}

impl AgentRole {
    pub fn name(&self) -> &'static str {
        match self {
            Self::IdentifyTrigger => "identify_trigger_agent",
            Self::RootCauseAnalyzer => "root_cause_analyzer_agent",
            Self::ScopeDefinition => "scope_definition_agent",
            Self::Drafting => "drafting_agent",
            Self::EstablishGoals => "establish_goals_agent",
            Self::IdentifyInformationNeeded => "identify_information_needed_agent",
            Self::RetrieveInformationNeeded => "retrieve_information_needed_agent",
            Self::DraftUpdate => "draft_update_agent",
            Self::GenerationOfAlternatives => "generation_of_alternatives_agent",
            Self::Result => "result_agent",
        }
    }

    pub fn evaluator_name(&self) -> String {
        format!("{}_evaluator", self.name())
    }

    /// Standing instruction sent as the system message for this role
    pub fn instructions(&self) -> &'static str {
        match self {
            Self::IdentifyTrigger => {
                "Identify the event or situation that triggered the need for this decision. \
                 Be specific and concise."
            }
            Self::RootCauseAnalyzer => {
                "Analyze the underlying root cause behind the identified trigger. \
                 Separate symptoms from causes."
            }
            Self::ScopeDefinition => {
                "Define the boundaries of the decision: what is in scope, what is out of scope, \
                 and the constraints that apply."
            }
            Self::Drafting => {
                "Draft a clear statement of the decision to be made, grounded in the trigger, \
                 root cause and scope."
            }
            Self::EstablishGoals => {
                "Establish measurable goals the decision must achieve."
            }
            Self::IdentifyInformationNeeded => {
                "List the information still missing to make this decision well."
            }
            Self::RetrieveInformationNeeded => {
                "Provide the requested information about the decision as factual, concise notes."
            }
            Self::DraftUpdate => {
                "Update the drafted decision using the complementary information provided."
            }
            Self::GenerationOfAlternatives => {
                "Generate distinct, realistic alternatives for the decision with their trade-offs."
            }
            Self::Result => {
                "Select the best option and the best alternative for the decision. \
                 Answer with result, result_comment, best_alternative_result and \
                 best_alternative_result_comment."
            }
        }
    }

    /// Standing instruction for the evaluator paired with this role
    pub fn evaluator_instructions(&self) -> String {
        format!(
            "You review the output of the {} step of a decision-making workflow. \
             Answer with `correct` set to true only if the output is relevant, specific and \
             consistent with the context, and always explain your verdict in `comment`.",
            self.name().trim_end_matches("_agent").replace('_', " ")
        )
    }
}

impl fmt::Display for AgentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
