//! Prompt and evaluator-context builders for each stage

use super::{Answer, Directive, Stage};
use crate::domain::decision::{DecisionState, ResultOutput};
use crate::domain::reasoning::EvaluationContext;

fn request_line(value: &str) -> String {
    format!("Here the decision requested by user: {}", value)
}

fn feedback_lines(comment: &str) -> String {
    format!(
        "You gave an answer but that was not correct.\n\
         Here the evaluation comments from your previous wrong answer: {}\n\
         Please fix it and give the correct answer.",
        comment
    )
}

fn rejected_result_lines(output: &ResultOutput) -> String {
    format!(
        "Here the selected result for the decision: {}\n\
         Here the comment on selected result for the decision: {}\n\
         Here the selected best alternative for the decision: {}\n\
         Here the comment on selected best alternative for the decision: {}",
        output.result,
        output.result_comment,
        output.best_alternative_result,
        output.best_alternative_result_comment
    )
}

/// Prompt sent to the drafting agent of `stage`
pub fn stage_prompt(stage: Stage, state: &DecisionState, directive: &Directive) -> String {
    let mut lines = Vec::new();

    match stage {
        Stage::CaptureQuery | Stage::IdentifyTrigger => {
            lines.push(request_line(state.decision_requested()));
        }
        Stage::AnalyzeRootCause | Stage::ScopeDefinition | Stage::Drafting => {
            lines.push(request_line(state.decision_requested()));
            lines.push(format!("Here the identified trigger: {}", state.trigger()));
            if stage != Stage::AnalyzeRootCause {
                lines.push(format!("Here the root cause analysis: {}", state.root_cause()));
            }
            if stage == Stage::Drafting {
                lines.push(format!(
                    "Here the scope definition: {}",
                    state.scope_definition()
                ));
            }
        }
        Stage::EstablishGoals => {
            lines.push(request_line(state.decision_drafted()));
        }
        Stage::IdentifyInformationNeeded => {
            lines.push(request_line(state.decision_drafted()));
            lines.push(format!(
                "Here the established goals for the decision: {}",
                state.goals()
            ));
            if *directive == Directive::Augmented {
                lines.push(format!(
                    "Here the complementary info about the decision: {}",
                    state.complementary_info()
                ));
            }
        }
        Stage::UpdateDraft => {
            lines.push(request_line(state.decision_drafted()));
            if state.complementary_info_num() > 0 {
                lines.push(format!(
                    "Here the complementary info for the decision: {}",
                    state.complementary_info()
                ));
            }
        }
        Stage::GenerationOfAlternatives => {
            lines.push(request_line(state.decision_draft_updated()));
        }
        Stage::Result => {
            lines.push(request_line(state.decision_draft_updated()));
            lines.push(format!(
                "Here the current alternatives for this decision: {}",
                state.alternatives()
            ));
        }
    }

    if let Directive::Feedback { comment, rejected } = directive {
        match (stage, rejected) {
            (Stage::Result, Answer::Decision(output)) => {
                lines.push(rejected_result_lines(output));
            }
            (Stage::GenerationOfAlternatives, Answer::Text(text)) => {
                lines.push(format!(
                    "Here the current alternatives for this decision: {}",
                    text
                ));
            }
            _ => {}
        }
        lines.push(feedback_lines(comment));
    }

    lines.join("\n")
}

/// Context handed to the evaluator of `stage`, with the candidate answer in it
pub fn evaluation_context(stage: Stage, state: &DecisionState, answer: &Answer) -> EvaluationContext {
    let text = match answer {
        Answer::Text(text) => text.as_str(),
        Answer::Decision(_) => "",
    };

    let analysis = || {
        EvaluationContext::new()
            .with("decision requested", state.decision_requested())
            .with("identified trigger for the decision", state.trigger())
    };

    match stage {
        Stage::CaptureQuery => {
            EvaluationContext::new().with("decision requested", state.decision_requested())
        }
        Stage::IdentifyTrigger => EvaluationContext::new()
            .with("decision requested", state.decision_requested())
            .with("identified trigger for the decision", text),
        Stage::AnalyzeRootCause => analysis().with("root cause analysis", text),
        Stage::ScopeDefinition => analysis()
            .with("root cause analysis", state.root_cause())
            .with("scope definition", text),
        Stage::Drafting => analysis()
            .with("root cause analysis", state.root_cause())
            .with("scope definition", state.scope_definition())
            .with("decision drafted", text),
        Stage::EstablishGoals => EvaluationContext::new()
            .with("decision requested", state.decision_drafted())
            .with("established goals", text),
        Stage::IdentifyInformationNeeded => EvaluationContext::new()
            .with("decision requested", state.decision_drafted())
            .with("established goals", state.goals())
            .with("information needed", text),
        Stage::UpdateDraft => {
            let context =
                EvaluationContext::new().with("decision requested", state.decision_drafted());
            let context = if state.complementary_info_num() > 0 {
                context.with("complementary info", state.complementary_info())
            } else {
                context
            };
            context.with("updated decision draft", text)
        }
        Stage::GenerationOfAlternatives => EvaluationContext::new()
            .with("decision requested", state.decision_draft_updated())
            .with("alternatives", text),
        Stage::Result => {
            let context = EvaluationContext::new()
                .with("decision requested", state.decision_draft_updated())
                .with("alternatives", state.alternatives());
            match answer {
                Answer::Decision(output) => context
                    .with("selected decision", &output.result)
                    .with("selected decision comment", &output.result_comment)
                    .with("best alternative", &output.best_alternative_result)
                    .with(
                        "best alternative comment",
                        &output.best_alternative_result_comment,
                    ),
                Answer::Text(text) => context.with("selected decision", text),
            }
        }
    }
}

/// Prompt for the information-retrieval agent, built from the rejected stage 7 answer
pub fn retrieval_prompt(state: &DecisionState, information_needed: &str) -> String {
    EvaluationContext::new()
        .with("decision requested", state.decision_drafted())
        .with("info needed", information_needed)
        .to_xml()
}
