//! Decision engine: drives a DecisionState through the stage/evaluator pipeline

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tracing::{debug, info, instrument, warn};

use crate::domain::decision::{DecisionState, Evaluation};
use crate::domain::reasoning::{AgentRole, EvaluationContext, ReasoningService};
use crate::domain::workflow::prompt;
use crate::domain::workflow::{
    Answer, DecisionExecutor, Directive, Node, RunOutcome, Stage, Transition, TransitionLog,
    TransitionPolicy, WorkflowError,
};
use crate::domain::DomainError;
use crate::infrastructure::observability::{
    record_information_augmentation, record_reasoning_call, record_verdict,
};

/// Engine executing one run at a time per call; runs share nothing but the reasoning service
#[derive(Debug)]
pub struct DecisionEngine {
    reasoning: Arc<dyn ReasoningService>,
    policy: TransitionPolicy,
    transition_log: Option<Arc<dyn TransitionLog>>,
}

impl DecisionEngine {
    pub fn new(reasoning: Arc<dyn ReasoningService>) -> Self {
        Self {
            reasoning,
            policy: TransitionPolicy::default(),
            transition_log: None,
        }
    }

    pub fn with_policy(mut self, policy: TransitionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_transition_log(mut self, log: Arc<dyn TransitionLog>) -> Self {
        self.transition_log = Some(log);
        self
    }

    pub fn policy(&self) -> TransitionPolicy {
        self.policy
    }

    /// Run the pipeline until the result evaluator approves
    #[instrument(skip_all, fields(run_id = %run_id))]
    pub async fn run(&self, run_id: &str, query: &str) -> Result<RunOutcome, WorkflowError> {
        let start = Instant::now();
        let mut state = DecisionState::new(query);
        let mut history = Vec::new();
        let mut stage = Stage::CaptureQuery;
        let mut directive = Directive::Fresh;

        loop {
            self.visit(run_id, &mut history, Node::Stage(stage)).await;

            let Some(role) = stage.agent() else {
                if state.decision_requested().trim().is_empty() {
                    return Err(WorkflowError::invalid_input("Decision query cannot be empty"));
                }
                stage = Stage::IdentifyTrigger;
                continue;
            };

            let stage_prompt = prompt::stage_prompt(stage, &state, &directive);
            let answer = self.draft(stage, role, &stage_prompt).await?;

            let evaluator = Node::Evaluator(stage);
            self.visit(run_id, &mut history, evaluator).await;
            let context = prompt::evaluation_context(stage, &state, &answer);
            let verdict = self.evaluate(evaluator, role, &context).await?;
            record_verdict(stage, verdict.correct);

            match self
                .policy
                .next(stage, verdict.correct, state.complementary_info_num())
            {
                Transition::Advance(next) => {
                    if !verdict.correct {
                        info!(
                            stage = stage.name(),
                            augmentations = state.complementary_info_num(),
                            "Augmentation limit reached, advancing without approval"
                        );
                    }
                    if let (Some(field), Answer::Text(text)) = (stage.field(), answer) {
                        state.commit(field, text)?;
                    }
                    debug!(from = stage.name(), to = next.name(), "Stage approved");
                    stage = next;
                    directive = Directive::Fresh;
                }
                Transition::Retry => {
                    debug!(
                        stage = stage.name(),
                        comment = %verdict.comment,
                        "Stage rejected, retrying with feedback"
                    );
                    directive = Directive::Feedback {
                        comment: verdict.comment,
                        rejected: answer,
                    };
                }
                Transition::Augment => {
                    self.visit(run_id, &mut history, Node::RetrieveInformation)
                        .await;
                    let needed = match &answer {
                        Answer::Text(text) => text.as_str(),
                        Answer::Decision(_) => "",
                    };
                    let retrieval_prompt = prompt::retrieval_prompt(&state, needed);
                    let info = self
                        .generate(
                            Node::RetrieveInformation,
                            AgentRole::RetrieveInformationNeeded,
                            &retrieval_prompt,
                        )
                        .await?;
                    state.append_complementary_info(&info);
                    record_information_augmentation();
                    debug!(
                        augmentations = state.complementary_info_num(),
                        "Complementary information retrieved"
                    );
                    directive = Directive::Augmented;
                }
                Transition::Finish => {
                    let Answer::Decision(output) = answer else {
                        return Err(WorkflowError::step_execution(
                            evaluator.name(),
                            "Result stage produced no structured answer",
                        ));
                    };
                    state.commit_result(output)?;
                    self.visit(run_id, &mut history, Node::End).await;

                    let execution_time_ms = start.elapsed().as_millis() as u64;
                    info!(
                        nodes = history.len(),
                        augmentations = state.complementary_info_num(),
                        execution_time_ms,
                        "Decision workflow finished"
                    );

                    return Ok(RunOutcome {
                        state,
                        history,
                        execution_time_ms,
                    });
                }
            }
        }
    }

    async fn visit(&self, run_id: &str, history: &mut Vec<Node>, node: Node) {
        history.push(node);
        debug!(node = %node, "Entering node");

        if let Some(log) = &self.transition_log {
            if let Err(e) = log.append(run_id, &node.name()).await {
                warn!(node = %node, error = %e, "Failed to append transition history");
            }
        }
    }

    async fn draft(
        &self,
        stage: Stage,
        role: AgentRole,
        stage_prompt: &str,
    ) -> Result<Answer, WorkflowError> {
        let node = Node::Stage(stage);

        if stage == Stage::Result {
            let started = Instant::now();
            let result = self.reasoning.decide(stage_prompt).await;
            record_reasoning_call(role, "decide", result.is_ok(), started.elapsed());
            return result
                .map(Answer::Decision)
                .map_err(|e| WorkflowError::at_node(node.name(), e));
        }

        self.generate(node, role, stage_prompt).await.map(Answer::Text)
    }

    async fn generate(
        &self,
        node: Node,
        role: AgentRole,
        text: &str,
    ) -> Result<String, WorkflowError> {
        let started = Instant::now();
        let result = self.reasoning.generate(role, text).await;
        record_reasoning_call(role, "generate", result.is_ok(), started.elapsed());
        result.map_err(|e| WorkflowError::at_node(node.name(), e))
    }

    async fn evaluate(
        &self,
        node: Node,
        role: AgentRole,
        context: &EvaluationContext,
    ) -> Result<Evaluation, WorkflowError> {
        let started = Instant::now();
        let result = self
            .reasoning
            .evaluate(role, context)
            .await
            .and_then(|verdict| verdict.validate().map(|_| verdict));
        record_reasoning_call(role, "evaluate", result.is_ok(), started.elapsed());
        result.map_err(|e: DomainError| WorkflowError::at_node(node.name(), e))
    }
}

#[async_trait]
impl DecisionExecutor for DecisionEngine {
    async fn execute(&self, run_id: &str, query: &str) -> Result<RunOutcome, WorkflowError> {
        self.run(run_id, query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::reasoning::ScriptedReasoningService;
    use crate::infrastructure::workflow::InMemoryTransitionLog;

    const QUERY: &str = "Should I migrate to microservices?";

    fn engine(reasoning: &Arc<ScriptedReasoningService>) -> DecisionEngine {
        DecisionEngine::new(reasoning.clone())
    }

    #[tokio::test]
    async fn test_approving_evaluators_run_each_stage_once() {
        let reasoning = Arc::new(ScriptedReasoningService::new());
        let outcome = engine(&reasoning).run("run-1", QUERY).await.unwrap();

        for stage in &Stage::ALL[1..] {
            let role = stage.agent().unwrap();
            assert_eq!(reasoning.generation_count(role), 1, "{}", stage);
            assert_eq!(reasoning.evaluation_count(role), 1, "{}", stage);
        }
        assert_eq!(
            reasoning.generation_count(AgentRole::RetrieveInformationNeeded),
            0
        );

        let state = &outcome.state;
        assert_eq!(state.decision_requested(), QUERY);
        assert_eq!(state.trigger(), "identify_trigger_agent answer 1");
        assert_eq!(state.alternatives(), "generation_of_alternatives_agent answer 1");
        assert_eq!(state.result(), "selected option 1");
        assert_eq!(state.best_alternative_result(), "fallback option 1");
        assert_eq!(state.complementary_info_num(), 0);

        let names = outcome.node_names();
        assert_eq!(names.first().map(String::as_str), Some("capture_query"));
        assert_eq!(names[1], "identify_trigger");
        assert_eq!(names[2], "evaluate_identify_trigger");
        assert_eq!(names[names.len() - 2], "evaluate_result");
        assert_eq!(names.last().map(String::as_str), Some("end"));
        assert_eq!(names.len(), 1 + 9 * 2 + 1);
    }

    #[tokio::test]
    async fn test_rejected_stage_reruns_with_feedback() {
        let reasoning = Arc::new(
            ScriptedReasoningService::new().reject_times(AgentRole::RootCauseAnalyzer, 2),
        );
        let outcome = engine(&reasoning).run("run-2", QUERY).await.unwrap();

        assert_eq!(reasoning.generation_count(AgentRole::RootCauseAnalyzer), 3);
        assert_eq!(reasoning.generation_count(AgentRole::ScopeDefinition), 1);
        assert_eq!(outcome.state.root_cause(), "root_cause_analyzer_agent answer 3");
        assert_eq!(outcome.visits(Node::Stage(Stage::AnalyzeRootCause)), 3);

        let prompts = reasoning.prompts_for(AgentRole::RootCauseAnalyzer);
        assert!(!prompts[0].contains("You gave an answer but that was not correct"));
        assert!(prompts[1].contains("root_cause_analyzer_agent output is too vague"));
        assert!(prompts[2].contains("Please fix it and give the correct answer."));
    }

    #[tokio::test]
    async fn test_information_loop_is_bounded() {
        let reasoning = Arc::new(
            ScriptedReasoningService::new().always_reject(AgentRole::IdentifyInformationNeeded),
        );
        let outcome = engine(&reasoning).run("run-3", QUERY).await.unwrap();

        let state = &outcome.state;
        assert_eq!(state.complementary_info_num(), 3);
        assert_eq!(
            state.complementary_info(),
            "\nretrieve_information_needed_agent answer 1\
             \nretrieve_information_needed_agent answer 2\
             \nretrieve_information_needed_agent answer 3"
        );
        assert_eq!(
            reasoning.generation_count(AgentRole::IdentifyInformationNeeded),
            4
        );
        assert_eq!(
            reasoning.generation_count(AgentRole::RetrieveInformationNeeded),
            3
        );
        assert_eq!(reasoning.generation_count(AgentRole::DraftUpdate), 1);
        assert!(!state.result().is_empty());

        let prompts = reasoning.prompts_for(AgentRole::IdentifyInformationNeeded);
        assert!(!prompts[0].contains("complementary info"));
        for prompt in &prompts[1..] {
            assert!(prompt.contains("Here the complementary info about the decision"));
            assert!(!prompt.contains("You gave an answer but that was not correct"));
        }

        let update_prompt = &reasoning.prompts_for(AgentRole::DraftUpdate)[0];
        assert!(update_prompt.contains("retrieve_information_needed_agent answer 3"));
    }

    #[tokio::test]
    async fn test_information_loop_honours_policy() {
        let reasoning = Arc::new(
            ScriptedReasoningService::new().always_reject(AgentRole::IdentifyInformationNeeded),
        );
        let outcome = engine(&reasoning)
            .with_policy(TransitionPolicy {
                max_information_augmentations: 1,
            })
            .run("run-4", QUERY)
            .await
            .unwrap();

        assert_eq!(outcome.state.complementary_info_num(), 1);
        assert_eq!(outcome.visits(Node::RetrieveInformation), 1);
    }

    #[tokio::test]
    async fn test_information_approval_commits_nothing() {
        let reasoning = Arc::new(
            ScriptedReasoningService::new().reject_times(AgentRole::IdentifyInformationNeeded, 1),
        );
        let outcome = engine(&reasoning).run("run-5", QUERY).await.unwrap();

        assert_eq!(outcome.state.complementary_info_num(), 1);
        assert_eq!(
            reasoning.generation_count(AgentRole::IdentifyInformationNeeded),
            2
        );
    }

    #[tokio::test]
    async fn test_result_retry_carries_rejected_answer() {
        let reasoning = Arc::new(ScriptedReasoningService::new().reject_times(AgentRole::Result, 1));
        let outcome = engine(&reasoning).run("run-6", QUERY).await.unwrap();

        let prompts = reasoning.prompts_for(AgentRole::Result);
        assert_eq!(prompts.len(), 2);
        assert!(prompts[1].contains("Here the selected result for the decision: selected option 1"));
        assert!(prompts[1].contains(
            "Here the comment on selected best alternative for the decision: fallback because 1"
        ));
        assert_eq!(outcome.state.result(), "selected option 2");
        assert_eq!(outcome.state.result_comment(), "selected because 2");

        let contexts = reasoning.contexts_for(AgentRole::Result);
        assert_eq!(contexts[0].get("selected decision"), Some("selected option 1"));
    }

    #[tokio::test]
    async fn test_every_stage_rejected_once_commits_second_answers() {
        let mut scripted = ScriptedReasoningService::new();
        for stage in &Stage::ALL[1..] {
            if *stage != Stage::IdentifyInformationNeeded {
                scripted = scripted.reject_times(stage.agent().unwrap(), 1);
            }
        }
        let reasoning = Arc::new(scripted);
        let outcome = engine(&reasoning).run("run-7", QUERY).await.unwrap();

        let state = &outcome.state;
        assert_eq!(state.trigger(), "identify_trigger_agent answer 2");
        assert_eq!(state.goals(), "establish_goals_agent answer 2");
        assert_eq!(state.decision_draft_updated(), "draft_update_agent answer 2");
        assert_eq!(state.result(), "selected option 2");
    }

    #[tokio::test]
    async fn test_reasoning_error_propagates() {
        let reasoning = Arc::new(
            ScriptedReasoningService::new().failing_on(AgentRole::Drafting, "upstream timeout"),
        );
        let err = engine(&reasoning).run("run-8", QUERY).await.unwrap_err();

        match &err {
            WorkflowError::StepExecution { step, message } => {
                assert_eq!(step, "drafting");
                assert!(message.contains("upstream timeout"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(reasoning.evaluation_count(AgentRole::Drafting), 0);
        assert_eq!(reasoning.generation_count(AgentRole::EstablishGoals), 0);
    }

    #[tokio::test]
    async fn test_empty_query_is_rejected_before_any_call() {
        let reasoning = Arc::new(ScriptedReasoningService::new());
        let err = engine(&reasoning).run("run-9", "   ").await.unwrap_err();

        assert!(matches!(err, WorkflowError::InvalidInput(_)));
        assert_eq!(reasoning.generation_count(AgentRole::IdentifyTrigger), 0);
    }

    #[tokio::test]
    async fn test_evaluators_see_the_candidate_answer() {
        let reasoning = Arc::new(ScriptedReasoningService::new());
        engine(&reasoning).run("run-10", QUERY).await.unwrap();

        let contexts = reasoning.contexts_for(AgentRole::GenerationOfAlternatives);
        assert_eq!(
            contexts[0].get("alternatives"),
            Some("generation_of_alternatives_agent answer 1")
        );

        let contexts = reasoning.contexts_for(AgentRole::EstablishGoals);
        assert_eq!(
            contexts[0].get("decision requested"),
            Some("drafting_agent answer 1")
        );
    }

    #[tokio::test]
    async fn test_transition_log_records_history() {
        let reasoning = Arc::new(ScriptedReasoningService::new().reject_times(AgentRole::Drafting, 1));
        let log = Arc::new(InMemoryTransitionLog::new());
        let outcome = engine(&reasoning)
            .with_transition_log(log.clone())
            .run("run-11", QUERY)
            .await
            .unwrap();

        let recorded = log.history("run-11").await.unwrap();
        assert_eq!(recorded, outcome.node_names());
        assert!(log.history("other-run").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_engine_as_executor() {
        let reasoning = Arc::new(ScriptedReasoningService::new());
        let executor: Arc<dyn DecisionExecutor> = Arc::new(engine(&reasoning));
        let outcome = executor.execute("run-12", QUERY).await.unwrap();
        assert!(!outcome.state.best_alternative_result().is_empty());
    }
}
