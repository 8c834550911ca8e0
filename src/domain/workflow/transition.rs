//! Pure transition table of the decision pipeline

use serde::{Deserialize, Serialize};

use super::Stage;
use crate::domain::decision::ResultOutput;

/// Default number of information retrievals before stage 7 is forced forward
pub const DEFAULT_MAX_INFORMATION_AUGMENTATIONS: u32 = 3;

/// Raw answer produced by a stage, not yet committed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Answer {
    Text(String),
    Decision(ResultOutput),
}

/// How a stage should build its next prompt
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Directive {
    #[default]
    Fresh,
    /// Re-run after a rejection, carrying the evaluator comment and the rejected answer
    Feedback { comment: String, rejected: Answer },
    /// Re-run stage 7 after complementary information was retrieved
    Augmented,
}

/// Outcome of one evaluator verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Commit the answer (if the stage owns a field) and move on
    Advance(Stage),
    /// Loop back to the same stage with feedback
    Retry,
    /// Retrieve more information and loop back to stage 7
    Augment,
    /// Commit the result and emit the terminal signal
    Finish,
}

/// Policy knobs of the transition table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionPolicy {
    pub max_information_augmentations: u32,
}

impl Default for TransitionPolicy {
    fn default() -> Self {
        Self {
            max_information_augmentations: DEFAULT_MAX_INFORMATION_AUGMENTATIONS,
        }
    }
}

impl TransitionPolicy {
    /// Next step for `stage` given the verdict and the augmentation counter.
    ///
    /// Every stage but stage 7 retries without limit on rejection.
    pub fn next(&self, stage: Stage, correct: bool, complementary_info_num: u32) -> Transition {
        match stage {
            Stage::Result if correct => Transition::Finish,
            Stage::Result => Transition::Retry,
            Stage::IdentifyInformationNeeded => {
                if correct || complementary_info_num >= self.max_information_augmentations {
                    Transition::Advance(Stage::UpdateDraft)
                } else {
                    Transition::Augment
                }
            }
            _ if correct => match stage.next() {
                Some(next) => Transition::Advance(next),
                None => Transition::Finish,
            },
            _ => Transition::Retry,
        }
    }
}
