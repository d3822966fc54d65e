//! Batch approval - per-host confirmation with an "apply to all" escalation

use crate::context::ApprovalPrompt;
use crate::diff::ChangeSet;
use crate::error::Error;
use anyhow::Result;
use std::str::FromStr;

/// Accepted answer tokens, in prompt order
pub const TOKENS: [&str; 3] = ["y", "n", "a"];

/// Hint shown after an invalid answer
pub const TOKEN_HINT: &str = "answer with y / n / a";

/// Approval state for one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ApprovalMode {
    /// Ask for every host with changes
    #[default]
    PerItem,
    /// Operator approved everything remaining; never reverts
    ApproveAll,
}

/// A valid operator answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalResponse {
    ApplyOne,
    Skip,
    ApplyAll,
}

impl FromStr for ApprovalResponse {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "y" | "yes" => Ok(Self::ApplyOne),
            "n" | "no" => Ok(Self::Skip),
            "a" | "all" => Ok(Self::ApplyAll),
            _ => Err(Error::InvalidResponse(s.trim().to_string())),
        }
    }
}

/// What to do with one host's change set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Apply,
    Skip,
}

/// Approval controller threaded through a single reconciliation run
#[derive(Debug, Default)]
pub struct BatchApproval {
    mode: ApprovalMode,
    prompts: usize,
}

impl BatchApproval {
    /// Start in per-item mode
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> ApprovalMode {
        self.mode
    }

    /// Number of questions actually put to the operator
    pub fn prompts(&self) -> usize {
        self.prompts
    }

    /// Decide whether to apply `changes` for the host named `label`
    ///
    /// In [`ApprovalMode::ApproveAll`] this returns [`Decision::Apply`] without
    /// touching the prompt. Otherwise the operator is asked until a valid
    /// token arrives; prompt failures propagate.
    pub fn decide<P: ApprovalPrompt>(
        &mut self,
        label: &str,
        changes: &ChangeSet,
        prompt: &mut P,
    ) -> Result<Decision> {
        if self.mode == ApprovalMode::ApproveAll {
            log::debug!("{label}: approved by earlier 'apply all'");
            return Ok(Decision::Apply);
        }

        let message = format!(
            "Apply {} change(s) to {}? [y]es / [n]o / [a]ll remaining",
            changes.len(),
            label
        );

        let response = loop {
            self.prompts += 1;
            let answer = prompt.ask(&message, &TOKENS)?;
            match answer.parse::<ApprovalResponse>() {
                Ok(response) => break response,
                Err(e) => {
                    log::debug!("{e}");
                    prompt.rejected(&answer, TOKEN_HINT);
                }
            }
        };

        Ok(match response {
            ApprovalResponse::ApplyOne => Decision::Apply,
            ApprovalResponse::Skip => Decision::Skip,
            ApprovalResponse::ApplyAll => {
                self.mode = ApprovalMode::ApproveAll;
                Decision::Apply
            }
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::diff::compute_changes;
    use crate::types::PolicyFlags;
    use std::collections::VecDeque;

    /// Prompt that replays canned answers and records every question
    #[derive(Default)]
    pub(crate) struct ScriptedPrompt {
        answers: VecDeque<String>,
        pub(crate) asked: Vec<String>,
        pub(crate) rejected: Vec<String>,
    }

    impl ScriptedPrompt {
        pub(crate) fn new(answers: &[&str]) -> Self {
            Self {
                answers: answers.iter().map(|a| (*a).to_string()).collect(),
                ..Self::default()
            }
        }
    }

    impl ApprovalPrompt for ScriptedPrompt {
        fn ask(&mut self, message: &str, tokens: &[&str]) -> Result<String> {
            assert_eq!(tokens, TOKENS);
            self.asked.push(message.to_string());
            self.answers
                .pop_front()
                .ok_or_else(|| anyhow::anyhow!("script exhausted"))
        }

        fn rejected(&mut self, answer: &str, _hint: &str) {
            self.rejected.push(answer.to_string());
        }
    }

    fn some_changes() -> ChangeSet {
        let desired = PolicyFlags {
            ssl_forced: true,
            ..PolicyFlags::default()
        };
        compute_changes(&PolicyFlags::default(), &desired)
    }

    #[test]
    fn test_parse_tokens() {
        assert_eq!("y".parse::<ApprovalResponse>(), Ok(ApprovalResponse::ApplyOne));
        assert_eq!(" N ".parse::<ApprovalResponse>(), Ok(ApprovalResponse::Skip));
        assert_eq!("All".parse::<ApprovalResponse>(), Ok(ApprovalResponse::ApplyAll));
        assert_eq!(
            "maybe".parse::<ApprovalResponse>(),
            Err(Error::InvalidResponse("maybe".into()))
        );
        assert!("".parse::<ApprovalResponse>().is_err());
    }

    #[test]
    fn test_apply_one_keeps_per_item() {
        let mut approval = BatchApproval::new();
        let mut prompt = ScriptedPrompt::new(&["y"]);

        let decision = approval.decide("a.lan", &some_changes(), &mut prompt).unwrap();
        assert_eq!(decision, Decision::Apply);
        assert_eq!(approval.mode(), ApprovalMode::PerItem);
    }

    #[test]
    fn test_skip_keeps_per_item() {
        let mut approval = BatchApproval::new();
        let mut prompt = ScriptedPrompt::new(&["n"]);

        let decision = approval.decide("a.lan", &some_changes(), &mut prompt).unwrap();
        assert_eq!(decision, Decision::Skip);
        assert_eq!(approval.mode(), ApprovalMode::PerItem);
    }

    #[test]
    fn test_apply_all_is_sticky() {
        let mut approval = BatchApproval::new();
        let mut prompt = ScriptedPrompt::new(&["a"]);
        let changes = some_changes();

        assert_eq!(
            approval.decide("a.lan", &changes, &mut prompt).unwrap(),
            Decision::Apply
        );
        assert_eq!(approval.mode(), ApprovalMode::ApproveAll);

        // Script is exhausted, so any further question would fail
        for label in ["b.lan", "c.lan", "d.lan"] {
            assert_eq!(
                approval.decide(label, &changes, &mut prompt).unwrap(),
                Decision::Apply
            );
        }
        assert_eq!(prompt.asked.len(), 1);
        assert_eq!(approval.prompts(), 1);
    }

    #[test]
    fn test_invalid_answers_are_asked_again() {
        let mut approval = BatchApproval::new();
        let mut prompt = ScriptedPrompt::new(&["s", "", "t", "n"]);

        let decision = approval.decide("a.lan", &some_changes(), &mut prompt).unwrap();
        assert_eq!(decision, Decision::Skip);
        assert_eq!(prompt.asked.len(), 4);
        assert_eq!(prompt.rejected, vec!["s", "", "t"]);
    }

    #[test]
    fn test_prompt_failure_propagates() {
        let mut approval = BatchApproval::new();
        let mut prompt = ScriptedPrompt::new(&[]);

        assert!(approval.decide("a.lan", &some_changes(), &mut prompt).is_err());
        assert_eq!(approval.mode(), ApprovalMode::PerItem);
    }

    #[test]
    fn test_prompt_message_names_host_and_count() {
        let mut approval = BatchApproval::new();
        let mut prompt = ScriptedPrompt::new(&["y"]);

        approval.decide("a.lan, b.lan", &some_changes(), &mut prompt).unwrap();
        assert!(prompt.asked[0].contains("a.lan, b.lan"));
        assert!(prompt.asked[0].contains("1 change(s)"));
    }
}
