//! The interaction state machine for a single chat session.
//!
//! A session owns its [`Conversation`] and moves between two states:
//!
//! ```text
//! Idle --submit--> AwaitingCompletion --answer or failure--> Idle
//! ```
//!
//! [`Session::submit`] borrows the session mutably until the completion
//! resolves, so no turn can be appended and no second request can be issued
//! while one is outstanding. There is no cancellation and no retry; a user
//! retries by submitting again.

use std::fmt;

use crate::chat::{Conversation, Turn};
use crate::persona::SystemInstruction;
use crate::providers::{CompletionGateway, ModelConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub(crate) enum SessionState {
    Idle,
    AwaitingCompletion,
}

/// Shown in place of an assistant turn when a completion fails
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FailureNotice {
    detail: String,
}

impl FailureNotice {
    const HEADLINE: &'static str = "could not get an answer from the AI service";
    const HINT: &'static str = "please check your API configuration or try again";

    fn new(detail: String) -> FailureNotice {
        FailureNotice { detail }
    }

    /// The provider's own description of the failure
    pub(crate) fn detail(&self) -> &str {
        &self.detail
    }

    pub(crate) fn hint(&self) -> &'static str {
        Self::HINT
    }
}

impl fmt::Display for FailureNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", Self::HEADLINE, self.detail)
    }
}

/// The result of one submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Exchange {
    /// The model replied; the turn has been appended to the conversation
    Answered(Turn),
    /// The completion failed; the conversation holds the user turn only
    Failed(FailureNotice),
}

pub(crate) struct Session {
    conversation: Conversation,
    state: SessionState,
    pending_example: Option<String>,
    system: SystemInstruction,
    config: ModelConfig,
}

impl Session {
    pub(crate) fn new(system: SystemInstruction, config: ModelConfig) -> Session {
        Session {
            conversation: Conversation::new(),
            state: SessionState::Idle,
            pending_example: None,
            system,
            config,
        }
    }

    pub(crate) fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub(crate) fn state(&self) -> SessionState {
        self.state
    }

    pub(crate) fn model_config(&self) -> &ModelConfig {
        &self.config
    }

    /// Queues `query` to be submitted on the next pass of the interaction loop.
    /// A later call replaces a query that has not been taken yet.
    pub(crate) fn queue_example(&mut self, query: impl Into<String>) {
        self.pending_example = Some(query.into());
    }

    /// Takes the queued example, leaving nothing behind
    pub(crate) fn take_pending_example(&mut self) -> Option<String> {
        self.pending_example.take()
    }

    /// Appends `prompt` as a user turn and asks `gateway` for the reply.
    ///
    /// On success the reply is appended and returned. On failure nothing
    /// beyond the user turn is appended and the returned notice describes
    /// what went wrong. Either way the session is idle again afterwards.
    pub(crate) async fn submit<G>(&mut self, gateway: &G, prompt: impl Into<String>) -> Exchange
    where
        G: CompletionGateway + ?Sized,
    {
        debug_assert_eq!(self.state, SessionState::Idle);

        self.conversation.append(Turn::user(prompt));

        self.state = SessionState::AwaitingCompletion;

        let result = gateway
            .complete(self.conversation.all(), &self.system, &self.config)
            .await;

        self.state = SessionState::Idle;

        match result {
            Ok(turn) => {
                self.conversation.append(turn.clone());

                Exchange::Answered(turn)
            }
            Err(err) => {
                tracing::warn!(kind = ?err.kind(), error = %err.describe(), "completion failed");

                Exchange::Failed(FailureNotice::new(err.describe()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::Role;
    use crate::persona::SYSTEM_INSTRUCTION;
    use crate::providers::fake::ScriptedGateway;
    use crate::providers::ErrorKind;

    fn session() -> Session {
        Session::new(SYSTEM_INSTRUCTION, ModelConfig::default())
    }

    #[tokio::test]
    async fn test_first_question_is_recorded() {
        let gateway = ScriptedGateway::new(vec![Ok("NIST 800-53 defines...")]);
        let mut session = session();

        assert!(session.conversation().is_empty());
        assert_eq!(session.state(), SessionState::Idle);

        let exchange = session.submit(&gateway, "What is NIST 800-53?").await;

        assert_eq!(
            exchange,
            Exchange::Answered(Turn::assistant("NIST 800-53 defines..."))
        );

        // The gateway saw exactly the user turn
        assert_eq!(
            gateway.calls()[0].history,
            vec![Turn::user("What is NIST 800-53?")]
        );

        assert_eq!(
            session.conversation().all(),
            &[
                Turn::user("What is NIST 800-53?"),
                Turn::assistant("NIST 800-53 defines..."),
            ]
        );
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[tokio::test]
    async fn test_failure_leaves_only_the_user_turn() {
        let gateway = ScriptedGateway::new(vec![
            Ok("NIST 800-53 defines..."),
            Err(ErrorKind::Connection),
            Ok("FedRAMP requires..."),
        ]);
        let mut session = session();

        session.submit(&gateway, "What is NIST 800-53?").await;

        let exchange = session.submit(&gateway, "And FedRAMP?").await;

        let notice = match exchange {
            Exchange::Failed(notice) => notice,
            other => panic!("expected a failure, got {:?}", other),
        };

        assert_eq!(notice.detail(), "failed to connect to the API service");
        assert_eq!(
            notice.to_string(),
            "could not get an answer from the AI service: failed to connect to the API service"
        );
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(
            session.conversation().all(),
            &[
                Turn::user("What is NIST 800-53?"),
                Turn::assistant("NIST 800-53 defines..."),
                Turn::user("And FedRAMP?"),
            ]
        );

        // The session keeps accepting input, and the retry carries both
        // consecutive user turns.
        let exchange = session.submit(&gateway, "And FedRAMP?").await;

        assert_eq!(
            exchange,
            Exchange::Answered(Turn::assistant("FedRAMP requires..."))
        );
        assert_eq!(gateway.calls()[2].history.len(), 4);
        assert_eq!(session.conversation().len(), 5);
        assert_eq!(
            session.conversation().last(),
            Some(&Turn::assistant("FedRAMP requires..."))
        );
    }

    #[tokio::test]
    async fn test_two_questions_make_four_turns() {
        let gateway = ScriptedGateway::new(vec![Ok("a1"), Ok("a2")]);
        let mut session = session();

        session.submit(&gateway, "q1").await;
        session.submit(&gateway, "q2").await;

        let roles: Vec<Role> = session
            .conversation()
            .all()
            .iter()
            .map(|turn| turn.role())
            .collect();

        assert_eq!(
            roles,
            vec![Role::User, Role::Assistant, Role::User, Role::Assistant]
        );
        assert_eq!(
            session.conversation().all(),
            &[
                Turn::user("q1"),
                Turn::assistant("a1"),
                Turn::user("q2"),
                Turn::assistant("a2"),
            ]
        );
    }

    #[tokio::test]
    async fn test_one_call_per_submission() {
        let gateway = ScriptedGateway::new(vec![Ok("a1"), Err(ErrorKind::TimedOut), Ok("a3")]);
        let mut session = session();

        for prompt in ["q1", "q2", "q3"] {
            session.submit(&gateway, prompt).await;
        }

        assert_eq!(gateway.calls().len(), 3);
        assert_eq!(gateway.max_in_flight(), 1);
    }

    #[tokio::test]
    async fn test_system_instruction_stays_out_of_history() {
        let gateway = ScriptedGateway::new(vec![Ok("a1"), Ok("a2"), Err(ErrorKind::ApiOverloaded)]);
        let mut session = session();

        for prompt in ["q1", "q2", "q3"] {
            session.submit(&gateway, prompt).await;
        }

        for call in gateway.calls().iter() {
            assert_eq!(call.system, SYSTEM_INSTRUCTION);
            assert_eq!(call.config, ModelConfig::default());
        }

        for turn in session.conversation().all() {
            assert_ne!(turn.content(), SYSTEM_INSTRUCTION.as_str());
        }
    }

    #[tokio::test]
    async fn test_empty_prompt_is_submitted() {
        let gateway = ScriptedGateway::new(vec![Ok("")]);
        let mut session = session();

        let exchange = session.submit(&gateway, "").await;

        assert_eq!(exchange, Exchange::Answered(Turn::assistant("")));
        assert_eq!(session.conversation().len(), 2);
    }

    #[test]
    fn test_pending_example_is_consumed_once() {
        let mut session = session();

        assert_eq!(session.take_pending_example(), None);

        session.queue_example("What is FISMA?");
        session.queue_example("What is TIC 3.0?");

        assert_eq!(
            session.take_pending_example().as_deref(),
            Some("What is TIC 3.0?")
        );
        assert_eq!(session.take_pending_example(), None);

        // Queueing alone never touches the conversation
        assert!(session.conversation().is_empty());
    }
}
