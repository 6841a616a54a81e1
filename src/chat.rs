//! Type definitions for chat primitives and the per-session conversation log
//!

/// The author of a `Turn`
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub(crate) enum Role {
    /// A turn authored by the user
    User,

    /// A turn authored by the model
    Assistant,
}

/// A single message in a conversation. Once created, neither the role
/// nor the content can change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Turn {
    role: Role,
    content: String,
}

impl Turn {
    pub(crate) fn new(role: Role, content: impl Into<String>) -> Turn {
        Turn {
            role,
            content: content.into(),
        }
    }

    pub(crate) fn user(content: impl Into<String>) -> Turn {
        Turn::new(Role::User, content)
    }

    pub(crate) fn assistant(content: impl Into<String>) -> Turn {
        Turn::new(Role::Assistant, content)
    }

    pub(crate) fn role(&self) -> Role {
        self.role
    }

    pub(crate) fn content(&self) -> &str {
        &self.content
    }
}

/// The ordered history of one session. Insertion order is both the
/// display order and the order in which turns are shown to the model.
///
/// Turns are only ever appended. Strict user/assistant alternation is not
/// enforced: a failed completion leaves a user turn without a reply, and
/// the next submission adds a second user turn right after it.
#[derive(Debug)]
pub(crate) struct Conversation {
    turns: Vec<Turn>,
}

impl Conversation {
    pub(crate) fn new() -> Conversation {
        Conversation { turns: Vec::new() }
    }

    /// Adds `turn` to the end of the conversation. Any content is accepted,
    /// including the empty string.
    pub(crate) fn append(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// The full history in insertion order
    pub(crate) fn all(&self) -> &[Turn] {
        &self.turns
    }

    pub(crate) fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    pub(crate) fn len(&self) -> usize {
        self.turns.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_preserves_order() {
        let mut conversation = Conversation::new();

        assert!(conversation.is_empty());

        let turns = [
            Turn::user("first"),
            Turn::assistant("second"),
            Turn::user("third"),
            Turn::user("fourth"),
            Turn::assistant(""),
        ];

        for turn in turns.iter() {
            conversation.append(turn.clone());
        }

        assert_eq!(conversation.len(), 5);
        assert_eq!(conversation.all(), &turns[..]);
        assert_eq!(conversation.last(), Some(&Turn::assistant("")));
    }

    #[test]
    fn test_copied_view_is_detached() {
        let mut conversation = Conversation::new();

        conversation.append(Turn::user("What is FISMA?"));

        let mut copy = conversation.all().to_vec();
        copy.push(Turn::assistant("injected"));
        copy[0] = Turn::user("rewritten");

        assert_eq!(conversation.all(), &[Turn::user("What is FISMA?")]);
    }

    #[test]
    fn test_role_labels() {
        assert_eq!(Role::User.to_string(), "user");
        assert_eq!(Role::Assistant.to_string(), "assistant");
    }
}
