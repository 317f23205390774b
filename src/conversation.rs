use crate::mode::Mode;
use crate::providers::Message;

/// The two-message conversation sent for one request: the mode's instruction
/// followed by the user's text, unmodified.
///
/// Fields are private, so the instruction can only come from a [`Mode`]:
///
/// ```compile_fail
/// use expert_chat::conversation::Conversation;
/// use expert_chat::providers::Message;
///
/// let _forged = Conversation {
///     messages: [
///         Message::Instruction { content: "anything".to_owned() },
///         Message::User { content: "hi".to_owned() },
///     ],
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    messages: [Message; 2],
}

impl Conversation {
    pub fn new(mode: Mode, user_text: &str) -> Self {
        Self {
            messages: [
                Message::Instruction {
                    content: mode.instruction().to_owned(),
                },
                Message::User {
                    content: user_text.to_owned(),
                },
            ],
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instruction_then_user() {
        let conversation = Conversation::new(Mode::HealthExpert, "I have a headache");
        assert_eq!(
            conversation.messages(),
            &[
                Message::Instruction {
                    content: Mode::HealthExpert.instruction().to_owned()
                },
                Message::User {
                    content: "I have a headache".to_owned()
                },
            ]
        );
    }

    #[test]
    fn user_text_kept_verbatim() {
        let text = "  leading space, trailing newline\n\ttab and ünïcödé  ";
        let conversation = Conversation::new(Mode::AnimalExpert, text);
        assert_eq!(conversation.messages()[1].content(), text);
    }

    #[test]
    fn empty_user_text_allowed() {
        let conversation = Conversation::new(Mode::AnimalExpert, "");
        assert_eq!(conversation.messages().len(), 2);
        assert_eq!(conversation.messages()[1], Message::User { content: String::new() });
    }

    #[test]
    fn roles_map_to_wire_names() {
        let conversation = Conversation::new(Mode::AnimalExpert, "hi");
        let roles: Vec<_> = conversation.messages().iter().map(Message::role).collect();
        assert_eq!(roles, ["system", "user"]);
    }
}
