use nu_ansi_term::AnsiGenericString;
use reedline::{PromptEditMode, PromptHistorySearch, PromptHistorySearchStatus, PromptViMode};
use std::borrow::Cow;

use crate::chat::{Role, Turn};
use crate::color::{self, MaybePaint};

const USER_PROMPT: &str = "[you] ";
const USER_VI_NORMAL_PROMPT: &str = "[you:=] ";
const ADVISOR_PROMPT: &str = "[advisor] ";
const COMPLETION_MARKER: &str = "[/] ";
const USER_MULTILINE_PROMPT: &str = "::: ";

pub(crate) fn advisor_prompt() -> AnsiGenericString<'static, str> {
    color::ADVISOR_PROMPT.maybe_paint(ADVISOR_PROMPT)
}

pub(crate) fn user_prompt() -> AnsiGenericString<'static, str> {
    color::USER_PROMPT.maybe_paint(USER_PROMPT)
}

pub(crate) fn completion_marker() -> AnsiGenericString<'static, str> {
    color::USER_PROMPT.maybe_paint(COMPLETION_MARKER)
}

/// Renders a turn the way it appears in the transcript
pub(crate) fn render_turn(turn: &Turn) -> String {
    match turn.role() {
        Role::User => format!(
            "{}{}",
            user_prompt(),
            color::USER_TEXT.maybe_paint(turn.content())
        ),
        Role::Assistant => format!("{}{}", advisor_prompt(), turn.content()),
    }
}

pub(crate) struct Prompt {
    user_prompt: String,
    user_vi_normal_prompt: String,
    user_multiline_prompt: String,
}

impl Default for Prompt {
    fn default() -> Self {
        Prompt {
            user_prompt: user_prompt().to_string(),
            user_vi_normal_prompt: color::USER_PROMPT
                .maybe_paint(USER_VI_NORMAL_PROMPT)
                .to_string(),
            user_multiline_prompt: color::USER_PROMPT
                .maybe_paint(USER_MULTILINE_PROMPT)
                .to_string(),
        }
    }
}

impl reedline::Prompt for Prompt {
    fn render_prompt_left(&self) -> Cow<str> {
        Cow::Borrowed("")
    }

    fn render_prompt_right(&self) -> Cow<str> {
        Cow::Borrowed("")
    }

    fn render_prompt_indicator(&self, prompt_mode: PromptEditMode) -> Cow<str> {
        match prompt_mode {
            PromptEditMode::Vi(PromptViMode::Normal) => Cow::Borrowed(&self.user_vi_normal_prompt),
            _ => Cow::Borrowed(&self.user_prompt),
        }
    }

    fn render_prompt_multiline_indicator(&self) -> Cow<str> {
        Cow::Borrowed(&self.user_multiline_prompt)
    }

    fn render_prompt_history_search_indicator(
        &self,
        history_search: PromptHistorySearch,
    ) -> Cow<str> {
        let prefix = match history_search.status {
            PromptHistorySearchStatus::Passing => "",
            PromptHistorySearchStatus::Failing => "failing ",
        };

        Cow::Owned(format!(
            "({}reverse-search: {}) ",
            prefix, history_search.term
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::ColorMode;

    #[test]
    fn test_render_turn_without_color() {
        color::configure_color(ColorMode::Off);

        assert_eq!(
            render_turn(&Turn::user("What is TIC 3.0?")),
            "[you] What is TIC 3.0?"
        );
        assert_eq!(
            render_turn(&Turn::assistant("TIC 3.0 is...")),
            "[advisor] TIC 3.0 is..."
        );
    }
}
