use nu_ansi_term::Style;

use crate::color;

use super::repl::COMMANDS;

/// Shows recognised slash commands in the prompt color and everything else
/// as user text
#[derive(Default)]
pub(crate) struct Highlighter;

fn style_for(line: &str) -> Style {
    let command = line.split_whitespace().next().unwrap_or_default();

    if COMMANDS.contains(&command) {
        *color::USER_PROMPT
    } else {
        *color::USER_TEXT
    }
}

impl reedline::Highlighter for Highlighter {
    fn highlight(&self, line: &str, _cursor: usize) -> reedline::StyledText {
        reedline::StyledText {
            buffer: vec![(style_for(line), line.to_string())],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commands_are_highlighted() {
        assert_eq!(style_for("/example 2"), *color::USER_PROMPT);
        assert_eq!(style_for("/frameworks"), *color::USER_PROMPT);
        assert_eq!(style_for("/exampl"), *color::USER_TEXT);
        assert_eq!(style_for("what does /exit do?"), *color::USER_TEXT);
        assert_eq!(style_for(""), *color::USER_TEXT);
    }
}
