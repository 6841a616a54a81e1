use reedline::{
    default_emacs_keybindings, default_vi_insert_keybindings, default_vi_normal_keybindings,
    ColumnarMenu, DefaultCompleter, EditCommand, EditMode, Emacs, KeyCode, KeyModifiers,
    MenuBuilder, Reedline, ReedlineEvent, ReedlineMenu, Signal, Vi,
};

use nu_ansi_term::{Color, Style};

use crate::cli::examples::{frameworks_table, questions_table};
use crate::config;
use crate::persona::{self, EXAMPLE_QUESTIONS};
use crate::session::Session;
use crate::warn;

use super::highlighter::Highlighter;
use super::prompt::{completion_marker, render_turn, Prompt};

pub(crate) const COMMANDS: [&str; 5] = ["/examples", "/example", "/frameworks", "/history", "/exit"];

/// What the user asked for at the prompt
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Input {
    /// A question for the advisor
    Prompt(String),
    /// An example was queued on the session and should be submitted next
    Queued,
    /// The user wants to leave
    Exit,
}

/// Supplies the chat loop with input between completions
pub(crate) trait InputSource {
    /// Blocks until there is something for the loop to do. Commands which
    /// only display something are handled without returning.
    fn read(&mut self, session: &mut Session) -> Input;
}

#[derive(Debug, PartialEq, Eq)]
enum Command<'l> {
    Examples,
    Example(Option<usize>),
    Frameworks,
    History,
    Exit,
    Unknown(&'l str),
}

/// Parses a slash command. Anything not starting with '/' is a question.
fn parse_command(line: &str) -> Option<Command<'_>> {
    let line = line.trim();

    if !line.starts_with('/') {
        return None;
    }

    let mut words = line.split_whitespace();
    let name = words.next().unwrap_or_default();
    let argument = words.next();

    let command = match name {
        "/examples" => Command::Examples,
        "/example" => Command::Example(argument.and_then(|n| n.parse().ok())),
        "/frameworks" => Command::Frameworks,
        "/history" => Command::History,
        "/exit" => Command::Exit,
        other => Command::Unknown(other),
    };

    Some(command)
}

fn edit_mode(keybindings: config::Keybindings) -> Box<dyn EditMode> {
    let complete = ReedlineEvent::UntilFound(vec![
        ReedlineEvent::Menu("completion_menu".to_string()),
        ReedlineEvent::MenuNext,
    ]);

    match keybindings {
        config::Keybindings::Vi => {
            let mut insert_bindings = default_vi_insert_keybindings();

            insert_bindings.add_binding(KeyModifiers::NONE, KeyCode::Tab, complete);

            Box::new(Vi::new(insert_bindings, default_vi_normal_keybindings()))
        }
        config::Keybindings::Emacs => {
            let mut keybindings = default_emacs_keybindings();

            keybindings.add_binding(KeyModifiers::NONE, KeyCode::Tab, complete);

            keybindings.add_binding(
                KeyModifiers::CONTROL,
                KeyCode::Char('j'),
                ReedlineEvent::Edit(vec![EditCommand::InsertNewline]),
            );

            Box::new(Emacs::new(keybindings))
        }
    }
}

pub(crate) struct Repl {
    line_editor: Reedline,
    prompt: Prompt,
}

impl Repl {
    pub(crate) fn new(keybindings: config::Keybindings) -> Repl {
        let mut completer = Box::new(DefaultCompleter::with_inclusions(&['/']));

        completer.insert(COMMANDS.iter().map(|c| c.to_string()).collect());

        // Use the interactive menu to select options from the completer
        let completion_menu = Box::new(
            ColumnarMenu::default()
                .with_name("completion_menu")
                .with_marker(&completion_marker().to_string())
                .with_text_style(Style::new().fg(Color::Default))
                .with_selected_text_style(Style::new().fg(Color::Blue).on(Color::DarkGray))
                .with_selected_match_text_style(
                    Style::new().fg(Color::Blue).bold().on(Color::DarkGray),
                ),
        );

        let line_editor = Reedline::create()
            .with_completer(completer)
            .with_menu(ReedlineMenu::EngineCompleter(completion_menu))
            .with_edit_mode(edit_mode(keybindings))
            .with_highlighter(Box::new(Highlighter));

        Repl {
            line_editor,
            prompt: Prompt::default(),
        }
    }
}

impl InputSource for Repl {
    fn read(&mut self, session: &mut Session) -> Input {
        loop {
            let line = match self.line_editor.read_line(&self.prompt) {
                Ok(Signal::Success(line)) => line,
                Ok(Signal::CtrlC) => continue,
                Ok(Signal::CtrlD) => return Input::Exit,
                Err(err) => {
                    tracing::warn!(error = %err, "failed to read from the terminal");
                    return Input::Exit;
                }
            };

            if line.trim().is_empty() {
                continue;
            }

            match parse_command(&line) {
                None => return Input::Prompt(line),
                Some(Command::Exit) => return Input::Exit,
                Some(Command::Examples) => print!("{}", questions_table()),
                Some(Command::Frameworks) => print!("{}", frameworks_table()),
                Some(Command::History) => {
                    for turn in session.conversation().all() {
                        println!("{}\n", render_turn(turn));
                    }
                }
                Some(Command::Example(number)) => match number.and_then(persona::example) {
                    Some(example) => {
                        session.queue_example(example.query);
                        return Input::Queued;
                    }
                    None => warn!(
                        "usage: /example N, where N is between 1 and {}",
                        EXAMPLE_QUESTIONS.len()
                    ),
                },
                Some(Command::Unknown(name)) => {
                    warn!("unknown command \"{}\", try one of {}", name, COMMANDS.join(", "))
                }
            }
        }
    }
}
