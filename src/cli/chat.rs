mod highlighter;
mod prompt;
mod repl;

use nu_ansi_term::AnsiGenericString;
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;

use self::repl::{Input, InputSource, Repl};

use crate::chat::Turn;
use crate::color::{self, MaybePaint};
use crate::config::{self, Overrides};
use crate::persona::{self, SYSTEM_INSTRUCTION};
use crate::providers::anthropic::AnthropicProvider;
use crate::providers::CompletionGateway;
use crate::session::{Exchange, FailureNotice, Session};
use crate::utils::errors::DEFAULT_EXIT_CODE;
use crate::{die, error, ChatArgs, NAME, VERSION};
use prompt::{advisor_prompt, render_turn};

/// How a chat gets its first question and whether the REPL follows
#[derive(Debug, PartialEq, Eq)]
struct Mode {
    interactive: bool,
    read_stdin: bool,
}

impl Mode {
    fn select(args: &ChatArgs, in_terminal: bool, out_terminal: bool) -> Mode {
        // An explicit first question never reads standard input, whatever it
        // is attached to.
        if args.prompt.is_some() || args.example.is_some() {
            return Mode {
                interactive: args.interactive,
                read_stdin: false,
            };
        }

        let interactive = in_terminal && out_terminal;

        Mode {
            interactive,
            read_stdin: !interactive,
        }
    }
}

pub(crate) async fn chat_cmd(config_path: Option<PathBuf>, args: &ChatArgs) {
    if args.prompt.is_some() && args.example.is_some() {
        die!("an example and a prompt cannot both be used as the first question");
    }

    let mode = Mode::select(args, io::stdin().is_terminal(), io::stdout().is_terminal());

    // Obtain the initial prompt, either from standard input or from a positional argument.
    let initial_prompt = if let Some(prompt) = &args.prompt {
        Some(prompt.clone())
    } else if mode.read_stdin {
        let mut buf = String::new();

        if let Err(err) = io::stdin().read_to_string(&mut buf) {
            die!("failed to read the initial prompt from standard input: {}", err);
        }

        Some(buf)
    } else {
        None
    };

    let config = match config::read_config(config_path) {
        Ok(config) => config,
        Err(err) => die!("{}", err),
    };

    let api_key = match config.api_key(|name| std::env::var(name)) {
        Ok(api_key) => api_key,
        Err(err) => die!("{}", err),
    };

    let api_base = match config.api_base(|name| std::env::var(name)) {
        Ok(api_base) => api_base,
        Err(err) => die!("{}", err),
    };

    let provider = match AnthropicProvider::new(&api_key, api_base.as_str()) {
        Ok(provider) => provider,
        Err(err) => die!("failed to set up the AI service: {}", err.describe()),
    };

    let model_config = config.model_config(Overrides {
        model: args.model.clone(),
        max_tokens: args.max_tokens,
    });

    let mut session = Session::new(SYSTEM_INSTRUCTION, model_config);

    if let Some(number) = args.example {
        match persona::example(number) {
            Some(example) => session.queue_example(example.query),
            None => die!(
                "there is no example {}, pick one between 1 and {}",
                number,
                persona::EXAMPLE_QUESTIONS.len()
            ),
        }
    }

    let mut repl = if mode.interactive {
        Some(Repl::new(config.keybindings))
    } else {
        None
    };

    if chat(&provider, &mut session, repl.as_mut(), initial_prompt).await.is_err() {
        std::process::exit(DEFAULT_EXIT_CODE);
    }
}

fn hint(text: &str) -> AnsiGenericString<'_, str> {
    color::HINT_TEXT.maybe_paint(text)
}

/// Where the next question comes from
enum Next {
    Ask(String),
    Stop,
}

/// The initial prompt goes first, then a queued example, then the input source.
fn next_question<I: InputSource + ?Sized>(
    session: &mut Session,
    input: &mut Option<&mut I>,
    initial_prompt: &mut Option<String>,
) -> Next {
    if let Some(prompt) = initial_prompt.take() {
        return Next::Ask(prompt);
    }

    loop {
        if let Some(example) = session.take_pending_example() {
            if input.is_some() {
                println!("{}", render_turn(&Turn::user(example.as_str())));
            }

            return Next::Ask(example);
        }

        let Some(input) = input.as_mut() else {
            return Next::Stop;
        };

        match input.read(session) {
            Input::Prompt(prompt) => return Next::Ask(prompt),
            Input::Queued => continue,
            Input::Exit => return Next::Stop,
        }
    }
}

/// Runs questions through `session` until the input is exhausted. Without an
/// input source only the first question is asked, and its failure is returned.
async fn chat<G, I>(
    gateway: &G,
    session: &mut Session,
    mut input: Option<&mut I>,
    mut initial_prompt: Option<String>,
) -> Result<(), FailureNotice>
where
    G: CompletionGateway + ?Sized,
    I: InputSource + ?Sized,
{
    let interactive = input.is_some();

    if interactive {
        let banner = format!("{} version {}", NAME, VERSION);

        println!("{}", color::HEADING.maybe_paint::<_, str>(banner));
        println!(
            "{}",
            hint(&format!(
                "using {}, type /examples for sample questions or /exit to leave",
                session.model_config().model
            ))
        );
    }

    loop {
        let prompt = match next_question(session, &mut input, &mut initial_prompt) {
            Next::Ask(prompt) => prompt,
            Next::Stop => break,
        };

        if interactive {
            println!("{}", hint("analyzing compliance requirements..."));
        }

        tracing::debug!(state = %session.state(), turns = session.conversation().len(), "submitting");

        match session.submit(gateway, prompt).await {
            Exchange::Answered(turn) => {
                if interactive {
                    println!("{}{}\n", advisor_prompt(), turn.content());
                } else {
                    println!("{}", turn.content());
                }
            }
            Exchange::Failed(notice) => {
                error!("{}", notice);
                eprintln!("{}", hint(notice.hint()));

                if !interactive {
                    return Err(notice);
                }
            }
        }

        if !interactive {
            break;
        }
    }

    Ok(())
}
