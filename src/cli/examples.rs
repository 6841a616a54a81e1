mod table;

pub(crate) use table::Table;

use crate::persona::{Framework, EXAMPLE_QUESTIONS, SUPPORTED_FRAMEWORKS};
use crate::{ExampleListing, ExamplesArgs, ListingFormat};

#[derive(serde::Serialize)]
struct Question {
    number: usize,
    label: &'static str,
    query: &'static str,
}

fn questions() -> Vec<Question> {
    EXAMPLE_QUESTIONS
        .iter()
        .enumerate()
        .map(|(i, question)| Question {
            number: i + 1,
            label: question.label,
            query: question.query,
        })
        .collect()
}

impl From<Vec<Question>> for Table {
    fn from(value: Vec<Question>) -> Self {
        let mut tab = Table::with_header(&["#", "LABEL", "QUESTION"]);

        for question in value {
            tab.add_row(vec![
                question.number.to_string(),
                question.label.to_string(),
                question.query.to_string(),
            ]);
        }

        tab
    }
}

impl From<Vec<Framework>> for Table {
    fn from(value: Vec<Framework>) -> Self {
        let mut tab = Table::with_header(&["FRAMEWORK", "FOCUS"]);

        for framework in value {
            tab.add_row(vec![framework.name.to_string(), framework.focus.to_string()]);
        }

        tab
    }
}

pub(crate) fn questions_table() -> Table {
    questions().into()
}

pub(crate) fn frameworks_table() -> Table {
    SUPPORTED_FRAMEWORKS.to_vec().into()
}

fn format_output<O>(object: O, format: ListingFormat) -> String
where
    O: Into<Table> + serde::Serialize,
{
    match format {
        ListingFormat::Json => {
            // Only static strings and integers are serialized here
            let mut output = serde_json::to_string_pretty(&object).unwrap_or_default();
            output.push('\n');
            output
        }
        ListingFormat::Table => {
            let tab: Table = object.into();

            tab.to_string()
        }
        ListingFormat::HeaderlessTable => {
            let mut tab: Table = object.into();

            tab.print_header(false);

            tab.to_string()
        }
    }
}

pub(crate) fn examples_cmd(args: &ExamplesArgs) {
    let output = match args.object.unwrap_or_default() {
        ExampleListing::Questions => format_output(questions(), args.format),
        ExampleListing::Frameworks => format_output(SUPPORTED_FRAMEWORKS.to_vec(), args.format),
    };

    print!("{}", output);
}
