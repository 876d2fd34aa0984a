use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Print a command's result: `render_text` writes the human form, JSON is
/// one compact object on stdout. Nothing is printed when `quiet`.
pub fn print_result<T, F>(format: OutputFormat, quiet: bool, result: &T, render_text: F)
where
    T: Serialize,
    F: FnOnce(&T),
{
    if quiet {
        return;
    }
    match format {
        OutputFormat::Text => render_text(result),
        OutputFormat::Json => match serde_json::to_string(result) {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("error: failed to encode result: {e}"),
        },
    }
}

pub fn print_error(format: OutputFormat, quiet: bool, message: &str) {
    if quiet {
        return;
    }
    match format {
        OutputFormat::Text => eprintln!("error: {message}"),
        OutputFormat::Json => {
            let err = serde_json::json!({ "error": message });
            eprintln!("{err}");
        }
    }
}
