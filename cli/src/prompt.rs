use pocketmark::error::{PocketmarkError, Result};
use pocketmark::store::Browser;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

/// Interpret an answer to the browser prompt; empty accepts the default
pub fn parse_browser_answer(answer: &str, default: Browser) -> Option<Browser> {
    let answer = answer.trim();
    if answer.is_empty() {
        Some(default)
    } else {
        Browser::from_string(answer)
    }
}

/// Ask which browser to export into, re-asking until the answer is valid
pub fn prompt_browser(default: Browser) -> Result<Browser> {
    let mut rl = DefaultEditor::new().map_err(|e| PocketmarkError::Other(e.to_string()))?;
    let prompt = format!(
        "Export into which browser? [edge/chrome/firefox] ({}): ",
        default.display_name().to_lowercase()
    );

    loop {
        match rl.readline(&prompt) {
            Ok(line) => match parse_browser_answer(&line, default) {
                Some(browser) => return Ok(browser),
                None => eprintln!("Unknown browser '{}'", line.trim()),
            },
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                return Err(PocketmarkError::InvalidInput("no browser selected".to_string()))
            }
            Err(err) => return Err(PocketmarkError::Other(err.to_string())),
        }
    }
}

/// Ask for the Pocket consumer key without echoing it
pub fn prompt_consumer_key() -> Result<String> {
    eprintln!("A Pocket consumer key is needed. Create one at https://getpocket.com/developer/apps/new");
    let key = rpassword::prompt_password("Pocket consumer key: ")?;
    let key = key.trim();
    if key.is_empty() {
        return Err(PocketmarkError::InvalidInput(
            "consumer key cannot be empty".to_string(),
        ));
    }
    Ok(key.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", Browser::Edge, Some(Browser::Edge))]
    #[case("   ", Browser::Chrome, Some(Browser::Chrome))]
    #[case("firefox", Browser::Edge, Some(Browser::Firefox))]
    #[case(" Chrome\n", Browser::Edge, Some(Browser::Chrome))]
    #[case("opera", Browser::Edge, None)]
    fn test_parse_browser_answer(
        #[case] answer: &str,
        #[case] default: Browser,
        #[case] expected: Option<Browser>,
    ) {
        assert_eq!(parse_browser_answer(answer, default), expected);
    }
}
