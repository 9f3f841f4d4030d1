/// One line of user input, classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Input {
    /// Plain text: the search box now holds this.
    Query(String),
    /// `/search [text]` starts a scan, or stops the running one.
    Search(Option<String>),
    Stop,
    Open(usize),
    Copy(usize),
    List,
    Help,
    Quit,
    Unknown(String),
}

pub(crate) const HELP_TEXT: &str = "\
type text            show cached folders whose keyword starts with it
/search [text]   /s  scan the root folder (again to stop)
/stop                stop the running scan
/open N              open result N in the file manager
/copy N              copy result N to the clipboard
/list                print the current results
/quit                exit";

pub(crate) fn parse_input(line: &str) -> Input {
    let trimmed = line.trim_start();
    if !trimmed.starts_with('/') {
        return Input::Query(line.trim().to_string());
    }

    let mut parts = trimmed.splitn(2, char::is_whitespace);
    let directive = parts.next().unwrap_or("").to_ascii_lowercase();
    let rest = parts.next().map(str::trim).unwrap_or("");

    match directive.as_str() {
        "/search" | "/s" => {
            if rest.is_empty() {
                Input::Search(None)
            } else {
                Input::Search(Some(rest.to_string()))
            }
        }
        "/stop" => Input::Stop,
        "/open" | "/o" => parse_index(rest)
            .map(Input::Open)
            .unwrap_or_else(|| Input::Unknown(line.trim().to_string())),
        "/copy" | "/c" => parse_index(rest)
            .map(Input::Copy)
            .unwrap_or_else(|| Input::Unknown(line.trim().to_string())),
        "/list" | "/ls" => Input::List,
        "/help" | "/?" => Input::Help,
        "/quit" | "/exit" | "/q" => Input::Quit,
        _ => Input::Unknown(directive),
    }
}

/// 1-based result number as shown in the list.
fn parse_index(raw: &str) -> Option<usize> {
    raw.parse::<usize>().ok().filter(|n| *n > 0)
}
