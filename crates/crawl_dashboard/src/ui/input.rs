use crawl_core::{Command, JobId};
use thiserror::Error;

/// One line of operator input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Command(Command),
    List,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("nothing entered")]
    Empty,
    #[error("unknown command `{0}`")]
    Unknown(String),
    #[error("`add` needs a URL")]
    MissingUrl,
    #[error("`{0}` needs a job id")]
    MissingId(&'static str),
    #[error("`{0}` is not a valid job id")]
    InvalidId(String),
    #[error("`{0}` takes no arguments")]
    UnexpectedArgument(&'static str),
}

pub fn parse_input(line: &str) -> Result<Input, InputError> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    match word.to_ascii_lowercase().as_str() {
        "" => Err(InputError::Empty),
        "add" | "submit" => {
            if rest.is_empty() {
                Err(InputError::MissingUrl)
            } else {
                Ok(Input::Command(Command::Submit {
                    url: rest.to_string(),
                }))
            }
        }
        "start" => parse_id("start", rest).map(|id| Input::Command(Command::Start(id))),
        "stop" => parse_id("stop", rest).map(|id| Input::Command(Command::Stop(id))),
        "delete" | "rm" => parse_id("delete", rest).map(|id| Input::Command(Command::Delete(id))),
        "reanalyze" => {
            parse_id("reanalyze", rest).map(|id| Input::Command(Command::Reanalyze(id)))
        }
        "details" | "show" => {
            parse_id("details", rest).map(|id| Input::Command(Command::Details(id)))
        }
        "refresh" => no_arguments("refresh", rest, Input::Command(Command::Refresh)),
        "list" | "ls" => no_arguments("list", rest, Input::List),
        "help" | "?" => Ok(Input::Help),
        "quit" | "exit" => Ok(Input::Quit),
        other => Err(InputError::Unknown(other.to_string())),
    }
}

fn parse_id(command: &'static str, rest: &str) -> Result<JobId, InputError> {
    if rest.is_empty() {
        return Err(InputError::MissingId(command));
    }
    rest.parse::<JobId>()
        .map_err(|_| InputError::InvalidId(rest.to_string()))
}

fn no_arguments(command: &'static str, rest: &str, input: Input) -> Result<Input, InputError> {
    if rest.is_empty() {
        Ok(input)
    } else {
        Err(InputError::UnexpectedArgument(command))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_commands_parse() {
        assert_eq!(
            parse_input("  add https://example.com  "),
            Ok(Input::Command(Command::Submit {
                url: "https://example.com".to_string()
            }))
        );
        assert_eq!(parse_input("start 3"), Ok(Input::Command(Command::Start(3))));
        assert_eq!(parse_input("STOP 3"), Ok(Input::Command(Command::Stop(3))));
        assert_eq!(parse_input("delete 4"), Ok(Input::Command(Command::Delete(4))));
        assert_eq!(
            parse_input("reanalyze\t5"),
            Ok(Input::Command(Command::Reanalyze(5)))
        );
        assert_eq!(parse_input("refresh"), Ok(Input::Command(Command::Refresh)));
        assert_eq!(parse_input("details 6"), Ok(Input::Command(Command::Details(6))));
        assert_eq!(parse_input("show 6"), Ok(Input::Command(Command::Details(6))));
    }

    #[test]
    fn local_commands_parse() {
        assert_eq!(parse_input("list"), Ok(Input::List));
        assert_eq!(parse_input("help"), Ok(Input::Help));
        assert_eq!(parse_input("quit"), Ok(Input::Quit));
    }

    #[test]
    fn malformed_input_is_reported() {
        assert_eq!(parse_input("   "), Err(InputError::Empty));
        assert_eq!(parse_input("add"), Err(InputError::MissingUrl));
        assert_eq!(parse_input("stop"), Err(InputError::MissingId("stop")));
        assert_eq!(parse_input("details"), Err(InputError::MissingId("details")));
        assert_eq!(
            parse_input("start abc"),
            Err(InputError::InvalidId("abc".to_string()))
        );
        assert_eq!(
            parse_input("start -1"),
            Err(InputError::InvalidId("-1".to_string()))
        );
        assert_eq!(
            parse_input("refresh now"),
            Err(InputError::UnexpectedArgument("refresh"))
        );
        assert_eq!(
            parse_input("crawl 1"),
            Err(InputError::Unknown("crawl".to_string()))
        );
    }
}
