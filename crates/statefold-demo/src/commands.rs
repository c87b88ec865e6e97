//! Parsing of interactive commands

use crate::reducers::{ADD_TODO, DECREMENT, INCREMENT, TOGGLE_TODO};
use statefold::Action;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Dispatch(Action),
    ShowState,
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  inc            increment the counter
  dec            decrement the counter
  add <text>     add a todo
  toggle <n>     toggle todo number n (starting at 1)
  state          print the current state
  help           show this help
  quit           exit";

/// Parse one input line
pub fn parse(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    match word {
        "inc" | "+" => Ok(Command::Dispatch(Action::new(INCREMENT))),
        "dec" | "-" => Ok(Command::Dispatch(Action::new(DECREMENT))),
        "add" if !rest.is_empty() => Ok(Command::Dispatch(
            Action::new(ADD_TODO).with("text", rest),
        )),
        "add" => Err("add needs a text".to_string()),
        "toggle" => {
            let number: u64 = rest
                .parse()
                .map_err(|_| format!("not a todo number: \"{}\"", rest))?;
            if number == 0 {
                return Err("todo numbers start at 1".to_string());
            }
            Ok(Command::Dispatch(
                Action::new(TOGGLE_TODO).with("index", number - 1),
            ))
        }
        "state" => Ok(Command::ShowState),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" | "q" => Ok(Command::Quit),
        other => Err(format!("unknown command \"{}\", try help", other)),
    }
}
