use std::fs;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;

use scribe_core::{FileBlob, Msg};
use scribe_logging::scribe_debug;

use super::app::AppEvent;

pub const HELP: &str = "\
commands:
  submit <file> [language]   upload a file (language defaults to en)
  cancel                     cancel the running transcription
  repeat                     clear the result and start over
  download                   open the download link of the last result
  help                       show this text
  quit                       exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Submit { path: PathBuf, language: String },
    Cancel,
    Repeat,
    Download,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("unknown command '{0}' (try 'help')")]
    Unknown(String),
    #[error("usage: submit <file> [language]")]
    MissingFile,
    #[error("'{0}' takes no arguments")]
    UnexpectedArgument(String),
}

pub fn parse_command(line: &str) -> Result<Option<Command>, CommandError> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(None);
    };
    let rest: Vec<&str> = words.collect();

    let command = match head.to_ascii_lowercase().as_str() {
        "submit" | "s" => {
            let path = rest.first().ok_or(CommandError::MissingFile)?;
            if rest.len() > 2 {
                return Err(CommandError::UnexpectedArgument(head.to_string()));
            }
            Command::Submit {
                path: PathBuf::from(path),
                language: rest.get(1).unwrap_or(&"en").to_string(),
            }
        }
        other => {
            let command = match other {
                "cancel" | "c" => Command::Cancel,
                "repeat" | "r" => Command::Repeat,
                "download" | "d" => Command::Download,
                "help" | "h" | "?" => Command::Help,
                "quit" | "q" | "exit" => Command::Quit,
                _ => return Err(CommandError::Unknown(head.to_string())),
            };
            if !rest.is_empty() {
                return Err(CommandError::UnexpectedArgument(head.to_string()));
            }
            command
        }
    };
    Ok(Some(command))
}

/// Reads an upload from disk, naming it after the file.
pub fn read_file(path: &Path) -> io::Result<FileBlob> {
    let bytes = fs::read(path)?;
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());
    Ok(FileBlob { name, bytes })
}

/// Turns a parsed command into the event the application loop consumes.
pub fn command_to_event(command: Command) -> AppEvent {
    match command {
        Command::Submit { path, language } => match read_file(&path) {
            Ok(file) => AppEvent::Core(Msg::SubmitClicked { file, language }),
            Err(err) => AppEvent::InputError(format!("cannot read {}: {err}", path.display())),
        },
        Command::Cancel => AppEvent::Core(Msg::CancelClicked),
        Command::Repeat => AppEvent::Core(Msg::RepeatClicked),
        Command::Download => AppEvent::Core(Msg::DownloadClicked),
        Command::Help => AppEvent::Help,
        Command::Quit => AppEvent::Quit,
    }
}

/// Feeds stdin lines into the application queue until EOF or `quit`.
pub fn spawn_stdin_reader(events: mpsc::Sender<AppEvent>) {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let event = match line {
                Ok(line) => match parse_command(&line) {
                    Ok(Some(command)) => command_to_event(command),
                    Ok(None) => continue,
                    Err(err) => AppEvent::InputError(err.to_string()),
                },
                Err(err) => AppEvent::InputError(format!("stdin: {err}")),
            };
            let quitting = matches!(event, AppEvent::Quit);
            if events.send(event).is_err() || quitting {
                return;
            }
        }
        scribe_debug!("stdin closed");
        let _ = events.send(AppEvent::Quit);
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn submit_defaults_language() {
        assert_eq!(
            parse_command("submit talk.wav").unwrap(),
            Some(Command::Submit {
                path: PathBuf::from("talk.wav"),
                language: "en".into()
            })
        );
        assert_eq!(
            parse_command("  s talk.wav pt ").unwrap(),
            Some(Command::Submit {
                path: PathBuf::from("talk.wav"),
                language: "pt".into()
            })
        );
    }

    #[test]
    fn blank_line_is_ignored() {
        assert_eq!(parse_command("   ").unwrap(), None);
    }

    #[test]
    fn bad_input_is_reported() {
        assert_eq!(parse_command("submit"), Err(CommandError::MissingFile));
        assert_eq!(
            parse_command("cancel now"),
            Err(CommandError::UnexpectedArgument("cancel".into()))
        );
        assert_eq!(
            parse_command("launch"),
            Err(CommandError::Unknown("launch".into()))
        );
    }

    #[test]
    fn read_file_names_blob_after_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memo.mp3");
        fs::File::create(&path).unwrap().write_all(b"abc").unwrap();

        let blob = read_file(&path).unwrap();
        assert_eq!(blob.name, "memo.mp3");
        assert_eq!(blob.bytes, b"abc");
    }

    #[test]
    fn unreadable_file_becomes_input_error() {
        let event = command_to_event(Command::Submit {
            path: PathBuf::from("/definitely/not/here.wav"),
            language: "en".into(),
        });
        assert!(matches!(event, AppEvent::InputError(_)));
    }
}
