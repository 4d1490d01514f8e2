//! REPL session: file commands plus printing of engine outcomes.

use anyhow::Context;
use std::fs;
use std::io::Write;
use std::path::Path;
use tally_calc::lexer::tokenize;
use tally_calc::token::TokenType;
use tally_calc::{Engine, Outcome};

/// What the read loop should do after a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Commands handled by the host rather than the engine.
#[derive(Debug, PartialEq)]
enum HostCommand<'a> {
    Save(&'a str),
    Open(&'a str),
    Quit,
}

pub struct Session {
    engine: Engine,
    json: bool,
}

impl Session {
    pub fn new(engine: Engine, json: bool) -> Self {
        Self { engine, json }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Handle one input line, writing any output to `out`.
    pub fn handle(&mut self, line: &str, out: &mut impl Write) -> anyhow::Result<Flow> {
        let tokens = tokenize(line);
        let host_command = match tokens.as_slice() {
            [command, rest @ ..] if command.token_type == TokenType::Command => {
                let arguments: Vec<&str> = rest
                    .iter()
                    .filter(|t| t.token_type == TokenType::CommandArg)
                    .map(|t| t.value.as_str())
                    .collect();
                match (command.value.as_str(), arguments.as_slice()) {
                    ("save", [path]) => Some(HostCommand::Save(path)),
                    ("open", [path]) => Some(HostCommand::Open(path)),
                    ("quit" | "q", []) => Some(HostCommand::Quit),
                    ("save" | "open", _) => {
                        writeln!(out, "Error: usage: :{} <path>", command.value)?;
                        return Ok(Flow::Continue);
                    }
                    _ => None,
                }
            }
            _ => None,
        };

        match host_command {
            Some(HostCommand::Quit) => Ok(Flow::Quit),
            Some(HostCommand::Save(path)) => {
                if let Err(err) = self.save(Path::new(path)) {
                    tracing::warn!(path, error = %err, "save failed");
                    writeln!(out, "Error: {err:#}")?;
                }
                Ok(Flow::Continue)
            }
            Some(HostCommand::Open(path)) => {
                match fs::read_to_string(path).with_context(|| format!("Failed to read {path}")) {
                    Ok(text) => {
                        self.engine.clear();
                        self.replay(&text, out)?;
                    }
                    Err(err) => {
                        tracing::warn!(path, error = %err, "open failed");
                        writeln!(out, "Error: {err:#}")?;
                    }
                }
                Ok(Flow::Continue)
            }
            None => {
                let outcome = self.engine.evaluate_line(line);
                self.print(line, &outcome, out)?;
                Ok(Flow::Continue)
            }
        }
    }

    /// Evaluate every line of `text` in order.
    pub fn replay(&mut self, text: &str, out: &mut impl Write) -> anyhow::Result<Flow> {
        for line in text.lines() {
            if self.handle(line, out)? == Flow::Quit {
                return Ok(Flow::Quit);
            }
        }
        Ok(Flow::Continue)
    }

    /// Write the raw input of every stored line, one per line.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let mut text = String::new();
        for line in self.engine.lines() {
            text.push_str(&line.input);
            text.push('\n');
        }
        fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::info!(path = %path.display(), lines = self.engine.lines().len(), "session saved");
        Ok(())
    }

    fn print(&self, input: &str, outcome: &Outcome, out: &mut impl Write) -> anyhow::Result<()> {
        let precision = self.engine.settings().precision;
        if self.json {
            if outcome.is_silent() {
                return Ok(());
            }
            let record = serde_json::json!({
                "input": input,
                "value": outcome.value(),
                "display": outcome.render(precision),
                "error": match outcome {
                    Outcome::Failure(_) => Some(outcome.message()),
                    _ => None,
                },
            });
            writeln!(out, "{record}")?;
        } else if let Some(text) = outcome.render(precision) {
            writeln!(out, "{text}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(session: &mut Session, text: &str) -> String {
        let mut out = Vec::new();
        session.replay(text, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_prints_results_and_errors() {
        let mut session = Session::new(Engine::default(), false);
        let output = run(&mut session, "x = 4\nx * 2\n// note\n1 / 0\n");
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], "4.00");
        assert_eq!(lines[1], "8.00");
        assert!(lines[2].starts_with("Error: "));
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_quit_stops_replay() {
        let mut session = Session::new(Engine::default(), false);
        let mut out = Vec::new();
        let flow = session.replay("1\n:q\n2\n", &mut out).unwrap();
        assert_eq!(flow, Flow::Quit);
        assert_eq!(session.engine().lines().len(), 1);
    }

    #[test]
    fn test_json_output() {
        let mut session = Session::new(Engine::default(), true);
        let output = run(&mut session, "2 + 3");
        let record: serde_json::Value = serde_json::from_str(output.trim()).unwrap();
        assert_eq!(record["input"], "2 + 3");
        assert_eq!(record["display"], "5.00");
        assert_eq!(record["value"]["type"], "number");
        assert!(record["error"].is_null());
    }

    #[test]
    fn test_save_and_open() {
        let path = std::env::temp_dir().join(format!("tally-session-{}.txt", std::process::id()));
        let mut session = Session::new(Engine::default(), false);
        run(&mut session, "a = 2\na * 10");
        run(&mut session, &format!(":save {}", path.display()));

        let mut restored = Session::new(Engine::default(), false);
        run(&mut restored, "junk = 1\njunk");
        let output = run(&mut restored, &format!(":open {}", path.display()));
        assert_eq!(output, "2.00\n20.00\n");
        assert_eq!(restored.engine().lines().len(), 2);
        assert!(restored.engine().environment().get("junk").is_none());

        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_open_missing_file_reports_error() {
        let mut session = Session::new(Engine::default(), false);
        let output = run(&mut session, ":open /nonexistent/tally/file.txt");
        assert!(output.starts_with("Error: Failed to read"));
    }
}
