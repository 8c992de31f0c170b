//! Line-oriented shell over a [`Runtime`].
//!
//! The shell itself does no terminal handling: each input line goes through
//! [`Repl::handle_line`], which writes replies to the given sink. The `jsonlang`
//! binary feeds it from `reedline` or from piped stdin.

use std::collections::BTreeMap;
use std::io::{self, Write};

use nu_ansi_term::Color;
use serde_json::Value as JsonValue;
use strum::{Display, EnumString};
use tracing::debug;

use crate::ast::ASTError;
use crate::config::ReplConfig;
use crate::eval::value::Value;
use crate::runtime::Runtime;
use crate::{InternalResult, JsonLangError};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

const COMMANDS: &str = "quit help reset env var locals func list load run_prog run";

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Command {
    Quit,
    Help,
    Reset,
    Env,
    Var,
    Locals,
    Func,
    List,
    Load,
    RunProg,
    Run,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplAction {
    Continue,
    Quit,
}

pub struct Repl {
    runtime: Runtime,
    env: BTreeMap<String, String>,
}

impl Repl {
    pub fn new(runtime: Runtime, config: &ReplConfig) -> Self {
        let env = BTreeMap::from([
            ("version".to_string(), VERSION.to_string()),
            ("prompt".to_string(), config.prompt.clone()),
            ("colors".to_string(), config.colors.to_string()),
            ("debug".to_string(), config.debug.to_string()),
        ]);
        Self { runtime, env }
    }

    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    pub fn banner(&self) -> String {
        format!("JsonLang v{}", VERSION)
    }

    pub fn prompt(&self) -> String {
        self.env.get("prompt").cloned().unwrap_or_default()
    }

    pub fn env_value(&self, key: &str) -> Option<&str> {
        self.env.get(key).map(String::as_str)
    }

    fn flag(&self, key: &str) -> bool {
        self.env_value(key) == Some("true")
    }

    pub fn colors(&self) -> bool {
        self.flag("colors")
    }

    /// Runs one line and reports any error to `out`; the session survives
    /// everything except a failing sink.
    pub fn handle_line(&mut self, line: &str, out: &mut dyn Write) -> io::Result<ReplAction> {
        match self.execute(line, out) {
            Ok(action) => Ok(action),
            Err(JsonLangError::Io(err)) => Err(err),
            Err(err) => {
                writeln!(out, "{}", format_error(&err, self.colors()))?;
                if self.flag("debug") {
                    writeln!(out, "{:?}", err)?;
                }
                Ok(ReplAction::Continue)
            }
        }
    }

    pub fn execute(&mut self, line: &str, out: &mut dyn Write) -> InternalResult<ReplAction> {
        let (first, rest) = split_word(line);
        if first.is_empty() {
            return Ok(ReplAction::Continue);
        }
        let Ok(command) = first.parse::<Command>() else {
            let value = self.runtime.run_statement(line)?;
            write_result(out, &value)?;
            return Ok(ReplAction::Continue);
        };
        debug!(%command, "shell command");
        let args: Vec<&str> = rest.split_whitespace().collect();
        let args = args.as_slice();

        match command {
            Command::Quit => return Ok(ReplAction::Quit),
            Command::Help => {
                writeln!(out, "{}", self.banner())?;
                writeln!(out, "Interpreter for JsonLang. Type json to execute it")?;
                writeln!(out, "Available commands: {}", COMMANDS)?;
            }
            Command::Reset => self.runtime.reset(),
            Command::Env => self.env_command(args, out)?,
            Command::Var => self.var_command(rest, out)?,
            Command::Locals => {
                writeln!(out, "{}", Value::Map(self.runtime.local_snapshot()))?;
            }
            Command::Func => {
                for (name, function) in self.runtime.functions().entries() {
                    writeln!(out, "{}({})", name, function.signature())?;
                }
            }
            Command::List => {
                for program in self.runtime.programs().list() {
                    writeln!(
                        out,
                        "{}: {} statements, imports [{}]",
                        program.name,
                        program.statements.len(),
                        program.imports.join(", ")
                    )?;
                }
            }
            Command::Load => match args {
                [path] => {
                    let name = self.runtime.load_program_file(path)?;
                    writeln!(out, "loaded program {}", name)?;
                }
                _ => return Err(JsonLangError::usage("usage: load PATH")),
            },
            Command::RunProg => {
                if args.is_empty() {
                    return Err(JsonLangError::usage("usage: run_prog NAME"));
                }
                let value = self.runtime.run_program(&args.join(" "))?;
                write_result(out, &value)?;
            }
            Command::Run => {
                let (name, json) = split_word(rest);
                if name.is_empty() {
                    return Err(JsonLangError::usage("usage: run FUNC [JSON ...]"));
                }
                // Arguments are a stream of JSON values and may contain spaces.
                let values = serde_json::Deserializer::from_str(json)
                    .into_iter::<JsonValue>()
                    .map(|arg| {
                        let arg = arg.map_err(ASTError::from)?;
                        self.runtime.eval_json(&arg)
                    })
                    .collect::<InternalResult<Vec<_>>>()?;
                let value = self.runtime.invoke_function(name, values)?;
                write_result(out, &value)?;
            }
        }
        Ok(ReplAction::Continue)
    }

    fn env_command(&mut self, args: &[&str], out: &mut dyn Write) -> InternalResult<()> {
        match args {
            [] | ["get"] => {
                for (key, value) in &self.env {
                    writeln!(out, "{}: {}", key, value)?;
                }
            }
            ["get", key] => {
                let value = self
                    .env
                    .get(*key)
                    .ok_or_else(|| JsonLangError::usage(format!("unknown env key '{}'", key)))?;
                writeln!(out, "{}", value)?;
            }
            ["set", key, value @ ..] if !value.is_empty() => {
                self.env.insert(key.to_string(), value.join(" "));
            }
            ["set", ..] => return Err(JsonLangError::usage("usage: env set KEY VALUE")),
            _ => return Err(JsonLangError::usage("usage: env [get|set KEY [VALUE]]")),
        }
        Ok(())
    }

    fn var_command(&mut self, rest: &str, out: &mut dyn Write) -> InternalResult<()> {
        let (action, rest) = split_word(rest);
        let (name, json) = split_word(rest);
        match (action, name, json) {
            ("", "", "") => {
                let globals: BTreeMap<_, _> = self.runtime.globals().iter().collect();
                for (name, value) in globals {
                    writeln!(out, "{}: {}", name, value)?;
                }
            }
            ("get", name, "") if !name.is_empty() => {
                let value = self.runtime.get_global(name)?;
                writeln!(out, "{}: {}", name, value)?;
            }
            ("set", name, json) if !name.is_empty() && !json.is_empty() => {
                let json: JsonValue = serde_json::from_str(json).map_err(ASTError::from)?;
                let value = self.runtime.eval_json(&json)?;
                self.runtime.set_global(name, value);
            }
            _ => return Err(JsonLangError::usage("usage: var [get|set NAME [VALUE]]")),
        }
        Ok(())
    }
}

/// Splits off the first word. The remainder keeps its inner spacing.
fn split_word(text: &str) -> (&str, &str) {
    let text = text.trim_start();
    match text.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (text, ""),
    }
}

fn write_result(out: &mut dyn Write, value: &Value) -> InternalResult<()> {
    if *value != Value::Null {
        writeln!(out, "{}", value)?;
    }
    Ok(())
}

/// `ERROR: <Kind>: <message>`, painted red when `colors` is set.
pub fn format_error(err: &JsonLangError, colors: bool) -> String {
    let message = err.report();
    if colors {
        Color::Red.paint(message).to_string()
    } else {
        message
    }
}
