// Interactive re-filter loop: one query per input line.
//
// The grid is decoded once; every line re-runs filter and aggregate on the
// session's records. `:reload` goes back through the cache, so an unchanged
// file is never decoded twice.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use supsum_io::{write_report, SheetCache};
use supsum_pipeline::{HeaderLabels, Session};

use crate::display::{empty_message, render_summary};
use crate::load::{open_session, InputArgs};
use crate::CliError;

const HELP: &str = "\
Type a search term to filter by supplier name or TIN; an empty line shows all.
  :export [PATH]  write the current view as xlsx
  :reload         re-read the file (cached when unchanged)
  :help           this text
  :quit           leave";

pub struct Browser<'a> {
    cache: &'a mut SheetCache,
    labels: &'a HeaderLabels,
    input: &'a InputArgs,
    default_export: PathBuf,
    session: Session,
    query: String,
    color: bool,
}

enum Step {
    Continue,
    Quit,
}

impl<'a> Browser<'a> {
    pub fn open(
        cache: &'a mut SheetCache,
        labels: &'a HeaderLabels,
        input: &'a InputArgs,
        default_export: PathBuf,
        color: bool,
    ) -> Result<Self, CliError> {
        let session = open_session(cache, labels, input)?;
        Ok(Self { cache, labels, input, default_export, session, query: String::new(), color })
    }

    /// Show the full view, then handle `lines` until EOF or `:quit`.
    pub fn run<R: BufRead, W: Write>(&mut self, lines: R, out: &mut W, prompt: bool) -> Result<(), CliError> {
        self.show(out)?;
        if prompt {
            eprint!("> ");
        }
        for line in lines.lines() {
            let line = line.map_err(|e| CliError::io(e.to_string()))?;
            if let Step::Quit = self.handle(line.trim(), out)? {
                break;
            }
            if prompt {
                eprint!("> ");
            }
        }
        Ok(())
    }

    fn handle<W: Write>(&mut self, line: &str, out: &mut W) -> Result<Step, CliError> {
        let Some(command) = line.strip_prefix(':') else {
            self.query = line.to_string();
            self.show(out)?;
            return Ok(Step::Continue);
        };

        let (name, arg) = match command.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (command, ""),
        };
        match name {
            "q" | "quit" | "exit" => return Ok(Step::Quit),
            "help" | "h" => writeln!(out, "{}", HELP).map_err(|e| CliError::io(e.to_string()))?,
            "export" => {
                let path = if arg.is_empty() { self.default_export.clone() } else { PathBuf::from(arg) };
                self.export(&path, out)?;
            }
            "reload" => self.reload(out)?,
            other => {
                writeln!(out, "unknown command :{} (try :help)", other).map_err(|e| CliError::io(e.to_string()))?
            }
        }
        Ok(Step::Continue)
    }

    fn show<W: Write>(&self, out: &mut W) -> Result<(), CliError> {
        let summary = self.session.view(&self.query);
        let text = match empty_message(&summary) {
            Some(message) => format!("{}\n", message),
            None => render_summary(&summary, self.color),
        };
        out.write_all(text.as_bytes()).map_err(|e| CliError::io(e.to_string()))?;
        out.flush().map_err(|e| CliError::io(e.to_string()))
    }

    fn export<W: Write>(&self, path: &Path, out: &mut W) -> Result<(), CliError> {
        let summary = self.session.view(&self.query);
        // A failed write is reported and the loop keeps going.
        let message = match write_report(&summary.report(), path) {
            Ok(()) => format!("wrote {} ({} entries)", path.display(), summary.entry_count),
            Err(e) => format!("error: {}", e),
        };
        writeln!(out, "{}", message).map_err(|e| CliError::io(e.to_string()))
    }

    fn reload<W: Write>(&mut self, out: &mut W) -> Result<(), CliError> {
        match open_session(self.cache, self.labels, self.input) {
            Ok(session) => {
                if Rc::ptr_eq(session.grid(), self.session.grid()) {
                    log::info!("{} unchanged", self.input.file.display());
                }
                self.session = session;
                self.show(out)
            }
            Err(e) => writeln!(out, "error: {}", e.message).map_err(|e| CliError::io(e.to_string())),
        }
    }
}
