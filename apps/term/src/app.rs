use std::io::{self, Write};

use foldcore_shell::ShellActions;
use foldd::{SearchCoordinator, UiUpdate};

use crate::commands::{parse_input, Input, HELP_TEXT};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Flow {
    Continue,
    Quit,
}

/// Terminal stand-in for the result list and status line.
pub(crate) struct App<S, W> {
    coordinator: SearchCoordinator,
    shell: S,
    out: W,
    query: String,
    items: Vec<String>,
    last_status: String,
}

impl<S: ShellActions, W: Write> App<S, W> {
    pub(crate) fn new(coordinator: SearchCoordinator, shell: S, out: W) -> Self {
        Self {
            coordinator,
            shell,
            out,
            query: String::new(),
            items: Vec::new(),
            last_status: String::new(),
        }
    }

    pub(crate) fn handle_line(&mut self, line: &str) -> io::Result<Flow> {
        match parse_input(line) {
            Input::Query(text) => {
                self.query = text;
                let update = self.coordinator.refresh_from_cache(&self.query);
                self.apply(update)?;
            }
            Input::Search(text) => {
                if let Some(text) = text {
                    self.query = text;
                }
                self.on_search_action()?;
            }
            Input::Stop => {
                if self.coordinator.is_searching() {
                    let update = self.coordinator.toggle_search();
                    self.apply(update)?;
                } else {
                    writeln!(self.out, "no search is running")?;
                }
            }
            Input::Open(n) => self.with_selected(n, |shell, path| shell.open_folder(path))?,
            Input::Copy(n) => {
                self.with_selected(n, |shell, path| shell.copy_path(path))?;
            }
            Input::List => self.print_items()?,
            Input::Help => writeln!(self.out, "{HELP_TEXT}")?,
            Input::Quit => return Ok(Flow::Quit),
            Input::Unknown(token) => {
                writeln!(self.out, "unknown command: {token} (try /help)")?;
            }
        }
        Ok(Flow::Continue)
    }

    /// Timer callback: drains scan events into the view.
    pub(crate) fn on_tick(&mut self) -> io::Result<()> {
        let update = self.coordinator.poll();
        if update.is_empty() && !self.status_changed(&update) {
            return Ok(());
        }
        self.apply(update)
    }

    pub(crate) fn is_searching(&self) -> bool {
        self.coordinator.is_searching()
    }

    fn on_search_action(&mut self) -> io::Result<()> {
        // One control, two meanings: the view decides from what it shows.
        if self.coordinator.is_searching() {
            let update = self.coordinator.toggle_search();
            return self.apply(update);
        }

        match self.coordinator.start_search(&self.query) {
            Ok(update) => self.apply(update),
            Err(err) => writeln!(self.out, "warning: {err}"),
        }
    }

    fn with_selected<F>(&mut self, n: usize, action: F) -> io::Result<()>
    where
        F: FnOnce(&S, &str) -> Result<(), foldcore_shell::ShellError>,
    {
        let Some(path) = self.items.get(n - 1) else {
            return writeln!(self.out, "no result #{n} ({} shown)", self.items.len());
        };

        match action(&self.shell, path) {
            Ok(()) => writeln!(self.out, "ok: {path}"),
            Err(err) => {
                tracing::warn!(%path, "shell action failed: {err}");
                writeln!(self.out, "error: {err}")
            }
        }
    }

    fn apply(&mut self, update: UiUpdate) -> io::Result<()> {
        if update.reset {
            self.items.clear();
        }
        for path in update.appended_paths {
            writeln!(self.out, "{:>4}  {path}", self.items.len() + 1)?;
            self.items.push(path);
        }
        for notice in &update.notices {
            writeln!(self.out, "! {notice}")?;
        }
        if !update.status_text.is_empty() {
            writeln!(self.out, "-- {}", update.status_text)?;
        }
        self.last_status = update.status_text;
        Ok(())
    }

    fn status_changed(&self, update: &UiUpdate) -> bool {
        self.last_status != update.status_text
    }

    fn print_items(&mut self) -> io::Result<()> {
        if self.items.is_empty() {
            return writeln!(self.out, "(no results)");
        }
        for (i, path) in self.items.iter().enumerate() {
            writeln!(self.out, "{:>4}  {path}", i + 1)?;
        }
        Ok(())
    }
}
