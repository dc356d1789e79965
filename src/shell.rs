//! The interactive menu loop.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use thiserror::Error;

use crate::analysis;
use crate::charts::{self, ChartError, ChartKind};
use crate::config::ChartConfig;
use crate::table::{Origin, TableError, TableStore};

#[derive(Error, Debug)]
pub enum ShellError {
    #[error("Invalid menu choice: {0:?}")]
    InvalidMenuChoice(String),
    #[error("{0}")]
    InvalidOperation(String),
    #[error(transparent)]
    Export(#[from] TableError),
    #[error(transparent)]
    Chart(#[from] ChartError),
    #[error("Console I/O error: {0}")]
    Io(#[from] std::io::Error),
}

const RULE_WIDTH: usize = 57;
const CONTINUE_PROMPT: &str = "Press ENTER to continue...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    TopSongs,
    TopArtists,
    BarChart,
    PieChart,
    BoxPlot,
    Export,
    Exit,
}

impl MenuChoice {
    pub const ALL: [MenuChoice; 7] = [
        Self::TopSongs,
        Self::TopArtists,
        Self::BarChart,
        Self::PieChart,
        Self::BoxPlot,
        Self::Export,
        Self::Exit,
    ];

    /// Parse a line of user input. Anything but 1–7 is an invalid choice.
    pub fn parse(input: &str) -> Result<Self, ShellError> {
        let trimmed = input.trim();
        let invalid = || ShellError::InvalidMenuChoice(trimmed.to_string());
        let n: usize = trimmed.parse().map_err(|_| invalid())?;
        n.checked_sub(1)
            .and_then(|i| Self::ALL.get(i))
            .copied()
            .ok_or_else(invalid)
    }

    pub fn number(&self) -> usize {
        Self::ALL.iter().position(|c| c == self).map_or(0, |i| i + 1)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::TopSongs => "Top 10 Songs",
            Self::TopArtists => "Top 10 Artists",
            Self::BarChart => "Bar Plot - Top 10 Artists Frequency",
            Self::PieChart => "Pie Plot - Top 10 Artists Frequency",
            Self::BoxPlot => "Box Plot - Top 100 Danceability, Energy, & Speechiness",
            Self::Export => "Save to CSV file",
            Self::Exit => "Exit",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellState {
    Menu,
    Viewing,
    Exporting,
    Exited,
}

/// Append `.csv` unless the name already carries it. Empty names are refused.
pub fn export_path(name: &str) -> Result<PathBuf, ShellError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ShellError::InvalidOperation(
            "An export file name is required.".to_string(),
        ));
    }
    if name.to_ascii_lowercase().ends_with(".csv") {
        Ok(PathBuf::from(name))
    } else {
        Ok(PathBuf::from(format!("{name}.csv")))
    }
}

/// One user session over a read-only table.
pub struct Shell<R, W> {
    table: TableStore,
    chart_dir: PathBuf,
    viewer: Option<String>,
    input: R,
    output: W,
    state: ShellState,
}

impl<R: BufRead, W: Write> Shell<R, W> {
    pub fn new(table: TableStore, charts: &ChartConfig, input: R, output: W) -> Self {
        Self {
            table,
            chart_dir: charts.resolve_output_dir(),
            viewer: charts.viewer.clone(),
            input,
            output,
            state: ShellState::Menu,
        }
    }

    pub fn state(&self) -> ShellState {
        self.state
    }

    pub fn table(&self) -> &TableStore {
        &self.table
    }

    /// Loop until the user exits or input ends. Only console I/O failures are
    /// returned; every other error is reported and the menu shown again.
    pub fn run(&mut self) -> Result<(), ShellError> {
        while self.state != ShellState::Exited {
            self.print_menu()?;
            let line = self.prompt("Enter choice: ")?;
            writeln!(self.output)?;

            let result = match line {
                Some(line) => self.step(&line),
                None => {
                    log::debug!("End of input, exiting");
                    self.step(&MenuChoice::Exit.number().to_string())
                }
            };
            if let Err(e) = result {
                self.report(e)?;
            }
        }
        Ok(())
    }

    /// Handle one line of menu input and return the resulting state.
    pub fn step(&mut self, line: &str) -> Result<ShellState, ShellError> {
        let choice = MenuChoice::parse(line)?;
        log::debug!("Menu choice {}", choice.number());

        let result = self.dispatch(choice);
        if self.state != ShellState::Exited {
            self.state = ShellState::Menu;
        }
        result.map(|()| self.state)
    }

    fn dispatch(&mut self, choice: MenuChoice) -> Result<(), ShellError> {
        match choice {
            MenuChoice::TopSongs => {
                self.state = ShellState::Viewing;
                let songs: Vec<String> = analysis::top_10_songs(&self.table)
                    .into_iter()
                    .map(str::to_string)
                    .collect();
                self.print_listing(&songs)
            }
            MenuChoice::TopArtists => {
                self.state = ShellState::Viewing;
                let artists: Vec<String> = analysis::top_10_artists(&self.table)
                    .into_iter()
                    .map(str::to_string)
                    .collect();
                self.print_listing(&artists)
            }
            MenuChoice::BarChart => self.show_chart(ChartKind::Bar),
            MenuChoice::PieChart => self.show_chart(ChartKind::Pie),
            MenuChoice::BoxPlot => self.show_chart(ChartKind::Box),
            MenuChoice::Export => self.export(),
            MenuChoice::Exit => {
                writeln!(self.output, "Exiting...")?;
                self.state = ShellState::Exited;
                Ok(())
            }
        }
    }

    fn print_menu(&mut self) -> Result<(), ShellError> {
        let source = match self.table.origin() {
            Origin::File(path) => path.display().to_string(),
            Origin::Fetched => "None".to_string(),
        };
        let rule = "-".repeat(RULE_WIDTH);

        writeln!(self.output, "{rule}")?;
        writeln!(self.output, "MENU {source}")?;
        writeln!(self.output, "{rule}")?;
        for choice in MenuChoice::ALL {
            writeln!(self.output, "{}. {}", choice.number(), choice.label())?;
        }
        writeln!(self.output, "{rule}")?;
        writeln!(self.output)?;
        Ok(())
    }

    fn print_listing(&mut self, entries: &[String]) -> Result<(), ShellError> {
        for entry in entries {
            writeln!(self.output, "{entry}")?;
        }
        writeln!(self.output)?;
        self.wait_for_enter(CONTINUE_PROMPT)?;
        writeln!(self.output)?;
        Ok(())
    }

    fn show_chart(&mut self, kind: ChartKind) -> Result<(), ShellError> {
        self.state = ShellState::Viewing;
        let path = charts::render(kind, &self.table, &self.chart_dir)?;

        match self.viewer.clone() {
            Some(viewer) => {
                writeln!(self.output, "Opening {}...", path.display())?;
                self.output.flush()?;
                charts::open_in_viewer(&viewer, &path)?;
            }
            None => {
                writeln!(self.output, "Chart saved to {}", path.display())?;
                self.wait_for_enter(CONTINUE_PROMPT)?;
            }
        }
        writeln!(self.output)?;
        Ok(())
    }

    fn export(&mut self) -> Result<(), ShellError> {
        if let Origin::File(path) = self.table.origin() {
            log::debug!("Refusing to export data loaded from {}", path.display());
            return Err(ShellError::InvalidOperation(
                "You are reading from a CSV file.".to_string(),
            ));
        }

        self.state = ShellState::Exporting;
        let name = self.prompt("Enter filename: ")?.unwrap_or_default();
        writeln!(self.output)?;

        let path = export_path(&name)?;
        self.table.export(&path)?;
        writeln!(self.output, "Saved to CSV file...")?;
        writeln!(self.output)?;
        Ok(())
    }

    /// Print a recoverable error and wait for acknowledgment. Console I/O
    /// errors are passed back up.
    fn report(&mut self, err: ShellError) -> Result<(), ShellError> {
        match err {
            ShellError::Io(e) => return Err(ShellError::Io(e)),
            ShellError::InvalidMenuChoice(input) => {
                log::debug!("Invalid menu choice {input:?}");
                self.wait_for_enter(&format!("Error. {CONTINUE_PROMPT}"))?;
            }
            ShellError::InvalidOperation(message) => {
                writeln!(self.output, "Error. {message}")?;
                self.wait_for_enter(CONTINUE_PROMPT)?;
            }
            other => {
                log::warn!("{other}");
                writeln!(self.output, "Error. {other}")?;
                self.wait_for_enter(CONTINUE_PROMPT)?;
            }
        }
        writeln!(self.output)?;
        Ok(())
    }

    fn wait_for_enter(&mut self, text: &str) -> Result<(), ShellError> {
        self.prompt(text)?;
        Ok(())
    }

    /// Print `text` and read one line. `None` at end of input.
    fn prompt(&mut self, text: &str) -> Result<Option<String>, ShellError> {
        write!(self.output, "{text}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }
}
