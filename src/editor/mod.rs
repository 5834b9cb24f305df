//! Interactive and one-shot editing of a recipe's ingredient list.

mod command;

pub use command::{Command, ParseError, USAGE};

use log::{debug, info, warn};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::error::ChefError;
use crate::model::{IngredientEntry, RecipeDocument};

/// Why an edit could not be applied. The document is left unchanged.
#[derive(Debug, Error, PartialEq)]
pub enum EditError {
    #[error("ingredient name cannot be empty")]
    EmptyName,
    #[error("ingredient with ID {0} not found")]
    NotFound(u32),
    #[error("multiplier must be a number of zero or more, got {0}")]
    InvalidMultiplier(f64),
}

/// What a successful edit did
#[derive(Debug, Clone, PartialEq)]
pub enum Applied {
    Added(u32),
    Deleted(u32),
    Modified(u32),
    Scaled {
        scaled: usize,
        /// Entries left untouched because their quantity is not a number
        skipped: Vec<IngredientEntry>,
    },
    Finished,
}

/// Owns the in-memory copy of one recipe file while it is being edited
pub struct Editor {
    path: PathBuf,
    document: RecipeDocument,
}

impl Editor {
    /// Load the recipe at `path` for editing
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ChefError> {
        let path = path.into();
        let document = RecipeDocument::load(&path)?;
        debug!(
            "Opened '{}' with {} ingredients",
            document.recipe_name,
            document.ingredients.len()
        );
        Ok(Self { path, document })
    }

    pub fn new(path: impl Into<PathBuf>, document: RecipeDocument) -> Self {
        Self {
            path: path.into(),
            document,
        }
    }

    pub fn document(&self) -> &RecipeDocument {
        &self.document
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the whole document back to its file
    pub fn save(&self) -> Result<(), ChefError> {
        self.document.save(&self.path)?;
        info!("Saved recipe to {}", self.path.display());
        Ok(())
    }

    /// Apply one command against the current state of the list
    pub fn apply(&mut self, command: Command) -> Result<Applied, EditError> {
        match command {
            Command::Add {
                name,
                quantity,
                unit,
            } => self.add(name, quantity, unit),
            Command::Delete { id } => self.delete(id),
            Command::Modify {
                id,
                quantity,
                unit,
                name,
            } => self.modify(id, quantity, unit, name),
            Command::ModifyAll { multiplier } => self.modify_all(multiplier),
            Command::Done => Ok(Applied::Finished),
        }
    }

    fn add(
        &mut self,
        name: String,
        quantity: Option<String>,
        unit: Option<String>,
    ) -> Result<Applied, EditError> {
        if name.trim().is_empty() {
            return Err(EditError::EmptyName);
        }
        let id = self.document.next_id();
        let mut entry = IngredientEntry::new(id, name);
        entry.quantity = quantity;
        entry.unit = unit;
        self.document.ingredients.push(entry);
        Ok(Applied::Added(id))
    }

    fn delete(&mut self, id: u32) -> Result<Applied, EditError> {
        let position = self
            .document
            .ingredients
            .iter()
            .position(|i| i.id == id)
            .ok_or(EditError::NotFound(id))?;
        self.document.ingredients.remove(position);
        Ok(Applied::Deleted(id))
    }

    fn modify(
        &mut self,
        id: u32,
        quantity: Option<String>,
        unit: Option<String>,
        name: Option<String>,
    ) -> Result<Applied, EditError> {
        if name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(EditError::EmptyName);
        }
        let entry = self.document.find_mut(id).ok_or(EditError::NotFound(id))?;
        if let Some(quantity) = quantity {
            entry.quantity = Some(quantity);
        }
        if let Some(unit) = unit {
            entry.unit = Some(unit);
        }
        if let Some(name) = name {
            entry.name = name;
        }
        Ok(Applied::Modified(id))
    }

    fn modify_all(&mut self, multiplier: f64) -> Result<Applied, EditError> {
        if !multiplier.is_finite() || multiplier < 0.0 {
            return Err(EditError::InvalidMultiplier(multiplier));
        }
        let mut scaled = 0;
        let mut skipped = Vec::new();
        for entry in &mut self.document.ingredients {
            match entry.quantity.as_deref().and_then(parse_quantity) {
                Some(value) => {
                    entry.quantity = Some(format_quantity(value * multiplier));
                    scaled += 1;
                }
                None => skipped.push(entry.clone()),
            }
        }
        Ok(Applied::Scaled { scaled, skipped })
    }

    /// Run the read-eval-print loop until `done` or end of input, then save.
    ///
    /// Malformed commands and failed edits are reported to `output` and the
    /// loop carries on. A failing input stream still saves before the error
    /// is returned.
    pub fn run_session<R: BufRead, W: Write>(
        &mut self,
        mut input: R,
        mut output: W,
    ) -> Result<(), ChefError> {
        self.display(&mut output)?;
        writeln!(
            output,
            "\nUse the following commands to edit this recipe:\n{}",
            USAGE
        )?;

        let read_error = loop {
            write!(output, "> ")?;
            output.flush()?;

            let line = match read_line_lossy(&mut input) {
                Ok(Some(line)) => line,
                Ok(None) => {
                    debug!("End of input, closing edit session");
                    writeln!(output)?;
                    break None;
                }
                Err(e) => {
                    warn!("Reading input failed, closing edit session: {}", e);
                    break Some(e);
                }
            };
            if line.trim().is_empty() {
                continue;
            }

            let command = match Command::parse(&line) {
                Ok(command) => command,
                Err(e) => {
                    writeln!(output, "Invalid command: {}.\n{}", e, USAGE)?;
                    continue;
                }
            };

            match self.apply(command) {
                Ok(Applied::Finished) => break None,
                Ok(applied) => {
                    self.report(&applied, &mut output)?;
                    self.display(&mut output)?;
                }
                Err(e) => {
                    warn!("Edit rejected: {}", e);
                    writeln!(output, "{}", capitalize(&e.to_string()))?;
                }
            }
        };

        self.save()?;
        writeln!(output, "Recipe updated successfully.")?;
        match read_error {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }

    /// Tell the user what an edit did
    pub fn report<W: Write>(&self, applied: &Applied, output: &mut W) -> std::io::Result<()> {
        match applied {
            Applied::Added(id) => writeln!(output, "Added ingredient with ID {}.", id),
            Applied::Deleted(id) => writeln!(output, "Deleted ingredient with ID {}.", id),
            Applied::Modified(id) => writeln!(output, "Updated ingredient with ID {}.", id),
            Applied::Scaled { scaled, skipped } => {
                for entry in skipped {
                    writeln!(
                        output,
                        "Skipping non-numeric quantity for {} ({}).",
                        entry.name,
                        entry.quantity.as_deref().unwrap_or("none")
                    )?;
                }
                writeln!(output, "Scaled {} quantities.", scaled)
            }
            Applied::Finished => Ok(()),
        }
    }

    /// Print the current list: id, name, quantity, unit
    pub fn display<W: Write>(&self, output: &mut W) -> std::io::Result<()> {
        writeln!(output, "\nCurrent ingredients for {}:", self.document.recipe_name)?;
        if self.document.ingredients.is_empty() {
            writeln!(output, "  (none)")?;
        }
        for entry in &self.document.ingredients {
            writeln!(output, "  {}", entry)?;
        }
        Ok(())
    }
}

/// Read one line without its line ending; `None` at end of input.
/// Bytes that are not UTF-8 are replaced rather than failing the read.
pub(crate) fn read_line_lossy<R: BufRead>(input: &mut R) -> std::io::Result<Option<String>> {
    let mut buf = Vec::new();
    if input.read_until(b'\n', &mut buf)? == 0 {
        return Ok(None);
    }
    let line = String::from_utf8_lossy(&buf);
    Ok(Some(line.trim_end_matches(['\n', '\r']).to_string()))
}

fn parse_quantity(quantity: &str) -> Option<f64> {
    quantity
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Round to two decimals and drop trailing zeros: 3.0 -> "3", 0.125 -> "0.13"
pub fn format_quantity(value: f64) -> String {
    // Adding zero turns -0.0 into 0.0
    let rounded = (value * 100.0).round() / 100.0 + 0.0;
    let text = format!("{:.2}", rounded);
    let trimmed = text.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() || trimmed == "-" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

fn capitalize(message: &str) -> String {
    let mut chars = message.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
