use log::{error, info, warn};
use std::fs;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use crate::config::AppConfig;
use crate::consolidate::Consolidator;
use crate::editor::{read_line_lossy, Editor};
use crate::error::ChefError;
use crate::extract::{Extraction, RecipeSource, TextExtractor};
use crate::merge;
use crate::model::ShoppingList;
use crate::normalize::{recipe_name_from_filename, Normalizer};
use crate::providers::ProviderFactory;
use crate::workspace::Workspace;

const SOURCE_PROMPT: &str = "Enter a recipe URL or file path (press Enter to finish): ";
const EDIT_PROMPT: &str = "Would you like to edit the ingredients of this recipe? (y/n): ";

/// The whole recipe to shopping list workflow
pub struct Pipeline {
    workspace: Workspace,
    extractor: TextExtractor,
    normalizer: Normalizer,
    consolidator: Consolidator,
}

impl Pipeline {
    /// Build every stage from configuration, using the default LLM provider
    pub fn new(config: &AppConfig) -> Result<Self, ChefError> {
        Ok(Self {
            workspace: Workspace::new(&config.workspace),
            extractor: TextExtractor::new(config)?,
            normalizer: Normalizer::new(ProviderFactory::default_provider(config)?),
            consolidator: Consolidator::new(ProviderFactory::default_provider(config)?),
        })
    }

    pub fn from_parts(
        workspace: Workspace,
        extractor: TextExtractor,
        normalizer: Normalizer,
        consolidator: Consolidator,
    ) -> Self {
        Self {
            workspace,
            extractor,
            normalizer,
            consolidator,
        }
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Extract, normalize and store one recipe.
    ///
    /// Writes `<slug>.txt` and `<slug>.json` to the temp directory and returns
    /// the path of the recipe document, or `None` when the source held no
    /// recipe text.
    pub async fn process_recipe(
        &self,
        source: &RecipeSource,
    ) -> Result<Option<PathBuf>, ChefError> {
        let text = match self.extractor.extract(source).await? {
            Extraction::Found(text) => text,
            Extraction::NotFound => {
                println!("No recipe text could be found in {}.", source);
                return Ok(None);
            }
        };

        let slug = source.slug();
        fs::create_dir_all(self.workspace.temp_dir())?;
        let text_path = self.workspace.recipe_text_path(&slug);
        fs::write(&text_path, &text)?;
        info!("Saved recipe text to {}", text_path.display());

        let fallback_name = recipe_name_from_filename(Path::new(&slug));
        let document = self.normalizer.normalize(&text, &fallback_name).await?;

        let recipe_path = self.workspace.recipe_path(&slug);
        document.save(&recipe_path)?;
        println!(
            "Saved '{}' with {} ingredients to {}",
            document.recipe_name,
            document.ingredients.len(),
            recipe_path.display()
        );
        Ok(Some(recipe_path))
    }

    /// Merge the recipe files in the temp directory, consolidate them and
    /// save the shopping list. `None` when there is nothing to merge.
    pub async fn build_shopping_list(&self) -> Result<Option<ShoppingList>, ChefError> {
        if self.workspace.recipe_files()?.is_empty() {
            return Ok(None);
        }
        let merged = merge::merge_all(self.workspace.temp_dir())?;
        let list = self.consolidator.consolidate(&merged).await?;
        let path = self.workspace.shopping_list_path();
        list.save(&path)?;
        info!("Saved shopping list to {}", path.display());
        Ok(Some(list))
    }

    /// Interactive session: collect recipes one at a time, offer to edit each
    /// one, then print the shopping list and archive the working files.
    pub async fn run_interactive<R: BufRead, W: Write>(
        &self,
        mut input: R,
        mut output: W,
    ) -> Result<(), ChefError> {
        self.workspace.ensure()?;

        loop {
            let line = match prompt(&mut input, &mut output, SOURCE_PROMPT) {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) => {
                    warn!("Reading input failed, finishing the run: {}", e);
                    break;
                }
            };
            let line = line.trim();
            if line.is_empty() {
                break;
            }

            let source = match RecipeSource::parse(line) {
                Ok(source) => source,
                Err(e) => {
                    writeln!(output, "{}", e)?;
                    continue;
                }
            };

            let recipe_path = match self.process_recipe(&source).await {
                Ok(Some(path)) => path,
                Ok(None) => continue,
                Err(e) => {
                    error!("Failed to process {}: {}", source, e);
                    writeln!(output, "Could not process {}: {}", source, e)?;
                    continue;
                }
            };

            let wants_edit = confirm(&mut input, &mut output, EDIT_PROMPT).unwrap_or_else(|e| {
                warn!("Reading input failed: {}", e);
                false
            });
            if wants_edit {
                let session = Editor::open(&recipe_path)
                    .and_then(|mut editor| editor.run_session(&mut input, &mut output));
                if let Err(e) = session {
                    warn!("Editing {} failed: {}", recipe_path.display(), e);
                    writeln!(output, "Could not edit {}: {}", recipe_path.display(), e)?;
                }
            }
        }

        match self.build_shopping_list().await {
            Ok(Some(list)) => writeln!(output, "\nShopping list:\n\n{}", list)?,
            Ok(None) => writeln!(output, "No recipes were processed, nothing to shop for.")?,
            Err(e) => {
                error!("Failed to build the shopping list: {}", e);
                writeln!(output, "Could not build the shopping list: {}", e)?;
            }
        }

        let archived = self.workspace.archive()?;
        info!("Archived {} working files", archived);
        Ok(())
    }
}

/// Print `message` and read one line; `None` at end of input
fn prompt<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    message: &str,
) -> Result<Option<String>, ChefError> {
    write!(output, "{}", message)?;
    output.flush()?;
    let line = read_line_lossy(input)?;
    if line.is_none() {
        writeln!(output)?;
    }
    Ok(line)
}

/// Ask a yes/no question until answered. End of input counts as no.
fn confirm<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    message: &str,
) -> Result<bool, ChefError> {
    loop {
        let Some(answer) = prompt(input, output, message)? else {
            return Ok(false);
        };
        match answer.trim().to_lowercase().as_str() {
            "y" | "yes" => return Ok(true),
            "n" | "no" => return Ok(false),
            _ => writeln!(output, "Please answer 'y' or 'n'.")?,
        }
    }
}
