use log::{debug, info, warn};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ChefError;
use crate::model::{MergedIngredient, MergedShoppingList};

/// File the merged list is written to
pub const MERGED_FILE_NAME: &str = "mergedlist.json";
/// File the consolidated shopping list is written to
pub const SHOPPING_LIST_FILE_NAME: &str = "final_shopping_list.json";

/// True for per-recipe documents: `.json` files other than the merge outputs
pub fn is_recipe_file(path: &Path) -> bool {
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    is_json && name != MERGED_FILE_NAME && name != SHOPPING_LIST_FILE_NAME
}

/// Per-recipe documents in `directory`, ordered by file name
pub fn recipe_files(directory: &Path) -> Result<Vec<PathBuf>, ChefError> {
    let mut files = Vec::new();
    for entry in fs::read_dir(directory)? {
        let path = entry?.path();
        if path.is_file() && is_recipe_file(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Read the `ingredients` of one recipe file. Anything unreadable counts as
/// no ingredients so one bad file never spoils the whole merge.
fn read_ingredients(path: &Path) -> Vec<MergedIngredient> {
    let value: Value = match fs::read_to_string(path)
        .map_err(ChefError::from)
        .and_then(|s| serde_json::from_str(&s).map_err(ChefError::from))
    {
        Ok(value) => value,
        Err(e) => {
            warn!("Skipping {}: {}", path.display(), e);
            return Vec::new();
        }
    };

    let items = match value.get("ingredients") {
        Some(Value::Array(items)) => items.clone(),
        _ => {
            warn!("{} has no ingredients list", path.display());
            return Vec::new();
        }
    };

    items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match MergedIngredient::from_value(item) {
            Ok(ingredient) => Some(ingredient),
            Err(e) => {
                warn!(
                    "Skipping ingredient #{} in {}: {}",
                    index + 1,
                    path.display(),
                    e
                );
                None
            }
        })
        .collect()
}

/// Concatenate ingredients and sort them by aisle, then name, ignoring case.
/// The sort is stable, so ties keep their input order.
pub fn merge_ingredients<I>(ingredients: I) -> MergedShoppingList
where
    I: IntoIterator<Item = MergedIngredient>,
{
    let mut ingredients: Vec<MergedIngredient> = ingredients.into_iter().collect();
    ingredients.sort_by_cached_key(MergedIngredient::sort_key);
    MergedShoppingList { ingredients }
}

/// Merge every recipe file in `directory` and write `mergedlist.json` there.
///
/// Quantities are not summed here; that is the consolidator's job.
pub fn merge_all(directory: &Path) -> Result<MergedShoppingList, ChefError> {
    let files = recipe_files(directory)?;
    debug!("Merging {} recipe files from {}", files.len(), directory.display());

    let merged = merge_ingredients(files.iter().flat_map(|path| read_ingredients(path)));

    let output = directory.join(MERGED_FILE_NAME);
    merged.save(&output)?;
    info!(
        "Merged {} ingredients into {}",
        merged.ingredients.len(),
        output.display()
    );
    Ok(merged)
}
