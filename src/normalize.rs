use log::{debug, info};
use serde_json::Value;
use std::path::Path;

use crate::error::ChefError;
use crate::model::RecipeDocument;
use crate::providers::{
    build_normalize_prompt, parse_json_block, LlmProvider, NORMALIZE_SYSTEM_PROMPT,
    RECIPE_NAME_PLACEHOLDER,
};

/// Turns free recipe text into a structured ingredient list using an LLM
pub struct Normalizer {
    provider: Box<dyn LlmProvider>,
}

impl Normalizer {
    pub fn new(provider: Box<dyn LlmProvider>) -> Self {
        Self { provider }
    }

    /// Ask the model for the recipe's ingredients.
    ///
    /// Ingredients are numbered 1..n in the order the model listed them.
    /// `fallback_name` is used when the model finds no recipe name.
    pub async fn normalize(
        &self,
        text: &str,
        fallback_name: &str,
    ) -> Result<RecipeDocument, ChefError> {
        let prompt = build_normalize_prompt(text, fallback_name);
        debug!(
            "Normalizing {} characters of recipe text with {}",
            text.len(),
            self.provider.provider_name()
        );

        let reply = self
            .provider
            .complete(NORMALIZE_SYSTEM_PROMPT, &prompt)
            .await?;
        let mut value: Value = parse_json_block(&reply)?;

        // Ids from the model are dropped, so loading numbers entries 1..n
        if let Some(items) = value.get_mut("ingredients").and_then(Value::as_array_mut) {
            for item in items.iter_mut().filter_map(Value::as_object_mut) {
                item.remove("ID");
            }
        }
        let mut document = RecipeDocument::from_value(value)?;

        let name = document.recipe_name.trim();
        if name.is_empty() || name == RECIPE_NAME_PLACEHOLDER {
            document.recipe_name = fallback_name.to_string();
        }

        info!(
            "Normalized '{}' with {} ingredients",
            document.recipe_name,
            document.ingredients.len()
        );
        Ok(document)
    }
}

/// Human-readable recipe name from a file name: `easy-apple_pie.txt` becomes
/// `Easy Apple Pie`
pub fn recipe_name_from_filename(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();

    stem.replace(['-', '_'], " ")
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
