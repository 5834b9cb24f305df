use crate::model::AISLES;

/// System message sent with the ingredient normalization prompt
pub const NORMALIZE_SYSTEM_PROMPT: &str =
    "You are a chef's bot assistant looking to extract ingredients from a recipe to create a shopping list.";

/// System message sent with the shopping list consolidation prompt
pub const CONSOLIDATE_SYSTEM_PROMPT: &str = "You are a chef's assistant and are responsible for creating a single, organized shopping list from the ingredients of multiple recipes.";

/// Name the model is told to use when the recipe has none; replaced by the
/// caller's fallback name if it comes back verbatim.
pub const RECIPE_NAME_PLACEHOLDER: &str = "{{RECIPE_NAME}}";

/// The normalization prompt template.
///
/// Loaded from `normalize_prompt.txt` at compile time. Contains
/// `{{RECIPE_NAME}}`, `{{AISLES}}` and `{{RECIPE}}` placeholders.
const NORMALIZE_PROMPT: &str = include_str!("normalize_prompt.txt");

/// The consolidation prompt template, with `{{AISLES}}` and `{{INGREDIENTS}}`
/// placeholders.
const CONSOLIDATE_PROMPT: &str = include_str!("consolidate_prompt.txt");

fn aisle_list() -> String {
    AISLES.join("\n")
}

/// Inject the recipe text and fallback name into the normalization prompt
pub fn build_normalize_prompt(recipe_text: &str, fallback_name: &str) -> String {
    // Substitute the recipe last so text inside it is never treated as a placeholder
    NORMALIZE_PROMPT
        .replace("{{AISLES}}", &aisle_list())
        .replace(RECIPE_NAME_PLACEHOLDER, fallback_name)
        .replace("{{RECIPE}}", recipe_text)
}

/// Inject the merged ingredient list (as JSON) into the consolidation prompt
pub fn build_consolidate_prompt(ingredients_json: &str) -> String {
    CONSOLIDATE_PROMPT
        .replace("{{AISLES}}", &aisle_list())
        .replace("{{INGREDIENTS}}", ingredients_json)
}
