use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::fs;
use std::path::Path;

use crate::error::ChefError;

/// Aisle assigned to ingredients that have not been categorized yet
pub const UNKNOWN_AISLE: &str = "Unknown";

/// Store aisles offered to the model when categorizing ingredients
pub const AISLES: &[&str] = &[
    "Produce",
    "Fresh meats",
    "Cooked Meats",
    "Milk/Butter/Cream/Cheese/Yoghurts",
    "Eggs/Sugar/Bread/Baking goods",
    "Oil/Jam/Tinned fruit/Honey/Spices/Stock",
    "Sauces/Mayonnaise/Pickles/Rice/Pulses",
    "Tinned Foods/Pasta/Soups",
    "Dried fruits, seeds & nuts",
    "Coffee/Cereal",
    "Biscuits/Chocolate/Sweets/Tea",
    "Fizzy drinks/Crackers/Nuts/Crisps",
    "Cordials/Bottled water",
    "Wine/Beer/Cider",
    "Other",
];

/// One ingredient of a single recipe
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngredientEntry {
    #[serde(rename = "ID")]
    pub id: u32,
    #[serde(rename = "ingredient")]
    pub name: String,
    pub quantity: Option<String>,
    #[serde(rename = "unittype")]
    pub unit: Option<String>,
    pub aisle: String,
}

impl IngredientEntry {
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            quantity: None,
            unit: None,
            aisle: UNKNOWN_AISLE.to_string(),
        }
    }

    pub fn with_quantity(mut self, quantity: impl Into<String>) -> Self {
        self.quantity = Some(quantity.into());
        self
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn with_aisle(mut self, aisle: impl Into<String>) -> Self {
        self.aisle = aisle.into();
        self
    }
}

impl fmt::Display for IngredientEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}. {}", self.id, self.name)?;
        match (&self.quantity, &self.unit) {
            (Some(q), Some(u)) => write!(f, ": {} {}", q, u),
            (Some(q), None) => write!(f, ": {}", q),
            (None, Some(u)) => write!(f, ": {}", u),
            (None, None) => Ok(()),
        }
    }
}

/// Ingredient record as it appears on disk. Every field is optional here so
/// that the rules for missing values live in one place.
#[derive(Debug, Deserialize)]
struct RawIngredient {
    #[serde(rename = "ID")]
    id: Option<u32>,
    ingredient: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    quantity: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    unittype: Option<String>,
    aisle: Option<String>,
}

impl RawIngredient {
    fn aisle_or_unknown(&self) -> String {
        aisle_or_unknown(self.aisle.as_deref())
    }
}

/// An ingredient as the merge reads it. `ID` is not declared, so whatever
/// a hand-edited file holds there is ignored.
#[derive(Debug, Deserialize)]
struct RawMergeIngredient {
    ingredient: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    quantity: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    unittype: Option<String>,
    aisle: Option<String>,
}

fn aisle_or_unknown(aisle: Option<&str>) -> String {
    match aisle.map(str::trim) {
        Some(aisle) if !aisle.is_empty() => aisle.to_string(),
        _ => UNKNOWN_AISLE.to_string(),
    }
}

/// Accepts a string, a number or null. Models regularly answer `2` instead of `"2"`.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected a string or number, found {}",
            other
        ))),
    }
}

#[derive(Debug, Deserialize)]
struct RawRecipeDocument {
    #[serde(rename = "recipeName", default)]
    recipe_name: Option<String>,
    #[serde(default)]
    ingredients: Vec<RawIngredient>,
}

/// A single recipe and its ordered ingredient list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecipeDocument {
    #[serde(rename = "recipeName")]
    pub recipe_name: String,
    pub ingredients: Vec<IngredientEntry>,
}

impl RecipeDocument {
    pub fn new(recipe_name: impl Into<String>) -> Self {
        Self {
            recipe_name: recipe_name.into(),
            ingredients: Vec::new(),
        }
    }

    /// Parse and validate a recipe document.
    ///
    /// Entries without an `ID` are numbered after the highest id present, in
    /// file order. Entries without an aisle get [`UNKNOWN_AISLE`]. An entry
    /// without an ingredient name is rejected.
    pub fn from_json(json: &str) -> Result<Self, ChefError> {
        let raw: RawRecipeDocument = serde_json::from_str(json)?;
        Self::from_raw(raw)
    }

    /// Same as [`RecipeDocument::from_json`], from an already parsed value
    pub fn from_value(value: Value) -> Result<Self, ChefError> {
        let raw: RawRecipeDocument = serde_json::from_value(value)?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawRecipeDocument) -> Result<Self, ChefError> {
        let mut next_id = raw
            .ingredients
            .iter()
            .filter_map(|i| i.id)
            .max()
            .unwrap_or(0);

        let mut ingredients = Vec::with_capacity(raw.ingredients.len());
        for (index, item) in raw.ingredients.into_iter().enumerate() {
            let aisle = item.aisle_or_unknown();
            let name = match item.ingredient {
                Some(name) if !name.trim().is_empty() => name,
                _ => {
                    return Err(ChefError::InvalidRecipe(format!(
                        "ingredient #{} has no name",
                        index + 1
                    )))
                }
            };
            let id = match item.id {
                Some(id) => id,
                None => {
                    next_id += 1;
                    next_id
                }
            };
            if ingredients.iter().any(|e: &IngredientEntry| e.id == id) {
                return Err(ChefError::InvalidRecipe(format!(
                    "duplicate ingredient ID {}",
                    id
                )));
            }
            ingredients.push(IngredientEntry {
                id,
                name,
                quantity: item.quantity,
                unit: item.unittype,
                aisle,
            });
        }

        Ok(RecipeDocument {
            recipe_name: raw.recipe_name.unwrap_or_default(),
            ingredients,
        })
    }

    /// Load a recipe document from disk
    pub fn load(path: &Path) -> Result<Self, ChefError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Overwrite `path` with the pretty-printed document
    pub fn save(&self, path: &Path) -> Result<(), ChefError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Next free id: one past the highest id in use, or 1 for an empty list
    pub fn next_id(&self) -> u32 {
        self.ingredients.iter().map(|i| i.id).max().unwrap_or(0) + 1
    }

    pub fn find(&self, id: u32) -> Option<&IngredientEntry> {
        self.ingredients.iter().find(|i| i.id == id)
    }

    pub fn find_mut(&mut self, id: u32) -> Option<&mut IngredientEntry> {
        self.ingredients.iter_mut().find(|i| i.id == id)
    }
}

/// An ingredient in the merged list. Per-recipe ids are not carried over.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergedIngredient {
    #[serde(rename = "ingredient")]
    pub name: String,
    pub quantity: Option<String>,
    #[serde(rename = "unittype")]
    pub unit: Option<String>,
    pub aisle: String,
}

impl MergedIngredient {
    /// Validate one raw `ingredients` element from a recipe file
    pub fn from_value(value: Value) -> Result<Self, ChefError> {
        let raw: RawMergeIngredient = serde_json::from_value(value)?;
        let aisle = aisle_or_unknown(raw.aisle.as_deref());
        match raw.ingredient {
            Some(name) if !name.trim().is_empty() => Ok(MergedIngredient {
                name,
                quantity: raw.quantity,
                unit: raw.unittype,
                aisle,
            }),
            _ => Err(ChefError::InvalidRecipe(
                "ingredient has no name".to_string(),
            )),
        }
    }

    /// Key the merged list is ordered by
    pub fn sort_key(&self) -> (String, String) {
        (self.aisle.to_lowercase(), self.name.to_lowercase())
    }
}

impl From<IngredientEntry> for MergedIngredient {
    fn from(entry: IngredientEntry) -> Self {
        MergedIngredient {
            name: entry.name,
            quantity: entry.quantity,
            unit: entry.unit,
            aisle: entry.aisle,
        }
    }
}

/// Every recipe's ingredients in one list, sorted by aisle then name
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct MergedShoppingList {
    pub ingredients: Vec<MergedIngredient>,
}

impl MergedShoppingList {
    /// Load a merged list written by the merge step
    pub fn load(path: &Path) -> Result<Self, ChefError> {
        let content = fs::read_to_string(path)?;
        let value: Value = serde_json::from_str(&content)?;
        let items = match value.get("ingredients") {
            Some(Value::Array(items)) => items.clone(),
            _ => {
                return Err(ChefError::InvalidRecipe(format!(
                    "{} has no ingredients list",
                    path.display()
                )))
            }
        };
        let ingredients = items
            .into_iter()
            .map(MergedIngredient::from_value)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(MergedShoppingList { ingredients })
    }

    pub fn save(&self, path: &Path) -> Result<(), ChefError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

/// One line of the consolidated shopping list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShoppingItem {
    #[serde(default)]
    pub ingredient: Option<String>,
    #[serde(
        rename = "totalQuantity",
        default,
        deserialize_with = "lenient_string"
    )]
    pub total_quantity: Option<String>,
}

/// The items for one aisle
#[derive(Debug, Clone, PartialEq)]
pub struct AisleGroup {
    pub aisle: String,
    pub items: Vec<ShoppingItem>,
}

/// The consolidated list: aisles in the order the consolidator returned them
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ShoppingList {
    pub aisles: Vec<AisleGroup>,
}

#[derive(Serialize, Deserialize)]
struct ShoppingListFile {
    #[serde(rename = "shoppingList")]
    shopping_list: serde_json::Map<String, Value>,
}

impl ShoppingList {
    pub fn from_json(json: &str) -> Result<Self, ChefError> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, ChefError> {
        let file: ShoppingListFile = serde_json::from_value(value)?;
        let mut aisles = Vec::with_capacity(file.shopping_list.len());
        for (aisle, items) in file.shopping_list {
            let items: Vec<ShoppingItem> = serde_json::from_value(items)?;
            aisles.push(AisleGroup { aisle, items });
        }
        Ok(ShoppingList { aisles })
    }

    pub fn to_json(&self) -> Result<String, ChefError> {
        let mut shopping_list = serde_json::Map::new();
        for group in &self.aisles {
            shopping_list.insert(group.aisle.clone(), serde_json::to_value(&group.items)?);
        }
        Ok(serde_json::to_string_pretty(&ShoppingListFile { shopping_list })?)
    }

    pub fn load(path: &Path) -> Result<Self, ChefError> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), ChefError> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.aisles.iter().all(|g| g.items.is_empty())
    }
}

impl fmt::Display for ShoppingList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for group in &self.aisles {
            writeln!(f, "{}", group.aisle.to_uppercase())?;
            for item in &group.items {
                writeln!(
                    f,
                    "{} {}",
                    item.total_quantity.as_deref().unwrap_or("N/A"),
                    item.ingredient.as_deref().unwrap_or("N/A")
                )?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
