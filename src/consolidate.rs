use log::{debug, info};
use serde_json::Value;

use crate::error::ChefError;
use crate::model::{MergedShoppingList, ShoppingList};
use crate::providers::{
    build_consolidate_prompt, parse_json_block, LlmProvider, CONSOLIDATE_SYSTEM_PROMPT,
};

/// Sums identical ingredients across recipes and groups them by aisle
pub struct Consolidator {
    provider: Box<dyn LlmProvider>,
}

impl Consolidator {
    pub fn new(provider: Box<dyn LlmProvider>) -> Self {
        Self { provider }
    }

    pub async fn consolidate(&self, merged: &MergedShoppingList) -> Result<ShoppingList, ChefError> {
        let ingredients_json = serde_json::to_string_pretty(merged)?;
        let prompt = build_consolidate_prompt(&ingredients_json);
        debug!(
            "Consolidating {} ingredients with {}",
            merged.ingredients.len(),
            self.provider.provider_name()
        );

        let reply = self
            .provider
            .complete(CONSOLIDATE_SYSTEM_PROMPT, &prompt)
            .await?;
        let value: Value = parse_json_block(&reply)?;
        if value.get("shoppingList").is_none() {
            return Err(ChefError::Provider(
                "reply has no shoppingList".to_string(),
            ));
        }

        let list = ShoppingList::from_value(value)?;
        info!("Shopping list has {} aisles", list.aisles.len());
        Ok(list)
    }
}
