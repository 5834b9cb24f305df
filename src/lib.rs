pub mod config;
pub mod consolidate;
pub mod editor;
pub mod error;
pub mod extract;
pub mod merge;
pub mod model;
pub mod normalize;
pub mod pipeline;
pub mod providers;
pub mod workspace;

pub use config::{load_config, AppConfig};
pub use consolidate::Consolidator;
pub use editor::{Command, EditError, Editor};
pub use error::ChefError;
pub use extract::{Extraction, RecipeSource, TextExtractor};
pub use merge::merge_all;
pub use model::{IngredientEntry, MergedShoppingList, RecipeDocument, ShoppingList};
pub use normalize::Normalizer;
pub use pipeline::Pipeline;
pub use workspace::Workspace;
