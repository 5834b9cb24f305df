use chefbuddy::config::{AppConfig, WorkspaceConfig};
use chefbuddy::extract::RecipeSource;
use chefbuddy::model::{RecipeDocument, ShoppingList};
use chefbuddy::Pipeline;
use mockito::{Matcher, Mock, ServerGuard};
use serde_json::json;
use std::fs;
use std::io::Cursor;
use std::path::Path;
use tempfile::TempDir;

const NORMALIZED: &str = r#"Here is the recipe:
[JSON_START]
{
  "recipeName": "{{RECIPE_NAME}}",
  "ingredients": [
    {"ingredient": "Tomato", "quantity": "4", "unittype": "whole", "aisle": "Produce"},
    {"ingredient": "Olive oil", "quantity": "2", "unittype": "tbsp", "aisle": "Oil/Jam/Tinned fruit/Honey/Spices/Stock"}
  ]
}
[JSON_END]"#;

const CONSOLIDATED: &str = r#"[JSON_START]
{
  "shoppingList": {
    "Produce": [{"ingredient": "Tomato", "totalQuantity": "4 whole"}],
    "Oil/Jam/Tinned fruit/Honey/Spices/Stock": [{"ingredient": "Olive oil", "totalQuantity": "2 tbsp"}]
  }
}
[JSON_END]"#;

fn chat_reply(content: &str) -> String {
    json!({
        "choices": [{"message": {"role": "assistant", "content": content}}]
    })
    .to_string()
}

async fn mock_openai(server: &mut ServerGuard) -> (Mock, Mock) {
    let normalize = server
        .mock("POST", "/v1/chat/completions")
        .match_body(Matcher::Regex("content to be processed".to_string()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(chat_reply(NORMALIZED))
        .create_async()
        .await;
    let consolidate = server
        .mock("POST", "/v1/chat/completions")
        .match_body(Matcher::Regex("list of ingredients".to_string()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(chat_reply(CONSOLIDATED))
        .create_async()
        .await;
    (normalize, consolidate)
}

fn config(root: &Path, server: &ServerGuard) -> AppConfig {
    let mut config = AppConfig {
        workspace: WorkspaceConfig {
            temp_dir: root.join("temp"),
            trash_dir: root.join("trash"),
        },
        ..Default::default()
    };
    let openai = config.llm.providers.get_mut("openai").unwrap();
    openai.api_key = Some("test-key".to_string());
    openai.base_url = Some(server.url());
    config
}

#[tokio::test]
async fn test_process_recipe_writes_working_files() {
    let mut server = mockito::Server::new_async().await;
    let (normalize, _) = mock_openai(&mut server).await;
    let root = TempDir::new().unwrap();
    let recipe = root.path().join("tomato_salad.txt");
    fs::write(&recipe, "4 tomatoes\n2 tbsp olive oil").unwrap();

    let pipeline = Pipeline::new(&config(root.path(), &server)).unwrap();
    let path = pipeline
        .process_recipe(&RecipeSource::File(recipe))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(path, root.path().join("temp/tomato_salad.json"));
    assert_eq!(
        fs::read_to_string(root.path().join("temp/tomato_salad.txt")).unwrap(),
        "4 tomatoes\n2 tbsp olive oil"
    );

    let document = RecipeDocument::load(&path).unwrap();
    assert_eq!(document.recipe_name, "Tomato Salad");
    assert_eq!(document.ingredients.len(), 2);
    assert_eq!(document.ingredients[1].id, 2);
    normalize.assert_async().await;
}

#[tokio::test]
async fn test_empty_source_is_skipped() {
    let server = mockito::Server::new_async().await;
    let root = TempDir::new().unwrap();
    let recipe = root.path().join("blank.txt");
    fs::write(&recipe, "\n").unwrap();

    let pipeline = Pipeline::new(&config(root.path(), &server)).unwrap();
    let result = pipeline
        .process_recipe(&RecipeSource::File(recipe))
        .await
        .unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn test_interactive_run() {
    let mut server = mockito::Server::new_async().await;
    let (_, consolidate) = mock_openai(&mut server).await;
    let root = TempDir::new().unwrap();
    let recipe = root.path().join("tomato_salad.txt");
    fs::write(&recipe, "4 tomatoes\n2 tbsp olive oil").unwrap();

    let script = format!(
        "not a recipe\n{}\ny\nmodify --id 1 --quantity \"6\"\ndone\n\n",
        recipe.display()
    );
    let mut output = Vec::new();
    let pipeline = Pipeline::new(&config(root.path(), &server)).unwrap();
    pipeline
        .run_interactive(Cursor::new(script), &mut output)
        .await
        .unwrap();
    let output = String::from_utf8(output).unwrap();

    assert!(output.contains("is not a web address or an existing file"));
    assert!(output.contains("Updated ingredient with ID 1."));
    assert!(output.contains("PRODUCE\n4 whole Tomato\n"));
    assert!(output.contains("OIL/JAM/TINNED FRUIT/HONEY/SPICES/STOCK\n2 tbsp Olive oil\n"));
    consolidate.assert_async().await;

    // Working files end up in the trash
    let temp = root.path().join("temp");
    assert_eq!(fs::read_dir(&temp).unwrap().count(), 0);
    let archived: Vec<String> = fs::read_dir(root.path().join("trash"))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(archived.len(), 4);
    let final_list = archived
        .iter()
        .find(|name| name.starts_with("final_shopping_list_"))
        .unwrap();
    let list = ShoppingList::load(&root.path().join("trash").join(final_list)).unwrap();
    assert_eq!(list.aisles[0].aisle, "Produce");
    let edited = archived
        .iter()
        .find(|name| name.starts_with("tomato_salad_") && name.ends_with(".json"))
        .unwrap();
    let document = RecipeDocument::load(&root.path().join("trash").join(edited)).unwrap();
    assert_eq!(document.find(1).unwrap().quantity.as_deref(), Some("6"));
}

#[tokio::test]
async fn test_interactive_run_without_recipes() {
    let server = mockito::Server::new_async().await;
    let root = TempDir::new().unwrap();
    let mut output = Vec::new();

    let pipeline = Pipeline::new(&config(root.path(), &server)).unwrap();
    pipeline
        .run_interactive(Cursor::new("\n"), &mut output)
        .await
        .unwrap();

    let output = String::from_utf8(output).unwrap();
    assert!(output.contains("nothing to shop for"));
    assert!(root.path().join("trash").is_dir());
}
