use chefbuddy::merge::{merge_all, MERGED_FILE_NAME, SHOPPING_LIST_FILE_NAME};
use chefbuddy::model::MergedShoppingList;
use std::fs;
use tempfile::TempDir;

fn write_recipes(dir: &std::path::Path) {
    fs::write(
        dir.join("omelette.json"),
        r#"{
            "recipeName": "Omelette",
            "ingredients": [
                {"ID": 1, "ingredient": "Egg", "quantity": "3", "unittype": "whole", "aisle": "Eggs/Sugar/Bread/Baking goods"},
                {"ID": 2, "ingredient": "Milk", "quantity": "50", "unittype": "ml", "aisle": "Milk/Butter/Cream/Cheese/Yoghurts"}
            ]
        }"#,
    )
    .unwrap();
    fs::write(
        dir.join("custard.json"),
        r#"{
            "recipeName": "Custard",
            "ingredients": [
                {"ID": 1, "ingredient": "Milk", "quantity": "500", "unittype": "ml", "aisle": "Milk/Butter/Cream/Cheese/Yoghurts"},
                {"ID": 2, "ingredient": "egg", "quantity": "2", "unittype": "whole", "aisle": "Eggs/Sugar/Bread/Baking goods"},
                {"ID": 3, "ingredient": "Vanilla pod", "quantity": "1", "unittype": "piece"}
            ]
        }"#,
    )
    .unwrap();
}

#[test]
fn test_merge_sorts_by_aisle_then_name() {
    let dir = TempDir::new().unwrap();
    write_recipes(dir.path());

    let merged = merge_all(dir.path()).unwrap();
    let rows: Vec<(&str, &str, Option<&str>)> = merged
        .ingredients
        .iter()
        .map(|i| (i.aisle.as_str(), i.name.as_str(), i.quantity.as_deref()))
        .collect();

    assert_eq!(
        rows,
        vec![
            // custard.json is read before omelette.json, so its egg comes first
            ("Eggs/Sugar/Bread/Baking goods", "egg", Some("2")),
            ("Eggs/Sugar/Bread/Baking goods", "Egg", Some("3")),
            ("Milk/Butter/Cream/Cheese/Yoghurts", "Milk", Some("500")),
            ("Milk/Butter/Cream/Cheese/Yoghurts", "Milk", Some("50")),
            ("Unknown", "Vanilla pod", Some("1")),
        ]
    );
}

#[test]
fn test_merged_file_has_no_ids() {
    let dir = TempDir::new().unwrap();
    write_recipes(dir.path());
    merge_all(dir.path()).unwrap();

    let content = fs::read_to_string(dir.path().join(MERGED_FILE_NAME)).unwrap();
    let json: serde_json::Value = serde_json::from_str(&content).unwrap();
    let items = json["ingredients"].as_array().unwrap();
    assert_eq!(items.len(), 5);
    for item in items {
        assert!(item.get("ID").is_none());
        assert!(item.get("ingredient").is_some());
        assert!(item.get("unittype").is_some());
    }

    let reloaded = MergedShoppingList::load(&dir.path().join(MERGED_FILE_NAME)).unwrap();
    assert_eq!(reloaded.ingredients.len(), 5);
}

#[test]
fn test_merge_is_idempotent() {
    let dir = TempDir::new().unwrap();
    write_recipes(dir.path());
    fs::write(
        dir.path().join(SHOPPING_LIST_FILE_NAME),
        r#"{"shoppingList": {"Produce": []}}"#,
    )
    .unwrap();

    merge_all(dir.path()).unwrap();
    let first = fs::read(dir.path().join(MERGED_FILE_NAME)).unwrap();
    merge_all(dir.path()).unwrap();
    let second = fs::read(dir.path().join(MERGED_FILE_NAME)).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_merge_empty_directory() {
    let dir = TempDir::new().unwrap();
    let merged = merge_all(dir.path()).unwrap();
    assert!(merged.ingredients.is_empty());
    assert!(dir.path().join(MERGED_FILE_NAME).exists());
}
