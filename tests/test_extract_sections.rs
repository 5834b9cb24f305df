use chefbuddy::config::{AppConfig, FetchConfig};
use chefbuddy::extract::{Extraction, RecipeSource, TextExtractor};

const RECIPE_PAGE: &str = r#"
<!DOCTYPE html>
<html>
<head><title>Lemon Drizzle Cake</title></head>
<body>
    <header class="site-header"><h1>Best Bakes</h1></header>
    <article class="recipe">
        <section class="recipe-ingredients">
            <h2>Ingredients</h2>
            <ul>
                <li>225 g unsalted butter, softened</li>
                <li>225 g caster sugar</li>
                <li>4 eggs</li>
                <li>1 lemon, zested</li>
            </ul>
        </section>
        <section class="recipe-method">
            <h2>Directions</h2>
            <ol>
                <li>Heat the oven to 180C and line a loaf tin.</li>
                <li>Beat the butter and sugar until pale, then add the eggs.</li>
            </ol>
        </section>
    </article>
</body>
</html>
"#;

fn config(page_scriber_url: Option<String>) -> AppConfig {
    AppConfig {
        fetch: FetchConfig {
            retry_attempts: 1,
            retry_delay_ms: 1,
            page_scriber_url,
            ..Default::default()
        },
        ..Default::default()
    }
}

#[tokio::test]
async fn test_url_sections_are_extracted() {
    let mut server = mockito::Server::new_async().await;
    let _m = server
        .mock("GET", "/lemon-drizzle")
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body(RECIPE_PAGE)
        .create_async()
        .await;

    let extractor = TextExtractor::new(&config(None)).unwrap();
    let source = RecipeSource::Url(format!("{}/lemon-drizzle", server.url()));
    let Extraction::Found(text) = extractor.extract(&source).await.unwrap() else {
        panic!("expected recipe text");
    };

    assert!(text.contains("Ingredients\n225 g unsalted butter, softened"));
    assert!(text.contains("Directions\nHeat the oven"));
    assert!(!text.contains("Best Bakes"));
    assert_eq!(source.slug(), "lemon-drizzle");
}

#[tokio::test]
async fn test_page_without_sections_is_not_found() {
    let mut server = mockito::Server::new_async().await;
    let _m = server
        .mock("GET", "/about")
        .with_status(200)
        .with_body("<html><body><h1>About</h1><p>We bake.</p></body></html>")
        .create_async()
        .await;

    let extractor = TextExtractor::new(&config(None)).unwrap();
    let source = RecipeSource::Url(format!("{}/about", server.url()));
    assert_eq!(extractor.extract(&source).await.unwrap(), Extraction::NotFound);
}

#[tokio::test]
async fn test_failed_fetch_is_not_found() {
    let mut server = mockito::Server::new_async().await;
    let _m = server
        .mock("GET", "/gone")
        .with_status(404)
        .create_async()
        .await;

    let extractor = TextExtractor::new(&config(None)).unwrap();
    let source = RecipeSource::Url(format!("{}/gone", server.url()));
    assert_eq!(extractor.extract(&source).await.unwrap(), Extraction::NotFound);
}

#[tokio::test]
async fn test_rendering_service_fallback() {
    let mut server = mockito::Server::new_async().await;
    let _page = server
        .mock("GET", "/spa")
        .with_status(200)
        .with_body("<html><body><div id=\"app\"></div></body></html>")
        .create_async()
        .await;
    let rendered = server
        .mock("POST", "/api/fetch-content")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"content": "Ingredients\n1 cup rice"}"#)
        .create_async()
        .await;

    let extractor = TextExtractor::new(&config(Some(server.url()))).unwrap();
    let source = RecipeSource::Url(format!("{}/spa", server.url()));
    assert_eq!(
        extractor.extract(&source).await.unwrap(),
        Extraction::Found("Ingredients\n1 cup rice".to_string())
    );
    rendered.assert_async().await;
}
