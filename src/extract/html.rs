use log::debug;
use scraper::{ElementRef, Html, Selector};

/// Heading words that mark the ingredient list
const INGREDIENT_KEYWORDS: &[&str] = &["ingredients"];
/// Heading words that mark the method
const INSTRUCTION_KEYWORDS: &[&str] = &[
    "method",
    "instructions",
    "directions",
    "steps",
    "preparation",
];

/// A section needs more words than this to count as recipe content
const MIN_SECTION_WORDS: usize = 10;

/// Text of an element, one text node per line, blank nodes dropped
fn element_text(element: &ElementRef) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn is_content_sufficient(element: &ElementRef) -> bool {
    element_text(element).split_whitespace().count() > MIN_SECTION_WORDS
}

fn is_section_container(element: &ElementRef) -> bool {
    let el = element.value();
    matches!(el.name(), "section" | "div" | "span") && el.attr("class").is_some()
}

/// Pull the ingredient and method sections out of a recipe page.
///
/// Every heading mentioning one of the keywords is walked up to the nearest
/// classed `section`/`div`/`span` holding more than a handful of words.
/// Returns `None` when no such section exists.
pub fn extract_recipe_sections(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let headings = Selector::parse("h1, h2, h3, h4, h5, h6").ok()?;

    let mut seen = Vec::new();
    let mut sections = Vec::new();

    for heading in document.select(&headings) {
        let heading_text = heading.text().collect::<String>().to_lowercase();
        let is_recipe_heading = INGREDIENT_KEYWORDS
            .iter()
            .chain(INSTRUCTION_KEYWORDS)
            .any(|keyword| heading_text.contains(keyword));
        if !is_recipe_heading {
            continue;
        }

        let section = heading
            .ancestors()
            .filter_map(ElementRef::wrap)
            .filter(is_section_container)
            .find(is_content_sufficient);

        if let Some(section) = section {
            if seen.contains(&section.id()) {
                continue;
            }
            debug!(
                "Section <{}> found under heading '{}'",
                section.value().name(),
                heading_text.trim()
            );
            seen.push(section.id());
            sections.push(element_text(&section));
        }
    }

    if sections.is_empty() {
        None
    } else {
        Some(sections.join("\n\n"))
    }
}

/// All text inside `<body>`, for pages without recognizable sections
pub fn extract_body_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let selector = match Selector::parse("body") {
        Ok(selector) => selector,
        Err(_) => return String::new(),
    };
    document
        .select(&selector)
        .next()
        .map(|el| element_text(&el))
        .unwrap_or_default()
}
