//! Markup extraction for the Netflix pages.
//!
//! Everything that knows about class names and `data-uia` attributes lives
//! here. The functions are synchronous so the parsed document never crosses
//! an `.await`.

use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

/// A title found on a page, before enrichment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub title: String,
    pub poster: Option<String>,
    pub blurb: Option<String>,
}

impl Candidate {
    fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            poster: None,
            blurb: None,
        }
    }
}

struct Selectors {
    top10_row: Selector,
    button: Selector,
    blurb: Selector,
    collection_row: Selector,
    title_card: Selector,
    fallback_text: Selector,
    labelled: Selector,
    image: Selector,
    card_title: Selector,
    boxart: Selector,
    loose_title: Selector,
}

impl Selectors {
    fn new() -> Self {
        Self {
            top10_row: Selector::parse(r#"[data-uia="top10-table-row-title"]"#)
                .expect("top10 row selector"),
            button: Selector::parse("button").expect("button selector"),
            blurb: Selector::parse(r#"[class*="description"], [class*="synopsis"]"#)
                .expect("blurb selector"),
            collection_row: Selector::parse(".nm-collections-row").expect("collection row selector"),
            title_card: Selector::parse(".nm-collections-title-card, .title-card, .slider-item")
                .expect("title card selector"),
            fallback_text: Selector::parse(".fallback-text").expect("fallback text selector"),
            labelled: Selector::parse("[aria-label]").expect("aria-label selector"),
            image: Selector::parse("img").expect("img selector"),
            card_title: Selector::parse(".title").expect("title selector"),
            boxart: Selector::parse(".boxart-image").expect("boxart selector"),
            loose_title: Selector::parse(
                r#"[data-uia*="title"], [aria-label*="Watch"], img[alt*="Watch"]"#,
            )
            .expect("loose title selector"),
        }
    }
}

static SELECTORS: LazyLock<Selectors> = LazyLock::new(Selectors::new);

/// Rows of a Top 10 table. Only the first `limit` rows are looked at.
pub fn extract_top10_candidates(html: &str, limit: usize) -> Vec<Candidate> {
    let document = Html::parse_document(html);
    let selectors = &*SELECTORS;

    document
        .select(&selectors.top10_row)
        .take(limit)
        .filter_map(|row| {
            let label = row
                .select(&selectors.button)
                .next()
                .map_or_else(|| text_of(row), text_of);
            // "Squid Game: Season 2" ranks under the show's name.
            let title = label.split(':').next().unwrap_or_default().trim();
            if title.is_empty() {
                return None;
            }

            let blurb = closest_div(row)
                .map(|div| {
                    div.select(&selectors.blurb)
                        .map(text_of)
                        .collect::<String>()
                })
                .and_then(non_empty);

            Some(Candidate {
                blurb,
                ..Candidate::titled(title)
            })
        })
        .collect()
}

/// Title cards of a genre browse page.
///
/// Collection rows are read first, keeping at most `card_limit` titles. A
/// page without collection rows falls back to a loose scan over anything
/// labelled like a title, looking at the first `loose_limit` matches.
pub fn extract_genre_candidates(html: &str, card_limit: usize, loose_limit: usize) -> Vec<Candidate> {
    let document = Html::parse_document(html);
    let selectors = &*SELECTORS;

    let rows: Vec<ElementRef<'_>> = document.select(&selectors.collection_row).collect();
    if rows.is_empty() {
        return loose_scan(&document, loose_limit);
    }

    rows.into_iter()
        .flat_map(|row| row.select(&selectors.title_card))
        .filter_map(card_candidate)
        .take(card_limit)
        .collect()
}

fn card_candidate(card: ElementRef<'_>) -> Option<Candidate> {
    let selectors = &*SELECTORS;
    let image = card.select(&selectors.image).next();

    let raw_title = first_present([
        non_empty(
            card.select(&selectors.fallback_text)
                .map(text_of)
                .collect::<String>(),
        ),
        card.select(&selectors.labelled)
            .next()
            .and_then(|e| attr(e, "aria-label")),
        image.and_then(|img| attr(img, "alt")),
        non_empty(card.select(&selectors.card_title).map(text_of).collect::<String>()),
        attr(card, "aria-label"),
    ])?;
    let title = strip_watch_prefix(&raw_title);
    if title.is_empty() {
        return None;
    }

    let poster = first_present([
        image.and_then(|img| attr(img, "src")),
        image.and_then(|img| attr(img, "data-src")),
        card.select(&selectors.boxart)
            .next()
            .and_then(|e| attr(e, "src")),
    ]);

    Some(Candidate {
        poster,
        ..Candidate::titled(title)
    })
}

fn loose_scan(document: &Html, limit: usize) -> Vec<Candidate> {
    document
        .select(&SELECTORS.loose_title)
        .take(limit)
        .filter_map(|element| {
            let raw = first_present([
                attr(element, "aria-label"),
                attr(element, "alt"),
                non_empty(text_of(element)),
            ])?;
            // Short labels are icons and buttons, not titles.
            if raw.chars().count() <= 3 {
                return None;
            }
            let title = strip_watch_prefix(&raw);
            (!title.is_empty()).then(|| Candidate::titled(title))
        })
        .collect()
}

/// Drops a leading "Watch " call to action, case-insensitively.
pub fn strip_watch_prefix(title: &str) -> &str {
    let trimmed = title.trim();
    match trimmed.get(..5) {
        Some(head) if head.eq_ignore_ascii_case("watch") => {
            let rest = &trimmed[5..];
            if rest.starts_with(char::is_whitespace) {
                rest.trim()
            } else {
                trimmed
            }
        }
        _ => trimmed,
    }
}

/// Lowercases and replaces every character outside `[a-z0-9]` with `_`.
pub fn slug(title: &str) -> String {
    title
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn closest_div(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    std::iter::once(element)
        .chain(element.ancestors().filter_map(ElementRef::wrap))
        .find(|e| e.value().name() == "div")
}

fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn attr(element: ElementRef<'_>, name: &str) -> Option<String> {
    element.value().attr(name).and_then(|value| non_empty(value.to_string()))
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn first_present<const N: usize>(options: [Option<String>; N]) -> Option<String> {
    options.into_iter().flatten().next()
}
