// src/services/extractor.rs

//! Markup queries for bundle pages.

use std::sync::LazyLock;

use scraper::{Html, Selector};

/// Elements whose class is exactly the bundle heading marker.
static TITLE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"[class="bundle-info-heading"]"#).expect("valid title selector")
});

/// Subtab anchors, minus the tab currently shown.
static SUBTAB_LINK_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("div#subtab-container > a:not(#active-subtab)")
        .expect("valid subtab selector")
});

/// Titles and subtab links pulled out of one page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageExtract {
    pub titles: Vec<String>,
    pub links: Vec<String>,
}

impl PageExtract {
    /// Parse `html` and run both queries.
    pub fn from_html(html: &str) -> Self {
        let document = Html::parse_document(html);
        Self {
            titles: extract_titles(Some(&document)),
            links: extract_other_tab_links(Some(&document)),
        }
    }
}

/// Text nodes directly under bundle heading elements, in document order.
///
/// Whitespace-only nodes (indentation around nested markup) are skipped.
pub fn extract_titles(document: Option<&Html>) -> Vec<String> {
    let Some(document) = document else {
        log::error!("HTML tree is empty");
        return Vec::new();
    };

    document
        .select(&TITLE_SELECTOR)
        .flat_map(|heading| {
            heading
                .children()
                .filter_map(|node| node.value().as_text().map(|t| t.text.to_string()))
        })
        .filter(|text| !text.trim().is_empty())
        .collect()
}

/// `href` targets of the inactive subtabs.
pub fn extract_other_tab_links(document: Option<&Html>) -> Vec<String> {
    let Some(document) = document else {
        log::error!("HTML tree is empty");
        return Vec::new();
    };

    document
        .select(&SUBTAB_LINK_SELECTOR)
        .filter_map(|anchor| anchor.value().attr("href"))
        .map(str::to_string)
        .collect()
}
