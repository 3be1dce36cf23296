//! Parsing of category listing pages.

use crate::text::normalize;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use url::Url;

pub const DEFAULT_START_URL: &str = "https://ru.wikipedia.org/wiki/Категория:Фильмы_по_алфавиту";

/// Anchor text of the pagination link on a category page.
pub const NEXT_PAGE_MARKER: &str = "Следующая страница";

/// Title prefix of list articles, which are not films.
pub const LIST_TITLE_PREFIX: &str = "Список ";

static SUBCATEGORY_LINKS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div#mw-subcategories a[href]").expect("valid selector"));
static MEMBER_LINKS: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"div#mw-pages li > a[href^="/wiki/"]"#).expect("valid selector")
});
static ANY_LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("valid selector"));

/// A member link scraped from a category listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateLink {
    pub url: String,
    pub title: String,
}

/// Everything the traversal needs from one category page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryListing {
    pub subcategories: Vec<String>,
    pub members: Vec<CandidateLink>,
    pub next_page: Option<String>,
}

impl CategoryListing {
    /// Parse a category page. Links resolve against `page_url`.
    ///
    /// Member links are already filtered: namespaced links (`Категория:`,
    /// `Файл:` and the like) and list articles are dropped here.
    pub fn parse(html: &str, page_url: &str) -> Self {
        let document = Html::parse_document(html);

        let subcategories = document
            .select(&SUBCATEGORY_LINKS)
            .filter_map(|a| a.value().attr("href"))
            .filter_map(|href| resolve_url(page_url, href))
            .collect();

        let members = document
            .select(&MEMBER_LINKS)
            .filter_map(|a| member_link(page_url, a))
            .collect();

        let next_page = document
            .select(&ANY_LINK)
            .find(|a| a.text().collect::<String>().contains(NEXT_PAGE_MARKER))
            .and_then(|a| a.value().attr("href"))
            .and_then(|href| resolve_url(page_url, href));

        Self {
            subcategories,
            members,
            next_page,
        }
    }
}

fn member_link(page_url: &str, anchor: ElementRef<'_>) -> Option<CandidateLink> {
    let href = anchor.value().attr("href")?;
    let title = normalize(&anchor.text().collect::<String>());

    if !is_record_candidate(href, &title) {
        return None;
    }

    Some(CandidateLink {
        url: resolve_url(page_url, href)?,
        title,
    })
}

/// Structural exclusions for member links.
pub fn is_record_candidate(href: &str, title: &str) -> bool {
    !href.is_empty() && !href.contains(':') && !title.starts_with(LIST_TITLE_PREFIX)
}

/// Resolve `href` against `base` and drop the fragment.
pub fn resolve_url(base: &str, href: &str) -> Option<String> {
    if href.is_empty()
        || href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with('#')
    {
        return None;
    }

    let base_url = Url::parse(base).ok()?;
    let mut resolved = base_url.join(href).ok()?;
    resolved.set_fragment(None);

    Some(resolved.to_string())
}
