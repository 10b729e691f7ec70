use scraper::{Html, Selector};

// containers most article pages wrap their body in, most specific first
const CANDIDATES: [&str; 6] = [
    "[itemprop=articleBody]",
    "article",
    ".post-content",
    "main",
    "[role=main]",
    "#content",
];

const MIN_CONTAINER_CHARS: usize = 200;

pub fn scrape_generic(html: &str) -> Option<String> {
    let doc = Html::parse_document(html);

    for sel in CANDIDATES.iter() {
        if let Some(text) = scrape_with_selector(&doc, sel) {
            if text.len() >= MIN_CONTAINER_CHARS { return Some(text); }
        }
    }

    // fallback: collect all paragraphs
    let p_sel = Selector::parse("p").ok()?;
    let paragraphs: Vec<String> = doc
        .select(&p_sel)
        .map(|p| normalize(&p.text().collect::<String>()))
        .filter(|s| !s.is_empty())
        .collect();
    if paragraphs.is_empty() { None } else { Some(paragraphs.join("\n")) }
}

fn scrape_with_selector(doc: &Html, selector: &str) -> Option<String> {
    let sel = Selector::parse(selector).ok()?;
    let node = doc.select(&sel).next()?;
    let s = normalize(&node.text().collect::<String>());
    if s.is_empty() { None } else { Some(s) }
}

// trim every line, drop blank ones
fn normalize(s: &str) -> String {
    s.lines().map(str::trim).filter(|l| !l.is_empty()).collect::<Vec<_>>().join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_article_container() {
        let body = "Rust ".repeat(50);
        let html = format!("<html><body><nav><p>menu</p></nav><article>\n  <p>{body}</p>\n</article></body></html>");
        let text = scrape_generic(&html).unwrap();
        assert!(text.starts_with("Rust Rust"));
        assert!(!text.contains("menu"));
    }

    #[test]
    fn falls_back_to_paragraphs() {
        let html = "<html><body><div><p> first </p><p></p><p>second</p></div></body></html>";
        assert_eq!(scrape_generic(html).as_deref(), Some("first\nsecond"));
    }

    #[test]
    fn empty_page_yields_none() {
        assert_eq!(scrape_generic("<html><body><div></div></body></html>"), None);
    }
}
