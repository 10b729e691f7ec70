mod generic;

/// Pull readable article text out of a fetched page.
pub fn extract_article(html: &str) -> Option<String> {
    generic::scrape_generic(html)
}

/// Feed bodies that are only a teaser or a list of links are worth replacing with the article.
pub fn needs_full_article(content: &str) -> bool {
    content.chars().count() < 500 || content.contains("<a href=")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_or_link_only_bodies_need_the_article() {
        assert!(needs_full_article("<a href=\"https://news.example/1\">Comments</a>"));
        assert!(needs_full_article("tiny"));
        assert!(!needs_full_article(&"long body ".repeat(80)));
    }

    #[test]
    fn extracts_article_text() {
        let html = format!("<html><body><article><p>{}</p></article></body></html>", "word ".repeat(60));
        let text = extract_article(&html).unwrap();
        assert!(text.starts_with("word word"));
    }
}
