//! HTML escaping and markdown rendering.

use pulldown_cmark::{html, Options, Parser};

/// Escape a string for safe HTML insertion.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Render markdown to HTML.
///
/// Raw HTML in the source is passed through untouched, so only feed this
/// content the server is trusted to produce.
pub fn render_markdown(source: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let parser = Parser::new_ext(source, options);
    let mut out = String::with_capacity(source.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup_and_quotes() {
        assert_eq!(
            html_escape(r#"<b onclick="x">'a' & b</b>"#),
            "&lt;b onclick=&quot;x&quot;&gt;&#x27;a&#x27; &amp; b&lt;/b&gt;"
        );
    }

    #[test]
    fn renders_headings_and_paragraphs() {
        assert_eq!(
            render_markdown("### Important Exam Questions\n"),
            "<h3>Important Exam Questions</h3>\n"
        );
        assert_eq!(render_markdown("plain **bold**\n"), "<p>plain <strong>bold</strong></p>\n");
    }
}
