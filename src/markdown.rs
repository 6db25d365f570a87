//! Converts entry bodies from Markdown to HTML. Smart punctuation is enabled
//! so straight quotes and dashes come out typographically correct, and
//! fenced code blocks are rewritten into syntax-highlighted HTML using
//! classed spans. The stylesheet rules matching those classes come from
//! [`highlight_css`] and are appended to the site stylesheet at build time.

use pulldown_cmark::{html, CodeBlockKind, Event, Options, Parser, Tag};
use std::sync::LazyLock;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::{
    css_for_theme_with_class_style, ClassStyle, ClassedHTMLGenerator,
};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

static SYNTAX_SET: LazyLock<SyntaxSet> =
    LazyLock::new(SyntaxSet::load_defaults_newlines);
static THEME_SET: LazyLock<ThemeSet> = LazyLock::new(ThemeSet::load_defaults);

const HIGHLIGHT_THEME: &str = "InspiredGitHub";
const HIGHLIGHT_CLASS_STYLE: ClassStyle = ClassStyle::Spaced;

/// Converts a Markdown body to HTML.
pub fn to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_SMART_PUNCTUATION);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);

    let events: Vec<Event> = Parser::new_ext(markdown, options).collect();
    let mut processed: Vec<Event> = Vec::with_capacity(events.len());
    let mut i = 0;

    while i < events.len() {
        match &events[i] {
            Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(lang))) => {
                // Collect the text events up to the end of the code block and
                // replace the whole block with pre-rendered HTML.
                let mut code = String::new();
                i += 1;
                while i < events.len() {
                    match &events[i] {
                        Event::End(Tag::CodeBlock(_)) => break,
                        Event::Text(text) => code.push_str(text),
                        _ => {}
                    }
                    i += 1;
                }
                processed.push(Event::Html(highlight(lang, &code).into()));
            }
            event => processed.push(event.clone()),
        }
        i += 1;
    }

    let mut out = String::new();
    html::push_html(&mut out, processed.into_iter());
    out
}

/// Returns the stylesheet rules for the classed spans emitted by
/// [`to_html`]'s code-block highlighting.
pub fn highlight_css() -> Result<String, syntect::Error> {
    css_for_theme_with_class_style(theme(), HIGHLIGHT_CLASS_STYLE)
}

fn theme() -> &'static Theme {
    &THEME_SET.themes[HIGHLIGHT_THEME]
}

fn highlight(lang: &str, code: &str) -> String {
    let syntax = match SYNTAX_SET.find_syntax_by_token(lang) {
        Some(syntax) => syntax,
        None => return plain_code_block(code),
    };

    let mut generator = ClassedHTMLGenerator::new_with_class_style(
        syntax,
        &SYNTAX_SET,
        HIGHLIGHT_CLASS_STYLE,
    );
    for line in LinesWithEndings::from(code) {
        if generator
            .parse_html_for_line_which_includes_newline(line)
            .is_err()
        {
            return plain_code_block(code);
        }
    }
    format!(
        "<pre class=\"highlight\"><code>{}</code></pre>",
        generator.finalize()
    )
}

fn plain_code_block(code: &str) -> String {
    format!(
        "<pre><code>{}</code></pre>",
        html_escape::encode_text(code)
    )
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_emphasis() {
        assert!(to_html("Hello **world**.").contains("<strong>world</strong>"));
    }

    #[test]
    fn test_smart_punctuation() {
        let html = to_html("\"Hello\" -- world");
        assert!(html.contains('\u{201c}'), "opening curly quote: {}", html);
        assert!(html.contains('\u{2013}'), "en dash: {}", html);
    }

    #[test]
    fn test_fenced_code_is_highlighted() {
        let html = to_html("```rust\nfn main() {}\n```\n");
        assert!(html.contains("<pre class=\"highlight\">"), "{}", html);
        assert!(html.contains("<span class="), "{}", html);
    }

    #[test]
    fn test_unknown_language_falls_back_to_plain() {
        let html = to_html("```nosuchlanguage\na < b\n```\n");
        assert!(html.contains("<pre><code>"), "{}", html);
        assert!(html.contains("&lt;"), "{}", html);
    }

    #[test]
    fn test_highlight_css_is_nonempty() {
        assert!(!highlight_css().unwrap().is_empty());
    }
}
