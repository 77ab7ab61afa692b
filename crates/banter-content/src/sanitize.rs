use std::collections::HashMap;
use std::sync::LazyLock;

use tracing::debug;

use crate::tokenizer::{Tag, Token, Tokenizer};

static DEFAULT_SANITIZER: LazyLock<Sanitizer> = LazyLock::new(Sanitizer::default);

/// Tags and, per tag, the attributes allowed through sanitization.
/// Names are stored lowercase and matched case-insensitively.
#[derive(Debug, Clone)]
pub struct AllowList {
    tags: HashMap<String, Vec<String>>,
}

impl AllowList {
    pub fn empty() -> Self {
        Self {
            tags: HashMap::new(),
        }
    }

    /// Allow `name` with the given attributes. `script` can never be allowed;
    /// its body is removed before the allow list is consulted.
    pub fn tag(mut self, name: &str, attrs: &[&str]) -> Self {
        let name = name.to_ascii_lowercase();
        if name != "script" {
            let attrs = attrs.iter().map(|a| a.to_ascii_lowercase()).collect();
            self.tags.insert(name, attrs);
        }
        self
    }

    pub fn allows_tag(&self, name: &str) -> bool {
        self.tags.contains_key(&name.to_ascii_lowercase())
    }

    pub fn allows_attr(&self, tag: &str, attr: &str) -> bool {
        self.tags
            .get(&tag.to_ascii_lowercase())
            .is_some_and(|attrs| attrs.iter().any(|a| a.eq_ignore_ascii_case(attr)))
    }
}

impl Default for AllowList {
    fn default() -> Self {
        Self::empty()
            .tag("b", &[])
            .tag("em", &[])
            .tag("i", &[])
            .tag("strong", &[])
            .tag("u", &[])
            .tag("div", &["class"])
            .tag("span", &["class"])
    }
}

#[derive(Debug, Clone, Default)]
pub struct Sanitizer {
    allow: AllowList,
}

impl Sanitizer {
    pub fn new(allow: AllowList) -> Self {
        Self { allow }
    }

    /// Rewrites untrusted text so that only allow-listed markup survives.
    ///
    /// Unknown tags lose their markup but keep their content, `<script>`
    /// elements vanish with their content, and markup that never closes is
    /// dropped to the end of input. Text is copied byte for byte, except that
    /// a `<` ending a text run is escaped: markup follows it, and if that
    /// markup is removed the `<` would open a tag with the text after it.
    /// Allowed tags still open at the end are closed, so the output is
    /// balanced and sanitizing it again is a no-op.
    pub fn sanitize(&self, raw: &str) -> String {
        let mut out = String::with_capacity(raw.len());
        // Allowed tags opened and not yet closed, innermost last.
        let mut open: Vec<String> = Vec::new();

        for token in Tokenizer::new(raw) {
            match token {
                Token::Text(text) => push_text(&mut out, text),
                Token::StartTag(tag) => {
                    if self.allow.allows_tag(tag.name) {
                        let name = tag.name.to_ascii_lowercase();
                        self.write_start_tag(&mut out, &name, &tag);
                        if VOID_TAGS.contains(&name.as_str()) {
                            continue;
                        }
                        if tag.self_closing {
                            push_end_tag(&mut out, &name);
                        } else {
                            open.push(name);
                        }
                    }
                }
                Token::EndTag(name) => {
                    let name = name.to_ascii_lowercase();
                    if let Some(idx) = open.iter().rposition(|n| *n == name) {
                        open.remove(idx);
                        push_end_tag(&mut out, &name);
                    }
                }
                Token::ScriptBody(body) => {
                    debug!("Removed script element ({} bytes)", body.len());
                }
                Token::Markup(_) => {}
                Token::Unterminated(rest) => {
                    debug!("Dropped unterminated markup ({} bytes)", rest.len());
                }
            }
        }

        for name in open.iter().rev() {
            push_end_tag(&mut out, name);
        }

        out
    }

    fn write_start_tag(&self, out: &mut String, name: &str, tag: &Tag<'_>) {
        out.push('<');
        out.push_str(name);

        let mut written: Vec<String> = Vec::new();
        for attr in &tag.attrs {
            let attr_name = attr.name.to_ascii_lowercase();
            if !self.allow.allows_attr(name, &attr_name) || written.contains(&attr_name) {
                continue;
            }
            out.push(' ');
            out.push_str(&attr_name);
            out.push_str("=\"");
            push_attr_value(out, attr.value.unwrap_or(""));
            out.push('"');
            written.push(attr_name);
        }

        out.push('>');
    }
}

/// Elements that never have content or an end tag.
const VOID_TAGS: &[&str] = &["br", "hr", "img", "wbr"];

/// Any other `<` in a text run is followed by a character that cannot start
/// a tag, and that character is copied with it.
fn push_text(out: &mut String, text: &str) {
    match text.strip_suffix('<') {
        Some(head) => {
            out.push_str(head);
            out.push_str("&lt;");
        }
        None => out.push_str(text),
    }
}

fn push_end_tag(out: &mut String, name: &str) {
    out.push_str("</");
    out.push_str(name);
    out.push('>');
}

/// Escapes what would let a value leave its double quotes or open a tag.
fn push_attr_value(out: &mut String, value: &str) {
    for c in value.chars() {
        match c {
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
}

/// Sanitizes with the default allow list.
pub fn sanitize(raw: &str) -> String {
    DEFAULT_SANITIZER.sanitize(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_input_is_unchanged() {
        let input = r#"plain <b>bold</b> <em>em</em> <div class="red">red <span class="x">s</span></div>"#;
        assert_eq!(sanitize(input), input);
    }

    #[test]
    fn quotes_are_normalized() {
        assert_eq!(
            sanitize("<div class='red'>red</div>"),
            r#"<div class="red">red</div>"#
        );
        assert_eq!(
            sanitize("<div class=red>red</div>"),
            r#"<div class="red">red</div>"#
        );
    }

    #[test]
    fn event_handlers_are_dropped() {
        assert_eq!(
            sanitize("<div class='red' onclick='f()'>red</div>"),
            r#"<div class="red">red</div>"#
        );
        assert_eq!(sanitize("<b onmouseover=\"steal()\">x</b>"), "<b>x</b>");
    }

    #[test]
    fn attributes_not_allowed_on_tag_are_dropped() {
        assert_eq!(sanitize("<b class='loud'>x</b>"), "<b>x</b>");
        assert_eq!(sanitize("<div style='color:red' class='a'>x</div>"), r#"<div class="a">x</div>"#);
    }

    #[test]
    fn script_element_is_removed_with_content() {
        assert_eq!(sanitize("a<script>alert(1)</script>b"), "ab");
        assert_eq!(
            sanitize("a <script type='text/javascript'>if (x < 1) { y('<b>') }</script> b"),
            "a  b"
        );
        assert_eq!(sanitize("<ScRiPt>x</sCrIpT>"), "");
    }

    #[test]
    fn unknown_tags_keep_their_content() {
        assert_eq!(sanitize("<img>this</img>"), "this");
        assert_eq!(sanitize("<p>para <a href='x'>link</a></p>"), "para link");
        assert_eq!(sanitize("<img src=x onerror=alert(1)>"), "");
    }

    #[test]
    fn stray_close_tags_are_dropped() {
        assert_eq!(sanitize("</div>text</b>"), "text");
        assert_eq!(sanitize("<b>x</b></b>"), "<b>x</b>");
        assert_eq!(sanitize("</script>x"), "x");
    }

    #[test]
    fn unterminated_markup_is_dropped_to_end() {
        assert_eq!(sanitize("safe <div class='x onclick=evil()>no end"), "safe ");
        assert_eq!(sanitize("safe <b"), "safe ");
    }

    #[test]
    fn whitespace_is_preserved() {
        assert_eq!(sanitize("  a\n\t<script>x</script>  b  "), "  a\n\t  b  ");
    }

    #[test]
    fn tag_names_are_lowercased() {
        assert_eq!(sanitize("<B>x</B>"), "<b>x</b>");
        assert_eq!(sanitize("<DIV CLASS='a'>x</DIV>"), r#"<div class="a">x</div>"#);
    }

    #[test]
    fn attribute_values_cannot_escape_quotes() {
        assert_eq!(
            sanitize(r#"<div class='a" onclick="x'>t</div>"#),
            r#"<div class="a&quot; onclick=&quot;x">t</div>"#
        );
    }

    #[test]
    fn duplicate_attributes_keep_first() {
        assert_eq!(sanitize("<div class=a class=b>x</div>"), r#"<div class="a">x</div>"#);
    }

    #[test]
    fn comments_are_removed() {
        assert_eq!(sanitize("a<!-- hidden -->b"), "ab");
    }

    #[test]
    fn lone_angle_brackets_stay_text() {
        assert_eq!(sanitize("1 < 2 > 0"), "1 < 2 > 0");
        assert_eq!(sanitize("<3 <b>x</b>"), "<3 <b>x</b>");
        assert_eq!(sanitize("x<<b>y</b>"), "x&lt;<b>y</b>");
    }

    #[test]
    fn removed_markup_cannot_splice_a_tag() {
        assert_eq!(
            sanitize("<</b>img src=x onerror=alert(1)>"),
            "&lt;img src=x onerror=alert(1)>"
        );
        assert_eq!(
            sanitize("<<script>junk</script>script>alert(1)</script>"),
            "&lt;script>alert(1)"
        );
        assert_eq!(
            sanitize("<<!-- c -->img src=x onerror=alert(1)>"),
            "&lt;img src=x onerror=alert(1)>"
        );
        assert_eq!(
            sanitize("'<\nclass>\t<<</>classimg"),
            "'<\nclass>\t&lt;classimg"
        );
    }

    #[test]
    fn sanitizing_twice_changes_nothing() {
        let inputs = [
            "<</b>img src=x onerror=alert(1)>",
            "<<script>junk</script>script>alert(1)</script>",
            "<<!-- c -->img src=x onerror=alert(1)>",
            "'<\nclass>\t<<</>classimg",
            "<b>open <i>nested",
            r#"<div class='a" onclick="x'>t</div>"#,
            "<div/> <span class=s/>x",
            "Contains <b>html</b> and <script>JavaScript</script> content.",
            "a &lt; b &amp; c",
        ];
        for input in inputs {
            let once = sanitize(input);
            assert_eq!(sanitize(&once), once, "input: {input:?}");
            assert!(!once.contains("<img") && !once.contains("<script"), "input: {input:?}");
        }
    }

    #[test]
    fn unclosed_tags_are_closed_at_end() {
        assert_eq!(sanitize("<b>bold"), "<b>bold</b>");
        assert_eq!(sanitize("<b>x <i>y"), "<b>x <i>y</i></b>");
        assert_eq!(sanitize("<b>x <i>y</b> z"), "<b>x <i>y</b> z</i>");
    }

    #[test]
    fn self_closing_tags_get_an_end_tag() {
        assert_eq!(sanitize("a<div/>b"), "a<div></div>b");
        assert_eq!(sanitize("<span class='s'/>x"), r#"<span class="s"></span>x"#);
    }

    #[test]
    fn void_tags_are_never_closed() {
        let sanitizer = Sanitizer::new(AllowList::empty().tag("br", &[]));
        assert_eq!(sanitizer.sanitize("a<br>b<br/>c</br>"), "a<br>b<br>c");
    }

    #[test]
    fn custom_allow_list() {
        let sanitizer = Sanitizer::new(AllowList::empty().tag("p", &["title"]).tag("script", &[]));
        assert_eq!(sanitizer.sanitize("<p title='t' id='i'>x</p><b>y</b>"), r#"<p title="t">x</p>y"#);
        assert_eq!(sanitizer.sanitize("<script>z</script>"), "");
    }
}
