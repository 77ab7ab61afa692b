use std::fmt::Write;
use std::sync::LazyLock;

use regex::Regex;

/// Tags as the sanitizer emits them. Their attribute values are never linked.
static MARKUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</?[A-Za-z][^>]*>").expect("static markup pattern"));

/// A bare address plus the single whitespace character before it, if any.
/// A single quote ends the token so it cannot leave the `href`.
static BARE_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s?www\.[^\s']*").expect("static url pattern"));

/// Wraps every bare `www.` address in an anchor.
///
/// The match includes the whitespace before the address, and both the
/// `href` and the link text repeat the match verbatim:
/// `"url: www.x.com"` becomes `"url:<a href=' www.x.com'> www.x.com</a>"`.
/// Existing consumers depend on that exact spacing.
pub fn autolink(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;

    for tag in MARKUP.find_iter(text) {
        link_segment(&mut out, &text[last..tag.start()]);
        out.push_str(tag.as_str());
        last = tag.end();
    }
    link_segment(&mut out, &text[last..]);

    out
}

fn link_segment(out: &mut String, segment: &str) {
    let mut last = 0;
    for m in BARE_URL.find_iter(segment) {
        out.push_str(&segment[last..m.start()]);
        let _ = write!(out, "<a href='{0}'>{0}</a>", m.as_str());
        last = m.end();
    }
    out.push_str(&segment[last..]);
}
