//! Markup tokenizer for untrusted chat text.
//!
//! A small finite-state machine over a byte cursor. It is deliberately not an
//! HTML5 tokenizer: it only knows enough to split text from tags, read
//! attributes with any quoting, and swallow `<script>` bodies whole. Every
//! delimiter it looks for is ASCII, so all slices land on char boundaries.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Plain text, looking for the next `<` that opens markup.
    Text,
    /// Just past `<`, reading an optional `/` and the tag name.
    TagOpen,
    /// Inside a tag, reading attributes until `>`.
    InTag,
    /// After a `<script>` start tag, skipping to the matching close tag.
    ScriptBody,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute<'a> {
    pub name: &'a str,
    /// Value without its quotes. `None` for a bare attribute like `<div hidden>`.
    pub value: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag<'a> {
    /// Name as written in the source; compare with `eq_ignore_ascii_case`.
    pub name: &'a str,
    pub attrs: Vec<Attribute<'a>>,
    pub self_closing: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    Text(&'a str),
    StartTag(Tag<'a>),
    EndTag(&'a str),
    /// Comment, doctype or processing instruction, including delimiters.
    Markup(&'a str),
    /// Everything after a `<script>` start tag up to and including its close
    /// tag, or to the end of input when the close tag is missing.
    ScriptBody(&'a str),
    /// Markup that never reached its closing `>`: from `<` to end of input.
    Unterminated(&'a str),
}

pub struct Tokenizer<'a> {
    input: &'a str,
    pos: usize,
    state: State,
    /// Start of the markup currently being read (the `<`).
    mark: usize,
    closing: bool,
    name: &'a str,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            state: State::Text,
            mark: 0,
            closing: false,
            name: "",
        }
    }

    fn unterminated(&mut self) -> Token<'a> {
        let rest = &self.input[self.mark..];
        self.pos = self.input.len();
        self.state = State::Text;
        Token::Unterminated(rest)
    }

    fn text(&mut self) -> Option<Token<'a>> {
        let rest = &self.input[self.pos..];
        match find_markup_start(rest) {
            Some(0) => {
                self.mark = self.pos;
                self.pos += 1;
                self.state = State::TagOpen;
                None
            }
            Some(i) => {
                self.pos += i;
                Some(Token::Text(&rest[..i]))
            }
            None => {
                self.pos = self.input.len();
                Some(Token::Text(rest))
            }
        }
    }

    fn tag_open(&mut self) -> Option<Token<'a>> {
        let bytes = self.input.as_bytes();
        let mut p = self.pos;

        match bytes[p] {
            b'!' | b'?' => return Some(self.declaration()),
            b'/' => {
                self.closing = true;
                p += 1;
            }
            _ => self.closing = false,
        }

        let start = p;
        while p < bytes.len() && !is_name_end(bytes[p]) {
            p += 1;
        }
        self.name = &self.input[start..p];
        self.pos = p;
        self.state = State::InTag;
        None
    }

    /// `<!-- ... -->`, `<!DOCTYPE ...>`, `<?xml ...?>`. Dropped wholesale.
    fn declaration(&mut self) -> Token<'a> {
        let rest = &self.input[self.pos..];
        let end = if rest.starts_with("!--") {
            rest[3..].find("-->").map(|i| self.pos + 3 + i + 3)
        } else {
            rest.find('>').map(|i| self.pos + i + 1)
        };

        match end {
            Some(end) => {
                self.pos = end;
                self.state = State::Text;
                Token::Markup(&self.input[self.mark..end])
            }
            None => self.unterminated(),
        }
    }

    fn in_tag(&mut self) -> Token<'a> {
        let bytes = self.input.as_bytes();
        let len = bytes.len();
        let mut p = self.pos;
        let mut attrs = Vec::new();
        let mut self_closing = false;

        loop {
            while p < len && (bytes[p].is_ascii_whitespace() || bytes[p] == b'/') {
                self_closing = bytes[p] == b'/' && bytes.get(p + 1) == Some(&b'>');
                p += 1;
            }
            if p >= len {
                return self.unterminated();
            }
            if bytes[p] == b'>' {
                p += 1;
                break;
            }

            let start = p;
            while p < len && !is_name_end(bytes[p]) && !(bytes[p] == b'=' && p > start) {
                p += 1;
            }
            let name = &self.input[start..p];

            while p < len && bytes[p].is_ascii_whitespace() {
                p += 1;
            }

            let mut value = None;
            if p < len && bytes[p] == b'=' {
                p += 1;
                while p < len && bytes[p].is_ascii_whitespace() {
                    p += 1;
                }
                if p < len && (bytes[p] == b'"' || bytes[p] == b'\'') {
                    let quote = bytes[p] as char;
                    let vstart = p + 1;
                    match self.input[vstart..].find(quote) {
                        Some(i) => {
                            value = Some(&self.input[vstart..vstart + i]);
                            p = vstart + i + 1;
                        }
                        None => return self.unterminated(),
                    }
                } else {
                    let vstart = p;
                    while p < len && !bytes[p].is_ascii_whitespace() && bytes[p] != b'>' {
                        p += 1;
                    }
                    value = Some(&self.input[vstart..p]);
                }
            }

            attrs.push(Attribute { name, value });
        }

        self.pos = p;
        if self.closing {
            self.state = State::Text;
            return Token::EndTag(self.name);
        }

        self.state = if self.name.eq_ignore_ascii_case("script") {
            State::ScriptBody
        } else {
            State::Text
        };
        Token::StartTag(Tag {
            name: self.name,
            attrs,
            self_closing,
        })
    }

    fn script_body(&mut self) -> Token<'a> {
        let rest = &self.input[self.pos..];
        let end = match find_script_close(rest) {
            Some(i) => match rest[i..].find('>') {
                Some(j) => self.pos + i + j + 1,
                None => self.input.len(),
            },
            None => self.input.len(),
        };

        let body = &self.input[self.pos..end];
        self.pos = end;
        self.state = State::Text;
        Token::ScriptBody(body)
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        loop {
            if self.pos >= self.input.len() {
                return match self.state {
                    State::Text | State::ScriptBody => None,
                    State::TagOpen | State::InTag => Some(self.unterminated()),
                };
            }

            let token = match self.state {
                State::Text => self.text(),
                State::TagOpen => self.tag_open(),
                State::InTag => Some(self.in_tag()),
                State::ScriptBody => Some(self.script_body()),
            };
            if token.is_some() {
                return token;
            }
        }
    }
}

fn is_name_end(b: u8) -> bool {
    b.is_ascii_whitespace() || b == b'/' || b == b'>'
}

/// Finds the next `<` that opens markup. A `<` followed by anything other
/// than a letter, `/`, `!` or `?` (as in `a < b`) stays text.
fn find_markup_start(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut from = 0;
    while let Some(i) = s[from..].find('<') {
        let at = from + i;
        match bytes.get(at + 1) {
            Some(b) if b.is_ascii_alphabetic() || matches!(b, b'/' | b'!' | b'?') => {
                return Some(at);
            }
            _ => from = at + 1,
        }
    }
    None
}

fn find_script_close(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut from = 0;
    while let Some(i) = s[from..].find("</") {
        let at = from + i;
        let tail = &bytes[at + 2..];
        if tail.len() >= 6
            && tail[..6].eq_ignore_ascii_case(b"script")
            && tail.get(6).is_none_or(|b| is_name_end(*b))
        {
            return Some(at);
        }
        from = at + 2;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Vec<Token<'_>> {
        Tokenizer::new(input).collect()
    }

    #[test]
    fn plain_text_is_one_token() {
        assert_eq!(tokens("hello world"), vec![Token::Text("hello world")]);
        assert_eq!(tokens(""), vec![]);
    }

    #[test]
    fn splits_text_and_tags() {
        assert_eq!(
            tokens("a <b>bold</b> c"),
            vec![
                Token::Text("a "),
                Token::StartTag(Tag { name: "b", attrs: vec![], self_closing: false }),
                Token::Text("bold"),
                Token::EndTag("b"),
                Token::Text(" c"),
            ]
        );
    }

    #[test]
    fn reads_attributes_with_any_quoting() {
        let toks = tokens(r#"<div class='red' id="x" data=plain hidden>"#);
        let Token::StartTag(tag) = &toks[0] else {
            panic!("expected start tag, got {:?}", toks[0]);
        };
        assert_eq!(tag.name, "div");
        assert_eq!(
            tag.attrs,
            vec![
                Attribute { name: "class", value: Some("red") },
                Attribute { name: "id", value: Some("x") },
                Attribute { name: "data", value: Some("plain") },
                Attribute { name: "hidden", value: None },
            ]
        );
    }

    #[test]
    fn quoted_value_may_contain_angle_bracket() {
        let toks = tokens("<div title='a>b'>x");
        let Token::StartTag(tag) = &toks[0] else {
            panic!("expected start tag");
        };
        assert_eq!(tag.attrs[0].value, Some("a>b"));
        assert_eq!(toks[1], Token::Text("x"));
    }

    #[test]
    fn spaces_around_equals() {
        let toks = tokens("<div class = 'red'>");
        let Token::StartTag(tag) = &toks[0] else {
            panic!("expected start tag");
        };
        assert_eq!(tag.attrs, vec![Attribute { name: "class", value: Some("red") }]);
    }

    #[test]
    fn self_closing_tag() {
        let toks = tokens("<br/>");
        assert_eq!(
            toks,
            vec![Token::StartTag(Tag { name: "br", attrs: vec![], self_closing: true })]
        );
    }

    #[test]
    fn script_body_is_one_token() {
        assert_eq!(
            tokens("x<script>alert('<b>')</script>y"),
            vec![
                Token::Text("x"),
                Token::StartTag(Tag { name: "script", attrs: vec![], self_closing: false }),
                Token::ScriptBody("alert('<b>')</script>"),
                Token::Text("y"),
            ]
        );
    }

    #[test]
    fn script_close_is_case_insensitive() {
        let toks = tokens("<SCRIPT>evil()</ScRiPt >after");
        assert_eq!(toks[1], Token::ScriptBody("evil()</ScRiPt >"));
        assert_eq!(toks[2], Token::Text("after"));
    }

    #[test]
    fn script_close_needs_name_boundary() {
        let toks = tokens("<script>a</scripts>b</script>c");
        assert_eq!(toks[1], Token::ScriptBody("a</scripts>b</script>"));
        assert_eq!(toks[2], Token::Text("c"));
    }

    #[test]
    fn unclosed_script_swallows_rest() {
        let toks = tokens("ok <script>never closed <b>x</b>");
        assert_eq!(toks.last(), Some(&Token::ScriptBody("never closed <b>x</b>")));
    }

    #[test]
    fn unterminated_tag_runs_to_end() {
        assert_eq!(
            tokens("text <div class='x"),
            vec![Token::Text("text "), Token::Unterminated("<div class='x")]
        );
        assert_eq!(
            tokens("text <b"),
            vec![Token::Text("text "), Token::Unterminated("<b")]
        );
    }

    #[test]
    fn less_than_without_tag_is_text() {
        assert_eq!(tokens("1 < 2 <3"), vec![Token::Text("1 < 2 <3")]);
        assert_eq!(tokens("trailing <"), vec![Token::Text("trailing <")]);
    }

    #[test]
    fn comments_and_doctype_are_markup() {
        assert_eq!(
            tokens("a<!-- x > y -->b<!DOCTYPE html>c"),
            vec![
                Token::Text("a"),
                Token::Markup("<!-- x > y -->"),
                Token::Text("b"),
                Token::Markup("<!DOCTYPE html>"),
                Token::Text("c"),
            ]
        );
    }

    #[test]
    fn multibyte_text_survives() {
        assert_eq!(
            tokens("héllo <em>wörld</em> 🎉"),
            vec![
                Token::Text("héllo "),
                Token::StartTag(Tag { name: "em", attrs: vec![], self_closing: false }),
                Token::Text("wörld"),
                Token::EndTag("em"),
                Token::Text(" 🎉"),
            ]
        );
    }
}
