use crate::dom::{Dom, NodeId};
use crate::{Error, Result};

/// Parses page markup into a [`Dom`].
///
/// This is a forgiving tree builder, not a conforming HTML parser: unknown end
/// tags pop back to the nearest matching open element, void elements never
/// take children, and `script`/`style`/`textarea`/`title` bodies are kept as
/// raw text.
pub fn parse_html(html: &str) -> Result<Dom> {
    let mut dom = Dom::new();
    let mut stack = vec![dom.root()];
    let bytes = html.as_bytes();
    let mut i = 0usize;

    while i < bytes.len() {
        if starts_with_at(bytes, i, b"<!--") {
            if let Some(end) = find_subslice(bytes, i + 4, b"-->") {
                i = end + 3;
            } else {
                return Err(Error::HtmlParse("unclosed HTML comment".into()));
            }
            continue;
        }

        if bytes[i] == b'<' && bytes.get(i + 1).is_some_and(|b| is_tag_open_char(*b)) {
            if starts_with_at(bytes, i, b"</") {
                let mut cursor = Cursor::at(html, i);
                let tag = cursor.end_tag()?;
                i = cursor.pos;
                close_to_matching(&dom, &mut stack, &tag);
                continue;
            }

            if starts_with_at(bytes, i, b"<!") {
                i = parse_declaration_tag(html, i)?;
                continue;
            }

            let (tag, attrs, self_closing, next) = parse_start_tag(html, i)?;
            i = next;

            let parent = *stack
                .last()
                .ok_or_else(|| Error::HtmlParse("missing parent element".into()))?;
            let node = dom.create_element(parent, &tag, attrs);

            if is_raw_text_tag(&tag) && !self_closing {
                let close = find_case_insensitive_end_tag(bytes, i, tag.as_bytes())
                    .ok_or_else(|| Error::HtmlParse(format!("unclosed <{tag}>")))?;
                if let Some(body) = html.get(i..close) {
                    if !body.is_empty() {
                        let body = if tag == "script" || tag == "style" {
                            body.to_string()
                        } else {
                            decode_html_character_references(body)
                        };
                        dom.create_text(node, &body);
                    }
                }
                let mut cursor = Cursor::at(html, close);
                cursor.end_tag()?;
                i = cursor.pos;
                continue;
            }

            if !self_closing && !is_void_tag(&tag) {
                stack.push(node);
            }
            continue;
        }

        let text_start = i;
        i += 1;
        while i < bytes.len() && bytes[i] != b'<' {
            i += 1;
        }

        if let Some(text) = html.get(text_start..i) {
            let parent = *stack
                .last()
                .ok_or_else(|| Error::HtmlParse("missing parent element".into()))?;
            let decoded = decode_html_character_references(text);
            if !decoded.is_empty() {
                dom.create_text(parent, &decoded);
            }
        }
    }

    Ok(dom)
}

fn close_to_matching(dom: &Dom, stack: &mut Vec<NodeId>, tag: &str) {
    let Some(index) = (1..stack.len())
        .rev()
        .find(|index| dom.tag_name(stack[*index]) == Some(tag))
    else {
        // Stray end tag.
        return;
    };
    stack.truncate(index);
}

fn parse_start_tag(html: &str, at: usize) -> Result<(String, Vec<(String, String)>, bool, usize)> {
    let mut cursor = Cursor::at(html, at);
    if !cursor.eat("<") {
        return Err(Error::HtmlParse("expected '<'".into()));
    }
    let tag = cursor.take_while(tag_name_byte)?.to_ascii_lowercase();
    if tag.is_empty() {
        return Err(Error::HtmlParse("empty tag name".into()));
    }

    let mut attrs: Vec<(String, String)> = Vec::new();
    let self_closing = loop {
        cursor.skip_whitespace();
        if cursor.eat("/>") {
            break true;
        }
        match cursor.peek() {
            None => return Err(Error::HtmlParse(format!("unclosed start tag <{tag}>"))),
            Some(b'>') => {
                cursor.pos += 1;
                break false;
            }
            Some(b) if !attr_name_byte(b) => {
                // Stray '/' or quote between attributes.
                cursor.pos += 1;
                continue;
            }
            Some(_) => {}
        }

        let name = cursor.take_while(attr_name_byte)?.to_ascii_lowercase();
        cursor.skip_whitespace();
        let value = if cursor.eat("=") {
            cursor.skip_whitespace();
            cursor.attr_value()?
        } else {
            String::new()
        };

        // First duplicate wins.
        if !attrs.iter().any(|(key, _)| *key == name) {
            attrs.push((name, value));
        }
    };

    Ok((tag, attrs, self_closing, cursor.pos))
}

fn parse_declaration_tag(html: &str, at: usize) -> Result<usize> {
    let bytes = html.as_bytes();
    let mut i = at + 2;
    let mut quote: Option<u8> = None;

    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None => match b {
                b'\'' | b'"' => quote = Some(b),
                b'>' => return Ok(i + 1),
                _ => {}
            },
        }
        i += 1;
    }

    Err(Error::HtmlParse("unclosed declaration tag".into()))
}

/// Byte position in the markup. It only ever stops on ASCII delimiters, so
/// slices taken between two stops are valid `str` ranges.
struct Cursor<'a> {
    html: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn at(html: &'a str, pos: usize) -> Self {
        Self { html, pos }
    }

    fn rest(&self) -> &'a str {
        self.html.get(self.pos..).unwrap_or_default()
    }

    fn peek(&self) -> Option<u8> {
        self.html.as_bytes().get(self.pos).copied()
    }

    fn eat(&mut self, prefix: &str) -> bool {
        let matched = self.rest().starts_with(prefix);
        if matched {
            self.pos += prefix.len();
        }
        matched
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn since(&self, start: usize) -> Result<&'a str> {
        self.html
            .get(start..self.pos)
            .ok_or_else(|| Error::HtmlParse(format!("malformed markup at byte {start}")))
    }

    fn take_while(&mut self, keep: fn(u8) -> bool) -> Result<&'a str> {
        let start = self.pos;
        while self.peek().is_some_and(keep) {
            self.pos += 1;
        }
        self.since(start)
    }

    /// Reads `</name ...>` and returns the lowercased name.
    fn end_tag(&mut self) -> Result<String> {
        if !self.eat("</") {
            return Err(Error::HtmlParse(format!(
                "expected end tag at byte {}",
                self.pos
            )));
        }
        self.skip_whitespace();
        let tag = self.take_while(tag_name_byte)?.to_ascii_lowercase();
        let Some(offset) = self.rest().find('>') else {
            return Err(Error::HtmlParse(format!("unclosed end tag </{tag}")));
        };
        self.pos += offset + 1;
        Ok(tag)
    }

    /// Reads a quoted or bare attribute value and decodes its references.
    fn attr_value(&mut self) -> Result<String> {
        let raw = match self.peek() {
            None => return Err(Error::HtmlParse("missing attribute value".into())),
            Some(quote @ (b'"' | b'\'')) => {
                self.pos += 1;
                let start = self.pos;
                while self.peek().is_some_and(|b| b != quote) {
                    self.pos += 1;
                }
                let raw = self.since(start)?;
                if self.peek().is_none() {
                    return Err(Error::HtmlParse("unclosed quoted attribute value".into()));
                }
                self.pos += 1;
                raw
            }
            Some(_) => {
                let start = self.pos;
                while let Some(b) = self.peek() {
                    if b.is_ascii_whitespace() || b == b'>' || self.rest().starts_with("/>") {
                        break;
                    }
                    self.pos += 1;
                }
                self.since(start)?
            }
        };
        Ok(decode_html_character_references(raw))
    }
}

fn decode_html_character_references(src: &str) -> String {
    if !src.contains('&') {
        return src.to_string();
    }

    let mut out = String::with_capacity(src.len());
    let mut rest = src;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp + 1..];
        let decoded = tail.find(';').and_then(|semi| {
            let raw = &tail[..semi];
            let ch = if let Some(num) = raw.strip_prefix('#') {
                decode_numeric(num)
            } else {
                decode_named(raw)
            }?;
            Some((ch, semi + 1))
        });
        match decoded {
            Some((ch, consumed)) => {
                out.push(ch);
                rest = &tail[consumed..];
            }
            None => {
                out.push('&');
                rest = tail;
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_numeric(value: &str) -> Option<char> {
    let codepoint = if let Some(hex) = value.strip_prefix('x').or_else(|| value.strip_prefix('X')) {
        u32::from_str_radix(hex, 16).ok()?
    } else {
        value.parse::<u32>().ok()?
    };
    char::from_u32(codepoint)
}

fn decode_named(value: &str) -> Option<char> {
    match value {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{00A0}'),
        "dollar" => Some('$'),
        "minus" => Some('\u{2212}'),
        "plus" => Some('+'),
        _ => None,
    }
}

fn is_tag_open_char(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'/' || b == b'!'
}

fn tag_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_')
}

fn attr_name_byte(b: u8) -> bool {
    tag_name_byte(b) || b == b':'
}

fn is_raw_text_tag(tag: &str) -> bool {
    matches!(tag, "script" | "style" | "textarea" | "title")
}

const VOID_TAGS: [&str; 14] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

/// Elements that never take children or an end tag.
pub(crate) fn is_void_tag(tag: &str) -> bool {
    VOID_TAGS.contains(&tag)
}

fn starts_with_at(bytes: &[u8], at: usize, needle: &[u8]) -> bool {
    bytes
        .get(at..at + needle.len())
        .is_some_and(|window| window == needle)
}

fn find_subslice(bytes: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || from > bytes.len() {
        return None;
    }
    bytes[from..]
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|pos| from + pos)
}

fn find_case_insensitive_end_tag(bytes: &[u8], from: usize, tag: &[u8]) -> Option<usize> {
    let mut i = from;
    while i + 2 + tag.len() <= bytes.len() {
        if bytes[i] == b'<'
            && bytes[i + 1] == b'/'
            && bytes[i + 2..i + 2 + tag.len()].eq_ignore_ascii_case(tag)
        {
            let after = bytes.get(i + 2 + tag.len()).copied();
            if matches!(after, None | Some(b'>') | Some(b' ' | b'\t' | b'\n' | b'\r' | b'/')) {
                return Some(i);
            }
        }
        i += 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_inputs_and_labels_with_ids() -> Result<()> {
        let dom = parse_html(
            r#"<!DOCTYPE html>
            <form>
              <input type="range" id="Income" min="0" max="200000" value="50000">
              <span id="slider_value_Income">$50000</span>
            </form>"#,
        )?;
        let input = dom
            .by_id("Income")
            .ok_or_else(|| Error::ElementNotFound("Income".into()))?;
        assert_eq!(dom.tag_name(input), Some("input"));
        assert_eq!(dom.value(input)?, "50000");
        assert_eq!(dom.attr(input, "max"), Some("200000"));

        let label = dom
            .by_id("slider_value_Income")
            .ok_or_else(|| Error::ElementNotFound("slider_value_Income".into()))?;
        assert_eq!(dom.text_content(label), "$50000");
        Ok(())
    }

    #[test]
    fn void_input_does_not_swallow_siblings() -> Result<()> {
        let dom = parse_html(r#"<div id="row"><input id="a"><span id="b">x</span></div>"#)?;
        let row = dom.by_id("row").ok_or_else(|| Error::ElementNotFound("row".into()))?;
        let span = dom.by_id("b").ok_or_else(|| Error::ElementNotFound("b".into()))?;
        assert_eq!(dom.parent(span), Some(row));
        Ok(())
    }

    #[test]
    fn script_body_is_raw_text() -> Result<()> {
        let dom = parse_html(
            "<script id=\"s\">if (a < b) { show_value_Income(1); }</script><p id=\"p\">&lt;ok&gt;</p>",
        )?;
        let script = dom.by_id("s").ok_or_else(|| Error::ElementNotFound("s".into()))?;
        assert_eq!(dom.text_content(script), "if (a < b) { show_value_Income(1); }");
        let p = dom.by_id("p").ok_or_else(|| Error::ElementNotFound("p".into()))?;
        assert_eq!(dom.text_content(p), "<ok>");
        Ok(())
    }

    #[test]
    fn attribute_entities_are_decoded() -> Result<()> {
        let dom = parse_html(r#"<button id="b" onclick="show_value_Income(&quot;7&quot;)">+</button>"#)?;
        let b = dom.by_id("b").ok_or_else(|| Error::ElementNotFound("b".into()))?;
        assert_eq!(dom.attr(b, "onclick"), Some("show_value_Income(\"7\")"));
        Ok(())
    }

    #[test]
    fn bare_less_than_in_text_is_kept() -> Result<()> {
        let dom = parse_html("<p id=\"p\">1 < 2</p>")?;
        let p = dom.by_id("p").ok_or_else(|| Error::ElementNotFound("p".into()))?;
        assert_eq!(dom.text_content(p), "1 < 2");
        Ok(())
    }

    #[test]
    fn unclosed_comment_is_an_error() {
        let err = parse_html("<p><!-- never closed").expect_err("comment should fail");
        assert_eq!(err, Error::HtmlParse("unclosed HTML comment".into()));
    }

    #[test]
    fn stray_end_tag_is_ignored() -> Result<()> {
        let dom = parse_html("<div id=\"d\"></span><b id=\"x\"></b></div>")?;
        let d = dom.by_id("d").ok_or_else(|| Error::ElementNotFound("d".into()))?;
        let x = dom.by_id("x").ok_or_else(|| Error::ElementNotFound("x".into()))?;
        assert_eq!(dom.parent(x), Some(d));
        Ok(())
    }

    #[test]
    fn attribute_values_quoted_bare_and_self_closing() -> Result<()> {
        let dom = parse_html(
            "<div id=wrap><input id=Income value=50000/><span id='slider_value_Income' data-format=\"currency\" hidden></span></ div ></div>",
        )?;
        let wrap = dom.by_id("wrap").ok_or_else(|| Error::ElementNotFound("wrap".into()))?;
        let input = dom.by_id("Income").ok_or_else(|| Error::ElementNotFound("Income".into()))?;
        let label = dom
            .by_id("slider_value_Income")
            .ok_or_else(|| Error::ElementNotFound("slider_value_Income".into()))?;
        assert_eq!(dom.value(input)?, "50000");
        assert_eq!(dom.parent(label), Some(wrap));
        assert_eq!(dom.attr(label, "data-format"), Some("currency"));
        assert_eq!(dom.attr(label, "hidden"), Some(""));
        Ok(())
    }

    #[test]
    fn unclosed_quoted_value_is_an_error() {
        let err = parse_html("<input id=\"Income value=1>").expect_err("quote should fail");
        assert_eq!(err, Error::HtmlParse("unclosed quoted attribute value".into()));
    }
}
