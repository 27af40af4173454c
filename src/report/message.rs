//! A small subset of ICU MessageFormat.
//!
//! Supported syntax:
//! - `{name}` substitutes a value
//! - `{name, select, key {...} other {...}}` picks a branch by value
//! - `<tag>...</tag>` and `<tag/>` for tags in [`SAFE_HTML_TAGS`]
//! - apostrophe quoting: `''` is a literal `'`, and `'{...}'` is literal text
//!
//! Every other argument type (`number`, `plural`, `date`, ...) is rejected.

use crate::error::FormatError;

use super::types::Values;

/// Markup tags allowed to pass through into rendered comments
pub const SAFE_HTML_TAGS: &[&str] = &[
    "h1", "h2", "h3", "h4", "h5", "h6", "h7", "h8", "br", "b", "i", "strong", "em", "a", "pre",
    "code", "img", "tt", "div", "ins", "del", "sup", "sub", "p", "ol", "ul", "table", "thead",
    "tbody", "tfoot", "blockquote", "dl", "dt", "dd", "kbd", "q", "samp", "var", "hr", "ruby",
    "rt", "rp", "li", "tr", "td", "th", "s", "strike", "summary", "details", "caption", "figure",
    "figcaption", "abbr", "bdo", "cite", "dfn", "mark", "small", "span", "time", "wbr",
];

#[derive(Debug, Clone, PartialEq, Eq)]
enum Node {
    Text(String),
    Argument(String),
    Select {
        name: String,
        cases: Vec<(String, Vec<Node>)>,
    },
    Tag {
        name: String,
        children: Option<Vec<Node>>,
    },
}

/// A parsed message template, ready to be formatted with values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageTemplate {
    nodes: Vec<Node>,
}

impl MessageTemplate {
    pub fn parse(source: &str) -> Result<Self, FormatError> {
        let mut parser = Parser { source, pos: 0 };
        let nodes = parser.nodes(Scope::Top)?;
        Ok(Self { nodes })
    }

    /// Substitute `values` into the template. Every referenced placeholder
    /// must have a value.
    pub fn format(&self, values: &Values) -> Result<String, FormatError> {
        let mut out = String::new();
        write_nodes(&self.nodes, values, &mut out)?;
        Ok(out)
    }
}

/// Parse and format in one step
pub fn format_message(source: &str, values: &Values) -> Result<String, FormatError> {
    MessageTemplate::parse(source)?.format(values)
}

fn write_nodes(nodes: &[Node], values: &Values, out: &mut String) -> Result<(), FormatError> {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Argument(name) => out.push_str(lookup(values, name)?),
            Node::Select { name, cases } => {
                let value = lookup(values, name)?;
                let branch = cases
                    .iter()
                    .find(|(key, _)| key == value)
                    .or_else(|| cases.iter().find(|(key, _)| key == "other"));
                if let Some((_, nodes)) = branch {
                    write_nodes(nodes, values, out)?;
                }
            }
            Node::Tag { name, children } => match children {
                None => {
                    out.push('<');
                    out.push_str(name);
                    out.push_str(" />");
                }
                Some(children) => {
                    out.push('<');
                    out.push_str(name);
                    out.push('>');
                    write_nodes(children, values, out)?;
                    out.push_str("</");
                    out.push_str(name);
                    out.push('>');
                }
            },
        }
    }
    Ok(())
}

fn lookup<'a>(values: &'a Values, name: &str) -> Result<&'a str, FormatError> {
    values
        .get(name)
        .map(String::as_str)
        .ok_or_else(|| FormatError::MissingValue(name.to_string()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope<'a> {
    Top,
    Case,
    Tag(&'a str),
}

struct Parser<'a> {
    source: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn rest(&self) -> &'a str {
        &self.source[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        self.rest().chars().nth(1)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn error(&self, reason: impl Into<String>) -> FormatError {
        FormatError::Parse {
            offset: self.pos,
            reason: reason.into(),
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), FormatError> {
        match self.peek() {
            Some(c) if c == expected => {
                self.bump();
                Ok(())
            }
            Some(c) => Err(self.error(format!("expected `{}`, found `{}`", expected, c))),
            None => Err(self.error(format!("expected `{}`, found end of message", expected))),
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn take_while(&mut self, keep: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos;
        while self.peek().is_some_and(&keep) {
            self.bump();
        }
        &self.source[start..self.pos]
    }

    fn nodes(&mut self, scope: Scope<'_>) -> Result<Vec<Node>, FormatError> {
        let mut nodes = Vec::new();
        let mut text = String::new();

        loop {
            match self.peek() {
                None => match scope {
                    Scope::Top => break,
                    Scope::Case => return Err(self.error("unclosed select case")),
                    Scope::Tag(name) => return Err(self.error(format!("unclosed tag <{}>", name))),
                },
                Some('}') => match scope {
                    Scope::Case => break,
                    _ => return Err(self.error("unexpected `}`")),
                },
                Some('{') => {
                    flush(&mut text, &mut nodes);
                    nodes.push(self.argument()?);
                }
                Some('<') if self.peek_second() == Some('/') => match scope {
                    Scope::Tag(_) => break,
                    _ => return Err(self.error("closing tag without an opening tag")),
                },
                Some('<') if self.peek_second().is_some_and(|c| c.is_ascii_alphabetic()) => {
                    flush(&mut text, &mut nodes);
                    nodes.push(self.tag()?);
                }
                Some('\'') => self.quoted(&mut text),
                Some(c) => {
                    self.bump();
                    text.push(c);
                }
            }
        }

        flush(&mut text, &mut nodes);
        Ok(nodes)
    }

    fn quoted(&mut self, text: &mut String) {
        self.bump();
        match self.peek() {
            Some('\'') => {
                self.bump();
                text.push('\'');
            }
            Some('{' | '}' | '<' | '>') => {
                // Literal until the next lone apostrophe or the end of input.
                while let Some(c) = self.bump() {
                    if c != '\'' {
                        text.push(c);
                    } else if self.peek() == Some('\'') {
                        self.bump();
                        text.push('\'');
                    } else {
                        break;
                    }
                }
            }
            _ => text.push('\''),
        }
    }

    fn identifier(&mut self, what: &str) -> Result<&'a str, FormatError> {
        let name = self.take_while(|c| c.is_alphanumeric() || c == '_' || c == '-');
        if name.is_empty() {
            return Err(self.error(format!("expected {}", what)));
        }
        Ok(name)
    }

    fn argument(&mut self) -> Result<Node, FormatError> {
        self.expect('{')?;
        self.skip_whitespace();
        let name = self.identifier("argument name")?.to_string();
        self.skip_whitespace();

        match self.peek() {
            Some('}') => {
                self.bump();
                Ok(Node::Argument(name))
            }
            Some(',') => {
                self.bump();
                self.skip_whitespace();
                let kind = self.identifier("argument type")?;
                if kind != "select" {
                    return Err(FormatError::UnsupportedArgument {
                        name,
                        kind: kind.to_string(),
                    });
                }
                self.skip_whitespace();
                self.expect(',')?;
                let cases = self.select_cases()?;
                Ok(Node::Select { name, cases })
            }
            _ => Err(self.error(format!("unclosed argument `{}`", name))),
        }
    }

    fn select_cases(&mut self) -> Result<Vec<(String, Vec<Node>)>, FormatError> {
        let mut cases = Vec::new();
        loop {
            self.skip_whitespace();
            if self.peek() == Some('}') {
                self.bump();
                break;
            }
            let key = self
                .take_while(|c| !c.is_whitespace() && c != '{' && c != '}')
                .to_string();
            if key.is_empty() {
                return Err(self.error("expected select case"));
            }
            self.skip_whitespace();
            self.expect('{')?;
            let nodes = self.nodes(Scope::Case)?;
            self.expect('}')?;
            cases.push((key, nodes));
        }

        if !cases.iter().any(|(key, _)| key == "other") {
            return Err(self.error("select requires an `other` case"));
        }
        Ok(cases)
    }

    fn tag(&mut self) -> Result<Node, FormatError> {
        let start = self.pos;
        self.expect('<')?;
        let name = self.identifier("tag name")?.to_string();
        if !SAFE_HTML_TAGS.contains(&name.as_str()) {
            return Err(FormatError::DisallowedTag(name));
        }
        self.skip_whitespace();

        if self.rest().starts_with("/>") {
            self.pos += 2;
            return Ok(Node::Tag {
                name,
                children: None,
            });
        }
        self.expect('>')?;

        let children = self.nodes(Scope::Tag(&name))?;

        self.expect('<')?;
        self.expect('/')?;
        let closing = self.identifier("closing tag name")?;
        if closing != name {
            return Err(FormatError::Parse {
                offset: start,
                reason: format!("<{}> closed by </{}>", name, closing),
            });
        }
        self.skip_whitespace();
        self.expect('>')?;

        Ok(Node::Tag {
            name,
            children: Some(children),
        })
    }
}

fn flush(text: &mut String, nodes: &mut Vec<Node>) {
    if !text.is_empty() {
        nodes.push(Node::Text(std::mem::take(text)));
    }
}
