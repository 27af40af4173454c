use regex::Regex;

/// Something to look for in a block of text: a literal substring or a regex.
#[derive(Debug, Clone)]
pub enum Needle {
    Text(String),
    Pattern(Regex),
}

impl Needle {
    pub fn found_in(&self, haystack: &str) -> bool {
        match self {
            Needle::Text(text) => haystack.contains(text.as_str()),
            Needle::Pattern(regex) => regex.is_match(haystack),
        }
    }
}

impl From<&str> for Needle {
    fn from(text: &str) -> Self {
        Needle::Text(text.to_string())
    }
}

impl From<String> for Needle {
    fn from(text: String) -> Self {
        Needle::Text(text)
    }
}

impl From<Regex> for Needle {
    fn from(regex: Regex) -> Self {
        Needle::Pattern(regex)
    }
}

impl From<&Regex> for Needle {
    fn from(regex: &Regex) -> Self {
        Needle::Pattern(regex.clone())
    }
}

impl From<&Needle> for Needle {
    fn from(needle: &Needle) -> Self {
        needle.clone()
    }
}
