//! Distinguished names and their canonical renderings.

use crate::Error;
use std::fmt;

const RDN_SEP: char = ',';
const CANONICAL_SEP: &str = "/";
const CANONICAL_EX_SEP: &str = "\n";

/// Relative distinguished name (single attribute/value pair).
#[derive(Debug, Clone)]
pub struct Rdn {
    attribute: String,
    value: String,
}

impl Rdn {
    pub fn new(attribute: &str, value: &str) -> Self {
        Self {
            attribute: attribute.to_owned(),
            value: value.to_owned(),
        }
    }

    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    fn matches(&self, other: &Rdn) -> bool {
        self.attribute.eq_ignore_ascii_case(&other.attribute)
            && self.value.to_lowercase() == other.value.to_lowercase()
    }
}

/// A parsed distinguished name, leaf component first. Equality ignores case.
#[derive(Debug, Clone)]
pub struct DistinguishedName {
    components: Vec<Rdn>,
}

impl DistinguishedName {
    pub fn parse(input: &str) -> anyhow::Result<Self> {
        let input = input.trim();
        if input.is_empty() {
            Err(Error::LDB_ERR_INVALID_DN_SYNTAX)?
        }
        let mut components = vec![];
        for component in split_unescaped(input, RDN_SEP)? {
            components.push(parse_rdn(component)?);
        }
        Ok(Self { components })
    }

    pub fn components(&self) -> &[Rdn] {
        &self.components
    }

    /// Value of the leaf component, e.g. `Administrator` for `CN=Administrator,...`.
    pub fn rdn_value(&self) -> Option<&str> {
        self.components.first().map(Rdn::value)
    }

    pub fn parent(&self) -> Option<Self> {
        match self.components.len() {
            0 | 1 => None,
            _ => Some(Self {
                components: self.components[1..].to_vec(),
            }),
        }
    }

    pub fn child(&self, attribute: &str, value: &str) -> Self {
        let mut components = vec![Rdn::new(attribute, value)];
        components.extend(self.components.iter().cloned());
        Self { components }
    }

    /// Whether `self` lies at or below `base`.
    pub fn is_under(&self, base: &DistinguishedName) -> bool {
        let Some(offset) = self.components.len().checked_sub(base.components.len()) else {
            return false;
        };
        self.components[offset..]
            .iter()
            .zip(&base.components)
            .all(|(a, b)| a.matches(b))
    }

    pub fn is_child_of(&self, base: &DistinguishedName) -> bool {
        self.components.len() == base.components.len() + 1 && self.is_under(base)
    }

    /// `example.com/Users/Administrator`
    pub fn canonical(&self) -> String {
        self.canonical_with(CANONICAL_SEP)
    }

    /// `example.com/Users\nAdministrator`
    pub fn canonical_ex(&self) -> String {
        self.canonical_with(CANONICAL_EX_SEP)
    }

    // Trailing DC components form the dotted domain, the rest are appended
    // root-first. The last separator is the format-specific one.
    fn canonical_with(&self, last_sep: &str) -> String {
        let mut remaining = self.components.len();
        let mut domain: Vec<String> = vec![];
        while remaining > 0 && self.components[remaining - 1].attribute.eq_ignore_ascii_case("dc") {
            domain.push(escape_value(&self.components[remaining - 1].value));
            remaining -= 1;
        }
        domain.reverse();
        let mut cracked = domain.join(".");
        if remaining == 0 {
            cracked.push_str(last_sep);
            return cracked;
        }
        for component in self.components[1..remaining].iter().rev() {
            cracked.push_str(CANONICAL_SEP);
            cracked.push_str(&escape_value(&component.value));
        }
        cracked.push_str(last_sep);
        cracked.push_str(&escape_value(&self.components[0].value));
        cracked
    }
}

impl PartialEq for DistinguishedName {
    fn eq(&self, other: &Self) -> bool {
        self.components.len() == other.components.len() && self.is_under(other)
    }
}

impl Eq for DistinguishedName {}

impl fmt::Display for DistinguishedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let linearized = self
            .components
            .iter()
            .map(|rdn| format!("{}={}", rdn.attribute, escape_value(&rdn.value)))
            .collect::<Vec<String>>()
            .join(",");
        f.write_str(&linearized)
    }
}

impl std::str::FromStr for DistinguishedName {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn split_unescaped(input: &str, delimiter: char) -> anyhow::Result<Vec<&str>> {
    let mut parts = vec![];
    let mut start = 0;
    let mut escape = false;
    for (i, c) in input.char_indices() {
        if escape {
            escape = false;
        } else if c == '\\' {
            escape = true;
        } else if c == delimiter {
            parts.push(&input[start..i]);
            start = i + c.len_utf8();
        }
    }
    if escape {
        Err(Error::LDB_ERR_INVALID_DN_SYNTAX)?
    }
    parts.push(&input[start..]);
    Ok(parts)
}

fn parse_rdn(component: &str) -> anyhow::Result<Rdn> {
    let (attribute, value) = match component.split_once('=') {
        Some((attribute, value)) => (attribute.trim(), value.trim()),
        None => Err(Error::LDB_ERR_INVALID_DN_SYNTAX)?,
    };
    let valid_attribute = attribute
        .chars()
        .next()
        .map(|c| c.is_ascii_alphanumeric())
        .unwrap_or(false)
        && attribute
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.');
    if !valid_attribute || value.is_empty() {
        Err(Error::LDB_ERR_INVALID_DN_SYNTAX)?
    }
    Ok(Rdn::new(attribute, &unescape_value(value)?))
}

fn unescape_value(value: &str) -> anyhow::Result<String> {
    let mut bytes = Vec::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                let next = chars.next().ok_or(Error::LDB_ERR_INVALID_DN_SYNTAX)?;
                match next.to_digit(16) {
                    Some(high) => {
                        let low = chars
                            .next()
                            .and_then(|c| c.to_digit(16))
                            .ok_or(Error::LDB_ERR_INVALID_DN_SYNTAX)?;
                        bytes.push((high * 16 + low) as u8);
                    }
                    None => {
                        let mut buf = [0; 4];
                        bytes.extend_from_slice(next.encode_utf8(&mut buf).as_bytes());
                    }
                }
            }
            '+' | '"' | '<' | '>' | ';' | '=' => Err(Error::LDB_ERR_INVALID_DN_SYNTAX)?,
            c => {
                let mut buf = [0; 4];
                bytes.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            }
        }
    }
    Ok(String::from_utf8(bytes)?)
}

/// Escapes an attribute value for use inside a DN string.
pub fn escape_value(value: &str) -> String {
    let last = value.chars().count().saturating_sub(1);
    let mut escaped = String::with_capacity(value.len());
    for (i, c) in value.chars().enumerate() {
        match c {
            ' ' if i == 0 || i == last => escaped.push_str("\\ "),
            '#' if i == 0 => escaped.push_str("\\#"),
            ',' | '+' | '"' | '\\' | '<' | '>' | '?' => {
                escaped.push('\\');
                escaped.push(c);
            }
            ';' | '\r' | '\n' | '=' | '\0' => escaped.push_str(&format!("\\{:02X}", c as u32)),
            c => escaped.push(c),
        }
    }
    escaped
}
