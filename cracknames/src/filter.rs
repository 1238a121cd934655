//! Search filters and their RFC 4515 string form.

use std::fmt;

/// Matching rule for "all bits of the assertion value are set".
pub const LDAP_MATCHING_RULE_BIT_AND: &str = "1.2.840.113556.1.4.803";

const SPECIAL_CHARS: &[u8] = b" *()\\&|!\"";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    And(Vec<Filter>),
    Or(Vec<Filter>),
    Not(Box<Filter>),
    Equality(String, String),
    Present(String),
    BitAnd(String, u32),
}

impl Filter {
    pub fn equality(attribute: &str, value: &str) -> Self {
        Self::Equality(attribute.to_owned(), value.to_owned())
    }

    pub fn present(attribute: &str) -> Self {
        Self::Present(attribute.to_owned())
    }

    pub fn bit_and(attribute: &str, mask: u32) -> Self {
        Self::BitAnd(attribute.to_owned(), mask)
    }

    pub fn and(filters: Vec<Filter>) -> Self {
        Self::And(filters)
    }

    pub fn or(filters: Vec<Filter>) -> Self {
        Self::Or(filters)
    }

    pub fn not(filter: Filter) -> Self {
        Self::Not(Box::new(filter))
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::And(filters) => {
                f.write_str("(&")?;
                for filter in filters {
                    write!(f, "{}", filter)?;
                }
                f.write_str(")")
            }
            Self::Or(filters) => {
                f.write_str("(|")?;
                for filter in filters {
                    write!(f, "{}", filter)?;
                }
                f.write_str(")")
            }
            Self::Not(filter) => write!(f, "(!{})", filter),
            Self::Equality(attribute, value) => {
                write!(f, "({}={})", attribute, escape_filter_value(value))
            }
            Self::Present(attribute) => write!(f, "({}=*)", attribute),
            Self::BitAnd(attribute, mask) => {
                write!(f, "({}:{}:={})", attribute, LDAP_MATCHING_RULE_BIT_AND, mask)
            }
        }
    }
}

/// Escapes a value for embedding in a filter string. Non-printable bytes and
/// filter metacharacters become `\XX`.
pub fn escape_filter_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for &byte in value.as_bytes() {
        if !byte.is_ascii_graphic() || SPECIAL_CHARS.contains(&byte) {
            escaped.push_str(&format!("\\{:02X}", byte));
        } else {
            escaped.push(byte as char);
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn display_composite_filter() {
        let filter = Filter::and(vec![
            Filter::equality("objectClass", "crossRef"),
            Filter::equality("dnsRoot", "example.com"),
            Filter::bit_and("systemFlags", 2),
        ]);
        assert_eq!(
            filter.to_string(),
            "(&(objectClass=crossRef)(dnsRoot=example.com)(systemFlags:1.2.840.113556.1.4.803:=2))"
        );
        assert_eq!(Filter::not(Filter::present("cn")).to_string(), "(!(cn=*))");
    }

    #[test]
    fn escape_metacharacters() {
        assert_eq!(escape_filter_value("admin*"), "admin\\2A");
        assert_eq!(escape_filter_value("a(b)c"), "a\\28b\\29c");
        assert_eq!(escape_filter_value("John Smith"), "John\\20Smith");
        assert_eq!(escape_filter_value("EXAMPLE\\alice"), "EXAMPLE\\5Calice");
        assert_eq!(escape_filter_value("é"), "\\C3\\A9");
    }

    proptest! {
        #[test]
        fn escaped_value_has_no_metacharacters(value in ".*") {
            let escaped = escape_filter_value(&value);
            prop_assert!(escaped.is_ascii());
            for c in ['*', '(', ')', '&', '|', '!', ' ', '"'] {
                prop_assert!(!escaped.contains(c));
            }
            let backslashes = escaped.matches('\\').count();
            prop_assert_eq!(escaped.len(), value.len() + backslashes * 2);
        }
    }
}
