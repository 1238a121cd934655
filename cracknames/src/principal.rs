use crate::{Context, Error, Flags};

const REALM_SEP: char = '@';
const COMPONENT_SEP: char = '/';
const QUOTE: char = '\\';
const QUOTABLE_CHARS: [char; 8] = [' ', '\n', '\t', '\x08', '\0', QUOTE, COMPONENT_SEP, REALM_SEP];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub realm: String,
    pub components: Vec<String>,
}

macro_rules! principal_flag {
    ($name:ident, $value:expr) => {
        pub const $name: Flags = $value;
    };
}

impl Principal {
    principal_flag!(PARSE_NO_REALM, 0x1);
    principal_flag!(PARSE_REQUIRE_REALM, 0x2);

    principal_flag!(UNPARSE_NO_REALM, 0x2);
    principal_flag!(UNPARSE_DISPLAY, 0x4);

    /// Parses `component/component@REALM`. A missing realm is filled from the
    /// context's default realm unless a flag says otherwise.
    pub fn parse_name(context: &Context, name: &str, flags: Flags) -> anyhow::Result<Self> {
        let require_realm = flags & Self::PARSE_REQUIRE_REALM != 0;
        let no_realm = flags & Self::PARSE_NO_REALM != 0;

        let mut components = vec![];
        let mut current = String::new();
        let mut realm: Option<String> = None;
        let mut chars = name.chars();
        while let Some(c) = chars.next() {
            let c = match c {
                QUOTE => match chars.next() {
                    Some('n') => '\n',
                    Some('t') => '\t',
                    Some('b') => '\x08',
                    Some('0') => '\0',
                    Some(c) => c,
                    None => Err(Error::KRB5_PARSE_MALFORMED)?,
                },
                COMPONENT_SEP | REALM_SEP if realm.is_some() => Err(Error::KRB5_PARSE_MALFORMED)?,
                COMPONENT_SEP => {
                    components.push(std::mem::take(&mut current));
                    continue;
                }
                REALM_SEP => {
                    components.push(std::mem::take(&mut current));
                    realm = Some(String::new());
                    continue;
                }
                c => c,
            };
            match realm.as_mut() {
                Some(realm) => realm.push(c),
                None => current.push(c),
            }
        }

        let realm = match realm {
            Some(realm) => {
                if no_realm || realm.is_empty() {
                    Err(Error::KRB5_PARSE_MALFORMED)?
                }
                realm
            }
            None => {
                components.push(current);
                if require_realm {
                    Err(Error::KRB5_PARSE_MALFORMED)?
                }
                if no_realm {
                    String::new()
                } else {
                    context.get_default_realm()?.to_owned()
                }
            }
        };

        Ok(Principal { realm, components })
    }

    pub fn realm(&self) -> &str {
        &self.realm
    }

    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    pub fn component(&self, index: usize) -> Option<&str> {
        self.components.get(index).map(String::as_str)
    }

    /// Renders the principal. `UNPARSE_DISPLAY` turns quoting off, which is
    /// what directory attributes holding account names expect.
    pub fn unparse_name(&self, flags: Flags) -> String {
        let display = flags & Self::UNPARSE_DISPLAY != 0;
        let mut name = self
            .components
            .iter()
            .map(|component| quote(component, display))
            .collect::<Vec<String>>()
            .join(&COMPONENT_SEP.to_string());
        if flags & Self::UNPARSE_NO_REALM == 0 {
            name.push(REALM_SEP);
            name.push_str(&quote(&self.realm, display));
        }
        name
    }
}

fn quote(s: &str, display: bool) -> String {
    if display {
        return s.to_owned();
    }
    let mut quoted = String::with_capacity(s.len());
    for c in s.chars() {
        if QUOTABLE_CHARS.contains(&c) {
            quoted.push(QUOTE);
            quoted.push(match c {
                '\n' => 'n',
                '\t' => 't',
                '\x08' => 'b',
                '\0' => '0',
                c => c,
            });
        } else {
            quoted.push(c);
        }
    }
    quoted
}
