//! Minimal LDIF reader (RFC 2849 content records with plain or base64 values).

use super::DirectoryObject;
use crate::{Attr, DistinguishedName, Error, Sid};
use base64::{engine::general_purpose::STANDARD, Engine};
use nom::{
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::space0,
    combinator::{all_consuming, rest},
    sequence::{terminated, tuple},
    IResult,
};
use uuid::Uuid;

#[derive(Debug, PartialEq, Eq)]
enum Separator {
    Plain,
    Base64,
    Url,
}

fn attribute_type(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_alphanumeric() || c == '-' || c == '.' || c == ';')(input)
}

fn separator(input: &str) -> IResult<&str, Separator> {
    let (input, separator) = alt((tag("::"), tag(":<"), tag(":")))(input)?;
    let separator = match separator {
        "::" => Separator::Base64,
        ":<" => Separator::Url,
        _ => Separator::Plain,
    };
    Ok((input, separator))
}

fn attribute_value_spec(input: &str) -> IResult<&str, (&str, Separator, &str)> {
    all_consuming(tuple((attribute_type, terminated(separator, space0), rest)))(input)
}

// Joins folded lines and drops comments.
fn unfold(text: &str) -> Vec<String> {
    let mut lines: Vec<String> = vec![];
    let mut in_comment = false;
    for line in text.lines() {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if let Some(continuation) = line.strip_prefix(' ') {
            if in_comment {
                continue;
            }
            if let Some(last) = lines.last_mut() {
                last.push_str(continuation);
                continue;
            }
        }
        in_comment = line.starts_with('#');
        if !in_comment {
            lines.push(line.to_owned());
        }
    }
    lines
}

// Binary SIDs and GUIDs are kept in their string forms, like the rest of
// the store.
fn decode_value(attribute: &str, encoded: &str) -> anyhow::Result<String> {
    let bytes = STANDARD.decode(encoded.trim()).map_err(|err| {
        anyhow::Error::from(Error::LDB_ERR_INVALID_ATTRIBUTE_SYNTAX)
            .context(format!("{} is not valid base64: {}", attribute, err))
    })?;
    if attribute.eq_ignore_ascii_case(Attr::OBJECT_SID) {
        return Ok(Sid::from_bytes(&bytes)?.to_string());
    }
    if attribute.eq_ignore_ascii_case(Attr::OBJECT_GUID) {
        let guid = Uuid::from_slice_le(&bytes).map_err(|_| Error::LDB_ERR_INVALID_ATTRIBUTE_SYNTAX)?;
        return Ok(guid.hyphenated().to_string());
    }
    String::from_utf8(bytes).map_err(|_| {
        anyhow::Error::from(Error::LDB_ERR_INVALID_ATTRIBUTE_SYNTAX)
            .context(format!("{} is binary", attribute))
    })
}

pub fn parse_ldif(text: &str) -> anyhow::Result<Vec<DirectoryObject>> {
    let mut entries = vec![];
    let mut current: Option<DirectoryObject> = None;
    for (index, line) in unfold(text).iter().enumerate() {
        if line.trim().is_empty() {
            entries.extend(current.take());
            continue;
        }
        let (_, (attribute, separator, value)) = attribute_value_spec(line)
            .map_err(|_| anyhow::anyhow!("Malformed LDIF line {}: {}", index + 1, line))?;
        let value = match separator {
            Separator::Plain => value.trim_end().to_owned(),
            Separator::Base64 => decode_value(attribute, value)
                .map_err(|err| err.context(format!("LDIF line {}", index + 1)))?,
            Separator::Url => Err(anyhow::Error::from(Error::LDB_ERR_PROTOCOL_ERROR).context(
                format!("Unsupported URL value for {} on LDIF line {}", attribute, index + 1),
            ))?,
        };
        if let Some(entry) = current.as_mut() {
            entry.add_value(attribute, &value);
        } else if attribute.eq_ignore_ascii_case("dn") {
            current = Some(DirectoryObject::new(DistinguishedName::parse(&value)?));
        } else if !attribute.eq_ignore_ascii_case("version") {
            Err(anyhow::anyhow!(
                "LDIF record does not start with dn on line {}",
                index + 1
            ))?
        }
    }
    entries.extend(current);
    Ok(entries)
}
