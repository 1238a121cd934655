//! Object GUID string forms.

use crate::Error;
use uuid::Uuid;

/// Accepts `xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx`, optionally wrapped in braces.
pub fn parse_guid(input: &str) -> anyhow::Result<Uuid> {
    let hyphenated = match input.len() {
        36 => input,
        38 if input.starts_with('{') && input.ends_with('}') => &input[1..37],
        _ => Err(Error::LDB_ERR_INVALID_ATTRIBUTE_SYNTAX)?,
    };
    Ok(Uuid::try_parse(hyphenated).map_err(|_| Error::LDB_ERR_INVALID_ATTRIBUTE_SYNTAX)?)
}

/// `{xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx}` in lower case.
pub fn format_guid(guid: &Uuid) -> String {
    guid.braced().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_plain_and_braced() {
        let plain = parse_guid("8C6F3C1E-2D4B-4D8A-9E0F-1A2B3C4D5E6F").unwrap();
        let braced = parse_guid("{8c6f3c1e-2d4b-4d8a-9e0f-1a2b3c4d5e6f}").unwrap();
        assert_eq!(plain, braced);
        assert_eq!(format_guid(&plain), "{8c6f3c1e-2d4b-4d8a-9e0f-1a2b3c4d5e6f}");
    }

    #[test]
    fn parse_rejects_other_shapes() {
        for input in [
            "",
            "8c6f3c1e2d4b4d8a9e0f1a2b3c4d5e6f",
            "urn:uuid:8c6f3c1e-2d4b-4d8a-9e0f-1a2b3c4d5e6f",
            "{8c6f3c1e-2d4b-4d8a-9e0f-1a2b3c4d5e6f",
            "8c6f3c1e-2d4b-4d8a-9e0f-1a2b3c4d5e6g",
        ] {
            assert!(parse_guid(input).is_err(), "{:?}", input);
        }
    }
}
