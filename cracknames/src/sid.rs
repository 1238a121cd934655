//! Security identifiers in their `S-1-5-21-...` string form.

use crate::Error;
use nom::{
    branch::alt,
    bytes::complete::{tag_no_case, take},
    character::complete::{char, digit1, hex_digit1},
    combinator::{all_consuming, map_res},
    multi::{count, many0},
    number::complete::{le_u32, u8 as byte},
    sequence::preceded,
    IResult,
};
use std::fmt;

const MAX_SUB_AUTHORITIES: usize = 15;
const MAX_AUTHORITY: u64 = (1 << 48) - 1;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Sid {
    pub revision: u8,
    pub authority: u64,
    pub sub_authorities: Vec<u32>,
}

impl Sid {
    /// `S-1-5-32`, the domain of the builtin local groups.
    pub fn builtin() -> Self {
        Self {
            revision: 1,
            authority: 5,
            sub_authorities: vec![32],
        }
    }

    pub fn parse(input: &str) -> anyhow::Result<Self> {
        let (_, sid) = all_consuming(sid)(input.trim())
            .map_err(|_| Error::LDB_ERR_INVALID_ATTRIBUTE_SYNTAX)?;
        if sid.revision != 1
            || sid.authority > MAX_AUTHORITY
            || sid.sub_authorities.len() > MAX_SUB_AUTHORITIES
        {
            Err(Error::LDB_ERR_INVALID_ATTRIBUTE_SYNTAX)?
        }
        Ok(sid)
    }

    /// Decodes the binary `objectSid` layout: revision, sub-authority count,
    /// a 48-bit big-endian authority, then little-endian sub-authorities.
    pub fn from_bytes(input: &[u8]) -> anyhow::Result<Self> {
        let (_, sid) =
            all_consuming(binary_sid)(input).map_err(|_| Error::LDB_ERR_INVALID_ATTRIBUTE_SYNTAX)?;
        if sid.revision != 1 || sid.sub_authorities.len() > MAX_SUB_AUTHORITIES {
            Err(Error::LDB_ERR_INVALID_ATTRIBUTE_SYNTAX)?
        }
        Ok(sid)
    }

    /// The SID with its final sub-authority (the RID) removed.
    pub fn domain_sid(&self) -> Option<Self> {
        let (_, domain) = self.sub_authorities.split_last()?;
        Some(Self {
            revision: self.revision,
            authority: self.authority,
            sub_authorities: domain.to_vec(),
        })
    }

    /// True when `self` is exactly one RID below `domain`.
    pub fn is_in_domain(&self, domain: &Sid) -> bool {
        self.revision == domain.revision
            && self.authority == domain.authority
            && self.sub_authorities.len() == domain.sub_authorities.len() + 1
            && self.sub_authorities.starts_with(&domain.sub_authorities)
    }
}

fn sid(input: &str) -> IResult<&str, Sid> {
    let (input, _) = tag_no_case("S-")(input)?;
    let (input, revision) = map_res(digit1, |s: &str| s.parse::<u8>())(input)?;
    let (input, _) = char('-')(input)?;
    let (input, authority) = authority(input)?;
    let (input, sub_authorities) =
        many0(preceded(char('-'), map_res(digit1, |s: &str| s.parse::<u32>())))(input)?;
    Ok((
        input,
        Sid {
            revision,
            authority,
            sub_authorities,
        },
    ))
}

fn binary_sid(input: &[u8]) -> IResult<&[u8], Sid> {
    let (input, revision) = byte(input)?;
    let (input, sub_authority_count) = byte(input)?;
    let (input, authority) = take(6usize)(input)?;
    let (input, sub_authorities) = count(le_u32, sub_authority_count as usize)(input)?;
    Ok((
        input,
        Sid {
            revision,
            authority: authority
                .iter()
                .fold(0, |authority, b| (authority << 8) | u64::from(*b)),
            sub_authorities,
        },
    ))
}

fn authority(input: &str) -> IResult<&str, u64> {
    alt((
        map_res(preceded(tag_no_case("0x"), hex_digit1), |s: &str| {
            u64::from_str_radix(s, 16)
        }),
        map_res(digit1, |s: &str| s.parse::<u64>()),
    ))(input)
}

impl fmt::Display for Sid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.authority > u32::MAX as u64 {
            write!(f, "S-{}-0x{:012X}", self.revision, self.authority)?;
        } else {
            write!(f, "S-{}-{}", self.revision, self.authority)?;
        }
        for sub_authority in &self.sub_authorities {
            write!(f, "-{}", sub_authority)?;
        }
        Ok(())
    }
}

impl std::str::FromStr for Sid {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
