use crate::Flags;
use std::fmt;

/// Name syntaxes understood by the cracking engine. The discriminants are the
/// wire values of the directory replication protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NameFormat {
    Unknown = 0,
    /// RFC 1779 distinguished name
    Fqdn1779 = 1,
    /// `DOMAIN\account`
    Nt4Account = 2,
    Display = 3,
    Guid = 6,
    /// `example.com/Users/Administrator`
    Canonical = 7,
    /// `account@realm`
    UserPrincipal = 8,
    /// `example.com/Users\nAdministrator`
    CanonicalEx = 9,
    /// `service/host[@realm]`
    ServicePrincipal = 10,
    SidOrSidHistory = 11,
    DnsDomain = 12,
}

impl NameFormat {
    const ALL: [NameFormat; 11] = [
        Self::Unknown,
        Self::Fqdn1779,
        Self::Nt4Account,
        Self::Display,
        Self::Guid,
        Self::Canonical,
        Self::UserPrincipal,
        Self::CanonicalEx,
        Self::ServicePrincipal,
        Self::SidOrSidHistory,
        Self::DnsDomain,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Fqdn1779 => "fqdn",
            Self::Nt4Account => "nt4",
            Self::Display => "display",
            Self::Guid => "guid",
            Self::Canonical => "canonical",
            Self::UserPrincipal => "upn",
            Self::CanonicalEx => "canonical-ex",
            Self::ServicePrincipal => "spn",
            Self::SidOrSidHistory => "sid",
            Self::DnsDomain => "dns-domain",
        }
    }

    pub fn is_canonical(self) -> bool {
        matches!(self, Self::Canonical | Self::CanonicalEx)
    }
}

impl TryFrom<u32> for NameFormat {
    type Error = anyhow::Error;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::ALL
            .iter()
            .find(|format| **format as u32 == value)
            .copied()
            .ok_or_else(|| anyhow::anyhow!("Invalid name format: {}", value))
    }
}

impl From<NameFormat> for u32 {
    fn from(format: NameFormat) -> Self {
        format as u32
    }
}

impl std::str::FromStr for NameFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|format| format.name().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| anyhow::anyhow!("Invalid name format: {}", s))
    }
}

impl fmt::Display for NameFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-name outcome. These are data, never errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameStatus {
    Ok = 0,
    ResolveError = 1,
    NotFound = 2,
    NotUnique = 3,
    NoMapping = 4,
    DomainOnly = 5,
    NoSyntacticalMapping = 6,
}

impl NameStatus {
    pub fn name(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::ResolveError => "RESOLVE_ERROR",
            Self::NotFound => "NOT_FOUND",
            Self::NotUnique => "NOT_UNIQUE",
            Self::NoMapping => "NO_MAPPING",
            Self::DomainOnly => "DOMAIN_ONLY",
            Self::NoSyntacticalMapping => "NO_SYNTACTICAL_MAPPING",
        }
    }
}

impl From<NameStatus> for u32 {
    fn from(status: NameStatus) -> Self {
        status as u32
    }
}

impl fmt::Display for NameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrackFlags(pub Flags);

macro_rules! crack_flag {
    ($name:ident, $value:expr) => {
        pub const $name: CrackFlags = CrackFlags($value);
    };
}

impl CrackFlags {
    crack_flag!(NONE, 0x0);
    // Translate by string manipulation only, without touching the directory
    crack_flag!(SYNTACTICAL_ONLY, 0x1);
    // Search every partition instead of the default naming context
    crack_flag!(GCVERIFY, 0x4);

    pub fn contains(self, other: CrackFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl std::ops::BitOr for CrackFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameRequest {
    pub name: Option<String>,
    pub format_offered: NameFormat,
    pub format_desired: NameFormat,
    pub flags: CrackFlags,
}

impl NameRequest {
    pub fn new(name: &str, format_offered: NameFormat, format_desired: NameFormat) -> Self {
        Self {
            name: Some(name.to_owned()),
            format_offered,
            format_desired,
            flags: CrackFlags::NONE,
        }
    }

    pub fn with_flags(mut self, flags: CrackFlags) -> Self {
        self.flags = flags;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameResult {
    pub status: NameStatus,
    pub dns_domain_name: Option<String>,
    pub result_name: Option<String>,
}

impl NameResult {
    pub fn new(status: NameStatus) -> Self {
        Self {
            status,
            dns_domain_name: None,
            result_name: None,
        }
    }

    pub fn ok(dns_domain_name: Option<String>, result_name: String) -> Self {
        Self {
            status: NameStatus::Ok,
            dns_domain_name,
            result_name: Some(result_name),
        }
    }

    pub fn domain_only(dns_domain_name: &str) -> Self {
        Self {
            status: NameStatus::DomainOnly,
            dns_domain_name: Some(dns_domain_name.to_owned()),
            result_name: None,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == NameStatus::Ok
    }
}
