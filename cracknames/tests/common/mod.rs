#![allow(dead_code)]

use cracknames::{
    Context, CrackFlags, Cracker, DistinguishedName, MemoryDirectory, NameFormat, NameRequest,
    NameResult,
};

pub const EXAMPLE_LDIF: &str = include_str!("example.ldif");

pub const NTDS_SETTINGS_DN: &str =
    "CN=NTDS Settings,CN=DC1,CN=Servers,CN=Default-First-Site-Name,CN=Sites,CN=Configuration,DC=example,DC=com";
pub const SERVER_DN: &str =
    "CN=DC1,CN=Servers,CN=Default-First-Site-Name,CN=Sites,CN=Configuration,DC=example,DC=com";

pub struct Fixture {
    pub directory: MemoryDirectory,
    pub context: Context,
}

impl Fixture {
    pub fn new() -> Self {
        Self::from_ldif(EXAMPLE_LDIF)
    }

    pub fn from_ldif(ldif: &str) -> Self {
        Self {
            directory: MemoryDirectory::from_ldif(ldif, None).unwrap(),
            context: Context {
                default_realm: Some("EXAMPLE.COM".to_owned()),
                ..Context::default()
            },
        }
    }

    pub fn cracker(&self) -> Cracker<'_> {
        Cracker::new(&self.directory, &self.context)
    }

    pub fn crack(&self, name: &str, offered: NameFormat, desired: NameFormat) -> NameResult {
        self.crack_with_flags(name, offered, desired, CrackFlags::NONE)
    }

    pub fn crack_with_flags(
        &self,
        name: &str,
        offered: NameFormat,
        desired: NameFormat,
        flags: CrackFlags,
    ) -> NameResult {
        self.cracker()
            .crack_name(&NameRequest::new(name, offered, desired).with_flags(flags))
            .unwrap()
    }
}

pub fn dn(s: &str) -> DistinguishedName {
    DistinguishedName::parse(s).unwrap()
}

pub fn ok(dns_domain_name: &str, result_name: &str) -> NameResult {
    NameResult::ok(Some(dns_domain_name.to_owned()), result_name.to_owned())
}
