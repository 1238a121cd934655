mod ldif;
mod memory_data;

pub use self::{ldif::parse_ldif, memory_data::MemoryDirectory};
use crate::{DistinguishedName, Error, Filter};
use std::fs;

pub struct Attr;

macro_rules! attr {
    ($name:ident, $value:expr) => {
        pub const $name: &'static str = $value;
    };
}

impl Attr {
    attr!(ALL, "*");
    attr!(CANONICAL_NAME, "canonicalName");
    attr!(CN, "cn");
    attr!(DISPLAY_NAME, "displayName");
    attr!(DISTINGUISHED_NAME, "distinguishedName");
    attr!(DNS_HOST_NAME, "dNSHostName");
    attr!(DNS_ROOT, "dnsRoot");
    attr!(FSMO_ROLE_OWNER, "fSMORoleOwner");
    attr!(NAME, "name");
    attr!(NC_NAME, "nCName");
    attr!(NETBIOS_NAME, "nETBIOSName");
    attr!(OBJECT_CLASS, "objectClass");
    attr!(OBJECT_GUID, "objectGUID");
    attr!(OBJECT_SID, "objectSid");
    attr!(SAM_ACCOUNT_NAME, "sAMAccountName");
    attr!(SERVER_REFERENCE, "serverReference");
    attr!(SERVICE_PRINCIPAL_NAME, "servicePrincipalName");
    attr!(SPN_MAPPINGS, "sPNMappings");
    attr!(SYSTEM_FLAGS, "systemFlags");
    attr!(USER_PRINCIPAL_NAME, "userPrincipalName");
}

pub struct ObjectClass;

impl ObjectClass {
    attr!(COMPUTER, "computer");
    attr!(CROSS_REF, "crossRef");
    attr!(DOMAIN, "domain");
    attr!(DOMAIN_DNS, "domainDNS");
    attr!(NTDS_DSA, "nTDSDSA");
    attr!(NTDS_SERVICE, "nTDSService");
    attr!(USER, "user");
}

/// `systemFlags` bit marking a cross reference as a domain naming context.
pub const SYSTEM_FLAG_CR_NTDS_DOMAIN: u32 = 0x0000_0002;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchScope {
    Base,
    OneLevel,
    Subtree,
    /// Subtree over every naming context the server holds
    AllPartitions,
}

#[derive(Debug, Clone)]
pub struct DirectoryObject {
    pub dn: DistinguishedName,
    attributes: Vec<(String, Vec<String>)>,
}

impl DirectoryObject {
    pub fn new(dn: DistinguishedName) -> Self {
        Self {
            dn,
            attributes: vec![],
        }
    }

    pub fn with(mut self, attribute: &str, values: &[&str]) -> Self {
        for value in values {
            self.add_value(attribute, value);
        }
        self
    }

    pub fn add_value(&mut self, attribute: &str, value: &str) {
        match self
            .attributes
            .iter_mut()
            .find(|(name, _)| name.eq_ignore_ascii_case(attribute))
        {
            Some((_, values)) => values.push(value.to_owned()),
            None => self
                .attributes
                .push((attribute.to_owned(), vec![value.to_owned()])),
        }
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.attributes
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    pub fn get(&self, attribute: &str) -> Option<&[String]> {
        self.attributes
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(attribute))
            .map(|(_, values)| values.as_slice())
    }

    /// First value of `attribute`.
    pub fn get_string(&self, attribute: &str) -> Option<&str> {
        self.get(attribute)?.first().map(String::as_str)
    }

    pub fn get_dn(&self, attribute: &str) -> Option<DistinguishedName> {
        DistinguishedName::parse(self.get_string(attribute)?).ok()
    }

    pub fn has_value(&self, attribute: &str, value: &str) -> bool {
        self.get(attribute)
            .map(|values| values.iter().any(|v| v.eq_ignore_ascii_case(value)))
            .unwrap_or(false)
    }
}

/// Read access to a directory store. Implementations must tolerate concurrent
/// searches.
pub trait Directory: Send + Sync {
    /// Searches below `base` (ignored for [`SearchScope::AllPartitions`]).
    /// `attributes` selects what is returned, `*` for everything. A base that
    /// does not exist fails with `LDB_ERR_NO_SUCH_OBJECT`.
    fn search(
        &self,
        base: Option<&DistinguishedName>,
        scope: SearchScope,
        attributes: &[&str],
        filter: &Filter,
    ) -> anyhow::Result<Vec<DirectoryObject>>;

    fn default_base_dn(&self) -> &DistinguishedName;

    fn config_base_dn(&self) -> &DistinguishedName;

    fn schema_base_dn(&self) -> &DistinguishedName;

    fn partitions_dn(&self) -> DistinguishedName {
        self.config_base_dn().child("CN", "Partitions")
    }
}

/// Opens a directory by name: `LDIF:<path>`, or a bare path to an LDIF file.
pub fn resolve(name: &str, base_dn: Option<&str>) -> anyhow::Result<Box<dyn Directory>> {
    let (prefix, real_name) = match name.split_once(':') {
        None => ("LDIF", name),
        // Use `LDIF` when prefix is a drive letter
        Some((p, _)) if p.len() == 1 && p.as_bytes()[0].is_ascii_alphabetic() => ("LDIF", name),
        Some(_) if name.starts_with('/') => ("LDIF", name),
        Some((prefix, real_name)) => (prefix, real_name),
    };
    match prefix {
        "LDIF" => {
            let text = fs::read_to_string(real_name)
                .map_err(|e| anyhow::anyhow!("{} while reading {}", e, real_name))?;
            let base_dn = base_dn.map(DistinguishedName::parse).transpose()?;
            Ok(Box::new(MemoryDirectory::from_ldif(&text, base_dn)?))
        }
        _ => Err(anyhow::Error::from(Error::LDB_ERR_OTHER)
            .context(format!("Unknown directory type {}", prefix))),
    }
}
