use super::{parse_ldif, Attr, Directory, DirectoryObject, ObjectClass, SearchScope};
use crate::{DistinguishedName, Error, Filter};
use tracing::debug;

// Attributes whose values are compared as distinguished names
const DN_SYNTAX_ATTRIBUTES: [&str; 4] = [
    Attr::FSMO_ROLE_OWNER,
    Attr::NC_NAME,
    Attr::SERVER_REFERENCE,
    Attr::DISTINGUISHED_NAME,
];

/// Directory held entirely in memory, loaded up front and then read-only.
#[derive(Debug)]
pub struct MemoryDirectory {
    default_base_dn: DistinguishedName,
    config_base_dn: DistinguishedName,
    schema_base_dn: DistinguishedName,
    entries: Vec<DirectoryObject>,
}

impl MemoryDirectory {
    /// Empty directory rooted at `default_base_dn`, with the configuration and
    /// schema partitions at their conventional places below it.
    pub fn new(default_base_dn: DistinguishedName) -> Self {
        let config_base_dn = default_base_dn.child("CN", "Configuration");
        let schema_base_dn = config_base_dn.child("CN", "Schema");
        Self {
            default_base_dn,
            config_base_dn,
            schema_base_dn,
            entries: vec![],
        }
    }

    /// Builds a directory from LDIF text. Without `base_dn` the first
    /// `domainDNS` entry becomes the default naming context.
    pub fn from_ldif(text: &str, base_dn: Option<DistinguishedName>) -> anyhow::Result<Self> {
        let entries = parse_ldif(text)?;
        let base_dn = match base_dn {
            Some(base_dn) => base_dn,
            None => entries
                .iter()
                .find(|entry| entry.has_value(Attr::OBJECT_CLASS, ObjectClass::DOMAIN_DNS))
                .map(|entry| entry.dn.clone())
                .ok_or_else(|| {
                    anyhow::Error::from(Error::LDB_ERR_NO_SUCH_OBJECT)
                        .context("No domainDNS entry to use as the base DN")
                })?,
        };
        let mut directory = Self::new(base_dn);
        for entry in entries {
            directory.add(entry)?;
        }
        debug!(
            "loaded {} entries below {}",
            directory.entries.len(),
            directory.default_base_dn
        );
        Ok(directory)
    }

    pub fn add(&mut self, entry: DirectoryObject) -> anyhow::Result<()> {
        if self.find(&entry.dn).is_some() {
            Err(Error::LDB_ERR_ENTRY_ALREADY_EXISTS)?
        }
        self.entries.push(entry);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn find(&self, dn: &DistinguishedName) -> Option<&DirectoryObject> {
        self.entries.iter().find(|entry| entry.dn == *dn)
    }

    fn in_scope(entry: &DirectoryObject, base: Option<&DistinguishedName>, scope: SearchScope) -> bool {
        match (scope, base) {
            (SearchScope::AllPartitions, _) | (_, None) => true,
            (SearchScope::Base, Some(base)) => entry.dn == *base,
            (SearchScope::OneLevel, Some(base)) => entry.dn.is_child_of(base),
            (SearchScope::Subtree, Some(base)) => entry.dn.is_under(base),
        }
    }

    fn project(entry: &DirectoryObject, attributes: &[&str]) -> DirectoryObject {
        let mut object = DirectoryObject::new(entry.dn.clone());
        for attribute in attributes {
            if *attribute == Attr::ALL {
                for (name, values) in entry.attributes() {
                    for value in values {
                        object.add_value(name, value);
                    }
                }
                continue;
            }
            if object.get(attribute).is_some() {
                continue;
            }
            for value in values_of(entry, attribute) {
                object.add_value(attribute, &value);
            }
        }
        object
    }
}

// Stored values plus the ones every object implicitly carries.
fn values_of(entry: &DirectoryObject, attribute: &str) -> Vec<String> {
    if let Some(values) = entry.get(attribute) {
        return values.to_vec();
    }
    if attribute.eq_ignore_ascii_case(Attr::DISTINGUISHED_NAME) {
        vec![entry.dn.to_string()]
    } else if attribute.eq_ignore_ascii_case(Attr::CANONICAL_NAME) {
        vec![entry.dn.canonical()]
    } else if attribute.eq_ignore_ascii_case(Attr::NAME) {
        entry.dn.rdn_value().map(str::to_owned).into_iter().collect()
    } else {
        vec![]
    }
}

fn value_matches(attribute: &str, stored: &str, asserted: &str) -> bool {
    if stored.to_lowercase() == asserted.to_lowercase() {
        return true;
    }
    if !DN_SYNTAX_ATTRIBUTES
        .iter()
        .any(|name| name.eq_ignore_ascii_case(attribute))
    {
        return false;
    }
    match (DistinguishedName::parse(stored), DistinguishedName::parse(asserted)) {
        (Ok(stored), Ok(asserted)) => stored == asserted,
        _ => false,
    }
}

fn matches(entry: &DirectoryObject, filter: &Filter) -> bool {
    match filter {
        Filter::And(filters) => filters.iter().all(|filter| matches(entry, filter)),
        Filter::Or(filters) => filters.iter().any(|filter| matches(entry, filter)),
        Filter::Not(filter) => !matches(entry, filter),
        Filter::Present(attribute) => !values_of(entry, attribute).is_empty(),
        Filter::Equality(attribute, asserted) => values_of(entry, attribute)
            .iter()
            .any(|stored| value_matches(attribute, stored, asserted)),
        Filter::BitAnd(attribute, mask) => values_of(entry, attribute).iter().any(|stored| {
            stored
                .trim()
                .parse::<i64>()
                .map(|value| value as u32 & mask == *mask)
                .unwrap_or(false)
        }),
    }
}

impl Directory for MemoryDirectory {
    fn search(
        &self,
        base: Option<&DistinguishedName>,
        scope: SearchScope,
        attributes: &[&str],
        filter: &Filter,
    ) -> anyhow::Result<Vec<DirectoryObject>> {
        if scope != SearchScope::AllPartitions {
            match base {
                Some(base) if self.find(base).is_none() => Err(Error::LDB_ERR_NO_SUCH_OBJECT)?,
                None if scope == SearchScope::Base => Err(Error::LDB_ERR_UNWILLING_TO_PERFORM)?,
                _ => {}
            }
        }
        let found = self
            .entries
            .iter()
            .filter(|entry| Self::in_scope(entry, base, scope))
            .filter(|entry| matches(entry, filter))
            .map(|entry| Self::project(entry, attributes))
            .collect::<Vec<DirectoryObject>>();
        debug!(
            "search {:?} base={} filter={} found {}",
            scope,
            base.map(|dn| dn.to_string()).unwrap_or_default(),
            filter,
            found.len()
        );
        Ok(found)
    }

    fn default_base_dn(&self) -> &DistinguishedName {
        &self.default_base_dn
    }

    fn config_base_dn(&self) -> &DistinguishedName {
        &self.config_base_dn
    }

    fn schema_base_dn(&self) -> &DistinguishedName {
        &self.schema_base_dn
    }
}
