//! Domain partitions, found through their cross references.

use super::{locate, proceed, Step};
use crate::{
    directory::SYSTEM_FLAG_CR_NTDS_DOMAIN, Attr, Directory, DirectoryObject, DistinguishedName,
    Filter, NameStatus, ObjectClass, SearchScope,
};

pub(crate) const DOMAIN_ATTRIBUTES: [&str; 3] = [Attr::NC_NAME, Attr::DNS_ROOT, Attr::NETBIOS_NAME];

#[derive(Debug)]
pub(crate) struct Partition {
    pub(crate) nc_name: DistinguishedName,
    pub(crate) dns_root: Option<String>,
}

/// Cross references of domain naming contexts that also satisfy `filter`.
pub(crate) fn partition_filter(filter: Filter) -> Filter {
    Filter::and(vec![
        Filter::equality(Attr::OBJECT_CLASS, ObjectClass::CROSS_REF),
        filter,
        Filter::bit_and(Attr::SYSTEM_FLAGS, SYSTEM_FLAG_CR_NTDS_DOMAIN),
    ])
}

/// One-level search of the partitions container.
pub(crate) fn search_partitions(
    directory: &dyn Directory,
    filter: &Filter,
    attributes: &[&str],
) -> anyhow::Result<Step<Vec<DirectoryObject>>> {
    locate::search(
        directory,
        Some(&directory.partitions_dn()),
        SearchScope::OneLevel,
        attributes,
        filter,
    )
}

/// The single domain partition whose cross reference matches `filter`.
pub(crate) fn resolve(directory: &dyn Directory, filter: &Filter) -> anyhow::Result<Step<Partition>> {
    let cross_refs = proceed!(search_partitions(directory, filter, &DOMAIN_ATTRIBUTES)?);
    let cross_ref = proceed!(locate::exactly_one(cross_refs)?);
    let Some(nc_name) = cross_ref.get_dn(Attr::NC_NAME) else {
        return Ok(Step::status(NameStatus::ResolveError));
    };
    Ok(Step::Continue(Partition {
        nc_name,
        dns_root: cross_ref.get_string(Attr::DNS_ROOT).map(str::to_owned),
    }))
}

/// NetBIOS name of the domain whose naming context is `nc_name`.
pub(crate) fn netbios_name(
    directory: &dyn Directory,
    nc_name: &DistinguishedName,
) -> anyhow::Result<Step<String>> {
    let filter = Filter::equality(Attr::NC_NAME, &nc_name.to_string());
    let cross_refs = proceed!(search_partitions(directory, &filter, &DOMAIN_ATTRIBUTES)?);
    let cross_ref = proceed!(locate::exactly_one(cross_refs)?);
    Ok(match cross_ref.get_string(Attr::NETBIOS_NAME) {
        Some(name) => Step::Continue(name.to_owned()),
        None => Step::status(NameStatus::NoMapping),
    })
}
