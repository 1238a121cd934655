use super::{domain::Partition, proceed, Step};
use crate::{
    Attr, CrackFlags, Directory, DirectoryObject, DistinguishedName, Error,
    Filter, NameFormat, NameStatus, SearchScope,
};
use tracing::debug;

/// Search whose failure only decides this name.
pub(crate) fn search(
    directory: &dyn Directory,
    base: Option<&DistinguishedName>,
    scope: SearchScope,
    attributes: &[&str],
    filter: &Filter,
) -> anyhow::Result<Step<Vec<DirectoryObject>>> {
    match directory.search(base, scope, attributes, filter) {
        Ok(objects) => Ok(Step::Continue(objects)),
        Err(err) => {
            debug!("search for {} failed: {:?}", filter, err);
            Ok(Step::status(NameStatus::ResolveError))
        }
    }
}

/// Reads the object at `dn`, if there is one.
pub(crate) fn fetch(
    directory: &dyn Directory,
    dn: &DistinguishedName,
    attributes: &[&str],
) -> anyhow::Result<Step<Vec<DirectoryObject>>> {
    let filter = Filter::present(Attr::DISTINGUISHED_NAME);
    match directory.search(Some(dn), SearchScope::Base, attributes, &filter) {
        Ok(objects) => Ok(Step::Continue(objects)),
        Err(err) if Error::LDB_ERR_NO_SUCH_OBJECT.matches(&err) => Ok(Step::Continue(vec![])),
        Err(err) => {
            debug!("reading {} failed: {:?}", dn, err);
            Ok(Step::status(NameStatus::ResolveError))
        }
    }
}

pub(crate) fn exactly_one(objects: Vec<DirectoryObject>) -> anyhow::Result<Step<DirectoryObject>> {
    let mut objects = objects.into_iter();
    Ok(match (objects.next(), objects.next()) {
        (Some(object), None) => Step::Continue(object),
        (None, _) => Step::status(NameStatus::NotFound),
        (Some(_), Some(_)) => Step::status(NameStatus::NotUnique),
    })
}

/// Follows every segment of `path` but the last one down from `nc_name`.
/// Returns the container reached (`None` when it is the naming context
/// itself) and a filter for the leaf.
pub(crate) fn walk_path(
    directory: &dyn Directory,
    nc_name: &DistinguishedName,
    path: &str,
) -> anyhow::Result<Step<(Option<DistinguishedName>, Filter)>> {
    let mut segments = path.split('/').collect::<Vec<&str>>();
    let leaf = segments.pop().unwrap_or_default();
    let mut container: Option<DistinguishedName> = None;
    for segment in segments {
        let base = container.as_ref().unwrap_or(nc_name);
        let filter = Filter::equality(Attr::NAME, segment);
        let objects = proceed!(search(directory, Some(base), SearchScope::OneLevel, &[], &filter)?);
        let object = proceed!(exactly_one(objects)?);
        debug!("path segment {:?} resolved to {}", segment, object.dn);
        container = Some(object.dn);
    }
    Ok(Step::Continue((container, Filter::equality(Attr::NAME, leaf))))
}

/// Where to look for the object and how deep.
pub(crate) fn search_base(
    directory: &dyn Directory,
    flags: CrackFlags,
    offered: NameFormat,
    partition: Option<&Partition>,
    walked_dn: Option<DistinguishedName>,
    scope: SearchScope,
) -> (Option<DistinguishedName>, SearchScope) {
    if flags.contains(CrackFlags::GCVERIFY) || offered == NameFormat::Guid {
        return (None, SearchScope::AllPartitions);
    }
    match partition {
        Some(partition) => (
            Some(walked_dn.unwrap_or_else(|| partition.nc_name.clone())),
            scope,
        ),
        None => (Some(directory.default_base_dn().clone()), scope),
    }
}

/// Picks the object a name refers to among the search hits. Canonical names
/// can match several objects by leaf name alone, so those are compared in
/// full.
pub(crate) fn choose(
    offered: NameFormat,
    name: &str,
    objects: Vec<DirectoryObject>,
) -> anyhow::Result<Step<DirectoryObject>> {
    if objects.len() < 2 || !offered.is_canonical() {
        return exactly_one(objects);
    }
    let name = name.to_lowercase();
    exactly_one(
        objects
            .into_iter()
            .filter(|object| {
                let canonical = match offered {
                    NameFormat::CanonicalEx => object.dn.canonical_ex(),
                    _ => object.dn.canonical(),
                };
                canonical.to_lowercase() == name
            })
            .collect(),
    )
}
