//! Renders a located object in the desired format.

use super::{domain, locate, proceed, Step};
use crate::{
    guid, Attr, Directory, DirectoryObject, DistinguishedName, Filter, NameFormat, NameResult,
    NameStatus, ObjectClass, SearchScope, Sid,
};

const BUILTIN_DOMAIN: &str = "BUILTIN";

/// Attributes to fetch for rendering `desired`.
pub(crate) fn result_attributes(desired: NameFormat) -> &'static [&'static str] {
    match desired {
        NameFormat::Canonical => &[Attr::CANONICAL_NAME],
        NameFormat::Nt4Account => &[Attr::SAM_ACCOUNT_NAME, Attr::OBJECT_SID, Attr::OBJECT_CLASS],
        NameFormat::Display => &[Attr::DISPLAY_NAME, Attr::SAM_ACCOUNT_NAME],
        NameFormat::Guid => &[Attr::OBJECT_GUID],
        NameFormat::UserPrincipal => &[Attr::USER_PRINCIPAL_NAME],
        NameFormat::ServicePrincipal => &[Attr::SERVICE_PRINCIPAL_NAME],
        NameFormat::SidOrSidHistory => &[Attr::OBJECT_SID],
        _ => &[],
    }
}

/// Conversion that needs no directory at all: a DN into its canonical forms.
pub(crate) fn syntactical(
    offered: NameFormat,
    desired: NameFormat,
    dn: Option<&DistinguishedName>,
) -> NameResult {
    let cracked = match (offered, desired, dn) {
        (NameFormat::Fqdn1779, NameFormat::Canonical, Some(dn)) => dn.canonical(),
        (NameFormat::Fqdn1779, NameFormat::CanonicalEx, Some(dn)) => dn.canonical_ex(),
        _ => return NameResult::new(NameStatus::NoSyntacticalMapping),
    };
    NameResult::ok(None, cracked)
}

pub(crate) fn render(
    directory: &dyn Directory,
    desired: NameFormat,
    object: &DirectoryObject,
) -> anyhow::Result<NameResult> {
    let dns_domain_name = object
        .dn
        .canonical()
        .split('/')
        .next()
        .map(str::to_owned);
    Ok(match rendered_name(directory, desired, object)? {
        Step::Continue(name) => NameResult::ok(dns_domain_name, name),
        Step::Done(result) if desired == NameFormat::DnsDomain => result,
        Step::Done(result) => NameResult {
            dns_domain_name,
            ..result
        },
    })
}

fn rendered_name(
    directory: &dyn Directory,
    desired: NameFormat,
    object: &DirectoryObject,
) -> anyhow::Result<Step<String>> {
    let attribute = |attribute: &str, missing: NameStatus| {
        match object.get_string(attribute) {
            Some(value) => Step::Continue(value.to_owned()),
            None => Step::status(missing),
        }
    };
    Ok(match desired {
        NameFormat::Fqdn1779 => Step::Continue(object.dn.to_string()),
        NameFormat::Canonical => attribute(Attr::CANONICAL_NAME, NameStatus::NoMapping),
        NameFormat::CanonicalEx => Step::Continue(object.dn.canonical_ex()),
        NameFormat::Nt4Account => nt4_account(directory, object)?,
        NameFormat::Guid => match object
            .get_string(Attr::OBJECT_GUID)
            .and_then(|value| guid::parse_guid(value).ok())
        {
            Some(guid) => Step::Continue(guid::format_guid(&guid)),
            None => Step::status(NameStatus::NoMapping),
        },
        NameFormat::Display => match object.get_string(Attr::DISPLAY_NAME) {
            Some(name) => Step::Continue(name.to_owned()),
            None => attribute(Attr::SAM_ACCOUNT_NAME, NameStatus::NotFound),
        },
        NameFormat::ServicePrincipal => match object.get(Attr::SERVICE_PRINCIPAL_NAME) {
            Some([name]) => Step::Continue(name.clone()),
            Some([_, _, ..]) => Step::status(NameStatus::NotUnique),
            _ => Step::status(NameStatus::NotFound),
        },
        NameFormat::SidOrSidHistory => match object_sid(object) {
            Some(sid) => Step::Continue(sid.to_string()),
            None => Step::status(NameStatus::NoMapping),
        },
        NameFormat::UserPrincipal => attribute(Attr::USER_PRINCIPAL_NAME, NameStatus::NoMapping),
        NameFormat::DnsDomain => Step::status(NameStatus::ResolveError),
        NameFormat::Unknown => Step::status(NameStatus::NoMapping),
    })
}

fn object_sid(object: &DirectoryObject) -> Option<Sid> {
    Sid::parse(object.get_string(Attr::OBJECT_SID)?).ok()
}

// `DOMAIN\account`, or `DOMAIN\` for a domain object itself.
fn nt4_account(directory: &dyn Directory, object: &DirectoryObject) -> anyhow::Result<Step<String>> {
    let Some(sid) = object_sid(object) else {
        return Ok(Step::status(NameStatus::NoMapping));
    };
    if object.has_value(Attr::OBJECT_CLASS, ObjectClass::DOMAIN) {
        let domain = proceed!(domain::netbios_name(directory, &object.dn)?);
        return Ok(Step::Continue(format!("{}\\", domain)));
    }
    let Some(account) = object.get_string(Attr::SAM_ACCOUNT_NAME) else {
        return Ok(Step::status(NameStatus::NoMapping));
    };

    let domain = if sid.is_in_domain(&Sid::builtin()) {
        BUILTIN_DOMAIN.to_owned()
    } else {
        let Some(domain_sid) = sid.domain_sid() else {
            return Ok(Step::status(NameStatus::NoMapping));
        };
        let filter = Filter::and(vec![
            Filter::equality(Attr::OBJECT_SID, &domain_sid.to_string()),
            Filter::equality(Attr::OBJECT_CLASS, ObjectClass::DOMAIN),
        ]);
        let domains = proceed!(locate::search(
            directory,
            None,
            SearchScope::AllPartitions,
            &[],
            &filter
        )?);
        let domain_object = proceed!(locate::exactly_one(domains)?);
        proceed!(domain::netbios_name(directory, &domain_object.dn)?)
    };
    Ok(Step::Continue(format!("{}\\{}", domain, account)))
}
