//! Turns an offered name into the searches that will locate its object.

use super::domain;
use crate::{
    guid, Attr, Context, DistinguishedName, Filter, NameFormat, NameResult, NameStatus, ObjectClass,
    Principal, SearchScope, Sid,
};
use tracing::trace;

const HOST_SERVICE: &str = "host";

pub(crate) enum Plan {
    /// The name is the object's DN
    Direct(DistinguishedName),
    Search(SearchPlan),
    /// The name alone decides the result
    Done(NameResult),
}

impl Plan {
    fn status(status: NameStatus) -> Self {
        Self::Done(NameResult::new(status))
    }
}

#[derive(Debug, Clone)]
pub(crate) struct SearchPlan {
    /// Selects the owning domain's cross reference below the partitions
    /// container
    pub(crate) domain_filter: Option<Filter>,
    pub(crate) result_filter: Option<Filter>,
    /// `/`-separated path below the domain's naming context, leaf last
    pub(crate) canonical_path: Option<String>,
    pub(crate) scope: SearchScope,
}

impl SearchPlan {
    pub(crate) fn subtree(result_filter: Filter) -> Self {
        Self {
            domain_filter: None,
            result_filter: Some(result_filter),
            canonical_path: None,
            scope: SearchScope::Subtree,
        }
    }
}

struct Ops {
    format: NameFormat,
    plan: fn(&Context, &str) -> Plan,
}

const FQDN_OPS: &Ops = &Ops {
    format: NameFormat::Fqdn1779,
    plan: plan_fqdn,
};
const NT4_OPS: &Ops = &Ops {
    format: NameFormat::Nt4Account,
    plan: plan_nt4_account,
};
const DISPLAY_OPS: &Ops = &Ops {
    format: NameFormat::Display,
    plan: plan_display,
};
const GUID_OPS: &Ops = &Ops {
    format: NameFormat::Guid,
    plan: plan_guid,
};
const CANONICAL_OPS: &Ops = &Ops {
    format: NameFormat::Canonical,
    plan: plan_canonical,
};
const UPN_OPS: &Ops = &Ops {
    format: NameFormat::UserPrincipal,
    plan: plan_user_principal,
};
const CANONICAL_EX_OPS: &Ops = &Ops {
    format: NameFormat::CanonicalEx,
    plan: plan_canonical_ex,
};
const SPN_OPS: &Ops = &Ops {
    format: NameFormat::ServicePrincipal,
    plan: plan_service_principal,
};
const SID_OPS: &Ops = &Ops {
    format: NameFormat::SidOrSidHistory,
    plan: plan_sid,
};

const OPS_LIST: [&Ops; 9] = [
    FQDN_OPS,
    NT4_OPS,
    DISPLAY_OPS,
    GUID_OPS,
    CANONICAL_OPS,
    UPN_OPS,
    CANONICAL_EX_OPS,
    SPN_OPS,
    SID_OPS,
];

/// Formats without a parser (`DnsDomain`) can never be offered and come back
/// as not found.
pub(crate) fn plan(context: &Context, format: NameFormat, name: &str) -> Plan {
    match OPS_LIST.iter().find(|ops| ops.format == format) {
        Some(ops) => (ops.plan)(context, name),
        None => Plan::status(NameStatus::NotFound),
    }
}

fn plan_fqdn(_: &Context, name: &str) -> Plan {
    match DistinguishedName::parse(name) {
        Ok(dn) => Plan::Direct(dn),
        Err(err) => {
            trace!("{:?} is not a DN: {}", name, err);
            Plan::status(NameStatus::NotFound)
        }
    }
}

fn plan_nt4_account(_: &Context, name: &str) -> Plan {
    let Some((domain, account)) = name.split_once('\\') else {
        return Plan::status(NameStatus::NotFound);
    };
    Plan::Search(SearchPlan {
        domain_filter: Some(domain::partition_filter(Filter::equality(
            Attr::NETBIOS_NAME,
            domain,
        ))),
        result_filter: (!account.is_empty())
            .then(|| Filter::equality(Attr::SAM_ACCOUNT_NAME, account)),
        canonical_path: None,
        scope: SearchScope::Subtree,
    })
}

fn plan_display(_: &Context, name: &str) -> Plan {
    Plan::Search(SearchPlan::subtree(Filter::or(vec![
        Filter::equality(Attr::DISPLAY_NAME, name),
        Filter::equality(Attr::SAM_ACCOUNT_NAME, name),
    ])))
}

fn plan_guid(_: &Context, name: &str) -> Plan {
    match guid::parse_guid(name) {
        Ok(guid) => Plan::Search(SearchPlan::subtree(Filter::equality(
            Attr::OBJECT_GUID,
            &guid.hyphenated().to_string(),
        ))),
        Err(_) => Plan::status(NameStatus::NotFound),
    }
}

fn plan_sid(_: &Context, name: &str) -> Plan {
    match Sid::parse(name) {
        Ok(sid) => Plan::Search(SearchPlan::subtree(Filter::equality(
            Attr::OBJECT_SID,
            &sid.to_string(),
        ))),
        Err(_) => Plan::status(NameStatus::NotFound),
    }
}

fn plan_canonical(_: &Context, name: &str) -> Plan {
    plan_canonical_path(name)
}

fn plan_canonical_ex(_: &Context, name: &str) -> Plan {
    // The last separator of the extended form is a newline
    match name.rsplit_once('\n') {
        Some((path, leaf)) => plan_canonical_path(&format!("{}/{}", path, leaf)),
        None => Plan::status(NameStatus::ResolveError),
    }
}

fn plan_canonical_path(name: &str) -> Plan {
    let Some((dns_root, path)) = name.split_once('/') else {
        return Plan::status(NameStatus::ResolveError);
    };
    Plan::Search(SearchPlan {
        domain_filter: Some(domain::partition_filter(Filter::equality(
            Attr::DNS_ROOT,
            dns_root,
        ))),
        result_filter: None,
        canonical_path: (!path.is_empty()).then(|| path.to_owned()),
        scope: SearchScope::OneLevel,
    })
}

fn plan_user_principal(context: &Context, name: &str) -> Plan {
    match Principal::parse_name(context, name, 0) {
        Ok(principal) => Plan::Search(SearchPlan::subtree(Filter::and(vec![
            Filter::equality(
                Attr::USER_PRINCIPAL_NAME,
                &principal.unparse_name(Principal::UNPARSE_DISPLAY),
            ),
            Filter::equality(Attr::OBJECT_CLASS, ObjectClass::USER),
        ]))),
        Err(err) => {
            trace!("{:?} is not a principal name: {}", name, err);
            Plan::status(NameStatus::NotFound)
        }
    }
}

fn plan_service_principal(context: &Context, name: &str) -> Plan {
    if let Ok(principal) = Principal::parse_name(context, name, 0) {
        if principal.component_count() < 2 {
            return Plan::status(NameStatus::NotFound);
        }
    }
    let principal = match Principal::parse_name(context, name, Principal::PARSE_NO_REALM) {
        Ok(principal) => principal,
        // Carries a realm, which is as far as this name gets us
        Err(_) => return domain_from_principal(context, name),
    };

    let service_filter = Filter::and(vec![
        Filter::equality(
            Attr::SERVICE_PRINCIPAL_NAME,
            &principal.unparse_name(Principal::UNPARSE_NO_REALM),
        ),
        Filter::equality(Attr::OBJECT_CLASS, ObjectClass::USER),
    ]);
    let filter = match (principal.component_count(), principal.component(0), principal.component(1)) {
        (2, Some(service), Some(host)) if service.eq_ignore_ascii_case(HOST_SERVICE) => {
            let computer_name = host.split('.').next().unwrap_or(host);
            Filter::or(vec![
                service_filter,
                Filter::and(vec![
                    Filter::equality(Attr::CN, computer_name),
                    Filter::equality(Attr::OBJECT_CLASS, ObjectClass::COMPUTER),
                ]),
            ])
        }
        _ => service_filter,
    };
    Plan::Search(SearchPlan::subtree(filter))
}

fn domain_from_principal(context: &Context, name: &str) -> Plan {
    match Principal::parse_name(context, name, Principal::PARSE_REQUIRE_REALM) {
        Ok(principal) => Plan::Done(NameResult::domain_only(principal.realm())),
        Err(_) => Plan::status(NameStatus::NotFound),
    }
}
