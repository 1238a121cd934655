//! Second chances for principal names that matched nothing directly.
//!
//! A service principal may use a service alias listed in the directory's
//! `sPNMappings` (`host=cifs,http,...`), in which case it is retried under the
//! alias it stands for. A user principal whose realm names a domain is retried
//! as a plain account name inside that domain.

use super::{dispatch::SearchPlan, domain, proceed, Cracker, Query, Step};
use crate::{
    directory::SYSTEM_FLAG_CR_NTDS_DOMAIN, Attr, Directory, DistinguishedName, Error, Filter,
    NameFormat, NameResult, NameStatus, ObjectClass, Principal, SearchScope,
};
use std::str::FromStr;
use tracing::{debug, warn};

const DIRECTORY_SERVICE_PATH: [&str; 3] = ["Services", "Windows NT", "Directory Service"];

/// One `sPNMappings` value: `service` answers for every name in `aliases`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SpnMapping {
    pub(crate) service: String,
    pub(crate) aliases: Vec<String>,
}

impl FromStr for SpnMapping {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> anyhow::Result<Self> {
        let Some((service, aliases)) = value.split_once('=') else {
            return Err(anyhow::Error::from(Error::LDB_ERR_INVALID_ATTRIBUTE_SYNTAX)
                .context(format!("sPNMappings value {:?} has no '='", value)));
        };
        Ok(Self {
            service: service.trim().to_owned(),
            aliases: aliases
                .split(',')
                .map(str::trim)
                .filter(|alias| !alias.is_empty())
                .map(str::to_owned)
                .collect(),
        })
    }
}

/// The service that `service` is an alias of. A mapping that lists its own
/// service among the aliases maps to the first alias that differs instead.
pub(crate) fn alias_for<'m>(mappings: &'m [SpnMapping], service: &str) -> Option<&'m str> {
    let mapping = mappings.iter().find(|mapping| {
        mapping
            .aliases
            .iter()
            .any(|alias| alias.eq_ignore_ascii_case(service))
    })?;
    if !mapping.service.eq_ignore_ascii_case(service) {
        return Some(&mapping.service);
    }
    mapping
        .aliases
        .iter()
        .map(String::as_str)
        .find(|alias| !alias.eq_ignore_ascii_case(service))
}

fn directory_service_dn(directory: &dyn Directory) -> DistinguishedName {
    DIRECTORY_SERVICE_PATH
        .iter()
        .fold(directory.config_base_dn().clone(), |dn, name| dn.child("CN", name))
}

/// Reads the alias table. A missing or malformed table is `NotFound`.
fn load_spn_mappings(directory: &dyn Directory) -> anyhow::Result<Step<Vec<SpnMapping>>> {
    let dn = directory_service_dn(directory);
    let filter = Filter::equality(Attr::OBJECT_CLASS, ObjectClass::NTDS_SERVICE);
    let objects = match directory.search(Some(&dn), SearchScope::Base, &[Attr::SPN_MAPPINGS], &filter) {
        Ok(objects) => objects,
        Err(err) if Error::LDB_ERR_NO_SUCH_OBJECT.matches(&err) => {
            debug!("no directory service object at {}", dn);
            return Ok(Step::status(NameStatus::NotFound));
        }
        Err(err) => {
            debug!("reading {} failed: {:?}", dn, err);
            return Ok(Step::status(NameStatus::ResolveError));
        }
    };
    let [object] = objects.as_slice() else {
        return Ok(Step::status(NameStatus::NotFound));
    };
    let values = object.get(Attr::SPN_MAPPINGS).unwrap_or_default();
    if values.is_empty() {
        debug!("{} has no {}", dn, Attr::SPN_MAPPINGS);
        return Ok(Step::status(NameStatus::NotFound));
    }
    match values
        .iter()
        .map(|value| value.parse::<SpnMapping>())
        .collect::<anyhow::Result<Vec<SpnMapping>>>()
    {
        Ok(mappings) => Ok(Step::Continue(mappings)),
        Err(err) => {
            debug!("{:?}", err);
            Ok(Step::status(NameStatus::NotFound))
        }
    }
}

impl Cracker<'_> {
    pub(super) fn service_principal_fallback(&self, query: Query) -> anyhow::Result<NameResult> {
        let principal = match Principal::parse_name(self.context, query.name, Principal::PARSE_NO_REALM) {
            Ok(principal) => principal,
            Err(err) => {
                debug!("{:?} is not a realm-less principal: {}", query.name, err);
                return Ok(NameResult::new(NameStatus::NotFound));
            }
        };
        let (Some(service), Some(host)) = (principal.component(0), principal.component(1)) else {
            return Ok(NameResult::new(NameStatus::NotFound));
        };
        if query.depth >= self.context.max_alias_depth {
            warn!(
                "giving up on {:?} after {} service alias substitutions",
                query.name, query.depth
            );
            return Ok(NameResult::domain_only(host));
        }

        let alias = match load_spn_mappings(self.directory)? {
            Step::Continue(mappings) => alias_for(&mappings, service).map(str::to_owned),
            Step::Done(result) if result.status == NameStatus::NotFound => None,
            Step::Done(result) => return Ok(result),
        };
        let Some(alias) = alias else {
            return Ok(NameResult::domain_only(host));
        };

        let name = Principal {
            realm: String::new(),
            components: vec![alias, host.to_owned()],
        }
        .unparse_name(Principal::UNPARSE_NO_REALM);
        debug!("retrying {:?} as {:?}", query.name, name);
        let result = self.crack(Query {
            offered: NameFormat::ServicePrincipal,
            name: &name,
            depth: query.depth + 1,
            ..query
        })?;
        Ok(match result.status {
            NameStatus::NotFound => NameResult::domain_only(host),
            _ => result,
        })
    }

    pub(super) fn user_principal_fallback(&self, query: Query) -> anyhow::Result<NameResult> {
        let principal = match Principal::parse_name(self.context, query.name, Principal::PARSE_REQUIRE_REALM) {
            Ok(principal) => principal,
            Err(_) => return Ok(NameResult::new(NameStatus::NotFound)),
        };
        let realm = principal.realm();
        let filter = Filter::and(vec![
            Filter::equality(Attr::OBJECT_CLASS, ObjectClass::CROSS_REF),
            Filter::or(vec![
                Filter::equality(Attr::DNS_ROOT, realm),
                Filter::equality(Attr::NETBIOS_NAME, realm),
            ]),
            Filter::bit_and(Attr::SYSTEM_FLAGS, SYSTEM_FLAG_CR_NTDS_DOMAIN),
        ]);
        let cross_refs = proceed!(domain::search_partitions(self.directory, &filter, &[])?);
        let cross_ref = match cross_refs.as_slice() {
            [] => return Ok(NameResult::domain_only(realm)),
            [cross_ref] => cross_ref,
            _ => return Ok(NameResult::new(NameStatus::NotUnique)),
        };

        let account = principal.unparse_name(Principal::UNPARSE_NO_REALM | Principal::UNPARSE_DISPLAY);
        let plan = SearchPlan {
            domain_filter: Some(Filter::equality(
                Attr::DISTINGUISHED_NAME,
                &cross_ref.dn.to_string(),
            )),
            result_filter: Some(Filter::and(vec![
                Filter::equality(Attr::SAM_ACCOUNT_NAME, &account),
                Filter::equality(Attr::OBJECT_CLASS, ObjectClass::USER),
            ])),
            canonical_path: None,
            scope: SearchScope::Subtree,
        };
        self.crack_search(query, &plan, false)
    }
}
