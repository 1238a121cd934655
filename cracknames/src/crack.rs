//! Translates a name from one syntax into another by locating the directory
//! object it names.
//!
//! A crack runs in stages: the offered format is parsed into a plan, the
//! owning domain partition is resolved, the object is located (falling back to
//! alias and realm lookups for principals) and finally rendered in the desired
//! format. Each stage yields either a value for the next one or the name's
//! final [`NameResult`]. Only malformed requests and internal faults surface
//! as errors.

mod dispatch;
mod domain;
mod fallback;
mod locate;
mod render;

use self::dispatch::{Plan, SearchPlan};
use crate::{
    Context, CrackFlags, Directory, DistinguishedName, Error, NameFormat, NameRequest, NameResult, NameStatus,
};
use tracing::{debug, trace};

const PROBE_ORDER: [NameFormat; 9] = [
    NameFormat::Fqdn1779,
    NameFormat::UserPrincipal,
    NameFormat::Nt4Account,
    NameFormat::Canonical,
    NameFormat::Guid,
    NameFormat::Display,
    NameFormat::ServicePrincipal,
    NameFormat::SidOrSidHistory,
    NameFormat::CanonicalEx,
];

/// Outcome of one stage of a crack.
pub(crate) enum Step<T> {
    Continue(T),
    Done(NameResult),
}

impl<T> Step<T> {
    pub(crate) fn status(status: NameStatus) -> Self {
        Self::Done(NameResult::new(status))
    }
}

impl<T> From<NameResult> for Step<T> {
    fn from(result: NameResult) -> Self {
        Self::Done(result)
    }
}

/// Unwraps a `Step`, returning early from the enclosing function when the
/// name's result is already decided.
macro_rules! proceed {
    ($step:expr) => {
        match $step {
            $crate::crack::Step::Continue(value) => value,
            $crate::crack::Step::Done(result) => return Ok(result.into()),
        }
    };
}

pub(crate) use proceed;

#[derive(Debug, Clone, Copy)]
struct Query<'n> {
    flags: CrackFlags,
    offered: NameFormat,
    desired: NameFormat,
    name: &'n str,
    // Number of alias substitutions already made for this name
    depth: usize,
}

pub struct Cracker<'a> {
    directory: &'a dyn Directory,
    context: &'a Context,
}

impl<'a> Cracker<'a> {
    pub fn new(directory: &'a dyn Directory, context: &'a Context) -> Self {
        Self { directory, context }
    }

    pub fn directory(&self) -> &'a dyn Directory {
        self.directory
    }

    pub fn context(&self) -> &'a Context {
        self.context
    }

    /// Cracks a single name. Per-name outcomes, including failures to find
    /// anything, are reported through the result's status.
    pub fn crack_name(&self, request: &NameRequest) -> anyhow::Result<NameResult> {
        let name = match request.name.as_deref() {
            None | Some("") if request.format_offered == NameFormat::Unknown => {
                trace!("anonymous name");
                return Ok(NameResult {
                    status: NameStatus::Ok,
                    dns_domain_name: Some(String::new()),
                    result_name: Some(String::new()),
                });
            }
            None => Err(Error::WERR_INVALID_PARAMETER)?,
            Some(name) => name,
        };
        let result = self.crack(Query {
            flags: request.flags,
            offered: request.format_offered,
            desired: request.format_desired,
            name,
            depth: 0,
        })?;
        debug!(
            "cracked {:?} from {} to {}: {}",
            name, request.format_offered, request.format_desired, result.status
        );
        Ok(result)
    }

    fn crack(&self, query: Query) -> anyhow::Result<NameResult> {
        if query.desired == NameFormat::Unknown {
            return Ok(NameResult::new(NameStatus::ResolveError));
        }
        if query.offered == NameFormat::Unknown {
            return self.probe(query);
        }

        let plan = dispatch::plan(self.context, query.offered, query.name);
        if query.flags.contains(CrackFlags::SYNTACTICAL_ONLY) {
            return Ok(match plan {
                Plan::Done(result) => result,
                Plan::Direct(dn) => render::syntactical(query.offered, query.desired, Some(&dn)),
                Plan::Search(_) => render::syntactical(query.offered, query.desired, None),
            });
        }
        match plan {
            Plan::Done(result) => Ok(result),
            Plan::Direct(dn) => self.crack_direct(query, &dn),
            Plan::Search(plan) => self.crack_search(query, &plan, true),
        }
    }

    // Tries each format in turn until one gives a definite answer.
    fn probe(&self, query: Query) -> anyhow::Result<NameResult> {
        let mut result = NameResult::new(NameStatus::ResolveError);
        for offered in PROBE_ORDER {
            result = self.crack(Query { offered, ..query })?;
            if !keep_probing(offered, result.status) {
                break;
            }
        }
        Ok(result)
    }

    fn crack_direct(&self, query: Query, dn: &DistinguishedName) -> anyhow::Result<NameResult> {
        let objects = proceed!(locate::fetch(
            self.directory,
            dn,
            render::result_attributes(query.desired)
        )?);
        let object = proceed!(locate::exactly_one(objects)?);
        render::render(self.directory, query.desired, &object)
    }

    fn crack_search(
        &self,
        query: Query,
        plan: &SearchPlan,
        fall_back: bool,
    ) -> anyhow::Result<NameResult> {
        let mut result = NameResult::new(NameStatus::ResolveError);
        let partition = match &plan.domain_filter {
            Some(filter) => {
                let partition = proceed!(domain::resolve(self.directory, filter)?);
                result.dns_domain_name = partition.dns_root.clone();
                result.status = NameStatus::DomainOnly;
                Some(partition)
            }
            None => None,
        };

        let (walked_dn, result_filter) = match (&plan.canonical_path, &partition) {
            (Some(path), Some(partition)) => {
                let (walked_dn, leaf) =
                    proceed!(locate::walk_path(self.directory, &partition.nc_name, path)?);
                (walked_dn, Some(leaf))
            }
            _ => (None, plan.result_filter.clone()),
        };

        let attributes = render::result_attributes(query.desired);
        let objects = match (result_filter, &partition) {
            (Some(filter), _) => {
                let (base, scope) = locate::search_base(
                    self.directory,
                    query.flags,
                    query.offered,
                    partition.as_ref(),
                    walked_dn,
                    plan.scope,
                );
                proceed!(locate::search(self.directory, base.as_ref(), scope, attributes, &filter)?)
            }
            // A bare domain is itself the answer for canonical names only
            (None, Some(_)) if !query.offered.is_canonical() => return Ok(result),
            (None, Some(partition)) => {
                proceed!(locate::fetch(self.directory, &partition.nc_name, attributes)?)
            }
            (None, None) => Err(Error::WERR_INTERNAL_ERROR)?,
        };

        if objects.is_empty() {
            if fall_back {
                match query.offered {
                    NameFormat::ServicePrincipal => return self.service_principal_fallback(query),
                    NameFormat::UserPrincipal => return self.user_principal_fallback(query),
                    _ => {}
                }
            }
            result.status = NameStatus::NotFound;
            return Ok(result);
        }

        let object = proceed!(locate::choose(query.offered, query.name, objects)?);
        render::render(self.directory, query.desired, &object)
    }
}

fn keep_probing(offered: NameFormat, status: NameStatus) -> bool {
    status == NameStatus::NotFound
        || (offered == NameFormat::Canonical && status == NameStatus::ResolveError)
}
