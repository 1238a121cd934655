//! Convenience entry points for callers that need one specific answer rather
//! than a name result.

mod server;

pub use self::server::FsmoRole;
use crate::{
    Cracker, DistinguishedName, Error, NameFormat, NameRequest, NameResult, NameStatus,
};
use tracing::debug;

/// Directory object of a principal, with the naming context of its domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalObject {
    pub object_dn: DistinguishedName,
    pub domain_dn: DistinguishedName,
}

impl Cracker<'_> {
    /// Cracks every request in order. A hard failure on one name abandons the
    /// whole batch.
    pub fn crack_names(&self, requests: &[NameRequest]) -> anyhow::Result<Vec<NameResult>> {
        requests
            .iter()
            .map(|request| self.crack_name(request))
            .collect()
    }

    pub fn crack_user_principal_name(&self, name: &str) -> anyhow::Result<PrincipalObject> {
        self.crack_principal(NameFormat::UserPrincipal, name)
    }

    pub fn crack_service_principal_name(&self, name: &str) -> anyhow::Result<PrincipalObject> {
        self.crack_principal(NameFormat::ServicePrincipal, name)
    }

    fn crack_principal(&self, offered: NameFormat, name: &str) -> anyhow::Result<PrincipalObject> {
        let result = self.crack_name(&NameRequest::new(name, offered, NameFormat::Fqdn1779))?;
        let (object_dn, dns_domain_name) = principal_result(result)?;

        let domain = format!("{}/", dns_domain_name.unwrap_or_default());
        let result = self.crack_name(&NameRequest::new(
            &domain,
            NameFormat::Canonical,
            NameFormat::Fqdn1779,
        ))?;
        let (domain_dn, _) = principal_result(result)?;

        Ok(PrincipalObject {
            object_dn: DistinguishedName::parse(&object_dn)?,
            domain_dn: DistinguishedName::parse(&domain_dn)?,
        })
    }

    /// Splits the NT4 form of `name` into domain and account. An empty name
    /// gives two empty strings.
    pub fn crack_name_to_nt4_name(
        &self,
        offered: NameFormat,
        name: Option<&str>,
    ) -> anyhow::Result<(String, String)> {
        let Some(name) = name.filter(|name| !name.is_empty()) else {
            return Ok((String::new(), String::new()));
        };
        let result = self.crack_name(&NameRequest::new(name, offered, NameFormat::Nt4Account))?;
        let (nt4_name, _) = principal_result(result)?;
        match nt4_name.split_once('\\') {
            Some((domain, account)) => Ok((domain.to_owned(), account.to_owned())),
            None => Err(Error::NT_STATUS_INVALID_PARAMETER)?,
        }
    }

    /// Like [`Cracker::crack_name_to_nt4_name`], guessing the format from the
    /// name's characters.
    pub fn crack_auto_name_to_nt4_name(&self, name: Option<&str>) -> anyhow::Result<(String, String)> {
        let Some(name) = name.filter(|name| !name.is_empty()) else {
            return Ok((String::new(), String::new()));
        };
        match guess_format(name) {
            Some(offered) => self.crack_name_to_nt4_name(offered, Some(name)),
            None => {
                debug!("cannot tell the format of {:?}", name);
                Err(Error::NT_STATUS_NO_SUCH_USER)?
            }
        }
    }
}

fn guess_format(name: &str) -> Option<NameFormat> {
    if name.contains('=') {
        Some(NameFormat::Fqdn1779)
    } else if name.contains('@') {
        Some(NameFormat::UserPrincipal)
    } else if name.contains('\\') {
        Some(NameFormat::Nt4Account)
    } else if name.contains('\n') {
        Some(NameFormat::CanonicalEx)
    } else if name.contains('/') {
        Some(NameFormat::Canonical)
    } else if name.starts_with("S-") || name.starts_with("s-") {
        Some(NameFormat::SidOrSidHistory)
    } else {
        None
    }
}

fn principal_result(result: NameResult) -> anyhow::Result<(String, Option<String>)> {
    match result {
        NameResult {
            status: NameStatus::Ok,
            result_name: Some(name),
            dns_domain_name,
        } => Ok((name, dns_domain_name)),
        NameResult {
            status: NameStatus::NotFound | NameStatus::DomainOnly | NameStatus::NotUnique,
            ..
        } => Err(Error::NT_STATUS_NO_SUCH_USER)?,
        result => {
            debug!("unusable crack result {:?}", result);
            Err(Error::NT_STATUS_UNSUCCESSFUL)?
        }
    }
}
