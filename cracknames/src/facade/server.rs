use crate::{
    Attr, Cracker, DistinguishedName, Error, Filter, NameResult, NameStatus, ObjectClass,
    SearchScope,
};
use std::fmt;
use tracing::{debug, warn};

/// Flexible single-master operation roles, in the order they are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsmoRole {
    Schema,
    RidAllocation,
    Infrastructure,
    DomainNaming,
    PdcEmulation,
}

impl FsmoRole {
    pub const ALL: [FsmoRole; 5] = [
        Self::Schema,
        Self::RidAllocation,
        Self::Infrastructure,
        Self::DomainNaming,
        Self::PdcEmulation,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Schema => "schema",
            Self::RidAllocation => "rid",
            Self::Infrastructure => "infrastructure",
            Self::DomainNaming => "naming",
            Self::PdcEmulation => "pdc",
        }
    }
}

impl fmt::Display for FsmoRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Cracker<'_> {
    /// Object whose `fSMORoleOwner` names the holder of `role`.
    pub fn role_object_dn(&self, role: FsmoRole) -> DistinguishedName {
        let directory = self.directory();
        match role {
            FsmoRole::Schema => directory.schema_base_dn().clone(),
            FsmoRole::RidAllocation => directory
                .default_base_dn()
                .child("CN", "System")
                .child("CN", "RID Manager$"),
            FsmoRole::Infrastructure => directory.default_base_dn().child("CN", "Infrastructure"),
            FsmoRole::DomainNaming => directory.partitions_dn(),
            FsmoRole::PdcEmulation => directory.default_base_dn().clone(),
        }
    }

    /// One result per role in [`FsmoRole::ALL`] order: the owner's NTDS
    /// settings DN, with its server's host name as the DNS domain.
    pub fn list_roles(&self) -> anyhow::Result<Vec<NameResult>> {
        FsmoRole::ALL
            .iter()
            .map(|role| self.role_owner(*role))
            .collect()
    }

    fn role_owner(&self, role: FsmoRole) -> anyhow::Result<NameResult> {
        let dn = self.role_object_dn(role);
        let owner = self
            .directory()
            .search(
                Some(&dn),
                SearchScope::Base,
                &[Attr::FSMO_ROLE_OWNER],
                &Filter::present(Attr::DISTINGUISHED_NAME),
            )
            .map_err(|err| warn!("reading {} failed: {:?}", dn, err))
            .ok()
            .and_then(|objects| objects.into_iter().next())
            .and_then(|object| object.get_dn(Attr::FSMO_ROLE_OWNER));
        let Some(owner) = owner else {
            warn!("no {} role owner on {}", role, dn);
            return Err(Error::WERR_DS_DRA_INTERNAL_ERROR.into());
        };

        let dns_host_name = owner
            .parent()
            .and_then(|server| self.read_string(&server, Attr::DNS_HOST_NAME));
        if dns_host_name.is_none() {
            debug!("no {} for the {} role owner {}", Attr::DNS_HOST_NAME, role, owner);
        }
        Ok(NameResult {
            status: NameStatus::Ok,
            dns_domain_name: dns_host_name,
            result_name: Some(owner.to_string()),
        })
    }

    /// For exactly one server object DN: its NTDS settings DN, its host name
    /// and its server reference, each `NotFound` when unavailable.
    pub fn list_info_server(&self, names: &[Option<String>]) -> anyhow::Result<Vec<NameResult>> {
        let mut results = vec![NameResult::new(NameStatus::NotFound); 3];
        let [Some(name)] = names else {
            debug!("server info wants exactly one name, got {}", names.len());
            return Ok(results);
        };
        let server = match DistinguishedName::parse(name) {
            Ok(server) => server,
            Err(err) => {
                debug!("{:?} is not a server DN: {}", name, err);
                return Ok(results);
            }
        };

        let filter = Filter::equality(Attr::OBJECT_CLASS, ObjectClass::NTDS_DSA);
        match self
            .directory()
            .search(Some(&server), SearchScope::OneLevel, &[], &filter)
        {
            Ok(objects) => match objects.as_slice() {
                [settings] => results[0] = NameResult::ok(None, settings.dn.to_string()),
                _ => debug!("{} has {} {} objects", server, objects.len(), ObjectClass::NTDS_DSA),
            },
            Err(err) => debug!("searching below {} failed: {:?}", server, err),
        }

        for (index, attribute) in [(1, Attr::DNS_HOST_NAME), (2, Attr::SERVER_REFERENCE)] {
            if let Some(value) = self.read_string(&server, attribute) {
                results[index] = NameResult::ok(None, value);
            }
        }
        Ok(results)
    }

    /// [`Cracker::list_info_server`] for a single server.
    pub fn describe_server(&self, name: &str) -> anyhow::Result<Vec<NameResult>> {
        self.list_info_server(&[Some(name.to_owned())])
    }

    fn read_string(&self, dn: &DistinguishedName, attribute: &str) -> Option<String> {
        match self.directory().search(
            Some(dn),
            SearchScope::Base,
            &[attribute],
            &Filter::present(Attr::DISTINGUISHED_NAME),
        ) {
            Ok(objects) => objects
                .first()
                .and_then(|object| object.get_string(attribute))
                .map(str::to_owned),
            Err(err) => {
                debug!("reading {} of {} failed: {:?}", attribute, dn, err);
                None
            }
        }
    }
}
