mod common;

use common::{ok, Fixture};
use cracknames::{
    Context, CrackFlags, Error, NameFormat::*, NameRequest, NameResult, NameStatus,
};

const ADMINISTRATOR_DN: &str = "CN=Administrator,CN=Users,DC=example,DC=com";
const ALICE_DN: &str = "CN=alice,CN=Users,DC=example,DC=com";
const DC1_DN: &str = "CN=DC1,CN=Computers,DC=example,DC=com";

#[test]
fn dn_to_every_format() {
    let fixture = Fixture::new();
    for (desired, expected) in [
        (Fqdn1779, ADMINISTRATOR_DN),
        (Canonical, "example.com/Users/Administrator"),
        (CanonicalEx, "example.com/Users\nAdministrator"),
        (Nt4Account, "EXAMPLE\\Administrator"),
        (Guid, "{8c6f3c1e-2d4b-4d8a-9e0f-1a2b3c4d5e6f}"),
        (SidOrSidHistory, "S-1-5-21-1-2-3-500"),
        (UserPrincipal, "Administrator@example.com"),
        (Display, "Domain Administrator"),
    ] {
        assert_eq!(
            fixture.crack(ADMINISTRATOR_DN, Fqdn1779, desired),
            ok("example.com", expected),
            "{}",
            desired
        );
    }
}

#[test]
fn missing_attributes_have_no_mapping() {
    let fixture = Fixture::new();
    for desired in [UserPrincipal, Guid] {
        let result = fixture.crack(ALICE_DN, Fqdn1779, desired);
        assert_eq!(result.status, NameStatus::NoMapping, "{}", desired);
        assert_eq!(result.dns_domain_name.as_deref(), Some("example.com"));
        assert_eq!(result.result_name, None);
    }
    assert_eq!(
        fixture.crack("CN=Users,DC=example,DC=com", Fqdn1779, Nt4Account).status,
        NameStatus::NoMapping
    );
}

#[test]
fn display_name_falls_back_to_account_name() {
    let fixture = Fixture::new();
    assert_eq!(fixture.crack(ALICE_DN, Fqdn1779, Display), ok("example.com", "alice"));
}

#[test]
fn service_principal_names() {
    let fixture = Fixture::new();
    assert_eq!(
        fixture.crack("CN=web,CN=Users,DC=example,DC=com", Fqdn1779, ServicePrincipal),
        ok("example.com", "http/www.example.com")
    );
    assert_eq!(
        fixture.crack(DC1_DN, Fqdn1779, ServicePrincipal).status,
        NameStatus::NotUnique
    );
    assert_eq!(
        fixture.crack(ALICE_DN, Fqdn1779, ServicePrincipal).status,
        NameStatus::NotFound
    );
}

#[test]
fn dns_domain_cannot_be_desired() {
    assert_eq!(
        Fixture::new().crack(ALICE_DN, Fqdn1779, DnsDomain),
        NameResult::new(NameStatus::ResolveError)
    );
}

#[test]
fn unknown_dn() {
    let fixture = Fixture::new();
    assert_eq!(
        fixture.crack("CN=nobody,CN=Users,DC=example,DC=com", Fqdn1779, Canonical),
        NameResult::new(NameStatus::NotFound)
    );
    assert_eq!(
        fixture.crack("nobody", Fqdn1779, Canonical),
        NameResult::new(NameStatus::NotFound)
    );
}

#[test]
fn nt4_account_names() {
    let fixture = Fixture::new();
    assert_eq!(fixture.crack("EXAMPLE\\alice", Nt4Account, Fqdn1779), ok("example.com", ALICE_DN));
    assert_eq!(fixture.crack("example\\ALICE", Nt4Account, Fqdn1779), ok("example.com", ALICE_DN));
    assert_eq!(
        fixture.crack("EXAMPLE\\", Nt4Account, Fqdn1779),
        NameResult::domain_only("example.com")
    );
    assert_eq!(
        fixture.crack("DC=example,DC=com", Fqdn1779, Nt4Account),
        ok("example.com", "EXAMPLE\\")
    );

    assert_eq!(
        fixture.crack("OTHER\\alice", Nt4Account, Fqdn1779),
        NameResult::new(NameStatus::NotFound)
    );
    let result = fixture.crack("EXAMPLE\\nobody", Nt4Account, Fqdn1779);
    assert_eq!(result.status, NameStatus::NotFound);
    assert_eq!(result.dns_domain_name.as_deref(), Some("example.com"));
    assert_eq!(fixture.crack("alice", Nt4Account, Fqdn1779).status, NameStatus::NotFound);
}

const SECOND_EXAMPLE_CROSS_REF: &str = "
dn: CN=EXAMPLE2,CN=Partitions,CN=Configuration,DC=example,DC=com
objectClass: top
objectClass: crossRef
nCName: DC=example2,DC=com
dnsRoot: example2.com
nETBIOSName: EXAMPLE
systemFlags: 3
";

#[test]
fn nt4_domain_without_account() {
    let fixture = Fixture::new();
    assert_eq!(
        fixture.crack("example\\", Nt4Account, Canonical),
        NameResult::domain_only("example.com")
    );
    assert_eq!(
        fixture.crack("OTHER\\", Nt4Account, Fqdn1779),
        NameResult::new(NameStatus::NotFound)
    );

    let fixture = Fixture::from_ldif(&format!("{}{}", common::EXAMPLE_LDIF, SECOND_EXAMPLE_CROSS_REF));
    assert_eq!(
        fixture.crack("EXAMPLE\\", Nt4Account, Fqdn1779),
        NameResult::new(NameStatus::NotUnique)
    );
    assert_eq!(
        fixture.crack("EXAMPLE\\alice", Nt4Account, Fqdn1779).status,
        NameStatus::NotUnique
    );
}

#[test]
fn builtin_accounts() {
    let fixture = Fixture::new();
    assert_eq!(
        fixture.crack("S-1-5-32-544", SidOrSidHistory, Nt4Account),
        ok("example.com", "BUILTIN\\Administrators")
    );
}

#[test]
fn canonical_names() {
    let fixture = Fixture::new();
    assert_eq!(
        fixture.crack("example.com/Users/alice", Canonical, Fqdn1779),
        ok("example.com", ALICE_DN)
    );
    assert_eq!(
        fixture.crack("EXAMPLE.COM/users/ALICE", Canonical, Fqdn1779),
        ok("example.com", ALICE_DN)
    );
    assert_eq!(
        fixture.crack("example.com/Users\nalice", CanonicalEx, Fqdn1779),
        ok("example.com", ALICE_DN)
    );
    assert_eq!(
        fixture.crack("example.com/", Canonical, Fqdn1779),
        ok("example.com", "DC=example,DC=com")
    );
    assert_eq!(
        fixture.crack("example.com/Sales/West/bob", Canonical, Nt4Account),
        NameResult {
            status: NameStatus::NoMapping,
            dns_domain_name: Some("example.com".to_owned()),
            result_name: None,
        }
    );
}

#[test]
fn canonical_name_failures() {
    let fixture = Fixture::new();
    for (name, offered, status) in [
        ("example.com", Canonical, NameStatus::ResolveError),
        ("", Canonical, NameStatus::ResolveError),
        ("example.com/Users/alice", CanonicalEx, NameStatus::ResolveError),
        ("nowhere.com/Users/alice", Canonical, NameStatus::NotFound),
        ("example.com/Nowhere/alice", Canonical, NameStatus::NotFound),
        ("example.com/Users/nobody", Canonical, NameStatus::NotFound),
        ("example.com/Sales/carol", Canonical, NameStatus::NotUnique),
    ] {
        assert_eq!(fixture.crack(name, offered, Fqdn1779).status, status, "{:?}", name);
    }
}

#[test]
fn colliding_canonical_names_are_not_unique() {
    // CN=carol and OU=carol under OU=Sales both render as example.com/Sales/carol
    let fixture = Fixture::new();
    for flags in [CrackFlags::NONE, CrackFlags::GCVERIFY] {
        for (name, offered) in [
            ("example.com/Sales/carol", Canonical),
            ("example.com/Sales\ncarol", CanonicalEx),
        ] {
            assert_eq!(
                fixture.crack_with_flags(name, offered, Fqdn1779, flags),
                NameResult::new(NameStatus::NotUnique),
                "{:?} {:?}",
                name,
                flags
            );
        }
    }
}

#[test]
fn global_catalog_search_picks_the_exact_canonical_match() {
    let fixture = Fixture::new();
    for (name, sam_account_name) in [
        ("example.com/Sales/West/bob", "bob.west"),
        ("example.com/Sales/East/bob", "bob.east"),
    ] {
        let result = fixture.crack_with_flags(name, Canonical, Display, CrackFlags::GCVERIFY);
        assert_eq!(result, ok("example.com", sam_account_name));
    }
    let result = fixture.crack_with_flags("alice", Display, Fqdn1779, CrackFlags::GCVERIFY);
    assert_eq!(result, ok("example.com", ALICE_DN));
}

#[test]
fn user_principal_names() {
    let fixture = Fixture::new();
    assert_eq!(
        fixture.crack("Administrator@example.com", UserPrincipal, Fqdn1779),
        ok("example.com", ADMINISTRATOR_DN)
    );
    assert_eq!(
        fixture.crack("administrator@EXAMPLE.COM", UserPrincipal, Fqdn1779),
        ok("example.com", ADMINISTRATOR_DN)
    );
}

#[test]
fn user_principal_realm_fallback() {
    let fixture = Fixture::new();
    // No userPrincipalName: found by account name within the realm's domain
    for name in ["alice@example.com", "alice@EXAMPLE"] {
        assert_eq!(
            fixture.crack(name, UserPrincipal, Fqdn1779),
            ok("example.com", ALICE_DN),
            "{}",
            name
        );
    }
    assert_eq!(
        fixture.crack("alice@other.com", UserPrincipal, Fqdn1779),
        NameResult::domain_only("other.com")
    );
    let result = fixture.crack("nobody@example.com", UserPrincipal, Fqdn1779);
    assert_eq!(result.status, NameStatus::NotFound);
    assert_eq!(result.dns_domain_name.as_deref(), Some("example.com"));
    assert_eq!(fixture.crack("alice", UserPrincipal, Fqdn1779).status, NameStatus::NotFound);
}

#[test]
fn user_principal_attribute_is_searched_before_the_realm() {
    let ldif = common::EXAMPLE_LDIF.replace(
        "sAMAccountName: alice\n",
        "sAMAccountName: alice\nuserPrincipalName: alice@partner.org\n",
    );
    let fixture = Fixture::from_ldif(&ldif);
    // partner.org is no domain here, yet the principal name itself matches
    assert_eq!(
        fixture.crack("alice@partner.org", UserPrincipal, Fqdn1779),
        ok("example.com", ALICE_DN)
    );
    assert_eq!(
        fixture.crack("bob@partner.org", UserPrincipal, Fqdn1779),
        NameResult::domain_only("partner.org")
    );
}

#[test]
fn user_principal_without_default_realm() {
    let mut fixture = Fixture::new();
    fixture.context = Context::default();
    assert_eq!(fixture.crack("alice", UserPrincipal, Fqdn1779).status, NameStatus::NotFound);
    assert_eq!(
        fixture.crack("Administrator@example.com", UserPrincipal, Fqdn1779),
        ok("example.com", ADMINISTRATOR_DN)
    );
}

#[test]
fn service_principal_lookups() {
    let fixture = Fixture::new();
    for name in ["HOST/dc1.example.com", "host/DC1", "ldap/dc1.example.com"] {
        assert_eq!(
            fixture.crack(name, ServicePrincipal, Fqdn1779),
            ok("example.com", DC1_DN),
            "{}",
            name
        );
    }
    assert_eq!(
        fixture.crack("http/www.example.com", ServicePrincipal, Nt4Account),
        ok("example.com", "EXAMPLE\\web")
    );
}

#[test]
fn service_principal_aliases() {
    let fixture = Fixture::new();
    assert_eq!(
        fixture.crack("cifs/dc1.example.com", ServicePrincipal, Fqdn1779),
        ok("example.com", DC1_DN)
    );
    for (name, host) in [
        ("cifs/dc2.example.com", "dc2.example.com"),
        ("HOST/dc2.example.com", "dc2.example.com"),
        ("nfs/dc1.example.com", "dc1.example.com"),
    ] {
        assert_eq!(
            fixture.crack(name, ServicePrincipal, Fqdn1779),
            NameResult::domain_only(host),
            "{}",
            name
        );
    }
}

#[test]
fn service_principal_through_a_self_listing_alias() {
    let ldif = common::EXAMPLE_LDIF.replace(
        "sPNMappings: host=alerter,http,cifs,dnscache",
        "sPNMappings: cifs=cifs,host",
    );
    let fixture = Fixture::from_ldif(&ldif);
    assert_eq!(
        fixture.crack("cifs/dc1.example.com", ServicePrincipal, Fqdn1779),
        ok("example.com", DC1_DN)
    );
    assert_eq!(
        fixture.crack("http/dc1.example.com", ServicePrincipal, Fqdn1779),
        NameResult::domain_only("dc1.example.com")
    );
}

#[test]
fn service_principal_edge_cases() {
    let fixture = Fixture::new();
    assert_eq!(
        fixture.crack("http/www.example.com@OTHER.COM", ServicePrincipal, Fqdn1779),
        NameResult::domain_only("OTHER.COM")
    );
    assert_eq!(
        fixture.crack("krbtgt", ServicePrincipal, Fqdn1779).status,
        NameStatus::NotFound
    );
}

const ALIAS_LOOP_LDIF: &str = "dn: DC=example,DC=com
objectClass: domainDNS

dn: CN=Directory Service,CN=Windows NT,CN=Services,CN=Configuration,DC=example,DC=com
objectClass: nTDSService
sPNMappings: alpha=beta
sPNMappings: beta=alpha
";

#[test]
fn alias_loops_stop_at_the_depth_limit() {
    let mut fixture = Fixture::from_ldif(ALIAS_LOOP_LDIF);
    assert_eq!(
        fixture.crack("alpha/x.example.com", ServicePrincipal, Fqdn1779),
        NameResult::domain_only("x.example.com")
    );
    fixture.context.max_alias_depth = 0;
    assert_eq!(
        fixture.crack("beta/x.example.com", ServicePrincipal, Fqdn1779),
        NameResult::domain_only("x.example.com")
    );
}

#[test]
fn unusable_alias_tables_give_the_host_domain() {
    for ldif in [
        "dn: DC=example,DC=com\nobjectClass: domainDNS\n",
        "dn: DC=example,DC=com
objectClass: domainDNS

dn: CN=Directory Service,CN=Windows NT,CN=Services,CN=Configuration,DC=example,DC=com
objectClass: nTDSService
sPNMappings: host=cifs
sPNMappings: garbage
",
    ] {
        assert_eq!(
            Fixture::from_ldif(ldif).crack("cifs/dc1.example.com", ServicePrincipal, Fqdn1779),
            NameResult::domain_only("dc1.example.com")
        );
    }
}

#[test]
fn sid_and_guid_names() {
    let fixture = Fixture::new();
    assert_eq!(
        fixture.crack("S-1-5-21-1-2-3-500", SidOrSidHistory, Fqdn1779),
        ok("example.com", ADMINISTRATOR_DN)
    );
    assert_eq!(
        fixture.crack("{8C6F3C1E-2D4B-4D8A-9E0F-1A2B3C4D5E6F}", Guid, Nt4Account),
        ok("example.com", "EXAMPLE\\Administrator")
    );
    assert_eq!(fixture.crack("S-1-5-21-1-2-3-999", SidOrSidHistory, Fqdn1779).status, NameStatus::NotFound);
    assert_eq!(fixture.crack("S-1-x", SidOrSidHistory, Fqdn1779).status, NameStatus::NotFound);
    assert_eq!(fixture.crack("{not-a-guid}", Guid, Fqdn1779).status, NameStatus::NotFound);
}

#[test]
fn display_names() {
    let fixture = Fixture::new();
    assert_eq!(
        fixture.crack("Domain Administrator", Display, SidOrSidHistory),
        ok("example.com", "S-1-5-21-1-2-3-500")
    );
    assert_eq!(fixture.crack("carol", Display, Fqdn1779).status, NameStatus::Ok);
    assert_eq!(fixture.crack("Nobody Here", Display, Fqdn1779).status, NameStatus::NotFound);
}

#[test]
fn unknown_format_is_guessed() {
    let fixture = Fixture::new();
    for name in [
        ADMINISTRATOR_DN,
        "Administrator@example.com",
        "EXAMPLE\\Administrator",
        "example.com/Users/Administrator",
        "{8c6f3c1e-2d4b-4d8a-9e0f-1a2b3c4d5e6f}",
        "Domain Administrator",
        "S-1-5-21-1-2-3-500",
    ] {
        assert_eq!(
            fixture.crack(name, Unknown, Fqdn1779),
            ok("example.com", ADMINISTRATOR_DN),
            "{:?}",
            name
        );
    }
    assert_eq!(
        fixture.crack("HOST/dc1.example.com", Unknown, Fqdn1779),
        ok("example.com", DC1_DN)
    );
}

#[test]
fn unknown_format_keeps_the_last_answer() {
    // Every probe misses; the extended canonical probe comes last
    assert_eq!(
        Fixture::new().crack("nothing matches this", Unknown, Fqdn1779),
        NameResult::new(NameStatus::ResolveError)
    );
}

#[test]
fn unknown_desired_format() {
    assert_eq!(
        Fixture::new().crack(ALICE_DN, Fqdn1779, Unknown),
        NameResult::new(NameStatus::ResolveError)
    );
}

#[test]
fn anonymous_names() {
    let fixture = Fixture::new();
    let cracker = fixture.cracker();
    let anonymous = NameResult {
        status: NameStatus::Ok,
        dns_domain_name: Some(String::new()),
        result_name: Some(String::new()),
    };
    let mut request = NameRequest::new("", Unknown, Fqdn1779);
    assert_eq!(cracker.crack_name(&request).unwrap(), anonymous);
    request.name = None;
    assert_eq!(cracker.crack_name(&request).unwrap(), anonymous);

    request.format_offered = Fqdn1779;
    let err = cracker.crack_name(&request).unwrap_err();
    assert!(Error::WERR_INVALID_PARAMETER.matches(&err));

    assert_eq!(fixture.crack("", Fqdn1779, Canonical).status, NameStatus::NotFound);
}

#[test]
fn syntactical_only() {
    let fixture = Fixture::new();
    let flags = CrackFlags::SYNTACTICAL_ONLY;
    let nobody = "CN=nobody,CN=Users,DC=example,DC=com";
    assert_eq!(
        fixture.crack_with_flags(nobody, Fqdn1779, Canonical, flags),
        NameResult::ok(None, "example.com/Users/nobody".to_owned())
    );
    assert_eq!(
        fixture.crack_with_flags(nobody, Fqdn1779, CanonicalEx, flags),
        NameResult::ok(None, "example.com/Users\nnobody".to_owned())
    );
    for (name, offered, desired, status) in [
        (nobody, Fqdn1779, Nt4Account, NameStatus::NoSyntacticalMapping),
        ("EXAMPLE\\alice", Nt4Account, Canonical, NameStatus::NoSyntacticalMapping),
        ("nobody", Fqdn1779, Canonical, NameStatus::NotFound),
    ] {
        assert_eq!(
            fixture.crack_with_flags(name, offered, desired, flags).status,
            status,
            "{:?}",
            name
        );
    }
}

#[test]
fn unrecognised_flags_are_ignored() {
    let fixture = Fixture::new();
    assert_eq!(
        fixture.crack_with_flags("EXAMPLE\\alice", Nt4Account, Fqdn1779, CrackFlags(0x8)),
        ok("example.com", ALICE_DN)
    );
}

#[test]
fn concurrent_cracks_share_the_directory() {
    let fixture = Fixture::new();
    std::thread::scope(|scope| {
        let handles = (0..4)
            .map(|_| scope.spawn(|| fixture.crack("EXAMPLE\\alice", Nt4Account, Canonical)))
            .collect::<Vec<_>>();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), ok("example.com", "example.com/Users/alice"));
        }
    });
}
