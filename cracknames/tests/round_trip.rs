mod common;

use common::{dn, Fixture};
use cracknames::{NameFormat, NameFormat::*, NameStatus};
use proptest::prelude::*;

const OBJECTS: [&str; 6] = [
    "CN=Administrator,CN=Users,DC=example,DC=com",
    "CN=alice,CN=Users,DC=example,DC=com",
    "CN=web,CN=Users,DC=example,DC=com",
    "CN=DC1,CN=Computers,DC=example,DC=com",
    "CN=bob,OU=East,OU=Sales,DC=example,DC=com",
    "CN=bob,OU=West,OU=Sales,DC=example,DC=com",
];

const REVERSIBLE: [NameFormat; 6] = [
    Canonical,
    CanonicalEx,
    Nt4Account,
    Guid,
    SidOrSidHistory,
    UserPrincipal,
];

fn round_trip(fixture: &Fixture, object: &str, format: NameFormat) -> Option<String> {
    let forward = fixture.crack(object, Fqdn1779, format);
    let name = match (forward.status, forward.result_name) {
        (NameStatus::Ok, Some(name)) => name,
        _ => return None,
    };
    let back = fixture.crack(&name, format, Fqdn1779);
    assert_eq!(back.status, NameStatus::Ok, "{:?} as {}", name, format);
    back.result_name
}

#[test]
fn complete_object_round_trips_through_every_format() {
    let fixture = Fixture::new();
    for format in REVERSIBLE {
        let back = round_trip(&fixture, OBJECTS[0], format);
        assert_eq!(back.map(|name| dn(&name)), Some(dn(OBJECTS[0])), "{}", format);
    }
}

proptest! {
    #[test]
    fn rendered_names_lead_back_to_their_object(
        object in prop::sample::select(OBJECTS.to_vec()),
        format in prop::sample::select(REVERSIBLE.to_vec()),
    ) {
        let fixture = Fixture::new();
        // Objects lacking the attribute a format needs have no name to go back from
        if let Some(back) = round_trip(&fixture, object, format) {
            prop_assert_eq!(dn(&back), dn(object));
        }
    }
}
