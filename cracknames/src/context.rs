mod profile;

pub use self::profile::Profile;
use crate::Error;

const DEFAULT_MAX_ALIAS_DEPTH: usize = 4;

pub struct Conf;

macro_rules! conf {
    ($name:ident, $value:expr) => {
        pub const $name: &'static str = $value;
    };
}

impl Conf {
    conf!(BASE_DN, "base_dn");
    conf!(CRACKNAMES, "cracknames");
    conf!(DEFAULT_REALM, "default_realm");
    conf!(DIRECTORY, "directory");
    conf!(LIBDEFAULTS, "libdefaults");
    conf!(MAX_ALIAS_DEPTH, "max_alias_depth");
}

/// Settings shared by every crack call. Read-only once built.
#[derive(Debug, Clone)]
pub struct Context {
    pub default_realm: Option<String>,
    pub max_alias_depth: usize,
    pub directory: Option<String>,
    pub base_dn: Option<String>,
}

impl Default for Context {
    fn default() -> Self {
        Self {
            default_realm: None,
            max_alias_depth: DEFAULT_MAX_ALIAS_DEPTH,
            directory: None,
            base_dn: None,
        }
    }
}

impl Context {
    pub fn init() -> anyhow::Result<Self> {
        Ok(Self::from_profile(&Profile::new()?))
    }

    pub fn from_profile(profile: &Profile) -> Self {
        let default_realm = profile.get_string(&Self::key(Conf::LIBDEFAULTS, Conf::DEFAULT_REALM));
        let max_alias_depth = profile
            .get_int(&Self::key(Conf::CRACKNAMES, Conf::MAX_ALIAS_DEPTH))
            .and_then(|depth| usize::try_from(depth).ok())
            .unwrap_or(DEFAULT_MAX_ALIAS_DEPTH);
        let directory = profile.get_string(&Self::key(Conf::CRACKNAMES, Conf::DIRECTORY));
        let base_dn = profile.get_string(&Self::key(Conf::CRACKNAMES, Conf::BASE_DN));
        Self {
            default_realm,
            max_alias_depth,
            directory,
            base_dn,
        }
    }

    fn key(section: &str, name: &str) -> String {
        format!("{}.{}", section, name)
    }

    pub fn get_default_realm(&self) -> anyhow::Result<&str> {
        match self.default_realm.as_deref() {
            Some(realm) if !realm.is_empty() => Ok(realm),
            _ => Err(Error::KRB5_CONFIG_NODEFREALM)?,
        }
    }
}
