use super::{error, Error};

impl Error {
    error!(KRB5_PARSE_MALFORMED, -1765328250, "Malformed representation of principal");
    error!(
        KRB5_CONFIG_NODEFREALM,
        -1765328160, "Configuration file does not specify default realm"
    );
}
