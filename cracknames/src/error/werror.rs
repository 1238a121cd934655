use super::{error, Error};

// Hard failures of a crack call
impl Error {
    error!(WERR_INVALID_PARAMETER, 0x0057, "The parameter is incorrect");
    error!(WERR_INTERNAL_ERROR, 0x054f, "An internal error occurred");
    error!(
        WERR_DS_DRA_INTERNAL_ERROR,
        0x20fa, "The replication operation encountered an internal error"
    );
}

// Results of the principal lookups used by authentication
impl Error {
    error!(
        NT_STATUS_UNSUCCESSFUL,
        0xc000_0001_u32 as i32,
        "Unsuccessful"
    );
    error!(
        NT_STATUS_INVALID_PARAMETER,
        0xc000_000d_u32 as i32,
        "Invalid parameter"
    );
    error!(
        NT_STATUS_NO_SUCH_USER,
        0xc000_0064_u32 as i32,
        "No such user"
    );
}
