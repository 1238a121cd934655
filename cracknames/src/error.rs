mod krb5_error;
mod ldb_error;
mod werror;

pub type ErrorCode = i32;

#[derive(Debug, PartialEq, Eq)]
pub struct Error {
    pub code: ErrorCode,
    pub message: &'static str,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

impl Error {
    /// Whether `err` was raised from this error constant.
    pub fn matches(&self, err: &anyhow::Error) -> bool {
        err.downcast_ref::<&Error>()
            .map(|error| *error == self)
            .unwrap_or(false)
    }
}

macro_rules! error {
    ($error:ident, $code:expr, $message:expr) => {
        pub const $error: &'static Error = &Error {
            code: $code,
            message: $message,
        };
    };
}

pub(self) use error;
