pub mod context;
pub mod crack;
pub mod directory;
pub mod dn;
pub mod error;
pub mod facade;
pub mod filter;
pub mod guid;
pub mod name;
pub mod principal;
pub mod sid;

pub use self::{
    context::{Conf, Context, Profile},
    crack::Cracker,
    directory::{Attr, Directory, DirectoryObject, MemoryDirectory, ObjectClass, SearchScope},
    dn::DistinguishedName,
    error::Error,
    facade::{FsmoRole, PrincipalObject},
    filter::Filter,
    name::{CrackFlags, NameFormat, NameRequest, NameResult, NameStatus},
    principal::Principal,
    sid::Sid,
};
use std::process::ExitCode;

pub type Flags = i32;

pub fn prefix_progname_to_error_if_needed(progname: &str, result: anyhow::Result<()>) -> ExitCode {
    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) if err.to_string().starts_with(&format!("Usage: {}", progname)) => {
            eprintln!("{:?}", err);
            ExitCode::FAILURE
        }
        Err(err) => {
            eprintln!("{}: {:?}", progname, err);
            ExitCode::FAILURE
        }
    }
}
