use super::{error, Error};

impl Error {
    error!(LDB_ERR_PROTOCOL_ERROR, 2, "Protocol error");
    error!(LDB_ERR_INVALID_ATTRIBUTE_SYNTAX, 21, "Invalid attribute syntax");
    error!(LDB_ERR_NO_SUCH_OBJECT, 32, "No such object");
    error!(LDB_ERR_INVALID_DN_SYNTAX, 34, "Invalid DN syntax");
    error!(LDB_ERR_UNWILLING_TO_PERFORM, 53, "Unwilling to perform");
    error!(LDB_ERR_ENTRY_ALREADY_EXISTS, 68, "Entry already exists");
    error!(LDB_ERR_OTHER, 80, "Other");
}
