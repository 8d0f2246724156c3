//! Standard exit codes (BSD sysexits.h compatible)

/// Successful termination
pub const OK: i32 = 0;

/// Key not found (`--found`)
pub const NOT_FOUND: i32 = 1;

/// Command line usage error
pub const USAGE: i32 = 64;

/// Data format error
pub const DATAERR: i32 = 65;

/// Cannot open input
pub const NOINPUT: i32 = 66;

/// Can't create output file
pub const CANTCREAT: i32 = 73;

/// Input/output error
pub const IOERR: i32 = 74;

/// Configuration error
pub const CONFIG: i32 = 78;
