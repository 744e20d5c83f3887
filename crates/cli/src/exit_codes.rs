//! CLI exit code registry.
//!
//! Exit codes are part of the shell contract — scheduled runs rely on them.
//!
//! | Code | Meaning                                   |
//! |------|-------------------------------------------|
//! | 0    | Success                                   |
//! | 1    | General error (unspecified)               |
//! | 2    | Usage error (bad args)                    |
//! | 3    | Invalid config (parse or validation)      |
//! | 4    | Missing required/catalog column           |
//! | 5    | Runtime error (file IO, unreadable input) |

/// Config failed to parse or validate.
pub const EXIT_INVALID_CONFIG: u8 = 3;

/// The source or the catalog lacks a column the pipeline requires.
pub const EXIT_MISSING_COLUMN: u8 = 4;

/// File IO or input parsing failure.
pub const EXIT_RUNTIME: u8 = 5;
