//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract: scripts rely on them.
//!
//! | Code | Meaning                                                  |
//! |------|----------------------------------------------------------|
//! | 0    | Success                                                  |
//! | 1    | General error (export or settings failure)               |
//! | 2    | CLI usage error (bad args, unknown column reference)     |
//! | 3    | Input file could not be read or decoded                  |
//! | 4    | No row contains both required header labels              |
//! | 5    | Columns could not be resolved automatically              |
//! | 6    | Nothing to report and `--fail-on-empty` was given         |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - export write failure, unreadable settings.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, column reference that matches nothing.
pub const EXIT_USAGE: u8 = 2;

/// Input file missing, unsupported extension, or undecodable content.
pub const EXIT_INGEST: u8 = 3;

/// Header row not found in the first sheet.
pub const EXIT_HEADER_NOT_FOUND: u8 = 4;

/// Automatic column detection failed and no column flags cover the gap.
/// The hint lists the available labels and the flags to pass.
pub const EXIT_COLUMN_AMBIGUOUS: u8 = 5;

/// Empty result (no records in file, or no matches) with `--fail-on-empty`.
pub const EXIT_EMPTY_RESULT: u8 = 6;
