//! Process exit codes
//!
//! Follows sysexits.h where a matching code exists.

/// Unspecified failure
pub const ERROR: i32 = 1;

/// The resource configuration failed validation
pub const VALIDATION_ERROR: i32 = 2;

/// The provider reported errors while talking to Octopus Deploy
pub const PROVIDER_ERROR: i32 = 3;

/// Provider settings or input files are invalid
pub const CONFIG_ERROR: i32 = 4;

/// File not found, permission denied, etc.
pub const IO_ERROR: i32 = 5;

/// Invalid arguments, e.g. an unknown resource type
pub const USAGE_ERROR: i32 = 64;
