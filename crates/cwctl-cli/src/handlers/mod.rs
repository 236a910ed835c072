//! Command handlers.
//!
//! Handlers follow one pattern:
//! - Signature: `execute(ctx: &CliContext, command, out) -> Result<()>`
//! - Resolve input, call the core service, write the result to `out`
//! - Errors are converted to [`CliError`](crate::CliError) so `main` can pick an exit code
//!
//! Handlers hold no business logic and never touch adapters directly.

pub mod connections;
pub mod registry_secrets;

#[cfg(test)]
pub(crate) mod test_support;
