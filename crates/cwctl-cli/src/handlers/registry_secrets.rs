//! `registrysecrets get|add|remove`.

use std::io::Write;

use anyhow::Result;
use cwctl_core::{LocalSyncError, RegistryCredentials, RegistrySecretsOutcome};

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::presentation::write_json;
use crate::registry_secrets_commands::RegistrySecretsCommand;

/// Run a registry secrets subcommand, writing the resulting list to `out`.
pub async fn execute<W: Write>(
    ctx: &CliContext,
    command: RegistrySecretsCommand,
    out: &mut W,
) -> Result<()> {
    match command {
        RegistrySecretsCommand::Get { conid } => {
            let secrets = ctx
                .secrets()
                .get(&conid, ctx.cancel())
                .await
                .map_err(CliError::from)?;
            write_json(out, &secrets).map_err(CliError::from)?;
        }
        RegistrySecretsCommand::Add {
            conid,
            address,
            username,
            password,
        } => {
            let credentials = RegistryCredentials::new(username, password);
            let outcome = ctx
                .secrets()
                .add(&conid, &address, credentials, ctx.cancel())
                .await
                .map_err(CliError::from)?;
            finish(outcome, out)?;
        }
        RegistrySecretsCommand::Remove { conid, address } => {
            let outcome = ctx
                .secrets()
                .remove(&conid, &address, ctx.cancel())
                .await
                .map_err(CliError::from)?;
            finish(outcome, out)?;
        }
    }
    Ok(())
}

/// The remote change stands even when the local mirror failed, so that case
/// is only a warning.
fn finish<W: Write>(outcome: RegistrySecretsOutcome, out: &mut W) -> Result<()> {
    if let Some(err) = &outcome.local_sync {
        warn_out_of_sync(err);
    }
    write_json(out, &outcome.secrets).map_err(CliError::from)?;
    Ok(())
}

fn warn_out_of_sync(err: &LocalSyncError) {
    eprintln!("Warning: {err}");
}
