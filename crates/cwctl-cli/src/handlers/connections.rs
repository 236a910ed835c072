//! `connections list|show`.

use std::io::Write;

use anyhow::Result;
use cwctl_core::Connection;
use serde::Serialize;

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::presentation::write_json;
use crate::registry_secrets_commands::ConnectionsCommand;

/// A connection together with the origin API calls will use.
#[derive(Serialize)]
struct ConnectionView<'a> {
    #[serde(flatten)]
    connection: &'a Connection,
    origin: String,
}

pub fn execute<W: Write>(ctx: &CliContext, command: ConnectionsCommand, out: &mut W) -> Result<()> {
    match command {
        ConnectionsCommand::List => {
            write_json(out, &ctx.connections().list()).map_err(CliError::from)?;
        }
        ConnectionsCommand::Show { id } => {
            let registry = ctx.connections();
            let connection = registry.resolve(&id).map_err(CliError::from)?;
            let origin = registry
                .endpoint_origin(&connection)
                .map_err(CliError::from)?;
            let view = ConnectionView {
                connection: &connection,
                origin: origin.to_string(),
            };
            write_json(out, &view).map_err(CliError::from)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_support::TestContext;
    use serde_json::Value;

    #[test]
    fn test_list_includes_local_first() {
        let test = TestContext::new();

        let mut out = Vec::new();
        execute(&test.ctx, ConnectionsCommand::List, &mut out).unwrap();

        let listed: Value = serde_json::from_slice(&out).unwrap();
        let ids: Vec<&str> = listed
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, ["local", "remote"]);
    }

    #[test]
    fn test_show_resolves_origin() {
        let test = TestContext::new();

        let mut out = Vec::new();
        execute(
            &test.ctx,
            ConnectionsCommand::Show {
                id: " Remote ".to_string(),
            },
            &mut out,
        )
        .unwrap();

        let shown: Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(shown["id"], "remote");
        assert_eq!(shown["origin"], "https://codewind.example.com/");
        assert_eq!(shown["local"], false);
    }

    #[test]
    fn test_show_local_uses_local_origin() {
        let test = TestContext::new();

        let mut out = Vec::new();
        execute(
            &test.ctx,
            ConnectionsCommand::Show {
                id: "local".to_string(),
            },
            &mut out,
        )
        .unwrap();

        let shown: Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(shown["origin"], "http://127.0.0.1:10000/");
    }

    #[test]
    fn test_show_unknown_is_config_error() {
        let test = TestContext::new();

        let err = execute(
            &test.ctx,
            ConnectionsCommand::Show {
                id: "nope".to_string(),
            },
            &mut Vec::<u8>::new(),
        )
        .unwrap_err();

        assert_eq!(err.downcast_ref::<CliError>().unwrap().exit_code(), 78);
    }
}
