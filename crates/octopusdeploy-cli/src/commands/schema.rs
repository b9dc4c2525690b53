//! Schema command - print provider, resource and data source schemas

use crate::commands::Session;
use crate::display;
use crate::error::{CliError, Result};

pub fn run(session: &Session, type_name: Option<&str>) -> Result<()> {
    let server = &session.server;
    let json = match type_name {
        None => server.schemas_json(),
        Some(name) => {
            if let Ok(resource) = server.resource(name) {
                resource.schema().to_json()
            } else if let Ok(data_source) = server.data_source(name) {
                data_source.schema().to_json()
            } else {
                return Err(CliError::UnknownType {
                    kind: "resource type or data source",
                    name: name.to_string(),
                    help: display::suggest(
                        name,
                        server.resource_types().chain(server.data_source_types()),
                    ),
                });
            }
        }
    };

    let rendered = serde_json::to_string_pretty(&json).map_err(|e| CliError::internal(e.to_string()))?;
    println!("{}", rendered);
    Ok(())
}
