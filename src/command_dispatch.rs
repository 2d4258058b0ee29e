//! Purpose: Hold top-level CLI command dispatch for `adgraph`.
//! Exports: `dispatch_command`.
//! Role: Keep `main.rs` focused on parse/bootstrap and delegate command execution.
//! Invariants: Offline commands (`schema`, `validate`) never build a client.

use super::*;
use adgraph::api::{ListOptions, Params};
use adgraph::core::validate::Validator;
use adgraph::models::ResourceKind;

pub(super) fn dispatch_command(
    command: Command,
    credentials: &Credentials,
) -> Result<RunOutcome, Error> {
    match command {
        Command::Schema { kind } => {
            let kind: ResourceKind = kind.parse()?;
            emit_json(schema_json(kind.schema(), kind.collection()));
            Ok(RunOutcome::ok())
        }
        Command::Validate {
            kind,
            json,
            match_mode,
        } => {
            let kind: ResourceKind = kind.parse()?;
            let raw = read_json_arg(&json)?;
            let value: Value = serde_json::from_str(&raw).map_err(|err| {
                Error::new(ErrorKind::Argument)
                    .with_message("input is not valid JSON")
                    .with_hint("Pass a JSON object, e.g. '{\"name\": \"spring\"}'.")
                    .with_source(err)
            })?;
            let Value::Object(map) = value else {
                return Err(Error::new(ErrorKind::Argument)
                    .with_message(format!("{kind} input must be a JSON object")));
            };
            let model = kind.instantiate_with(&map, Validator::new(match_mode.into()))?;
            emit_json(model.to_json());
            Ok(RunOutcome::ok())
        }
        Command::Get { path, params, all } => {
            let client = build_client(credentials)?;
            let params: Params = params.into_iter().collect();
            let resource = resource_path(&path);
            if all {
                let items = client.get_all(&resource, &params)?;
                emit_json(Value::Array(items));
            } else {
                emit_json(client.get(&resource, &params)?);
            }
            Ok(RunOutcome::ok())
        }
        Command::List {
            kind,
            container,
            limit,
            offset,
            include_deleted,
        } => {
            let kind: ResourceKind = kind.parse()?;
            let client = build_client(credentials)?;
            let mut options = ListOptions::default().include_deleted(include_deleted);
            if let Some(limit) = limit {
                options = options.limit(limit);
            }
            if let Some(offset) = offset {
                options = options.offset(offset);
            }
            let models = client.get_list(&container, kind, &options.to_params())?;
            let values = models.iter().map(|model| model.to_json()).collect();
            emit_json(Value::Array(values));
            Ok(RunOutcome::ok())
        }
        Command::Show { kind, id } => {
            let kind: ResourceKind = kind.parse()?;
            let client = build_client(credentials)?;
            let model = client.get_one(&id, kind)?;
            emit_json(model.to_json());
            Ok(RunOutcome::ok())
        }
        Command::ExchangeToken => {
            let mut client = build_client(credentials)?;
            let token = client.exchange_token()?;
            emit_json(json!({ "access_token": token }));
            Ok(RunOutcome::ok())
        }
    }
}

fn resource_path(path: &str) -> String {
    let trimmed = path.trim();
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}
