//! Handlers for the list/get/set/delete commands.

use crate::{
    actions::Action,
    commands::{PARAMETER_ASSET, PARAMETER_KEY, PARAMETER_KEYS_ONLY, PARAMETER_VALUE},
    context::ExecutionContext,
    error::FactError,
    format::{render_entries, render_keys, render_value},
};
use clap::ArgMatches;
use serde_json::Value;
use std::io::IsTerminal;
use tracing::debug;

fn asset_argument(matches: &ArgMatches) -> Option<String> {
    matches.get_one::<String>(PARAMETER_ASSET).cloned()
}

fn required_argument(matches: &ArgMatches, name: &str) -> Result<String, FactError> {
    matches
        .get_one::<String>(name)
        .cloned()
        .ok_or_else(|| FactError::InputError(format!("Missing required argument: {}", name)))
}

pub fn list_from_args(matches: &ArgMatches) -> Result<Action, FactError> {
    Ok(Action::List {
        asset: asset_argument(matches),
        keys_only: matches.get_flag(PARAMETER_KEYS_ONLY),
    })
}

pub fn get_from_args(matches: &ArgMatches) -> Result<Action, FactError> {
    Ok(Action::Get {
        asset: asset_argument(matches),
        key: required_argument(matches, PARAMETER_KEY)?,
    })
}

pub fn set_from_args(matches: &ArgMatches) -> Result<Action, FactError> {
    Ok(Action::Set {
        asset: asset_argument(matches),
        key: required_argument(matches, PARAMETER_KEY)?,
        value: required_argument(matches, PARAMETER_VALUE)?,
    })
}

pub fn delete_from_args(matches: &ArgMatches) -> Result<Action, FactError> {
    Ok(Action::Delete {
        asset: asset_argument(matches),
        key: required_argument(matches, PARAMETER_KEY)?,
    })
}

pub async fn list(
    context: &mut ExecutionContext,
    asset: Option<&str>,
    keys_only: bool,
) -> Result<(), FactError> {
    let asset_id = context.asset_id(asset)?;
    let entries = context.metadata_client(&asset_id)?.fetch_all().await?;
    debug!("Found {} entries on asset {}", entries.len(), asset_id);

    if entries.is_empty() {
        eprintln!("No fact entries found!");
        return Ok(());
    }

    if keys_only {
        println!("{}", render_keys(&entries));
    } else {
        println!("{}", render_entries(&entries, std::io::stdout().is_terminal())?);
    }
    Ok(())
}

pub async fn get(
    context: &mut ExecutionContext,
    asset: Option<&str>,
    key: &str,
) -> Result<(), FactError> {
    let asset_id = context.asset_id(asset)?;
    let value = context.metadata_client(&asset_id)?.fetch_one(key).await?;
    println!("{}", render_value(&value));
    Ok(())
}

/// The value is always stored as a JSON string.
pub async fn set(
    context: &mut ExecutionContext,
    asset: Option<&str>,
    key: &str,
    value: String,
) -> Result<(), FactError> {
    let asset_id = context.asset_id(asset)?;
    context
        .metadata_client(&asset_id)?
        .set_one(key, &Value::String(value))
        .await
}

pub async fn delete(
    context: &mut ExecutionContext,
    asset: Option<&str>,
    key: &str,
) -> Result<(), FactError> {
    let asset_id = context.asset_id(asset)?;
    context.metadata_client(&asset_id)?.delete_one(key).await
}
