//! Then steps for license server configuration BDD scenarios.

use super::world::{ConfigWorld, column_list, run_async};
use licensewatch::license_server::{
    domain::{ColumnName, ConfigStep},
    services::LicenseMonitorServiceError,
};
use rstest_bdd_macros::then;
use std::collections::BTreeSet;

fn names(columns: &BTreeSet<ColumnName>) -> Vec<&str> {
    columns.iter().map(ColumnName::as_str).collect()
}

fn subscribed(world: &ConfigWorld) -> Result<Vec<String>, eyre::Report> {
    let form = run_async(
        world
            .service
            .get_catalog_and_current_selections(world.server_id()?),
    )
    .map_err(|err| eyre::eyre!("catalog read failed: {err}"))?;
    Ok(form
        .selections
        .iter()
        .filter(|(_, checked)| **checked)
        .map(|(column, _)| column.as_str().to_owned())
        .collect())
}

#[then(r#"the configuration state is "{state}""#)]
fn configuration_state(world: &ConfigWorld, state: String) -> Result<(), eyre::Report> {
    let step = world
        .last_step
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing configuration step in scenario world"))?;
    if step.state().as_str() != state {
        return Err(eyre::eyre!(
            "expected state '{state}', got '{}'",
            step.state().as_str()
        ));
    }
    Ok(())
}

#[then(r#"the subscribed columns are "{columns}""#)]
fn subscribed_columns_are(world: &ConfigWorld, columns: String) -> Result<(), eyre::Report> {
    let actual = subscribed(world)?;
    if actual != column_list(&columns) {
        return Err(eyre::eyre!("expected subscriptions {columns}, got {actual:?}"));
    }
    Ok(())
}

#[then("no columns are subscribed")]
fn no_columns_subscribed(world: &ConfigWorld) -> Result<(), eyre::Report> {
    let actual = subscribed(world)?;
    if !actual.is_empty() {
        return Err(eyre::eyre!("expected no subscriptions, got {actual:?}"));
    }
    Ok(())
}

#[then(r#"the last delta added "{added}" and removed "{removed}""#)]
fn last_delta(world: &ConfigWorld, added: String, removed: String) -> Result<(), eyre::Report> {
    let Some(ConfigStep::Reconciled { delta, .. }) = world.last_step.as_ref() else {
        return Err(eyre::eyre!("expected a reconciled step in scenario world"));
    };
    if names(&delta.to_add) != column_list(&added) || names(&delta.to_remove) != column_list(&removed)
    {
        return Err(eyre::eyre!("unexpected delta {delta:?}"));
    }
    Ok(())
}

#[then(r#"the usage for "{period}" has {count:usize} rows"#)]
fn usage_row_count(world: &ConfigWorld, period: String, count: usize) -> Result<(), eyre::Report> {
    let rows = run_async(world.service.get_usage(world.server_id()?, &period))
        .map_err(|err| eyre::eyre!("usage read failed: {err}"))?;
    if rows.len() != count {
        return Err(eyre::eyre!("expected {count} rows, got {}", rows.len()));
    }
    Ok(())
}

#[then("the submission fails because the usage database is unavailable")]
fn submission_fails_unavailable(world: &ConfigWorld) -> Result<(), eyre::Report> {
    let error = world
        .last_error
        .as_ref()
        .ok_or_else(|| eyre::eyre!("expected a submission error"))?;
    if !matches!(error, LicenseMonitorServiceError::SourceUnavailable { .. }) {
        return Err(eyre::eyre!("expected source unavailable, got {error:?}"));
    }
    Ok(())
}

#[then(r#"reading usage for "{period}" fails because the server is not found"#)]
fn usage_not_found(world: &ConfigWorld, period: String) -> Result<(), eyre::Report> {
    let result = run_async(world.service.get_usage(world.server_id()?, &period));
    if !matches!(result, Err(LicenseMonitorServiceError::NotFound(_))) {
        return Err(eyre::eyre!("expected not found, got {result:?}"));
    }
    Ok(())
}
