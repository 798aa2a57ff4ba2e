//! When steps for license server configuration BDD scenarios.

use super::world::{ConfigWorld, form_input, run_async, ticked};
use eyre::WrapErr;
use rstest_bdd_macros::when;

fn submit(world: &mut ConfigWorld, path: &str, columns: &str) -> Result<(), eyre::Report> {
    let server_id = world.server_id()?;
    match run_async(
        world
            .service
            .submit_config(server_id, &form_input("Acme", path), &ticked(columns)),
    ) {
        Ok(step) => world.last_step = Some(step),
        Err(err) => world.last_error = Some(err),
    }
    Ok(())
}

#[when(r#"the columns "{columns}" are checked and submitted"#)]
fn columns_checked_and_submitted(
    world: &mut ConfigWorld,
    columns: String,
) -> Result<(), eyre::Report> {
    let server_id = world.server_id()?;
    let current = run_async(world.service.present_config(server_id))
        .wrap_err("present current configuration")?;
    let path = current
        .server()
        .usage_database()
        .map(|database| database.as_str().to_owned())
        .unwrap_or_default();
    submit(world, &path, &columns)
}

#[when(r#"the usage database is changed to "{path}""#)]
fn usage_database_changed(world: &mut ConfigWorld, path: String) -> Result<(), eyre::Report> {
    submit(world, &path, "cpu")
}

#[when("the server is deleted")]
fn server_deleted(world: &mut ConfigWorld) -> Result<(), eyre::Report> {
    let server_id = world.server_id()?;
    run_async(world.service.delete_server(server_id)).wrap_err("delete scenario server")?;
    Ok(())
}
