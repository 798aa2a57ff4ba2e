//! Given steps for license server configuration BDD scenarios.

use super::world::{ConfigWorld, column_list, form_input, run_async, scenario_now, ticked};
use camino::Utf8Path;
use chrono::TimeDelta;
use eyre::WrapErr;
use licensewatch::license_server::ports::SampleStore;
use rstest_bdd_macros::given;

#[given(r#"a usage database "{path}" with columns "{columns}""#)]
fn a_usage_database(
    world: &mut ConfigWorld,
    path: String,
    columns: String,
) -> Result<(), eyre::Report> {
    world
        .store
        .put_database(path.as_str(), &column_list(&columns))
        .wrap_err("install usage database")?;
    Ok(())
}

#[given(r#"server "{vendor}" uses "{path}" with subscriptions "{columns}""#)]
fn server_with_subscriptions(
    world: &mut ConfigWorld,
    vendor: String,
    path: String,
    columns: String,
) -> Result<(), eyre::Report> {
    let created = run_async(world.service.create_server(&form_input(&vendor, &path)))
        .wrap_err("register scenario server")?;
    let server_id = created.server().id();
    run_async(
        world
            .service
            .submit_config(server_id, &form_input(&vendor, &path), &ticked(&columns)),
    )
    .wrap_err("subscribe scenario columns")?;
    world.server_id = Some(server_id);
    Ok(())
}

#[given(r#"the database "{path}" holds hourly samples for the last {hours:u32} hours"#)]
fn hourly_samples(world: &mut ConfigWorld, path: String, hours: u32) -> Result<(), eyre::Report> {
    let database = Utf8Path::new(&path);
    let source = run_async(world.store.open(database)).wrap_err("open scenario database")?;
    let column_count = run_async(world.store.list_columns(&source))
        .wrap_err("read scenario database columns")?
        .len();

    for hours_ago in 1..=hours {
        world
            .store
            .push_sample(
                database,
                scenario_now() - TimeDelta::hours(i64::from(hours_ago)),
                vec![Some(f64::from(hours_ago)); column_count],
            )
            .wrap_err("record hourly sample")?;
    }
    Ok(())
}
