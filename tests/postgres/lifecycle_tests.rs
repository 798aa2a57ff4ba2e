//! Create, lookup, rename and delete against `PostgreSQL`.

use crate::postgres::helpers::{TestDatabase, at, columns, database, server, settings};
use diesel::prelude::*;
use licensewatch::license_server::{
    domain::{
        LicenseServer, PersistedLicenseServerData, ServerCommit, SubscriptionChange,
        SubscriptionDelta,
    },
    ports::{LicenseServerRepository, LicenseServerRepositoryError},
};
use rstest::rstest;
use uuid::Uuid;

#[derive(QueryableByName)]
struct CountRow {
    #[diesel(sql_type = diesel::sql_types::BigInt)]
    count: i64,
}

fn subscription_rows(database: &TestDatabase, server_id: Uuid) -> i64 {
    let mut connection = database.connection().expect("connection");
    diesel::sql_query("SELECT COUNT(*) AS count FROM subscribed_columns WHERE server_id = $1")
        .bind::<diesel::sql_types::Uuid, _>(server_id)
        .get_result::<CountRow>(&mut connection)
        .expect("count query")
        .count
}

fn subscribe(database: &TestDatabase, server: &LicenseServer, names: &[&str]) {
    let change = SubscriptionChange::Apply(SubscriptionDelta {
        to_add: columns(names),
        to_remove: columns(&[]),
    });
    database
        .block_on(
            database
                .repository
                .commit(&ServerCommit::new(server.clone(), change)),
        )
        .expect("subscription commit");
}

#[rstest]
fn created_server_is_found_by_id_and_vendor(database: TestDatabase) {
    let repo = &database.repository;
    let acme = server("Acme", "/data/a.rrd", &at(1));
    database.block_on(repo.create(&acme)).expect("create");

    let by_id = database.block_on(repo.find_by_id(acme.id())).expect("lookup");
    let by_vendor = database
        .block_on(repo.find_by_vendor(acme.vendor()))
        .expect("lookup");

    assert_eq!(by_id.as_ref(), Some(&acme));
    assert_eq!(by_vendor.as_ref(), Some(&acme));
}

#[rstest]
fn create_with_taken_vendor_is_duplicate_vendor(database: TestDatabase) {
    let repo = &database.repository;
    database
        .block_on(repo.create(&server("Acme", "/data/a.rrd", &at(1))))
        .expect("create");

    let result = database.block_on(repo.create(&server("Acme", "/data/b.rrd", &at(2))));

    assert!(matches!(
        result,
        Err(LicenseServerRepositoryError::DuplicateVendor(ref vendor)) if vendor.as_str() == "Acme"
    ));
}

#[rstest]
fn create_with_taken_id_is_duplicate_server(database: TestDatabase) {
    let repo = &database.repository;
    let acme = server("Acme", "/data/a.rrd", &at(1));
    database.block_on(repo.create(&acme)).expect("create");
    let same_id = LicenseServer::from_persisted(PersistedLicenseServerData {
        id: acme.id(),
        settings: settings("Initech", "/data/b.rrd"),
        created_at: at(2).0,
        updated_at: at(2).0,
    });

    let result = database.block_on(repo.create(&same_id));

    assert!(matches!(
        result,
        Err(LicenseServerRepositoryError::DuplicateServer(id)) if id == acme.id()
    ));
}

#[rstest]
fn rename_onto_taken_vendor_is_duplicate_vendor(database: TestDatabase) {
    let repo = &database.repository;
    let acme = server("Acme", "/data/a.rrd", &at(1));
    let initech = server("Initech", "/data/b.rrd", &at(1));
    database.block_on(repo.create(&acme)).expect("create acme");
    database.block_on(repo.create(&initech)).expect("create initech");

    let mut renamed = acme.clone();
    renamed.apply_settings(settings("Initech", "/data/a.rrd"), &at(2));
    let result = database.block_on(
        repo.commit(&ServerCommit::new(renamed, SubscriptionChange::Unchanged)),
    );

    assert!(matches!(
        result,
        Err(LicenseServerRepositoryError::DuplicateVendor(ref vendor))
            if vendor.as_str() == "Initech"
    ));
    let stored = database
        .block_on(repo.find_by_id(acme.id()))
        .expect("lookup");
    assert_eq!(stored.as_ref(), Some(&acme));
}

#[rstest]
fn delete_removes_the_server_and_its_subscriptions(database: TestDatabase) {
    let repo = &database.repository;
    let acme = server("Acme", "/data/a.rrd", &at(1));
    database.block_on(repo.create(&acme)).expect("create");
    subscribe(&database, &acme, &["cpu", "seats"]);
    assert_eq!(subscription_rows(&database, acme.id().into_inner()), 2);

    database.block_on(repo.delete(acme.id())).expect("delete");

    assert_eq!(subscription_rows(&database, acme.id().into_inner()), 0);
    assert_eq!(
        database.block_on(repo.find_by_id(acme.id())).expect("lookup"),
        None
    );
    assert!(matches!(
        database.block_on(repo.subscribed_columns(acme.id())),
        Err(LicenseServerRepositoryError::NotFound(id)) if id == acme.id()
    ));
    assert!(matches!(
        database.block_on(repo.delete(acme.id())),
        Err(LicenseServerRepositoryError::NotFound(id)) if id == acme.id()
    ));
}

#[rstest]
fn removing_a_server_row_cascades_to_its_subscriptions(database: TestDatabase) {
    let repo = &database.repository;
    let acme = server("Acme", "/data/a.rrd", &at(1));
    database.block_on(repo.create(&acme)).expect("create");
    subscribe(&database, &acme, &["cpu"]);

    let mut connection = database.connection().expect("connection");
    diesel::sql_query("DELETE FROM license_servers WHERE id = $1")
        .bind::<diesel::sql_types::Uuid, _>(acme.id().into_inner())
        .execute(&mut connection)
        .expect("raw delete");

    assert_eq!(subscription_rows(&database, acme.id().into_inner()), 0);
}

#[rstest]
fn list_all_orders_servers_by_vendor(database: TestDatabase) {
    let repo = &database.repository;
    for vendor in ["Initech", "Acme", "Globex"] {
        database
            .block_on(repo.create(&server(vendor, "/data/a.rrd", &at(1))))
            .expect("create");
    }

    let listed = database.block_on(repo.list_all()).expect("list");

    let vendors: Vec<&str> = listed.iter().map(|s| s.vendor().as_str()).collect();
    assert_eq!(vendors, ["Acme", "Globex", "Initech"]);
}
