//! Atomicity of server commits against `PostgreSQL`.

use crate::postgres::helpers::{
    TestDatabase, at, columns, database, names, server, settings,
};
use licensewatch::license_server::{
    domain::{ServerCommit, SubscriptionChange, SubscriptionDelta},
    ports::{LicenseServerRepository, LicenseServerRepositoryError},
};
use rstest::rstest;

fn delta(to_add: &[&str], to_remove: &[&str]) -> SubscriptionChange {
    SubscriptionChange::Apply(SubscriptionDelta {
        to_add: columns(to_add),
        to_remove: columns(to_remove),
    })
}

#[rstest]
fn commit_writes_fields_and_subscriptions_together(database: TestDatabase) {
    let repo = &database.repository;
    let mut acme = server("Acme", "/data/a.rrd", &at(1));
    database.block_on(repo.create(&acme)).expect("create");
    database
        .block_on(repo.commit(&ServerCommit::new(acme.clone(), delta(&["cpu", "mem"], &[]))))
        .expect("initial subscription");

    acme.apply_settings(settings("Acme Corp", "/data/b.rrd"), &at(2));
    database
        .block_on(repo.commit(&ServerCommit::new(acme.clone(), delta(&["seats"], &["cpu"]))))
        .expect("commit");

    let stored = database
        .block_on(repo.find_by_id(acme.id()))
        .expect("lookup")
        .expect("server should exist");
    assert_eq!(stored, acme);
    assert_eq!(stored.updated_at(), at(2).0);
    let subscribed = database
        .block_on(repo.subscribed_columns(acme.id()))
        .expect("subscriptions");
    assert_eq!(names(&subscribed), ["mem", "seats"]);
}

#[rstest]
#[case::removes_unsubscribed_column(&[], &["mem"])]
#[case::adds_subscribed_column(&["cpu"], &[])]
fn stale_delta_rolls_back_the_field_update(
    database: TestDatabase,
    #[case] to_add: &[&str],
    #[case] to_remove: &[&str],
) {
    let repo = &database.repository;
    let acme = server("Acme", "/data/a.rrd", &at(1));
    database.block_on(repo.create(&acme)).expect("create");
    database
        .block_on(repo.commit(&ServerCommit::new(acme.clone(), delta(&["cpu"], &[]))))
        .expect("initial subscription");

    let mut renamed = acme.clone();
    renamed.apply_settings(settings("Initech", "/data/b.rrd"), &at(3));
    let result = database.block_on(
        repo.commit(&ServerCommit::new(renamed, delta(to_add, to_remove))),
    );

    assert!(
        matches!(
            result,
            Err(LicenseServerRepositoryError::PartialCommitRefused { server_id, .. })
                if server_id == acme.id()
        ),
        "expected a refused commit, got {result:?}"
    );
    let stored = database
        .block_on(repo.find_by_id(acme.id()))
        .expect("lookup")
        .expect("server should exist");
    assert_eq!(stored, acme);
    assert_eq!(stored.vendor().as_str(), "Acme");
    let subscribed = database
        .block_on(repo.subscribed_columns(acme.id()))
        .expect("subscriptions");
    assert_eq!(names(&subscribed), ["cpu"]);
}

#[rstest]
fn purge_drops_every_subscription(database: TestDatabase) {
    let repo = &database.repository;
    let mut acme = server("Acme", "/data/a.rrd", &at(1));
    database.block_on(repo.create(&acme)).expect("create");
    database
        .block_on(repo.commit(&ServerCommit::new(acme.clone(), delta(&["cpu", "seats"], &[]))))
        .expect("initial subscription");

    acme.apply_settings(settings("Acme", "/data/b.rrd"), &at(2));
    database
        .block_on(repo.commit(&ServerCommit::new(acme.clone(), SubscriptionChange::PurgeAll)))
        .expect("purge");

    let subscribed = database
        .block_on(repo.subscribed_columns(acme.id()))
        .expect("subscriptions");
    assert!(subscribed.is_empty());
    let stored = database
        .block_on(repo.find_by_id(acme.id()))
        .expect("lookup")
        .expect("server should exist");
    assert_eq!(stored, acme);
}

#[rstest]
fn commit_for_unknown_server_is_not_found(database: TestDatabase) {
    let ghost = server("Ghost", "/data/g.rrd", &at(1));

    let result = database.block_on(
        database
            .repository
            .commit(&ServerCommit::new(ghost.clone(), SubscriptionChange::Unchanged)),
    );

    assert!(matches!(
        result,
        Err(LicenseServerRepositoryError::NotFound(id)) if id == ghost.id()
    ));
}
