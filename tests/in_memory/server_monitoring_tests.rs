//! End-to-end monitoring flows over the in-memory adapters.

use super::helpers::{TestContext, acme, context, now};
use chrono::TimeDelta;
use licensewatch::license_server::{
    domain::{
        CheckoutRecord, ColumnName, ColumnSelections, ConfigSessionState, ServerAddress,
        ServerCommit, SubscriptionChange, SubscriptionDelta,
    },
    ports::{LicenseServerRepository, LicenseServerRepositoryError},
};
use camino::Utf8Path;
use rstest::rstest;
use serde_json::json;

fn column(name: &str) -> ColumnName {
    ColumnName::new(name).expect("valid column")
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn configure_read_and_delete_a_server(context: TestContext) {
    context
        .store
        .put_database("/data/acme.rrd", &["cpu", "seats"])
        .expect("database should install");
    let created = context
        .service
        .create_server(&acme("/data/acme.rrd"))
        .await
        .expect("creation should succeed");
    assert_eq!(created.state(), ConfigSessionState::CatalogPresented);
    let server_id = created.server().id();

    let selections: ColumnSelections = [("seats", true), ("cpu", false)].into_iter().collect();
    let step = context
        .service
        .submit_config(server_id, &acme("/data/acme.rrd"), &selections)
        .await
        .expect("submission should succeed");
    assert_eq!(step.state(), ConfigSessionState::Reconciled);

    context
        .store
        .push_sample(
            Utf8Path::new("/data/acme.rrd"),
            now() - TimeDelta::hours(1),
            vec![Some(0.5), Some(7.0)],
        )
        .expect("sample should record");
    let rows = context
        .service
        .get_usage(server_id, "1d")
        .await
        .expect("usage should read");
    let serialized = serde_json::to_value(&rows).expect("rows should serialize");
    assert_eq!(
        serialized,
        json!([{"timestamp": "2026-10-01T11:00:00Z", "values": {"seats": 7.0}}])
    );

    let chart = context
        .service
        .get_usage_chart(server_id, "1d")
        .await
        .expect("chart should read");
    let chart_json = serde_json::to_value(&chart).expect("chart should serialize");
    assert_eq!(
        chart_json,
        json!([{"key": "seats", "values": [[1_790_852_400_000_i64, 7.0]]}])
    );

    context
        .service
        .delete_server(server_id)
        .await
        .expect("delete should succeed");
    let remaining = context
        .service
        .list_servers()
        .await
        .expect("listing should succeed");
    assert!(remaining.is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn live_users_use_the_configured_feature(context: TestContext) {
    let created = context
        .service
        .create_server(&acme(""))
        .await
        .expect("creation should succeed");
    let address = ServerAddress::new("licsrv01", 27000).expect("valid address");
    let record = |feature: &str| CheckoutRecord {
        user: "alice".to_owned(),
        host: "ws01".to_owned(),
        display: None,
        feature: feature.to_owned(),
        version: None,
        checked_out_since: "Wed 10/1 9:00".to_owned(),
        licenses: 2,
    };
    context
        .status
        .set_checkouts(&address, vec![record("MATLAB"), record("SIMULINK")])
        .expect("checkouts should install");

    let live = context
        .service
        .get_live_users(created.server().id())
        .await
        .expect("live users should read");

    let features: Vec<&str> = live.records.iter().map(|entry| entry.feature.as_str()).collect();
    assert_eq!(features, ["MATLAB"]);
    assert_eq!(live.address.license_path(), "27000@licsrv01");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn stale_commit_changes_nothing(context: TestContext) {
    context
        .store
        .put_database("/data/acme.rrd", &["cpu", "seats"])
        .expect("database should install");
    let created = context
        .service
        .create_server(&acme("/data/acme.rrd"))
        .await
        .expect("creation should succeed");
    let server = created.server().clone();

    let stale = SubscriptionDelta {
        to_add: [column("cpu")].into(),
        to_remove: [column("seats")].into(),
    };
    let result = context
        .repository
        .commit(&ServerCommit::new(server.clone(), SubscriptionChange::Apply(stale)))
        .await;

    assert!(matches!(
        result,
        Err(LicenseServerRepositoryError::PartialCommitRefused { .. })
    ));
    let subscribed = context
        .repository
        .subscribed_columns(server.id())
        .await
        .expect("subscriptions should load");
    assert!(subscribed.is_empty());
}
