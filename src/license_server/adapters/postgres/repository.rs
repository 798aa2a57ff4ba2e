//! `PostgreSQL` repository implementation for license servers.

use super::{
    models::{LicenseServerRow, NewLicenseServerRow, NewSubscribedColumnRow},
    schema::{license_servers, subscribed_columns},
};
use crate::license_server::{
    domain::{
        ColumnName, FeatureName, LicenseServer, PersistedLicenseServerData, ServerAddress,
        ServerCommit, ServerId, ServerSettings, SubscriptionChange, UsageDatabasePath, VendorName,
    },
    ports::{
        LicenseServerRepository, LicenseServerRepositoryError, LicenseServerRepositoryResult,
    },
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use std::collections::BTreeSet;

/// `PostgreSQL` connection pool type for license server adapters.
pub type LicenseServerPgPool = Pool<ConnectionManager<PgConnection>>;

/// Name of the unique index on `license_servers.vendor`.
const VENDOR_UNIQUE_INDEX: &str = "idx_license_servers_vendor";

/// `PostgreSQL`-backed repository for license servers and subscriptions.
#[derive(Debug, Clone)]
pub struct PostgresLicenseServerRepository {
    pool: LicenseServerPgPool,
}

impl PostgresLicenseServerRepository {
    /// Creates a new repository from a `PostgreSQL` pool.
    #[must_use]
    pub const fn new(pool: LicenseServerPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, operation: F) -> LicenseServerRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> LicenseServerRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool
                .get()
                .map_err(LicenseServerRepositoryError::persistence)?;
            operation(&mut connection)
        })
        .await
        .map_err(LicenseServerRepositoryError::persistence)?
    }
}

impl From<DieselError> for LicenseServerRepositoryError {
    fn from(err: DieselError) -> Self {
        Self::persistence(err)
    }
}

/// Subscription change with owned column names, ready to send to a worker.
enum PlannedSubscriptionChange {
    Unchanged,
    Apply {
        to_add: Vec<String>,
        to_remove: Vec<String>,
    },
    PurgeAll,
}

impl From<&SubscriptionChange> for PlannedSubscriptionChange {
    fn from(change: &SubscriptionChange) -> Self {
        match change {
            SubscriptionChange::Unchanged => Self::Unchanged,
            SubscriptionChange::PurgeAll => Self::PurgeAll,
            SubscriptionChange::Apply(delta) => Self::Apply {
                to_add: delta
                    .to_add
                    .iter()
                    .map(|column| column.as_str().to_owned())
                    .collect(),
                to_remove: delta
                    .to_remove
                    .iter()
                    .map(|column| column.as_str().to_owned())
                    .collect(),
            },
        }
    }
}

#[async_trait]
impl LicenseServerRepository for PostgresLicenseServerRepository {
    async fn create(&self, server: &LicenseServer) -> LicenseServerRepositoryResult<()> {
        let server_id = server.id();
        let vendor = server.vendor().clone();
        let new_row = to_new_row(server);

        self.run_blocking(move |connection| {
            diesel::insert_into(license_servers::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| map_write_error(err, server_id, &vendor))?;
            Ok(())
        })
        .await
    }

    async fn find_by_id(
        &self,
        server_id: ServerId,
    ) -> LicenseServerRepositoryResult<Option<LicenseServer>> {
        self.run_blocking(move |connection| {
            let row = license_servers::table
                .filter(license_servers::id.eq(server_id.into_inner()))
                .select(LicenseServerRow::as_select())
                .first::<LicenseServerRow>(connection)
                .optional()?;
            row.map(row_to_server).transpose()
        })
        .await
    }

    async fn find_by_vendor(
        &self,
        vendor: &VendorName,
    ) -> LicenseServerRepositoryResult<Option<LicenseServer>> {
        let vendor_name = vendor.as_str().to_owned();
        self.run_blocking(move |connection| {
            let row = license_servers::table
                .filter(license_servers::vendor.eq(&vendor_name))
                .select(LicenseServerRow::as_select())
                .first::<LicenseServerRow>(connection)
                .optional()?;
            row.map(row_to_server).transpose()
        })
        .await
    }

    async fn list_all(&self) -> LicenseServerRepositoryResult<Vec<LicenseServer>> {
        self.run_blocking(move |connection| {
            let rows = license_servers::table
                .order(license_servers::vendor.asc())
                .select(LicenseServerRow::as_select())
                .load::<LicenseServerRow>(connection)?;
            rows.into_iter().map(row_to_server).collect()
        })
        .await
    }

    async fn subscribed_columns(
        &self,
        server_id: ServerId,
    ) -> LicenseServerRepositoryResult<BTreeSet<ColumnName>> {
        let server_uuid = server_id.into_inner();
        self.run_blocking(move |connection| {
            let exists: i64 = license_servers::table
                .filter(license_servers::id.eq(server_uuid))
                .count()
                .get_result(connection)?;
            if exists == 0 {
                return Err(LicenseServerRepositoryError::NotFound(server_id));
            }

            let names = subscribed_columns::table
                .filter(subscribed_columns::server_id.eq(server_uuid))
                .select(subscribed_columns::column_name)
                .load::<String>(connection)?;
            names
                .into_iter()
                .map(|name| {
                    ColumnName::new(name).map_err(LicenseServerRepositoryError::invalid_persisted_data)
                })
                .collect()
        })
        .await
    }

    async fn commit(&self, commit: &ServerCommit) -> LicenseServerRepositoryResult<()> {
        let server_id = commit.server.id();
        let vendor = commit.server.vendor().clone();
        let row = to_new_row(&commit.server);
        let change = PlannedSubscriptionChange::from(&commit.subscriptions);

        self.run_blocking(move |connection| {
            connection.transaction::<_, LicenseServerRepositoryError, _>(|tx_conn| {
                lock_server_row(tx_conn, server_id)?;
                ensure_vendor_free(tx_conn, server_id, &vendor)?;
                update_server_row(tx_conn, &row, &vendor)?;
                apply_subscription_change(tx_conn, server_id, change)
            })
        })
        .await
    }

    async fn delete(&self, server_id: ServerId) -> LicenseServerRepositoryResult<()> {
        let server_uuid = server_id.into_inner();
        self.run_blocking(move |connection| {
            connection.transaction::<_, LicenseServerRepositoryError, _>(|tx_conn| {
                diesel::delete(
                    subscribed_columns::table.filter(subscribed_columns::server_id.eq(server_uuid)),
                )
                .execute(tx_conn)?;
                let deleted = diesel::delete(
                    license_servers::table.filter(license_servers::id.eq(server_uuid)),
                )
                .execute(tx_conn)?;
                if deleted == 0 {
                    return Err(LicenseServerRepositoryError::NotFound(server_id));
                }
                Ok(())
            })
        })
        .await
    }
}

fn lock_server_row(
    connection: &mut PgConnection,
    server_id: ServerId,
) -> LicenseServerRepositoryResult<()> {
    let locked = license_servers::table
        .filter(license_servers::id.eq(server_id.into_inner()))
        .select(license_servers::id)
        .for_update()
        .first::<uuid::Uuid>(connection)
        .optional()?;
    locked
        .map(|_| ())
        .ok_or(LicenseServerRepositoryError::NotFound(server_id))
}

fn ensure_vendor_free(
    connection: &mut PgConnection,
    server_id: ServerId,
    vendor: &VendorName,
) -> LicenseServerRepositoryResult<()> {
    let clashes: i64 = license_servers::table
        .filter(license_servers::vendor.eq(vendor.as_str()))
        .filter(license_servers::id.ne(server_id.into_inner()))
        .count()
        .get_result(connection)?;
    if clashes > 0 {
        return Err(LicenseServerRepositoryError::DuplicateVendor(vendor.clone()));
    }
    Ok(())
}

/// Writes the scalar fields of `row`.
///
/// A concurrent rename can pass [`ensure_vendor_free`] and still lose the
/// race on the unique vendor index; that loss reports `DuplicateVendor`.
fn update_server_row(
    connection: &mut PgConnection,
    row: &NewLicenseServerRow,
    vendor: &VendorName,
) -> LicenseServerRepositoryResult<()> {
    diesel::update(license_servers::table.filter(license_servers::id.eq(row.id)))
        .set((
            license_servers::vendor.eq(&row.vendor),
            license_servers::host.eq(&row.host),
            license_servers::port.eq(row.port),
            license_servers::feature.eq(&row.feature),
            license_servers::usage_database.eq(&row.usage_database),
            license_servers::updated_at.eq(row.updated_at),
        ))
        .execute(connection)
        .map_err(|err| map_write_error(err, ServerId::from_uuid(row.id), vendor))?;
    Ok(())
}

fn apply_subscription_change(
    connection: &mut PgConnection,
    server_id: ServerId,
    change: PlannedSubscriptionChange,
) -> LicenseServerRepositoryResult<()> {
    let server_uuid = server_id.into_inner();
    match change {
        PlannedSubscriptionChange::Unchanged => Ok(()),
        PlannedSubscriptionChange::PurgeAll => {
            diesel::delete(
                subscribed_columns::table.filter(subscribed_columns::server_id.eq(server_uuid)),
            )
            .execute(connection)?;
            Ok(())
        }
        PlannedSubscriptionChange::Apply { to_add, to_remove } => {
            let expected_removals = to_remove.len();
            if expected_removals > 0 {
                let removed = diesel::delete(
                    subscribed_columns::table
                        .filter(subscribed_columns::server_id.eq(server_uuid))
                        .filter(subscribed_columns::column_name.eq_any(to_remove)),
                )
                .execute(connection)?;
                if removed != expected_removals {
                    return Err(LicenseServerRepositoryError::partial_commit_refused(
                        server_id,
                        format!("expected to remove {expected_removals} columns, removed {removed}"),
                    ));
                }
            }

            let rows: Vec<NewSubscribedColumnRow> = to_add
                .into_iter()
                .map(|column_name| NewSubscribedColumnRow {
                    server_id: server_uuid,
                    column_name,
                })
                .collect();
            if !rows.is_empty() {
                let inserted = diesel::insert_into(subscribed_columns::table)
                    .values(&rows)
                    .on_conflict_do_nothing()
                    .execute(connection)?;
                if inserted != rows.len() {
                    return Err(LicenseServerRepositoryError::partial_commit_refused(
                        server_id,
                        format!("expected to add {} columns, added {inserted}", rows.len()),
                    ));
                }
            }
            Ok(())
        }
    }
}

fn to_new_row(server: &LicenseServer) -> NewLicenseServerRow {
    NewLicenseServerRow {
        id: server.id().into_inner(),
        vendor: server.vendor().as_str().to_owned(),
        host: server.address().host().to_owned(),
        port: i32::from(server.address().port()),
        feature: server.feature().map(|feature| feature.as_str().to_owned()),
        usage_database: server
            .usage_database()
            .map(|path| path.as_str().to_owned()),
        created_at: server.created_at(),
        updated_at: server.updated_at(),
    }
}

fn row_to_server(row: LicenseServerRow) -> LicenseServerRepositoryResult<LicenseServer> {
    let LicenseServerRow {
        id,
        vendor,
        host,
        port,
        feature,
        usage_database,
        created_at,
        updated_at,
    } = row;

    let parsed_port =
        u16::try_from(port).map_err(LicenseServerRepositoryError::invalid_persisted_data)?;
    let settings = ServerSettings {
        vendor: VendorName::new(vendor)
            .map_err(LicenseServerRepositoryError::invalid_persisted_data)?,
        address: ServerAddress::new(host, parsed_port)
            .map_err(LicenseServerRepositoryError::invalid_persisted_data)?,
        feature: FeatureName::parse_optional(feature.unwrap_or_default())
            .map_err(LicenseServerRepositoryError::invalid_persisted_data)?,
        usage_database: UsageDatabasePath::parse_optional(usage_database.unwrap_or_default())
            .map_err(LicenseServerRepositoryError::invalid_persisted_data)?,
    };

    Ok(LicenseServer::from_persisted(PersistedLicenseServerData {
        id: ServerId::from_uuid(id),
        settings,
        created_at,
        updated_at,
    }))
}

/// Maps a failed insert or update of a server row.
fn map_write_error(
    err: DieselError,
    server_id: ServerId,
    vendor: &VendorName,
) -> LicenseServerRepositoryError {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
            if is_vendor_unique_violation(info.as_ref()) =>
        {
            LicenseServerRepositoryError::DuplicateVendor(vendor.clone())
        }
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            LicenseServerRepositoryError::DuplicateServer(server_id)
        }
        _ => LicenseServerRepositoryError::persistence(err),
    }
}

fn is_vendor_unique_violation(info: &dyn diesel::result::DatabaseErrorInformation) -> bool {
    info.constraint_name()
        .is_some_and(|name| name == VENDOR_UNIQUE_INDEX)
}
