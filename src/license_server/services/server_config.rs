//! Orchestration of license server configuration and usage reads.

use super::{
    catalog::ColumnCatalog,
    error::{LicenseMonitorServiceError, LicenseMonitorServiceResult},
    locks::ServerLocks,
    reader::TimeSeriesReader,
    reconciler::SubscriptionReconciler,
    timeouts::ServiceTimeouts,
};
use crate::license_server::{
    domain::{
        CatalogForm, ChartSeries, ColumnSelections, ConfigStep, LicenseServer, LiveUsers,
        ServerCommit, ServerConfigInput, ServerId, ServerSettings, SubscriptionChange,
        SubscriptionDelta, TimeSeriesRow, UsagePeriod, VendorName, chart_series,
    },
    ports::{LicenseServerRepository, LicenseStatusError, LicenseStatusQuery, SampleStore},
};
use mockable::Clock;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Usage and live status of one server, resolved independently.
#[derive(Debug, Clone)]
pub struct ServerOverview {
    /// Server the overview describes.
    pub server: LicenseServer,
    /// Usage rows for the requested period, or why they are unavailable.
    pub usage: LicenseMonitorServiceResult<Vec<TimeSeriesRow>>,
    /// Current checkouts, or why they are unavailable.
    pub live_users: LicenseMonitorServiceResult<LiveUsers>,
}

/// License server configuration and monitoring service.
pub struct ServerConfigService<R, S, L, C>
where
    R: LicenseServerRepository,
    S: SampleStore,
    L: LicenseStatusQuery,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    catalog: ColumnCatalog<S>,
    reader: TimeSeriesReader<S, C>,
    reconciler: SubscriptionReconciler<R>,
    status: Arc<L>,
    clock: Arc<C>,
    locks: ServerLocks,
    timeouts: ServiceTimeouts,
}

impl<R, S, L, C> ServerConfigService<R, S, L, C>
where
    R: LicenseServerRepository,
    S: SampleStore,
    L: LicenseStatusQuery,
    C: Clock + Send + Sync,
{
    /// Creates the service over its ports.
    #[must_use]
    pub fn new(
        repository: Arc<R>,
        store: Arc<S>,
        status: Arc<L>,
        clock: Arc<C>,
        timeouts: ServiceTimeouts,
    ) -> Self {
        Self {
            catalog: ColumnCatalog::new(Arc::clone(&store), timeouts.store),
            reader: TimeSeriesReader::new(store, Arc::clone(&clock), timeouts.store),
            reconciler: SubscriptionReconciler::new(Arc::clone(&repository)),
            repository,
            status,
            clock,
            locks: ServerLocks::new(),
            timeouts,
        }
    }

    async fn find_server_or_error(
        &self,
        server_id: ServerId,
    ) -> LicenseMonitorServiceResult<LicenseServer> {
        self.repository
            .find_by_id(server_id)
            .await?
            .ok_or(LicenseMonitorServiceError::NotFound(server_id))
    }

    /// Registers a new server.
    ///
    /// A configured usage database must list through the store before the
    /// server is stored. The returned step presents its catalog with every
    /// box unchecked.
    ///
    /// # Errors
    ///
    /// Returns `Domain` for invalid input, `SourceUnavailable` when the usage
    /// database cannot be read, `DuplicateVendor` for a taken vendor name, or
    /// repository failures.
    pub async fn create_server(
        &self,
        input: &ServerConfigInput,
    ) -> LicenseMonitorServiceResult<ConfigStep> {
        let settings = ServerSettings::try_from(input)?;
        let catalog = match settings.usage_database.as_ref() {
            Some(path) => Some(self.catalog.list_columns(Some(path)).await?),
            None => None,
        };

        let server = LicenseServer::new(settings, &*self.clock);
        self.repository.create(&server).await?;
        info!(
            server_id = %server.id(),
            vendor = %server.vendor(),
            address = %server.address(),
            "registered license server"
        );

        Ok(match catalog {
            Some(columns) => ConfigStep::CatalogPresented {
                form: CatalogForm::new(columns, &BTreeSet::new()),
                server,
            },
            None => ConfigStep::NoDatabase { server },
        })
    }

    /// Returns the configuration step to show for a stored server.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown server, `SourceUnavailable` when the
    /// configured usage database cannot be read, or repository failures.
    pub async fn present_config(
        &self,
        server_id: ServerId,
    ) -> LicenseMonitorServiceResult<ConfigStep> {
        let server = self.find_server_or_error(server_id).await?;
        if server.usage_database().is_none() {
            return Ok(ConfigStep::NoDatabase { server });
        }
        let form = self.current_form(&server).await?;
        Ok(ConfigStep::CatalogPresented { server, form })
    }

    /// Returns the current catalog with each column's subscription state.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown server, `SourceUnavailable` when no
    /// usage database is configured or it cannot be read, or repository
    /// failures.
    pub async fn get_catalog_and_current_selections(
        &self,
        server_id: ServerId,
    ) -> LicenseMonitorServiceResult<CatalogForm> {
        let server = self.find_server_or_error(server_id).await?;
        self.current_form(&server).await
    }

    async fn current_form(&self, server: &LicenseServer) -> LicenseMonitorServiceResult<CatalogForm> {
        let catalog = self.catalog.list_columns(server.usage_database()).await?;
        let subscribed = self.repository.subscribed_columns(server.id()).await?;
        Ok(CatalogForm::new(catalog, &subscribed))
    }

    /// Applies an edit form submission.
    ///
    /// A changed usage database path purges every subscription and presents
    /// the new catalog; the submitted selections are then discarded. An
    /// unchanged path reconciles the selections. Scalar fields and the
    /// subscription change are committed together.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `Domain`, `DuplicateVendor`,
    /// `PartialCommitRefused`, `SourceUnavailable` (nothing is committed), or
    /// repository failures.
    pub async fn submit_config(
        &self,
        server_id: ServerId,
        input: &ServerConfigInput,
        selections: &ColumnSelections,
    ) -> LicenseMonitorServiceResult<ConfigStep> {
        let _guard = self.locks.acquire(server_id).await;
        let mut server = self.find_server_or_error(server_id).await?;
        let settings = ServerSettings::try_from(input)?;
        let path_changed = server.usage_database_changes(&settings);
        server.apply_settings(settings, &*self.clock);
        let database = server.usage_database().cloned();

        match (path_changed, database) {
            (true, Some(path)) => {
                let catalog = self.catalog.list_columns(Some(&path)).await?;
                self.commit_purge(&server).await?;
                Ok(ConfigStep::CatalogPresented {
                    form: CatalogForm::new(catalog, &BTreeSet::new()),
                    server,
                })
            }
            (true, None) => {
                self.commit_purge(&server).await?;
                Ok(ConfigStep::NoDatabase { server })
            }
            (false, Some(path)) => {
                let catalog = self.catalog.list_columns(Some(&path)).await?;
                let delta = self.reconciler.apply(&server, &catalog, selections).await?;
                Ok(ConfigStep::Reconciled { server, delta })
            }
            (false, None) => {
                self.repository
                    .commit(&ServerCommit::new(
                        server.clone(),
                        SubscriptionChange::Unchanged,
                    ))
                    .await?;
                info!(server_id = %server.id(), vendor = %server.vendor(), "updated license server");
                Ok(ConfigStep::Reconciled {
                    server,
                    delta: SubscriptionDelta::default(),
                })
            }
        }
    }

    async fn commit_purge(&self, server: &LicenseServer) -> LicenseMonitorServiceResult<()> {
        self.repository
            .commit(&ServerCommit::new(
                server.clone(),
                SubscriptionChange::PurgeAll,
            ))
            .await?;
        info!(
            server_id = %server.id(),
            vendor = %server.vendor(),
            usage_database = server.usage_database().map(|path| path.as_str()),
            "usage database changed, purged subscriptions"
        );
        Ok(())
    }

    /// Returns subscribed usage rows for the period named by `period_token`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPeriod` for an unknown token, `NotFound` for an
    /// unknown server, `SourceUnavailable` when the usage database cannot be
    /// read, or repository failures.
    pub async fn get_usage(
        &self,
        server_id: ServerId,
        period_token: &str,
    ) -> LicenseMonitorServiceResult<Vec<TimeSeriesRow>> {
        let period = UsagePeriod::try_from(period_token)?;
        let server = self.find_server_or_error(server_id).await?;
        self.usage_for(&server, period).await
    }

    /// Returns subscribed usage as one chart series per column.
    ///
    /// # Errors
    ///
    /// Same as [`Self::get_usage`].
    pub async fn get_usage_chart(
        &self,
        server_id: ServerId,
        period_token: &str,
    ) -> LicenseMonitorServiceResult<Vec<ChartSeries>> {
        let rows = self.get_usage(server_id, period_token).await?;
        Ok(chart_series(&rows))
    }

    async fn usage_for(
        &self,
        server: &LicenseServer,
        period: UsagePeriod,
    ) -> LicenseMonitorServiceResult<Vec<TimeSeriesRow>> {
        let subscribed = self.repository.subscribed_columns(server.id()).await?;
        self.reader
            .read(server.usage_database(), &subscribed, period)
            .await
    }

    /// Queries the license manager for current checkouts.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown server, `UpstreamTimeout` when the
    /// license manager does not answer in time, or `UpstreamError`.
    pub async fn get_live_users(
        &self,
        server_id: ServerId,
    ) -> LicenseMonitorServiceResult<LiveUsers> {
        let server = self.find_server_or_error(server_id).await?;
        self.live_users_for(&server).await
    }

    async fn live_users_for(&self, server: &LicenseServer) -> LicenseMonitorServiceResult<LiveUsers> {
        let address = server.address();
        let query = self.status.query(address, server.feature());
        let records = match tokio::time::timeout(self.timeouts.status, query).await {
            Ok(Ok(records)) => records,
            Ok(Err(err)) => {
                warn!(server_id = %server.id(), address = %address, error = %err, "license manager query failed");
                return Err(err.into());
            }
            Err(_) => {
                warn!(
                    server_id = %server.id(),
                    address = %address,
                    limit_ms = self.timeouts.status.as_millis(),
                    "license manager query timed out"
                );
                return Err(LicenseStatusError::timeout(address).into());
            }
        };
        debug!(server_id = %server.id(), checkouts = records.len(), "queried live users");

        Ok(LiveUsers {
            vendor: server.vendor().clone(),
            address: address.clone(),
            captured_at: self.clock.utc(),
            records,
        })
    }

    /// Resolves usage and live status concurrently.
    ///
    /// Each half of the overview carries its own result.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown server or repository failures while
    /// loading it.
    pub async fn get_overview(
        &self,
        server_id: ServerId,
        period_token: &str,
    ) -> LicenseMonitorServiceResult<ServerOverview> {
        let server = self.find_server_or_error(server_id).await?;
        let usage = async {
            match UsagePeriod::try_from(period_token) {
                Ok(period) => self.usage_for(&server, period).await,
                Err(err) => Err(err.into()),
            }
        };
        let (usage_result, live_result) = tokio::join!(usage, self.live_users_for(&server));
        Ok(ServerOverview {
            server,
            usage: usage_result,
            live_users: live_result,
        })
    }

    /// Deletes a server and all of its subscriptions.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown server or repository failures.
    pub async fn delete_server(&self, server_id: ServerId) -> LicenseMonitorServiceResult<()> {
        let guard = self.locks.acquire(server_id).await;
        self.repository.delete(server_id).await?;
        drop(guard);
        self.locks.forget(server_id);
        info!(server_id = %server_id, "deleted license server");
        Ok(())
    }

    /// Lists every server ordered by vendor name.
    ///
    /// # Errors
    ///
    /// Returns repository failures.
    pub async fn list_servers(&self) -> LicenseMonitorServiceResult<Vec<LicenseServer>> {
        Ok(self.repository.list_all().await?)
    }

    /// Looks up a server by vendor name.
    ///
    /// # Errors
    ///
    /// Returns `Domain` when `vendor` is not a valid vendor name, or
    /// repository failures.
    pub async fn find_by_vendor(
        &self,
        vendor: &str,
    ) -> LicenseMonitorServiceResult<Option<LicenseServer>> {
        let vendor_name = VendorName::new(vendor)?;
        Ok(self.repository.find_by_vendor(&vendor_name).await?)
    }
}
