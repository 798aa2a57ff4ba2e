//! Live status adapter backed by the FlexLM `lmutil lmstat` client.

use crate::license_server::{
    domain::{CheckoutRecord, FeatureName, ServerAddress},
    ports::{LicenseStatusError, LicenseStatusQuery, LicenseStatusResult},
};
use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, warn};

/// Default `lmutil` executable name.
pub const DEFAULT_LMUTIL_BINARY: &str = "lmutil";

/// Queries checkouts by running `lmutil lmstat -c port@host`.
///
/// The child process is killed when the returned future is dropped, so a
/// caller timeout or disconnect leaves nothing running.
#[derive(Debug, Clone)]
pub struct LmstatStatusQuery {
    binary: Utf8PathBuf,
}

impl Default for LmstatStatusQuery {
    fn default() -> Self {
        Self::new(DEFAULT_LMUTIL_BINARY)
    }
}

impl LmstatStatusQuery {
    /// Creates an adapter that runs `binary`.
    #[must_use]
    pub fn new(binary: impl Into<Utf8PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Returns the configured executable.
    #[must_use]
    pub fn binary(&self) -> &Utf8Path {
        &self.binary
    }
}

#[async_trait]
impl LicenseStatusQuery for LmstatStatusQuery {
    async fn query(
        &self,
        address: &ServerAddress,
        feature: Option<&FeatureName>,
    ) -> LicenseStatusResult<Vec<CheckoutRecord>> {
        let mut command = Command::new(self.binary.as_std_path());
        command
            .arg("lmstat")
            .arg("-c")
            .arg(address.license_path());
        match feature {
            Some(name) => command.arg("-f").arg(name.as_str()),
            None => command.arg("-a"),
        };

        let output = command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|err| {
                LicenseStatusError::upstream(address, format!("failed to run {}: {err}", self.binary))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stdout = String::from_utf8_lossy(&output.stdout);
            let detail = if stderr.trim().is_empty() {
                stdout.trim().to_owned()
            } else {
                stderr.trim().to_owned()
            };
            warn!(address = %address, status = %output.status, "lmstat exited with failure");
            return Err(LicenseStatusError::upstream(address, detail));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let records: Vec<CheckoutRecord> = parse_lmstat_output(&stdout)
            .into_iter()
            .filter(|record| feature.is_none_or(|wanted| record.feature == wanted.as_str()))
            .collect();
        debug!(address = %address, checkouts = records.len(), "parsed lmstat output");
        Ok(records)
    }
}

/// Extracts checkout records from `lmstat` output.
///
/// Checkout lines are attributed to the feature of the closest preceding
/// `Users of <feature>:` header. Lines that cannot be read are skipped.
#[must_use]
pub fn parse_lmstat_output(output: &str) -> Vec<CheckoutRecord> {
    let mut current_feature: Option<String> = None;
    let mut records = Vec::new();

    for line in output.lines() {
        let trimmed = line.trim();
        if let Some(rest) = trimmed.strip_prefix("Users of ") {
            current_feature = rest
                .split_once(':')
                .map(|(feature, _)| feature.trim().to_owned());
            continue;
        }
        if let Some(feature) = current_feature.as_deref()
            && let Some(record) = parse_checkout_line(trimmed, feature)
        {
            records.push(record);
        }
    }

    records
}

/// Parses `user host display (version) (server/port handle), start <when>`.
fn parse_checkout_line(line: &str, feature: &str) -> Option<CheckoutRecord> {
    let (head, tail) = line.split_once(", start ")?;

    let (checked_out_since, licenses) = match tail.split_once(", ") {
        Some((since, count)) => (since, parse_license_count(count)),
        None => (tail, 1),
    };

    let mut identity = head
        .split_whitespace()
        .take_while(|token| !token.starts_with('('));
    let user = identity.next()?.to_owned();
    let host = identity.next()?.to_owned();
    let display = identity.next().map(str::to_owned);

    let version = head
        .split_whitespace()
        .find_map(|token| token.strip_prefix("(v"))
        .map(|token| format!("v{}", token.trim_end_matches(')')));

    Some(CheckoutRecord {
        user,
        host,
        display,
        feature: feature.to_owned(),
        version,
        checked_out_since: checked_out_since.trim().to_owned(),
        licenses,
    })
}

fn parse_license_count(text: &str) -> u32 {
    text.split_whitespace()
        .next()
        .and_then(|count| count.parse().ok())
        .unwrap_or(1)
}
