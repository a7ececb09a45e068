// Copyright (c) 2024-2025 pyLoad Team
// SPDX-License-Identifier: AGPL-3.0-or-later

//! [`RemoteClient`] over the core's JSON web API.
//!
//! Every call is a form `POST` to `{base}/api/<method>` whose fields are
//! JSON-encoded arguments plus the session id obtained from `login`.

use reqwest::StatusCode;
use serde::de::{DeserializeOwned, IgnoredAny};
use serde_json::{json, Value};
use std::time::Duration;

use super::RemoteClient;
use crate::error::{ClientError, ClientResult};
use crate::types::{Destination, DownloadInfo, OnlineCheck, PackageData, ServerStatus};

/// Timeout for establishing a TCP connection (in seconds).
const CONNECTION_TIMEOUT_SECS: u64 = 5;

/// Timeout for a whole request (in seconds).
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Client for a running pyLoad core.
#[derive(Debug, Clone)]
pub struct HttpClient {
    /// `scheme://host:port/api`
    base_url: String,
    client: reqwest::blocking::Client,
    session: String,
}

impl HttpClient {
    /// Log in to the core at `addr:port`.
    ///
    /// `addr` may carry an explicit `http://` or `https://` scheme; plain
    /// hosts use `http`.
    ///
    /// # Errors
    ///
    /// - [`ClientError::NoConnection`] when nothing answers at `addr:port`
    /// - [`ClientError::NoSsl`] when TLS cannot be set up
    /// - [`ClientError::WrongLogin`] when the core refuses the credentials
    pub fn connect(addr: &str, port: u16, username: &str, password: &str) -> ClientResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .connect_timeout(Duration::from_secs(CONNECTION_TIMEOUT_SECS))
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|_| ClientError::NoSsl)?;

        let base_url = base_url(addr, port);
        tracing::debug!(url = %base_url, user = username, "logging in");

        let response = client
            .post(format!("{}/login", base_url))
            .form(&[("username", username), ("password", password)])
            .send()
            .map_err(|e| {
                if is_tls_error(&e) {
                    ClientError::NoSsl
                } else {
                    ClientError::NoConnection {
                        addr: addr.to_string(),
                        port,
                    }
                }
            })?;

        if !response.status().is_success() {
            return Err(ClientError::WrongLogin);
        }

        // The core answers the session id as a JSON string, or `false`.
        let session = match response.json::<Value>() {
            Ok(Value::String(session)) if !session.is_empty() => session,
            Ok(_) => return Err(ClientError::WrongLogin),
            Err(e) => return Err(ClientError::Protocol(format!("login: {}", e))),
        };

        tracing::info!(url = %base_url, user = username, "connected to pyLoad core");

        Ok(Self {
            base_url,
            client,
            session,
        })
    }

    fn call<T: DeserializeOwned>(&self, method: &str, params: &[(&str, Value)]) -> ClientResult<T> {
        let mut form: Vec<(&str, String)> = params
            .iter()
            .map(|(name, value)| (*name, value.to_string()))
            .collect();
        form.push(("session", self.session.clone()));

        let response = self
            .client
            .post(format!("{}/{}", self.base_url, method))
            .form(&form)
            .send()
            .map_err(|e| {
                if e.is_connect() || e.is_timeout() {
                    tracing::warn!(method, error = %e, "connection to core lost");
                    ClientError::ConnectionClosed
                } else {
                    ClientError::Remote(e.to_string())
                }
            })?;

        let status = response.status();
        if status == StatusCode::FORBIDDEN || status == StatusCode::UNAUTHORIZED {
            // Session was dropped by the core (restart or logout).
            return Err(ClientError::ConnectionClosed);
        }
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ClientError::Remote(format!(
                "{} failed: HTTP {} {}",
                method,
                status,
                body.trim()
            )));
        }

        response
            .json::<T>()
            .map_err(|e| ClientError::Protocol(format!("{}: {}", method, e)))
    }

    fn call_unit(&self, method: &str, params: &[(&str, Value)]) -> ClientResult<()> {
        self.call::<IgnoredAny>(method, params).map(|_| ())
    }
}

fn base_url(addr: &str, port: u16) -> String {
    let addr = addr.trim().trim_end_matches('/');
    let (scheme, host) = match addr.split_once("://") {
        Some((scheme, host)) => (scheme, host),
        None => ("http", addr),
    };
    format!("{}://{}:{}/api", scheme, host, port)
}

fn is_tls_error(err: &reqwest::Error) -> bool {
    let mut source: Option<&dyn std::error::Error> = Some(err);
    while let Some(e) = source {
        let msg = e.to_string().to_lowercase();
        if msg.contains("tls") || msg.contains("ssl") || msg.contains("certificate") {
            return true;
        }
        source = e.source();
    }
    false
}

/// Containers travel as a byte-per-char string, the form the core decodes.
fn latin1(data: &[u8]) -> String {
    data.iter().map(|&b| b as char).collect()
}

impl RemoteClient for HttpClient {
    fn status_downloads(&self) -> ClientResult<Vec<DownloadInfo>> {
        self.call("statusDownloads", &[])
    }

    fn status_server(&self) -> ClientResult<ServerStatus> {
        self.call("statusServer", &[])
    }

    fn toggle_pause(&self) -> ClientResult<bool> {
        self.call("togglePause", &[])
    }

    fn pause_server(&self) -> ClientResult<()> {
        self.call_unit("pauseServer", &[])
    }

    fn unpause_server(&self) -> ClientResult<()> {
        self.call_unit("unpauseServer", &[])
    }

    fn kill(&self) -> ClientResult<()> {
        tracing::info!("requesting core shutdown");
        self.call_unit("kill", &[])
    }

    fn close(&self) {
        if let Err(e) = self.call_unit("logout", &[]) {
            tracing::debug!(error = %e, "logout failed");
        }
    }

    fn add_package(&self, name: &str, links: &[String], dest: Destination) -> ClientResult<i64> {
        tracing::info!(name, links = links.len(), %dest, "adding package");
        self.call(
            "addPackage",
            &[
                ("name", json!(name)),
                ("links", json!(links)),
                ("dest", json!(i64::from(dest))),
            ],
        )
    }

    fn get_queue_data(&self) -> ClientResult<Vec<PackageData>> {
        self.call("getQueueData", &[])
    }

    fn get_collector_data(&self) -> ClientResult<Vec<PackageData>> {
        self.call("getCollectorData", &[])
    }

    fn get_package_data(&self, pid: i64) -> ClientResult<PackageData> {
        self.call("getPackageData", &[("pid", json!(pid))])
    }

    fn get_package_info(&self, pid: i64) -> ClientResult<PackageData> {
        self.call("getPackageInfo", &[("pid", json!(pid))])
    }

    fn delete_files(&self, fids: &[i64]) -> ClientResult<()> {
        tracing::info!(?fids, "deleting files");
        self.call_unit("deleteFiles", &[("fids", json!(fids))])
    }

    fn delete_packages(&self, pids: &[i64]) -> ClientResult<()> {
        tracing::info!(?pids, "deleting packages");
        self.call_unit("deletePackages", &[("pids", json!(pids))])
    }

    fn move_package(&self, dest: Destination, pid: i64) -> ClientResult<()> {
        tracing::info!(pid, %dest, "moving package");
        self.call_unit(
            "movePackage",
            &[("destination", json!(i64::from(dest))), ("pid", json!(pid))],
        )
    }

    fn restart_file(&self, fid: i64) -> ClientResult<()> {
        self.call_unit("restartFile", &[("fid", json!(fid))])
    }

    fn restart_package(&self, pid: i64) -> ClientResult<()> {
        self.call_unit("restartPackage", &[("pid", json!(pid))])
    }

    fn check_online_status(&self, urls: &[String]) -> ClientResult<OnlineCheck> {
        self.call("checkOnlineStatus", &[("urls", json!(urls))])
    }

    fn check_online_status_container(
        &self,
        urls: &[String],
        filename: &str,
        data: &[u8],
    ) -> ClientResult<OnlineCheck> {
        self.call(
            "checkOnlineStatusContainer",
            &[
                ("urls", json!(urls)),
                ("filename", json!(filename)),
                ("data", json!(latin1(data))),
            ],
        )
    }

    fn poll_results(&self, rid: i64) -> ClientResult<OnlineCheck> {
        self.call("pollResults", &[("rid", json!(rid))])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_defaults_to_http() {
        assert_eq!(base_url("127.0.0.1", 7227), "http://127.0.0.1:7227/api");
        assert_eq!(base_url(" host/ ", 80), "http://host:80/api");
    }

    #[test]
    fn test_base_url_keeps_explicit_scheme() {
        assert_eq!(base_url("https://nas.local", 8000), "https://nas.local:8000/api");
    }

    #[test]
    fn test_latin1_is_byte_per_char() {
        let encoded = latin1(&[0x41, 0xff, 0x00]);
        assert_eq!(encoded.chars().count(), 3);
        assert_eq!(encoded.chars().nth(1), Some('\u{ff}'));
    }

    #[test]
    fn test_connect_refused_is_no_connection() {
        // Port 1 on loopback is never a pyLoad core.
        let err = HttpClient::connect("127.0.0.1", 1, "u", "p").unwrap_err();
        assert!(matches!(err, ClientError::NoConnection { port: 1, .. }));
    }
}
