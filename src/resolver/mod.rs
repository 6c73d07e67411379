//! Player name resolution.
//!
//! Maps a Minecraft UUID to its current username through an HTTP lookup
//! service (playerdb.co by default). Lookups never fail outward: any error
//! degrades to the `[UNKNOWN]` sentinel.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::ResolverConfig;
use crate::models::PlayerUuid;

/// Placeholder shown when a name cannot be resolved.
pub const UNKNOWN_NAME: &str = "[UNKNOWN]";

/// Errors that can occur during a lookup.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },

    #[error("Player not found")]
    NotFound,

    #[error("Malformed response: {0}")]
    Malformed(String),
}

/// A username lookup service.
#[async_trait]
pub trait NameResolver: Send + Sync {
    /// Resolver name for logging.
    fn name(&self) -> &'static str;

    /// Look up the current username for a player.
    async fn lookup(&self, uuid: &PlayerUuid) -> Result<String, ResolveError>;
}

/// Resolve one name, absorbing any failure into [`UNKNOWN_NAME`].
pub async fn resolve_name(resolver: &dyn NameResolver, uuid: &PlayerUuid) -> String {
    match resolver.lookup(uuid).await {
        Ok(name) => name,
        Err(e) => {
            warn!(
                "Error fetching username for UUID {} via {}: {}",
                uuid,
                resolver.name(),
                e
            );
            UNKNOWN_NAME.to_string()
        }
    }
}

/// Resolve every distinct uuid concurrently and wait for all of them.
pub async fn resolve_names(
    resolver: &dyn NameResolver,
    uuids: &[PlayerUuid],
) -> HashMap<PlayerUuid, String> {
    let mut distinct: Vec<&PlayerUuid> = Vec::with_capacity(uuids.len());
    for uuid in uuids {
        if !distinct.contains(&uuid) {
            distinct.push(uuid);
        }
    }

    let names = join_all(distinct.iter().map(|uuid| resolve_name(resolver, uuid))).await;

    distinct.into_iter().cloned().zip(names).collect()
}

/// playerdb.co response envelope.
#[derive(Debug, Deserialize)]
struct PlayerDbResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Option<PlayerDbData>,
}

#[derive(Debug, Deserialize)]
struct PlayerDbData {
    #[serde(default)]
    player: Option<PlayerDbPlayer>,
}

#[derive(Debug, Deserialize)]
struct PlayerDbPlayer {
    #[serde(default)]
    username: Option<String>,
}

/// Extract the username from a playerdb.co response body.
pub fn parse_player_response(body: &str) -> Result<String, ResolveError> {
    let response: PlayerDbResponse =
        serde_json::from_str(body).map_err(|e| ResolveError::Malformed(e.to_string()))?;

    if !response.success {
        return Err(ResolveError::NotFound);
    }

    response
        .data
        .and_then(|data| data.player)
        .and_then(|player| player.username)
        .filter(|name| !name.trim().is_empty())
        .ok_or_else(|| ResolveError::Malformed("response carries no username".to_string()))
}

/// HTTP resolver for playerdb.co compatible services.
pub struct PlayerDbResolver {
    client: Client,
    base_url: String,
}

impl PlayerDbResolver {
    pub fn new(config: &ResolverConfig) -> Result<Self, ResolveError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    fn url_for(&self, uuid: &PlayerUuid) -> String {
        format!("{}{}", self.base_url, uuid)
    }
}

#[async_trait]
impl NameResolver for PlayerDbResolver {
    fn name(&self) -> &'static str {
        "playerdb"
    }

    async fn lookup(&self, uuid: &PlayerUuid) -> Result<String, ResolveError> {
        let url = self.url_for(uuid);
        debug!("Resolving username: {}", url);

        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResolveError::HttpStatus {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let body = response.text().await?;
        parse_player_response(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Resolver answering from a fixed table; uuids missing from it fail.
    struct TableResolver {
        names: HashMap<PlayerUuid, String>,
        delay: Duration,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl TableResolver {
        fn new(pairs: &[(&str, &str)]) -> Self {
            Self {
                names: pairs
                    .iter()
                    .map(|(uuid, name)| (PlayerUuid::from(*uuid), name.to_string()))
                    .collect(),
                delay: Duration::ZERO,
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl NameResolver for TableResolver {
        fn name(&self) -> &'static str {
            "table"
        }

        async fn lookup(&self, uuid: &PlayerUuid) -> Result<String, ResolveError> {
            let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(current, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            self.names.get(uuid).cloned().ok_or(ResolveError::HttpStatus {
                status: 503,
                message: "Service Unavailable".to_string(),
            })
        }
    }

    #[test]
    fn test_parse_success() {
        let body = r#"{"code":"player.found","success":true,"data":{"player":{"username":"Notch","id":"069a79f4-44e9-4726-a5be-fca90e38aaf5"}}}"#;
        assert_eq!(parse_player_response(body).unwrap(), "Notch");
    }

    #[test]
    fn test_parse_not_found() {
        let body = r#"{"code":"minecraft.invalid_username","success":false,"data":{}}"#;
        assert!(matches!(parse_player_response(body), Err(ResolveError::NotFound)));
    }

    #[test]
    fn test_parse_missing_username() {
        let body = r#"{"success":true,"data":{"player":{}}}"#;
        assert!(matches!(parse_player_response(body), Err(ResolveError::Malformed(_))));

        let body = r#"{"success":true,"data":{"player":{"username":"  "}}}"#;
        assert!(matches!(parse_player_response(body), Err(ResolveError::Malformed(_))));
    }

    #[test]
    fn test_parse_not_json() {
        assert!(matches!(
            parse_player_response("<html>bad gateway</html>"),
            Err(ResolveError::Malformed(_))
        ));
    }

    #[tokio::test]
    async fn test_resolve_name_falls_back_to_sentinel() {
        let resolver = TableResolver::new(&[("a", "Alice")]);

        assert_eq!(resolve_name(&resolver, &PlayerUuid::from("a")).await, "Alice");
        assert_eq!(resolve_name(&resolver, &PlayerUuid::from("b")).await, UNKNOWN_NAME);
    }

    #[tokio::test]
    async fn test_resolve_names_isolates_failures() {
        let resolver = TableResolver::new(&[("a", "Alice"), ("c", "Carol")]);
        let uuids: Vec<PlayerUuid> = ["a", "b", "c", "a"].iter().map(|u| PlayerUuid::from(*u)).collect();

        let names = resolve_names(&resolver, &uuids).await;

        assert_eq!(names.len(), 3);
        assert_eq!(names[&PlayerUuid::from("a")], "Alice");
        assert_eq!(names[&PlayerUuid::from("b")], UNKNOWN_NAME);
        assert_eq!(names[&PlayerUuid::from("c")], "Carol");
    }

    #[tokio::test]
    async fn test_resolve_names_runs_concurrently() {
        let mut resolver = TableResolver::new(&[]);
        resolver.delay = Duration::from_millis(100);
        let uuids: Vec<PlayerUuid> = (0..10).map(|i| PlayerUuid::from(format!("p{}", i))).collect();

        let names = resolve_names(&resolver, &uuids).await;

        assert_eq!(names.len(), 10);
        assert_eq!(resolver.max_in_flight.load(Ordering::SeqCst), 10);
        assert_eq!(resolver.in_flight.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_url_for_appends_uuid() {
        let resolver = PlayerDbResolver::new(&ResolverConfig::default()).unwrap();
        let uuid = PlayerUuid::from("069a79f444e94726a5befca90e38aaf5");
        assert_eq!(
            resolver.url_for(&uuid),
            "https://playerdb.co/api/player/minecraft/069a79f4-44e9-4726-a5be-fca90e38aaf5"
        );
    }

    /// Resolver whose transport always fails before any request is sent.
    struct BrokenTransport;

    #[async_trait]
    impl NameResolver for BrokenTransport {
        fn name(&self) -> &'static str {
            "broken"
        }

        async fn lookup(&self, _uuid: &PlayerUuid) -> Result<String, ResolveError> {
            // A relative url is rejected by the request builder.
            Client::new().get("not-a-url").send().await?;
            Err(ResolveError::NotFound)
        }
    }

    #[tokio::test]
    async fn test_transport_error_yields_sentinel() {
        let resolver = BrokenTransport;
        let uuid = PlayerUuid::from("a");

        assert!(matches!(resolver.lookup(&uuid).await, Err(ResolveError::Http(_))));
        assert_eq!(resolve_name(&resolver, &uuid).await, UNKNOWN_NAME);

        let names = resolve_names(&resolver, &[uuid.clone(), PlayerUuid::from("b")]).await;
        assert!(names.values().all(|name| name == UNKNOWN_NAME));
    }

    #[tokio::test]
    #[ignore = "opens a local socket"]
    async fn test_unreachable_service_yields_sentinel() {
        let config = ResolverConfig {
            base_url: "http://127.0.0.1:9/".to_string(),
            timeout_seconds: 2,
            ..ResolverConfig::default()
        };
        let resolver = PlayerDbResolver::new(&config).unwrap();

        let name = resolve_name(&resolver, &PlayerUuid::from("a")).await;
        assert_eq!(name, UNKNOWN_NAME);
    }
}
