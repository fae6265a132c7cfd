//! Interactive worker dashboard: availability toggle and live badges.

use std::sync::Arc;

use hirehub_common::{CredentialProvider, HireHubError, Navigator, PositionWatcher, Toaster};
use hirehub_config::schema::LocationProvider;
use hirehub_config::HireHubConfig;
use hirehub_platform::{FixedPositionWatcher, GpsdWatcher, NoGeolocation};
use hirehub_presence::{
    ChannelPhase, HttpLocationUploader, LocationReporter, LocationStatus, NotificationStatus,
    NotificationSubscriber, PresencePipeline, PresenceStatus, ReporterSettings,
    StompChannelFactory, SubscriberSettings,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use crate::console::ConsoleToaster;

const HELP: &str = "commands: on | off | status | open | help | quit";

/// One line of dashboard input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardCommand {
    On,
    Off,
    Status,
    Open,
    Help,
    Quit,
    Unknown(String),
}

impl DashboardCommand {
    /// `None` for blank lines.
    pub fn parse(line: &str) -> Option<Self> {
        let word = line.trim();
        if word.is_empty() {
            return None;
        }
        Some(match word.to_ascii_lowercase().as_str() {
            "on" | "available" => DashboardCommand::On,
            "off" | "away" => DashboardCommand::Off,
            "status" | "s" => DashboardCommand::Status,
            "open" | "o" => DashboardCommand::Open,
            "help" | "?" => DashboardCommand::Help,
            "quit" | "exit" | "q" => DashboardCommand::Quit,
            _ => DashboardCommand::Unknown(word.to_string()),
        })
    }
}

/// Wire the presence pipeline from config and the injected services.
pub fn build_pipeline(
    config: &HireHubConfig,
    credentials: Arc<dyn CredentialProvider>,
    toaster: Arc<dyn Toaster>,
    navigator: Arc<dyn Navigator>,
) -> Result<PresencePipeline, HireHubError> {
    let location = &config.location;
    let watcher: Arc<dyn PositionWatcher> = match location.provider {
        LocationProvider::Gpsd => Arc::new(GpsdWatcher::new(location.gpsd_addr.clone())),
        LocationProvider::Static => Arc::new(FixedPositionWatcher::new(
            location.fixed.latitude,
            location.fixed.longitude,
        )),
        LocationProvider::None => Arc::new(NoGeolocation),
    };
    info!(provider = ?location.provider, "Geolocation provider selected");

    let uploader = Arc::new(HttpLocationUploader::new(
        config.api.location_url(),
        config.api.request_timeout(),
    )?);
    let reporter = LocationReporter::new(
        watcher,
        uploader,
        Arc::clone(&credentials),
        Arc::clone(&toaster),
        ReporterSettings {
            watch: location.watch_options(),
            retry_delay: location.retry_delay(),
        },
    );

    let notifications = &config.notifications;
    let subscriber = NotificationSubscriber::new(
        Arc::new(StompChannelFactory),
        credentials,
        Arc::clone(&toaster),
        navigator,
        SubscriberSettings {
            url: config.api.ws_url(&notifications.ws_path),
            topic: notifications.topic.clone(),
            reconnect_delay: notifications.reconnect_delay(),
            heartbeat_outgoing: notifications.heartbeat_outgoing(),
            heartbeat_incoming: notifications.heartbeat_incoming(),
            connect_timeout: notifications.connect_timeout(),
            toast_duration: notifications.toast_duration(),
        },
    );

    Ok(PresencePipeline::new(reporter, subscriber, toaster))
}

pub fn tracking_badge(status: &LocationStatus) -> String {
    match (&status.error, status.latitude, status.longitude) {
        (Some(error), _, _) => format!("location: ✗ {error}"),
        (None, Some(lat), Some(lon)) if status.is_tracking => {
            format!("location: ● tracking ({lat:.4}, {lon:.4})")
        }
        _ => "location: ○ off".to_string(),
    }
}

/// The part of location status worth announcing; new fixes alone are not.
fn tracking_state(status: &LocationStatus) -> (bool, Option<String>) {
    (status.is_tracking, status.error.clone())
}

pub fn connection_badge(status: &NotificationStatus) -> String {
    match (&status.error, status.phase) {
        (_, ChannelPhase::Connected) => "job alerts: ● live".to_string(),
        (Some(error), ChannelPhase::Connecting) => format!("job alerts: ◌ reconnecting ({error})"),
        (Some(error), _) => format!("job alerts: ✗ {error}"),
        (None, ChannelPhase::Connecting) => "job alerts: ◌ connecting".to_string(),
        (None, ChannelPhase::Disconnected) => "job alerts: ○ off".to_string(),
    }
}

pub fn render_status(status: &PresenceStatus) -> String {
    let availability = if status.available {
        "available"
    } else {
        "not available"
    };
    format!(
        "{availability}\n  {}\n  {}",
        tracking_badge(&status.location),
        connection_badge(&status.notifications)
    )
}

/// Drive the pipeline from stdin until `quit`, end of input or Ctrl-C.
pub async fn run(
    pipeline: &PresencePipeline,
    toaster: &ConsoleToaster,
    start_available: bool,
) -> Result<(), HireHubError> {
    println!("{HELP}");
    if start_available {
        pipeline.set_available(true);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut connection = pipeline.notification_updates();
    let mut last_badge = connection_badge(&connection.borrow());
    let mut location = pipeline.location_updates();
    let mut last_tracking = tracking_state(&location.borrow());

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                match DashboardCommand::parse(&line) {
                    None => {}
                    Some(DashboardCommand::On) => pipeline.set_available(true),
                    Some(DashboardCommand::Off) => pipeline.set_available(false),
                    Some(DashboardCommand::Status) => println!("{}", render_status(&pipeline.status())),
                    Some(DashboardCommand::Open) => {
                        if !toaster.open_latest() {
                            println!("No job to open");
                        }
                    }
                    Some(DashboardCommand::Help) => println!("{HELP}"),
                    Some(DashboardCommand::Quit) => break,
                    Some(DashboardCommand::Unknown(word)) => println!("Unknown command: {word} ({HELP})"),
                }
            }
            changed = connection.changed() => {
                if changed.is_err() {
                    break;
                }
                let badge = connection_badge(&connection.borrow_and_update());
                if badge != last_badge {
                    println!("{badge}");
                    last_badge = badge;
                }
            }
            changed = location.changed() => {
                if changed.is_err() {
                    break;
                }
                let status = location.borrow_and_update().clone();
                let state = tracking_state(&status);
                if state != last_tracking {
                    println!("{}", tracking_badge(&status));
                    last_tracking = state;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
        }
    }

    pipeline.shutdown();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hirehub_platform::{FileSessionStore, Session};

    #[test]
    fn parses_commands() {
        assert_eq!(DashboardCommand::parse("  ON "), Some(DashboardCommand::On));
        assert_eq!(DashboardCommand::parse("off"), Some(DashboardCommand::Off));
        assert_eq!(DashboardCommand::parse("q"), Some(DashboardCommand::Quit));
        assert_eq!(DashboardCommand::parse(""), None);
        assert_eq!(
            DashboardCommand::parse("dance"),
            Some(DashboardCommand::Unknown("dance".into()))
        );
    }

    #[test]
    fn badges_reflect_status() {
        assert_eq!(tracking_badge(&LocationStatus::default()), "location: ○ off");
        let tracking = LocationStatus {
            is_tracking: true,
            error: None,
            latitude: Some(19.076),
            longitude: Some(72.8777),
        };
        assert_eq!(
            tracking_badge(&tracking),
            "location: ● tracking (19.0760, 72.8777)"
        );

        let failed = NotificationStatus {
            is_connected: false,
            error: Some("WebSocket connection failed".into()),
            phase: ChannelPhase::Disconnected,
        };
        assert_eq!(
            connection_badge(&failed),
            "job alerts: ✗ WebSocket connection failed"
        );
        assert_eq!(
            connection_badge(&NotificationStatus::default()),
            "job alerts: ○ off"
        );
    }

    #[test]
    fn tracking_state_ignores_new_coordinates() {
        let at = |lat: f64| LocationStatus {
            is_tracking: true,
            error: None,
            latitude: Some(lat),
            longitude: Some(72.8777),
        };
        assert_eq!(tracking_state(&at(19.0760)), tracking_state(&at(19.0761)));

        let failed = LocationStatus {
            is_tracking: false,
            error: Some("Location request timed out".into()),
            ..at(19.0760)
        };
        assert_ne!(tracking_state(&at(19.0760)), tracking_state(&failed));
    }

    #[tokio::test]
    async fn pipeline_without_geolocation_reports_capability_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(FileSessionStore::new(dir.path().join("session.json")));
        store
            .save(&Session {
                token: "jwt".into(),
                user_id: "1".into(),
                role: hirehub_common::Role::Worker,
            })
            .unwrap();

        let mut config = HireHubConfig::default();
        config.location.provider = LocationProvider::None;
        // Nothing listens on port 9; the channel just keeps retrying.
        config.api.base_url = "http://127.0.0.1:9".into();

        let toaster = Arc::new(ConsoleToaster::default());
        let navigator = Arc::new(crate::console::ConsoleNavigator::new("http://localhost:5173"));
        let pipeline = build_pipeline(&config, store, toaster, navigator).unwrap();
        pipeline.set_available(true);

        let status = pipeline.status();
        assert!(status.available);
        assert_eq!(
            status.location.error.as_deref(),
            Some("Geolocation is not supported by your browser")
        );
        pipeline.shutdown();
        assert!(!pipeline.status().available);
    }
}
