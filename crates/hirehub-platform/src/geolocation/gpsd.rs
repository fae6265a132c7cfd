//! Position watch backed by a gpsd daemon.
//!
//! Speaks the gpsd JSON protocol: after `?WATCH` the daemon streams one JSON
//! object per line. Only `TPV` reports with a 2D or 3D fix become samples;
//! everything else is skipped while the acquisition timeout runs.

use std::io;

use hirehub_common::{
    PositionCallback, PositionError, PositionSample, PositionWatcher, WatchId, WatchOptions,
};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::OwnedReadHalf;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use super::WatchRegistry;

const WATCH_COMMAND: &str = "?WATCH={\"enable\":true,\"json\":true}\n";

/// A single decoded gpsd report.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum GpsdReport {
    Fix { latitude: f64, longitude: f64 },
    NoFix,
    Other,
}

/// Decode one line of gpsd output.
pub(crate) fn parse_report(line: &str) -> GpsdReport {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(line) else {
        return GpsdReport::Other;
    };
    if value.get("class").and_then(|c| c.as_str()) != Some("TPV") {
        return GpsdReport::Other;
    }
    let mode = value.get("mode").and_then(|m| m.as_u64()).unwrap_or(0);
    let lat = value.get("lat").and_then(|v| v.as_f64());
    let lon = value.get("lon").and_then(|v| v.as_f64());
    match (lat, lon) {
        (Some(latitude), Some(longitude)) if mode >= 2 => GpsdReport::Fix {
            latitude,
            longitude,
        },
        _ => GpsdReport::NoFix,
    }
}

fn connect_error(addr: &str, e: &io::Error) -> PositionError {
    match e.kind() {
        io::ErrorKind::PermissionDenied => {
            PositionError::permission_denied(format!("access to gpsd at {addr} denied: {e}"))
        }
        _ => PositionError::unavailable(format!("gpsd at {addr} unreachable: {e}")),
    }
}

/// Watches positions reported by gpsd.
pub struct GpsdWatcher {
    addr: String,
    registry: WatchRegistry,
}

impl GpsdWatcher {
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            registry: WatchRegistry::default(),
        }
    }
}

impl PositionWatcher for GpsdWatcher {
    fn is_supported(&self) -> bool {
        true
    }

    fn watch_position(&self, options: WatchOptions, callback: PositionCallback) -> WatchId {
        let id = self.registry.next_id();
        let task = tokio::spawn(run_watch(self.addr.clone(), options, callback));
        self.registry.insert(id, task);
        info!(%id, addr = %self.addr, "gpsd watch started");
        id
    }

    fn clear_watch(&self, id: WatchId) {
        if self.registry.cancel(id) {
            info!(%id, "gpsd watch cleared");
        }
    }
}

async fn run_watch(addr: String, options: WatchOptions, callback: PositionCallback) {
    let stream = match timeout(options.timeout, TcpStream::connect(&addr)).await {
        Ok(Ok(stream)) => stream,
        Ok(Err(e)) => {
            warn!(addr = %addr, error = %e, "gpsd connect failed");
            callback(Err(connect_error(&addr, &e)));
            return;
        }
        Err(_) => {
            callback(Err(PositionError::timeout(format!(
                "gpsd at {addr} did not accept a connection within {:?}",
                options.timeout
            ))));
            return;
        }
    };

    let (read, mut write) = stream.into_split();
    if let Err(e) = write.write_all(WATCH_COMMAND.as_bytes()).await {
        callback(Err(PositionError::unavailable(format!(
            "failed to start gpsd watch: {e}"
        ))));
        return;
    }
    debug!(addr = %addr, "gpsd watch enabled");

    let mut lines = BufReader::new(read).lines();
    loop {
        match timeout(options.timeout, next_fix(&mut lines)).await {
            Ok(Ok(Some((latitude, longitude)))) => {
                callback(Ok(PositionSample::now(latitude, longitude)));
            }
            Ok(Ok(None)) => {
                callback(Err(PositionError::unavailable(
                    "gpsd closed the connection",
                )));
                return;
            }
            Ok(Err(e)) => {
                callback(Err(PositionError::unavailable(format!(
                    "gpsd read failed: {e}"
                ))));
                return;
            }
            Err(_) => {
                callback(Err(PositionError::timeout(format!(
                    "no fix within {:?}",
                    options.timeout
                ))));
            }
        }
    }
}

/// Read lines until one carries a usable fix. `None` on end of stream.
async fn next_fix(lines: &mut Lines<BufReader<OwnedReadHalf>>) -> io::Result<Option<(f64, f64)>> {
    while let Some(line) = lines.next_line().await? {
        if let GpsdReport::Fix {
            latitude,
            longitude,
        } = parse_report(&line)
        {
            return Ok(Some((latitude, longitude)));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hirehub_common::PositionErrorKind;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tokio::net::TcpListener;

    #[test]
    fn parses_3d_fix() {
        let line = r#"{"class":"TPV","device":"/dev/ttyUSB0","mode":3,"lat":19.076,"lon":72.8777,"alt":14.0}"#;
        assert_eq!(
            parse_report(line),
            GpsdReport::Fix {
                latitude: 19.076,
                longitude: 72.8777
            }
        );
    }

    #[test]
    fn tpv_without_fix_is_no_fix() {
        assert_eq!(parse_report(r#"{"class":"TPV","mode":1}"#), GpsdReport::NoFix);
        assert_eq!(
            parse_report(r#"{"class":"TPV","mode":2,"lat":1.0}"#),
            GpsdReport::NoFix
        );
    }

    #[test]
    fn other_classes_and_garbage_are_ignored() {
        assert_eq!(
            parse_report(r#"{"class":"VERSION","release":"3.25"}"#),
            GpsdReport::Other
        );
        assert_eq!(parse_report("not json"), GpsdReport::Other);
    }

    type Seen = Arc<Mutex<Vec<Result<PositionSample, PositionError>>>>;

    fn recorder() -> (Seen, PositionCallback) {
        let seen: Seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        (seen, Arc::new(move |r| sink.lock().unwrap().push(r)))
    }

    async fn wait_for(seen: &Seen, count: usize) {
        for _ in 0..200 {
            if seen.lock().unwrap().len() >= count {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("timed out waiting for {count} callbacks");
    }

    #[tokio::test]
    async fn streams_fixes_from_daemon() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 128];
            let n = tokio::io::AsyncReadExt::read(&mut socket, &mut buf).await.unwrap();
            assert!(String::from_utf8_lossy(&buf[..n]).starts_with("?WATCH="));
            socket
                .write_all(
                    b"{\"class\":\"VERSION\"}\n{\"class\":\"TPV\",\"mode\":1}\n{\"class\":\"TPV\",\"mode\":2,\"lat\":19.076,\"lon\":72.8777}\n",
                )
                .await
                .unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
        });

        let watcher = GpsdWatcher::new(addr);
        let (seen, callback) = recorder();
        let id = watcher.watch_position(WatchOptions::default(), callback);
        wait_for(&seen, 1).await;
        watcher.clear_watch(id);

        let first = seen.lock().unwrap()[0].clone().unwrap();
        assert_eq!(first.latitude, 19.076);
        assert_eq!(first.longitude, 72.8777);
    }

    #[tokio::test]
    async fn refused_connection_is_unavailable() {
        // Bind then drop to obtain a port nobody listens on.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        drop(listener);

        let watcher = GpsdWatcher::new(addr);
        let (seen, callback) = recorder();
        watcher.watch_position(WatchOptions::default(), callback);
        wait_for(&seen, 1).await;

        let err = seen.lock().unwrap()[0].clone().unwrap_err();
        assert_eq!(err.kind, PositionErrorKind::PositionUnavailable);
    }

    #[tokio::test]
    async fn silent_daemon_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
        });

        let watcher = GpsdWatcher::new(addr);
        let (seen, callback) = recorder();
        let options = WatchOptions {
            timeout: Duration::from_millis(100),
            ..WatchOptions::default()
        };
        let id = watcher.watch_position(options, callback);
        wait_for(&seen, 1).await;
        watcher.clear_watch(id);

        let err = seen.lock().unwrap()[0].clone().unwrap_err();
        assert_eq!(err.kind, PositionErrorKind::Timeout);
    }
}
