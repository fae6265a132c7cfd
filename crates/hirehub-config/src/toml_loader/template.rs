//! Default TOML config template with inline documentation comments.

/// Generate the default TOML config content with comments.
pub(crate) fn default_config_toml() -> String {
    r##"# HireHub Configuration
# Schema version 1
# Only override what you want to change -- missing fields use defaults.

[api]
# base_url = "http://localhost:8080"
# request_timeout_secs = 10
# web_url = "http://localhost:5173"

[location]
# provider = "gpsd"              # gpsd, static, none
# high_accuracy = true
# acquisition_timeout_ms = 10000 # 1000-60000
# maximum_age_ms = 0             # 0 = never reuse a cached fix
# retry_delay_ms = 10000         # 1000-300000
# gpsd_addr = "127.0.0.1:2947"

[location.fixed]
# latitude = 19.0760             # used by provider = "static"
# longitude = 72.8777

[notifications]
# ws_path = "/ws"
# topic = "/user/queue/nearby-jobs"
# reconnect_delay_ms = 5000      # 500-60000
# heartbeat_outgoing_ms = 4000   # 0 disables
# heartbeat_incoming_ms = 4000   # 0 disables
# connect_timeout_ms = 15000
# toast_duration_ms = 10000

[logging]
# level = "INFO"                 # DEBUG, INFO, WARNING, ERROR
"##
    .to_string()
}
