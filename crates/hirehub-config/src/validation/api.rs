use crate::schema::HireHubConfig;

use super::helpers::validate_range;

pub(crate) fn validate_api(errors: &mut Vec<String>, config: &HireHubConfig) {
    let url = config.api.base_url.trim();
    if url.is_empty() {
        errors.push("api.base_url must not be empty".into());
    } else if !(url.starts_with("http://") || url.starts_with("https://")) {
        errors.push(format!(
            "api.base_url = {url} must start with http:// or https://"
        ));
    }
    let web = config.api.web_url.trim();
    if !(web.starts_with("http://") || web.starts_with("https://")) {
        errors.push(format!(
            "api.web_url = {web} must start with http:// or https://"
        ));
    }
    validate_range(
        errors,
        "api.request_timeout_secs",
        config.api.request_timeout_secs,
        1,
        120,
    );
}
