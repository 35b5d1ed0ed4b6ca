use super::types::Config;

const HEADER: &str = r#"# =============================================================================
# DELAYLENS CONFIGURATION
# =============================================================================
# Constants used by the incident analysis tools. Every key is optional: a
# missing key keeps the built-in default shown below.
#
# Sections:
#   signup_delay:    CRM export columns, time window and indicator markers
#   schedule_delay:  outlier cutoff and chart display offset
#   fetch:           search backend, service filter and sampling windows
#   companies:       name exclusion rules and creation-date lookback
#
# Durations use humantime syntax (30s, 10m, 2h, 7days). Naive timestamps
# (signup_delay) are wall-clock values; fetch start/end are UTC.
# Values may reference environment variables with the $env{...} syntax.
#
# Config file locations (in order of precedence):
#   1. Path specified via --config argument
#   2. ~/.config/delaylens/config.yml
#   3. /etc/delaylens/config.yml

"#;

/// Render the built-in defaults as a commented YAML document.
pub fn generate_default_config() -> Result<String, serde_yaml::Error> {
    let body = serde_yaml::to_string(&Config::default())?;
    Ok(format!("{HEADER}{body}"))
}
