//! Trial loop configuration.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

/// Trial loop configuration, normally read from the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct LoopConfig {
    /// Node identifier embedded in every payload (`NODE_ID`)
    pub node_id: String,
    /// Interpreter used to run the submit script (`NODE_BIN`)
    pub node_bin: String,
    /// Submit script, relative to `base_dir` (`SEND_JS`)
    pub send_js: String,
    /// CSV log file (`CSV_FILENAME`)
    pub csv_filename: PathBuf,
    /// Number of trials; `None` runs until interrupted (`N_TRIALS`, 0 = infinite)
    pub trials: Option<u64>,
    /// How long the QR canvas stays up (`DISPLAY_HOLD_SEC`)
    pub display_hold: Duration,
    /// Pause after clearing the panel (`SLEEP_BETWEEN_SEC`)
    pub sleep_between: Duration,
    /// Submit the full payload JSON instead of just `unique_id` (`SEND_FULL_PAYLOAD`)
    pub send_full_payload: bool,
    /// Append the txhash to the QR content (`INCLUDE_TXHASH_IN_QR`)
    pub include_txhash_in_qr: bool,
    /// Working directory of the submit script (`BASE_DIR`)
    pub base_dir: PathBuf,
    /// Panel font (`FONT_PATH`, default `<base_dir>/pic/Font.ttc`)
    pub font_path: PathBuf,
    /// Where the frame panel writes its images (`FRAME_DIR`)
    pub frame_dir: PathBuf,
    /// Submit script timeout (`SEND_TIMEOUT_SEC`)
    pub send_timeout: Duration,
}

impl Default for LoopConfig {
    fn default() -> Self {
        let base_dir = PathBuf::from(".");
        Self {
            node_id: "node-t-8821".to_string(),
            node_bin: "node".to_string(),
            send_js: "send_set_value.js".to_string(),
            csv_filename: PathBuf::from("qr_tx_log_spec.csv"),
            trials: None,
            display_hold: Duration::from_secs(20),
            sleep_between: Duration::ZERO,
            send_full_payload: true,
            include_txhash_in_qr: true,
            font_path: base_dir.join("pic").join("Font.ttc"),
            base_dir,
            frame_dir: PathBuf::from("frames"),
            send_timeout: Duration::from_secs(180),
        }
    }
}

fn parse_var<T>(var: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidValue {
            var,
            value: value.to_string(),
            reason: e.to_string(),
        })
}

/// Seconds as a duration; zero or negative means no delay.
fn parse_seconds(var: &'static str, value: &str) -> Result<Duration, ConfigError> {
    let secs: f64 = parse_var(var, value)?;
    if !secs.is_finite() {
        return Err(ConfigError::InvalidValue {
            var,
            value: value.to_string(),
            reason: "not a finite number".to_string(),
        });
    }
    Ok(Duration::from_secs_f64(secs.max(0.0)))
}

impl LoopConfig {
    /// Reads the configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    ///
    /// Unset variables keep their defaults. Flags are enabled only by the
    /// literal value `1`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(v) = lookup("NODE_ID") {
            config.node_id = v;
        }
        if let Some(v) = lookup("NODE_BIN") {
            config.node_bin = v;
        }
        if let Some(v) = lookup("SEND_JS") {
            config.send_js = v;
        }
        if let Some(v) = lookup("CSV_FILENAME") {
            config.csv_filename = PathBuf::from(v);
        }
        if let Some(v) = lookup("N_TRIALS") {
            let n: i64 = parse_var("N_TRIALS", &v)?;
            config.trials = u64::try_from(n).ok().filter(|&n| n > 0);
        }
        if let Some(v) = lookup("DISPLAY_HOLD_SEC") {
            let secs: i64 = parse_var("DISPLAY_HOLD_SEC", &v)?;
            config.display_hold = Duration::from_secs(secs.max(0) as u64);
        }
        if let Some(v) = lookup("SLEEP_BETWEEN_SEC") {
            config.sleep_between = parse_seconds("SLEEP_BETWEEN_SEC", &v)?;
        }
        if let Some(v) = lookup("SEND_FULL_PAYLOAD") {
            config.send_full_payload = v == "1";
        }
        if let Some(v) = lookup("INCLUDE_TXHASH_IN_QR") {
            config.include_txhash_in_qr = v == "1";
        }
        if let Some(v) = lookup("BASE_DIR") {
            config.base_dir = PathBuf::from(v);
        }
        config.font_path = match lookup("FONT_PATH") {
            Some(v) => PathBuf::from(v),
            None => config.base_dir.join("pic").join("Font.ttc"),
        };
        if let Some(v) = lookup("FRAME_DIR") {
            config.frame_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup("SEND_TIMEOUT_SEC") {
            config.send_timeout = parse_seconds("SEND_TIMEOUT_SEC", &v)?;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = LoopConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, LoopConfig::default());
        assert_eq!(config.trials, None);
        assert_eq!(config.display_hold, Duration::from_secs(20));
        assert!(config.send_full_payload);
        assert_eq!(config.font_path, PathBuf::from("./pic/Font.ttc"));
    }

    #[test]
    fn test_overrides() {
        let config = LoopConfig::from_lookup(lookup_from(&[
            ("NODE_ID", "node-a"),
            ("N_TRIALS", "5"),
            ("DISPLAY_HOLD_SEC", "3"),
            ("SLEEP_BETWEEN_SEC", "0.5"),
            ("CSV_FILENAME", "out.csv"),
            ("BASE_DIR", "/opt/qr"),
        ]))
        .unwrap();

        assert_eq!(config.node_id, "node-a");
        assert_eq!(config.trials, Some(5));
        assert_eq!(config.display_hold, Duration::from_secs(3));
        assert_eq!(config.sleep_between, Duration::from_millis(500));
        assert_eq!(config.csv_filename, PathBuf::from("out.csv"));
        assert_eq!(config.font_path, PathBuf::from("/opt/qr/pic/Font.ttc"));
    }

    #[test]
    fn test_flags_only_accept_literal_one() {
        for (value, expected) in [("1", true), ("0", false), ("true", false), ("", false)] {
            let config =
                LoopConfig::from_lookup(lookup_from(&[("SEND_FULL_PAYLOAD", value)])).unwrap();
            assert_eq!(config.send_full_payload, expected, "value {:?}", value);
        }
    }

    #[test]
    fn test_zero_and_negative_trials_mean_infinite() {
        for value in ["0", "-2"] {
            let config = LoopConfig::from_lookup(lookup_from(&[("N_TRIALS", value)])).unwrap();
            assert_eq!(config.trials, None);
        }
    }

    #[test]
    fn test_negative_delays_clamp_to_zero() {
        let config = LoopConfig::from_lookup(lookup_from(&[
            ("DISPLAY_HOLD_SEC", "-1"),
            ("SLEEP_BETWEEN_SEC", "-0.25"),
        ]))
        .unwrap();
        assert_eq!(config.display_hold, Duration::ZERO);
        assert_eq!(config.sleep_between, Duration::ZERO);
    }

    #[test]
    fn test_invalid_number_is_error() {
        let err = LoopConfig::from_lookup(lookup_from(&[("N_TRIALS", "ten")])).unwrap_err();
        match err {
            ConfigError::InvalidValue { var, value, .. } => {
                assert_eq!(var, "N_TRIALS");
                assert_eq!(value, "ten");
            }
        }

        let err = LoopConfig::from_lookup(lookup_from(&[("SLEEP_BETWEEN_SEC", "inf")]));
        assert!(err.is_err());
    }
}
