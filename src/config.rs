use log::warn;
use std::{str::FromStr, time::Duration};

pub const ENV_EQUALITY_OVERRIDE: &str = "REDRAW_EQUALITY_OVERRIDE";
pub const ENV_FRAME_MS: &str = "REDRAW_FRAME_MS";
pub const ENV_RUN_SECS: &str = "REDRAW_RUN_SECS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// install the `child2` equality override on the demo root
    pub equality_override: bool,
    pub frame_interval: Duration,
    pub run_for: Duration,
    pub report_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            equality_override: true,
            frame_interval: Duration::from_millis(16),
            run_for: Duration::from_secs(10),
            report_interval: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Flag(bool);

impl FromStr for Flag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(Flag(true)),
            "0" | "false" | "no" | "off" => Ok(Flag(false)),
            other => Err(format!("expected a boolean, got {:?}", other)),
        }
    }
}

fn parse<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<T>
where
    T::Err: std::fmt::Display,
{
    let raw = lookup(name)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(err) => {
            warn!("ignoring {}={:?}: {}", name, raw, err);
            None
        }
    }
}

impl Config {
    pub fn from_env() -> Self { Self::from_lookup(|name| std::env::var(name).ok()) }

    /// Defaults overridden by whatever `lookup` knows. Malformed values are
    /// logged and ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(Flag(enabled)) = parse(&lookup, ENV_EQUALITY_OVERRIDE) {
            config.equality_override = enabled;
        }
        match parse::<u64>(&lookup, ENV_FRAME_MS) {
            Some(0) => warn!("ignoring {}=0, frames need a non zero interval", ENV_FRAME_MS),
            Some(ms) => config.frame_interval = Duration::from_millis(ms),
            None => {}
        }
        if let Some(secs) = parse::<f64>(&lookup, ENV_RUN_SECS) {
            match Duration::try_from_secs_f64(secs) {
                Ok(run_for) => config.run_for = run_for,
                Err(err) => warn!("ignoring {}={}: {}", ENV_RUN_SECS, secs, err),
            }
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Config::from_lookup(move |name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_without_environment() {
        assert_eq!(config(&[]), Config::default());
        assert!(Config::default().equality_override);
    }

    #[test]
    fn overrides_are_applied() {
        let config = config(&[
            (ENV_EQUALITY_OVERRIDE, "off"),
            (ENV_FRAME_MS, "33"),
            (ENV_RUN_SECS, "2.5"),
        ]);
        assert!(!config.equality_override);
        assert_eq!(config.frame_interval, Duration::from_millis(33));
        assert_eq!(config.run_for, Duration::from_millis(2500));
    }

    #[test]
    fn malformed_values_are_ignored() {
        let _ = env_logger::builder().is_test(true).try_init();
        let config = config(&[
            (ENV_EQUALITY_OVERRIDE, "maybe"),
            (ENV_FRAME_MS, "0"),
            (ENV_RUN_SECS, "-1"),
        ]);
        assert_eq!(config, Config::default());
    }
}
