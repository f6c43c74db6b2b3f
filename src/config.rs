use std::env;
use std::str::FromStr;

use thiserror::Error;

pub const CONDITIONS_VAR: &str = "PSEUDO_CONDITIONS";
pub const MAX_STEPS_VAR: &str = "PSEUDO_MAX_STEPS";

/// How often `WHILE` and `REPEAT ... UNTIL` look at their condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConditionMode {
    /// Evaluated once before the loop starts, and that answer is kept.
    #[default]
    Once,
    /// Re-evaluated around every iteration.
    EveryIteration,
}

impl FromStr for ConditionMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "once" => Ok(ConditionMode::Once),
            "every-iteration" => Ok(ConditionMode::EveryIteration),
            other => Err(ConfigError::Conditions(other.to_string())),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("PSEUDO_CONDITIONS must be `once` or `every-iteration`, got `{0}`")]
    Conditions(String),
    #[error("step limit must be a positive integer, got `{0}`")]
    MaxSteps(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Config {
    pub conditions: ConditionMode,
    /// Upper bound on loop iterations across the whole run. `None` never
    /// interrupts a program.
    pub max_steps: Option<u64>,
}

pub fn parse_max_steps(s: &str) -> Result<u64, ConfigError> {
    match s.trim().parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::MaxSteps(s.to_string())),
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Config::default();
        if let Some(mode) = lookup(CONDITIONS_VAR) {
            config.conditions = mode.parse()?;
        }
        if let Some(steps) = lookup(MAX_STEPS_VAR) {
            config.max_steps = Some(parse_max_steps(&steps)?);
        }
        Ok(config)
    }

    pub fn with_conditions(mut self, conditions: ConditionMode) -> Self {
        self.conditions = conditions;
        self
    }

    pub fn with_max_steps(mut self, max_steps: u64) -> Self {
        self.max_steps = Some(max_steps);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |key: &str| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn defaults_when_unset() {
        assert_eq!(Config::from_lookup(lookup(&[])), Ok(Config::default()));
        assert_eq!(Config::default().conditions, ConditionMode::Once);
        assert_eq!(Config::default().max_steps, None);
    }

    #[test]
    fn reads_both_variables() {
        let config = Config::from_lookup(lookup(&[
            (CONDITIONS_VAR, "every-iteration"),
            (MAX_STEPS_VAR, "500"),
        ]));
        assert_eq!(
            config,
            Ok(Config {
                conditions: ConditionMode::EveryIteration,
                max_steps: Some(500),
            })
        );
    }

    #[test]
    fn rejects_bad_values() {
        assert_eq!(
            Config::from_lookup(lookup(&[(CONDITIONS_VAR, "sometimes")])),
            Err(ConfigError::Conditions("sometimes".to_string()))
        );
        assert!(Config::from_lookup(lookup(&[(MAX_STEPS_VAR, "0")])).is_err());
        assert!(Config::from_lookup(lookup(&[(MAX_STEPS_VAR, "lots")])).is_err());
    }
}
