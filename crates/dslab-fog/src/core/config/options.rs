//! Config utils.

use std::collections::HashMap;
use std::str::FromStr;

/// Parses config value string, which consists of two parts - name and options.
/// Example: EnergyAware[tie_break=random,seed=7] parts are name EnergyAware
/// and options string "tie_break=random,seed=7".
pub fn parse_config_value(config_str: &str) -> (String, Option<String>) {
    match config_str.split_once('[') {
        Some((l, r)) => (l.trim().to_string(), Some(r.replace(']', ""))),
        None => (config_str.trim().to_string(), None),
    }
}

/// Parses options string from config value, returns map with option names and values.
pub fn parse_options(options_str: &str) -> HashMap<String, String> {
    let mut options = HashMap::new();
    for option_str in options_str.split(',') {
        if let Some((name, value)) = option_str.split_once('=') {
            options.insert(name.trim().to_string(), value.trim().to_string());
        }
    }
    options
}

/// Options of a single config value with typed access.
#[derive(Clone, Debug, Default)]
pub struct ConfigOptions {
    name: String,
    options: HashMap<String, String>,
}

impl ConfigOptions {
    pub fn parse(config_str: &str) -> Self {
        let (name, options) = parse_config_value(config_str);
        Self {
            name,
            options: options.as_deref().map(parse_options).unwrap_or_default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns raw option value.
    pub fn raw(&self, option: &str) -> Option<&str> {
        self.options.get(option).map(|s| s.as_str())
    }

    /// Returns parsed option value, `Ok(None)` if the option is absent and `Err(value)` if it can't be parsed.
    pub fn get<T: FromStr>(&self, option: &str) -> Result<Option<T>, String> {
        match self.options.get(option) {
            None => Ok(None),
            Some(value) => value.parse::<T>().map(Some).map_err(|_| value.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_name_and_options() {
        let options = parse_options("option1=0.8,option2=something");
        assert_eq!(options.get("option1").map(|s| s.as_str()), Some("0.8"));
        assert_eq!(options.get("option2").map(|s| s.as_str()), Some("something"));
        assert_eq!(options.get("option3"), None);

        let value = ConfigOptions::parse("DeadlineAware[tie_break=random, seed=3]");
        assert_eq!(value.name(), "DeadlineAware");
        assert_eq!(value.raw("tie_break"), Some("random"));
        assert_eq!(value.get::<u64>("seed"), Ok(Some(3)));
        assert_eq!(value.get::<u64>("window"), Ok(None));
        assert_eq!(value.get::<u64>("tie_break"), Err("random".to_string()));

        let plain = ConfigOptions::parse("RoundRobin");
        assert_eq!(plain.name(), "RoundRobin");
        assert_eq!(plain.raw("window"), None);
    }
}
