//! Argument string parsing for hooks and resolvers.
//!
//! The orchestration tool hands plugins a single string. Hooks receive
//! whitespace-separated `key=value` pairs; resolvers receive one or two
//! positional parameters.

use std::collections::BTreeMap;

use stackhooks_common::Region;
use tracing::trace;

use crate::error::{ConfigError, ConfigResult};

/// Parsed `key=value` hook arguments
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HookArguments {
    values: BTreeMap<String, String>,
}

impl HookArguments {
    /// Parse a whitespace-separated `key=value` argument string.
    ///
    /// Tokens without `=`, empty keys and repeated keys are rejected.
    pub fn parse(argument: &str) -> ConfigResult<Self> {
        let mut values = BTreeMap::new();

        for token in argument.split_whitespace() {
            let (key, value) = token.split_once('=').ok_or_else(|| {
                ConfigError::invalid_argument(token, "expected key=value")
            })?;

            if key.is_empty() {
                return Err(ConfigError::invalid_argument(token, "empty key"));
            }

            if values.insert(key.to_string(), value.to_string()).is_some() {
                return Err(ConfigError::invalid_argument(key, "given more than once"));
            }
        }

        trace!(count = values.len(), "Parsed hook arguments");
        Ok(Self { values })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}

/// Positional resolver arguments: `name [region]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverArgs {
    /// Domain name or FQDN being resolved
    pub name: String,
    /// Region to query
    pub region: Region,
}

impl ResolverArgs {
    /// Parse `name [region]`, falling back to `default_region` when the
    /// region is omitted.
    pub fn parse(argument: &str, usage: &'static str, default_region: &Region) -> ConfigResult<Self> {
        let parts: Vec<&str> = argument.split_whitespace().collect();

        match parts.as_slice() {
            [name] => Ok(Self {
                name: name.to_string(),
                region: default_region.clone(),
            }),
            [name, region] => Ok(Self {
                name: name.to_string(),
                region: Region::new(region),
            }),
            _ => Err(ConfigError::ResolverArguments {
                usage,
                count: parts.len(),
            }),
        }
    }
}
