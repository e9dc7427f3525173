//! Configuration for the mydbs sample runner.

use crate::error::Result;
use clap::{Parser, ValueEnum};
use serde::Deserialize;
use serde_json::from_reader;
use std::{fs::File, io::BufReader};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
/// Command line arguments for the sample runner.
pub struct Args {
    /// path to the config file
    #[arg(long)]
    pub config_path: String,
    /// which sample scenario to run
    #[arg(long, value_enum, default_value_t = Sample::DbInstance)]
    pub sample: Sample,
}

impl Args {
    /// helper function for exporting the `clap::Parser::parse` function
    pub fn parse_args() -> Self {
        Args::parse()
    }
}

/// Sample scenarios, selected on the command line.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Sample {
    /// create -> stop -> start -> restart -> delete a DB instance
    DbInstance,
    /// create a DB instance, take a full backup, delete both
    Backup,
}

/// Credentials used to authenticate with the control plane.
#[derive(Debug, Deserialize, PartialEq)]
#[serde(tag = "type", content = "content")]
pub enum CredentialsConfig {
    Basic {
        username: String,
        password: Option<String>,
    },
    Bearer {
        token: String,
    },
}

/// Defaults applied to every DB instance the samples create.
#[derive(Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct InstanceConfig {
    pub subnet_id: String,
    pub shape: String,
    pub mysql_version: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Per-operation wait deadlines, in seconds.
#[derive(Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TimeoutsConfig {
    pub create_instance_secs: u64,
    pub delete_instance_secs: u64,
    /// Bound for stop/start/restart waits and for the shutdown
    /// reconciler's wait on instances stuck in `Updating`.
    pub updating_instance_secs: u64,
    pub create_backup_secs: u64,
    pub delete_backup_secs: u64,
}

/// Tuning of the lifecycle poller.
#[derive(Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PollConfig {
    #[serde(default = "default_poll_interval_secs")]
    pub interval_secs: u64,
    /// Consecutive transient fetch errors tolerated before a wait is
    /// abandoned.
    #[serde(default = "default_transient_error_budget")]
    pub transient_error_budget: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_poll_interval_secs(),
            transient_error_budget: default_transient_error_budget(),
        }
    }
}

/// Tuning of the shutdown reconciler's backup-deletion retry loop.
#[derive(Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CleanupConfig {
    #[serde(default = "default_cleanup_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_cleanup_interval_secs")]
    pub retry_interval_secs: u64,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_cleanup_attempts(),
            retry_interval_secs: default_cleanup_interval_secs(),
        }
    }
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Base URL of the managed MySQL control plane.
    pub endpoint: String,
    pub credentials: Option<CredentialsConfig>,
    pub compartment_id: String,
    pub instance: InstanceConfig,
    pub timeouts: TimeoutsConfig,
    #[serde(default)]
    pub poll: PollConfig,
    #[serde(default)]
    pub cleanup: CleanupConfig,
}

impl Config {
    pub fn read_config(path: &str) -> Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let config = from_reader(reader)?;
        Ok(config)
    }
}

fn default_port() -> u16 {
    3306
}

fn default_poll_interval_secs() -> u64 {
    10
}

fn default_transient_error_budget() -> u32 {
    5
}

fn default_cleanup_attempts() -> u32 {
    30
}

fn default_cleanup_interval_secs() -> u64 {
    10
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::anyhow::Result;
    use ::serde_json::{from_value, json};

    fn full_config() -> serde_json::Value {
        json!({
            "endpoint": "http://localhost:3000",
            "credentials": {
                "type": "Bearer",
                "content": { "token": "admin" }
            },
            "compartment_id": "cmp-1",
            "instance": {
                "subnet_id": "subnet-1",
                "shape": "MySQL.VM.Standard.E3.1.8GB",
                "mysql_version": "8.0.33"
            },
            "timeouts": {
                "create_instance_secs": 1800,
                "delete_instance_secs": 1800,
                "updating_instance_secs": 600,
                "create_backup_secs": 900,
                "delete_backup_secs": 900
            }
        })
    }

    #[test]
    fn missing_field_endpoint() {
        let mut config = full_config();
        config.as_object_mut().unwrap().remove("endpoint");
        let result = from_value::<Config>(config);
        assert_eq!(
            result.unwrap_err().to_string(),
            "missing field `endpoint`"
        );
    }

    #[test]
    fn missing_field_timeouts() {
        let mut config = full_config();
        config.as_object_mut().unwrap().remove("timeouts");
        let result = from_value::<Config>(config);
        assert_eq!(
            result.unwrap_err().to_string(),
            "missing field `timeouts`"
        );
    }

    #[test]
    fn deny_unknown_fields() {
        let mut config = full_config();
        config
            .as_object_mut()
            .unwrap()
            .insert("unknown_field".to_owned(), json!("unknown"));
        let result = from_value::<Config>(config);
        assert!(result
            .unwrap_err()
            .to_string()
            .starts_with("unknown field `unknown_field`"));
    }

    #[test]
    fn poll_and_cleanup_default_when_omitted() -> Result<()> {
        let config = from_value::<Config>(full_config())?;
        assert_eq!(
            config.poll,
            PollConfig {
                interval_secs: 10,
                transient_error_budget: 5
            }
        );
        assert_eq!(
            config.cleanup,
            CleanupConfig {
                max_attempts: 30,
                retry_interval_secs: 10
            }
        );
        assert_eq!(config.instance.port, 3306);
        Ok(())
    }

    #[test]
    fn deserialize_full_config() -> Result<()> {
        let mut config = full_config();
        let object = config.as_object_mut().unwrap();
        object.insert(
            "poll".to_owned(),
            json!({ "interval_secs": 2, "transient_error_budget": 3 }),
        );
        object.insert(
            "cleanup".to_owned(),
            json!({ "max_attempts": 5, "retry_interval_secs": 1 }),
        );
        let config = from_value::<Config>(config)?;
        assert_eq!(config.endpoint, "http://localhost:3000");
        assert_eq!(
            config.credentials,
            Some(CredentialsConfig::Bearer {
                token: "admin".to_owned()
            })
        );
        assert_eq!(config.poll.interval_secs, 2);
        assert_eq!(config.poll.transient_error_budget, 3);
        assert_eq!(config.cleanup.max_attempts, 5);
        assert_eq!(config.timeouts.updating_instance_secs, 600);
        Ok(())
    }
}
