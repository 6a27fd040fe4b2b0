// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{Error, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::Error;

    /// Validates that the batch has at least one task, `[config].jobs` is not
    /// zero, and every task has a non-empty `cmd`.
    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.config, raw.env, raw.task))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    ensure_has_tasks(cfg)?;
    validate_global_config(cfg)?;
    validate_tasks(cfg)?;
    Ok(())
}

fn ensure_has_tasks(cfg: &RawConfigFile) -> Result<()> {
    if cfg.task.is_empty() {
        return Err(Error::Config(
            "config must contain at least one [task.<name>] section".to_string(),
        ));
    }
    Ok(())
}

fn validate_global_config(cfg: &RawConfigFile) -> Result<()> {
    if cfg.config.jobs == Some(0) {
        return Err(Error::Config(
            "[config].jobs must be >= 1 (got 0)".to_string(),
        ));
    }

    if let Some(shell) = &cfg.config.shell {
        if shell.trim().is_empty() {
            return Err(Error::Config("[config].shell must not be empty".to_string()));
        }
    }

    Ok(())
}

fn validate_tasks(cfg: &RawConfigFile) -> Result<()> {
    for (name, task) in cfg.task.iter() {
        if task.cmd.trim().is_empty() {
            return Err(Error::Config(format!("task '{name}' has an empty `cmd`")));
        }
    }
    Ok(())
}
