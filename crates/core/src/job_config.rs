// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed access to a job's opaque configuration payload.
//!
//! The engine never interprets `Job::configuration`; producers and workers
//! agree on a payload type through its `configuration_type` tag.

use crate::job::Job;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Errors converting between typed payloads and stored configuration.
#[derive(Debug, Error)]
pub enum JobConfigError {
    #[error("configuration type mismatch: expected '{expected}', found '{found}'")]
    TypeMismatch { expected: String, found: String },

    #[error("configuration payload error: {0}")]
    Payload(#[from] serde_json::Error),
}

/// A payload type that can be stored as a job configuration.
pub trait JobConfiguration: Serialize + DeserializeOwned {
    /// Tag stored in `Job::configuration_type`
    const TYPE: &'static str;
}

impl Job {
    /// Store `config` as this job's payload, tagging it with its type.
    pub fn set_configuration<T: JobConfiguration>(
        &mut self,
        config: &T,
    ) -> Result<(), JobConfigError> {
        self.configuration = Some(serde_json::to_value(config)?);
        self.configuration_type = Some(T::TYPE.to_string());
        Ok(())
    }

    /// Decode the payload as `T`. `Ok(None)` if the job carries no payload.
    pub fn configuration_as<T: JobConfiguration>(&self) -> Result<Option<T>, JobConfigError> {
        let Some(payload) = &self.configuration else {
            return Ok(None);
        };
        match self.configuration_type.as_deref() {
            Some(found) if found != T::TYPE => {
                return Err(JobConfigError::TypeMismatch {
                    expected: T::TYPE.to_string(),
                    found: found.to_string(),
                })
            }
            _ => {}
        }
        Ok(Some(serde_json::from_value(payload.clone())?))
    }
}

#[cfg(test)]
#[path = "job_config_tests.rs"]
mod tests;
