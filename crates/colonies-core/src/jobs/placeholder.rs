//! A job with no work.

use serde::{Deserialize, Serialize};

use colonies_types::CitizenStatus;

use crate::error::CoreError;
use crate::job::{Job, JobCommon, JobContext, PLACEHOLDER};

/// Keeps a citizen employed without giving it anything to do.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceholderJob {
    #[serde(default)]
    common: JobCommon,
}

impl Job for PlaceholderJob {
    fn kind(&self) -> &'static str {
        PLACEHOLDER
    }

    fn common(&self) -> &JobCommon {
        &self.common
    }

    fn common_mut(&mut self) -> &mut JobCommon {
        &mut self.common
    }

    fn save_state(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    fn tick(&mut self, _ctx: &mut JobContext<'_>) -> Result<CitizenStatus, CoreError> {
        Ok(CitizenStatus::Idle)
    }
}
