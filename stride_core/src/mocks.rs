//! Test and helper mocks for stride_core

use std::collections::VecDeque;
use stride_traits::{ImuSource, Sample};

/// Replays a prepared sample sequence; yields `None` once exhausted.
pub struct ScriptedImu {
    queue: VecDeque<Sample>,
}

impl ScriptedImu {
    pub fn new(samples: impl IntoIterator<Item = Sample>) -> Self {
        Self {
            queue: samples.into_iter().collect(),
        }
    }
}

impl ImuSource for ScriptedImu {
    fn next_sample(
        &mut self,
        _timeout: std::time::Duration,
    ) -> Result<Option<Sample>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.queue.pop_front())
    }
}

/// A source that always errors; useful for feed error-path tests.
pub struct FaultyImu;

impl ImuSource for FaultyImu {
    fn next_sample(
        &mut self,
        _timeout: std::time::Duration,
    ) -> Result<Option<Sample>, Box<dyn std::error::Error + Send + Sync>> {
        Err(Box::new(std::io::Error::other("faulty imu")))
    }
}
