use std::{
    fs,
    io::{self, Write},
    path::Path,
};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    errors::{ConfigError, EvidenceOverflow},
    MAX_EVIDENCE_BYTES,
};

/// Consensus limits on evidence admitted into blocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceParams {
    /// Maximum age of evidence, in blocks.
    pub max_age_num_blocks: i64,
    /// Maximum age of evidence, in seconds.
    pub max_age_duration: i64,
    /// Maximum number of evidence items per block.
    pub max_num: u32,
    /// Maximum total evidence size per block, in bytes.
    pub max_bytes: i64,
}

impl Default for EvidenceParams {
    fn default() -> Self {
        Self {
            max_age_num_blocks: 100_000,
            max_age_duration: 48 * 60 * 60,
            max_num: 50,
            max_bytes: 1024 * 1024,
        }
    }
}

impl EvidenceParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_age_num_blocks <= 0 {
            return Err(ConfigError::InvalidMaxAgeNumBlocks(self.max_age_num_blocks));
        }
        if self.max_age_duration <= 0 {
            return Err(ConfigError::InvalidMaxAgeDuration);
        }
        if Duration::try_seconds(self.max_age_duration).is_none() {
            return Err(ConfigError::MaxAgeDurationTooLarge(self.max_age_duration));
        }
        if self.max_bytes <= 0 {
            return Err(ConfigError::InvalidMaxBytes(self.max_bytes));
        }
        if i64::from(self.max_num) * MAX_EVIDENCE_BYTES > self.max_bytes {
            return Err(ConfigError::MaxNumTooLarge {
                max_num: self.max_num,
                item: MAX_EVIDENCE_BYTES,
                max_bytes: self.max_bytes,
            });
        }
        Ok(())
    }

    /// Saturates at [`Duration::MAX`] for values [`Self::validate`] rejects.
    pub fn max_age(&self) -> Duration {
        Duration::try_seconds(self.max_age_duration).unwrap_or(if self.max_age_duration < 0 {
            Duration::MIN
        } else {
            Duration::MAX
        })
    }

    /// Fails when a block proposes more than `max_num` items.
    pub fn check_count(&self, got: usize) -> Result<(), EvidenceOverflow> {
        let max = self.max_num as usize;
        if got > max {
            return Err(EvidenceOverflow::new(max, got));
        }
        Ok(())
    }

    /// Evidence expires only once it is too old both in blocks and in time.
    pub fn is_expired(
        &self,
        height: i64,
        time: DateTime<Utc>,
        current_height: i64,
        current_time: DateTime<Utc>,
    ) -> bool {
        let age_blocks = current_height.saturating_sub(height);
        let age = current_time.signed_duration_since(time);
        age_blocks > self.max_age_num_blocks && age > self.max_age()
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let json = fs::read_to_string(path)?;
        let params = serde_json::from_str(&json)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        Ok(params)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        let mut file = fs::File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}
