use crate::animation::DEFAULT_DURATION;
use crate::cli::GlobalArgs;
use crate::storage::default_store_dir;
use anyhow::Result;
use std::path::PathBuf;
use std::time::Duration;

const MIN_ANIMATION_MS: u64 = 50;
const MAX_ANIMATION_MS: u64 = 2_000;

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub store_dir: PathBuf,
    pub animation: Duration,
    pub offline: bool,
}

impl Settings {
    pub fn resolve(args: &GlobalArgs) -> Result<Self> {
        let store_dir = match &args.store_dir {
            Some(dir) => dir.clone(),
            None => default_store_dir()?,
        };
        let animation = args
            .animation_ms
            .map(|ms| Duration::from_millis(ms.clamp(MIN_ANIMATION_MS, MAX_ANIMATION_MS)))
            .unwrap_or(DEFAULT_DURATION);
        Ok(Settings {
            store_dir,
            animation,
            offline: args.offline,
        })
    }

    pub fn log_path(&self) -> PathBuf {
        self.store_dir.join("notecards.log")
    }
}
