//! Extension de halloconfig pour le scheduler

use crate::config::SchedulerConfig;
use std::time::Duration;

/// Trait d'extension pour halloconfig::Config
pub trait SchedulerConfigExt {
    /// Construit la configuration du scheduler depuis la section `playback`
    fn scheduler_config(&self) -> anyhow::Result<SchedulerConfig>;
}

impl SchedulerConfigExt for halloconfig::Config {
    fn scheduler_config(&self) -> anyhow::Result<SchedulerConfig> {
        Ok(SchedulerConfig {
            bumper_duration: Duration::from_secs(self.get_bumper_seconds()?),
            logo_duration: Duration::from_secs(self.get_logo_seconds()?),
            auto_restart: self.get_auto_restart()?,
        })
    }
}
