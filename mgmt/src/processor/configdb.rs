// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Configuration database: the rendered configurations and what happened to them

use std::time::SystemTime;
use tracing::{debug, info};

/// Generation of a rendered configuration. Bumps every time the content changes.
pub type GenId = u64;

/// Maximum number of entries kept in the history
const HISTORY_LEN: usize = 64;

/// A rendered `smf.conf`
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SmfConfig {
    pub genid: GenId,
    pub content: String,
}

/// Metadata associated to a configuration generation
#[derive(Clone, Debug)]
pub struct ConfigMeta {
    // generation Id of a config
    pub genid: GenId,

    // time when a config was rendered first
    pub create_t: SystemTime,

    // time when a config was last applied
    pub apply_t: Option<SystemTime>,

    // error if configuration could not be applied
    pub error: Option<String>,
}

impl ConfigMeta {
    fn new(genid: GenId) -> Self {
        Self {
            genid,
            create_t: SystemTime::now(),
            apply_t: None,
            error: None,
        }
    }
}

/// Keeps the latest rendered configuration, the one applied and the history of generations
#[derive(Default)]
pub struct ConfigDatabase {
    latest: Option<SmfConfig>,  /* last rendered config */
    applied: Option<SmfConfig>, /* last config successfully applied */
    history: Vec<ConfigMeta>,   /* event history */
}

impl ConfigDatabase {
    #[must_use]
    pub fn new() -> Self {
        debug!("Building config database...");
        Self::default()
    }

    #[must_use]
    pub fn history(&self) -> &[ConfigMeta] {
        &self.history
    }

    fn meta_mut(&mut self, genid: GenId) -> Option<&mut ConfigMeta> {
        self.history.iter_mut().rev().find(|m| m.genid == genid)
    }

    /// Learn a rendered configuration and return its generation. Rendering the same
    /// content again keeps the generation.
    pub fn learn(&mut self, content: &str) -> GenId {
        if let Some(latest) = &self.latest
            && latest.content == content
        {
            return latest.genid;
        }
        let genid = self.latest.as_ref().map_or(1, |c| c.genid + 1);
        info!("Learnt config for generation '{genid}'");
        self.latest = Some(SmfConfig {
            genid,
            content: content.to_string(),
        });
        self.history.push(ConfigMeta::new(genid));
        if self.history.len() > HISTORY_LEN {
            self.history.remove(0);
        }
        genid
    }

    /// Record that generation `genid` was applied
    pub fn mark_applied(&mut self, genid: GenId) {
        if let Some(meta) = self.meta_mut(genid) {
            meta.apply_t = Some(SystemTime::now());
            meta.error = None;
        }
        if let Some(latest) = self.latest.as_ref().filter(|c| c.genid == genid) {
            self.applied = Some(latest.clone());
        }
    }

    /// Record that generation `genid` failed to apply
    pub fn mark_failed(&mut self, genid: GenId, error: &str) {
        if let Some(meta) = self.meta_mut(genid) {
            meta.error = Some(error.to_string());
        }
    }

    /// Get the generation Id of the currently applied config, if any.
    #[must_use]
    pub fn get_current_gen(&self) -> Option<GenId> {
        self.applied.as_ref().map(|c| c.genid)
    }

    /// Get the config currently applied, if any.
    #[must_use]
    pub fn get_current_config(&self) -> Option<&SmfConfig> {
        self.applied.as_ref()
    }
}
