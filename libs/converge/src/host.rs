//! Host-level convergence run over multiple instance declarations.

use std::collections::BTreeSet;

use tracing::info;

use crate::config::SiteConfig;
use crate::error::ConfigError;
use crate::machine::{plan_instance, InstancePlan};
use crate::name::InstanceName;
use crate::params::InstanceParams;

/// Aggregate counters for one convergence run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConvergeStats {
    /// Instances successfully planned.
    pub instances_planned: usize,

    /// Total intents emitted across all instances.
    pub intents_emitted: usize,

    /// Plans that remove data (deleted targets).
    pub destructive_plans: usize,
}

/// Collects instance declarations for one host and one convergence run.
///
/// Each name may be declared at most once per run; instances are otherwise
/// independent of each other.
#[derive(Debug)]
pub struct HostPlan {
    site: SiteConfig,
    plans: Vec<InstancePlan>,
    names: BTreeSet<String>,
    stats: ConvergeStats,
}

impl HostPlan {
    /// Start a convergence run against one host's site configuration.
    pub fn new(site: SiteConfig) -> Self {
        Self {
            site,
            plans: Vec::new(),
            names: BTreeSet::new(),
            stats: ConvergeStats::default(),
        }
    }

    /// The site configuration this run plans against.
    pub fn site(&self) -> &SiteConfig {
        &self.site
    }

    /// Declare one instance and plan its intent set.
    ///
    /// Fails on an invalid name, a duplicate declaration, or a resolution
    /// error; a failed declaration contributes nothing to the run.
    pub fn declare(&mut self, name: &str, params: InstanceParams) -> Result<(), ConfigError> {
        let name: InstanceName = name.parse()?;

        if !self.names.insert(name.to_string()) {
            return Err(ConfigError::DuplicateInstanceName(name.to_string()));
        }

        let plan = plan_instance(&name, &params, &self.site)?;

        info!(
            instance = %name,
            ensure = %plan.ensure(),
            intent_count = plan.intents().len(),
            "Planned instance"
        );

        self.stats.instances_planned += 1;
        self.stats.intents_emitted += plan.intents().len();
        if plan.ensure().is_destructive() {
            self.stats.destructive_plans += 1;
        }

        self.plans.push(plan);
        Ok(())
    }

    /// Aggregate counters for the run so far.
    pub fn stats(&self) -> ConvergeStats {
        self.stats
    }

    /// Plans in declaration order.
    pub fn plans(&self) -> &[InstancePlan] {
        &self.plans
    }

    /// Finish the run, yielding the plans in declaration order.
    pub fn into_plans(self) -> Vec<InstancePlan> {
        info!(
            instances_planned = self.stats.instances_planned,
            intents_emitted = self.stats.intents_emitted,
            destructive_plans = self.stats.destructive_plans,
            "Convergence planning complete"
        );

        self.plans
    }
}
