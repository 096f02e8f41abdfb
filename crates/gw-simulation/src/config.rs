use std::ops::Range;

/// Configuration for a simulation run.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// RNG seed for deterministic simulation.
    pub seed: u64,
    /// Action and animation period of saplings planted by fairies.
    pub sapling_period: f64,
    /// Health at which a sapling grows into a tree.
    pub sapling_health_limit: i32,
    /// Range the action period of a freshly grown tree is drawn from.
    pub tree_action_period: Range<f64>,
    /// Range the animation period of a freshly grown tree is drawn from.
    pub tree_animation_period: Range<f64>,
    /// Range the starting health of a freshly grown tree is drawn from.
    pub tree_health: Range<i32>,
    /// Maximum event log size (oldest events dropped when exceeded). 0 = unlimited.
    pub max_events: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            sapling_period: 1.0,
            sapling_health_limit: 5,
            tree_action_period: 1.0..1.4,
            tree_animation_period: 0.05..0.6,
            tree_health: 1..3,
            max_events: 0,
        }
    }
}

impl SimConfig {
    /// Set the RNG seed for deterministic simulation.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the period of fairy-planted saplings.
    pub fn with_sapling_period(mut self, period: f64) -> Self {
        self.sapling_period = period;
        self
    }

    /// Set the health a sapling needs to become a tree.
    pub fn with_sapling_health_limit(mut self, limit: i32) -> Self {
        self.sapling_health_limit = limit;
        self
    }

    /// Set the action period range for grown trees.
    pub fn with_tree_action_period(mut self, range: Range<f64>) -> Self {
        self.tree_action_period = range;
        self
    }

    /// Set the animation period range for grown trees.
    pub fn with_tree_animation_period(mut self, range: Range<f64>) -> Self {
        self.tree_animation_period = range;
        self
    }

    /// Set the starting health range for grown trees.
    pub fn with_tree_health(mut self, range: Range<i32>) -> Self {
        self.tree_health = range;
        self
    }

    /// Set the maximum event log size (0 = unlimited).
    pub fn with_max_events(mut self, max: usize) -> Self {
        self.max_events = max;
        self
    }
}
