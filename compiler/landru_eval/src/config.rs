//! Engine limits.

/// Default bound on nested script function calls.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 256;

/// Tunable engine limits, built with chained setters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    max_call_depth: usize,
    max_launches_per_tick: Option<usize>,
}

impl EngineConfig {
    pub fn new() -> Self {
        EngineConfig {
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            max_launches_per_tick: None,
        }
    }

    /// Calls nested deeper than this fail with `RecursionLimit`.
    #[must_use]
    pub fn max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = depth;
        self
    }

    /// Service at most `cap` launches per tick. The rest stay queued.
    #[must_use]
    pub fn max_launches_per_tick(mut self, cap: usize) -> Self {
        self.max_launches_per_tick = Some(cap);
        self
    }

    #[inline]
    pub fn call_depth_limit(&self) -> usize {
        self.max_call_depth
    }

    #[inline]
    pub fn launch_cap(&self) -> Option<usize> {
        self.max_launches_per_tick
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}
