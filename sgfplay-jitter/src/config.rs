/// Lowest accepted contact factor
pub const MIN_CONTACT_FACTOR: f64 = 0.85;
/// Highest accepted contact factor
pub const MAX_CONTACT_FACTOR: f64 = 0.98;

/// Configuration for jitter synthesis and relaxation.
///
/// Offsets are in stone-radius units. `sigma` and `max_offset` are scaled by
/// `eccentricity`, the user-facing jitter amplitude.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct JitterConfig {
    /// Standard deviation of the initial jitter at eccentricity 1
    pub sigma: f64,
    /// Per-axis clamp at eccentricity 1
    pub max_offset: f64,
    /// Jitter amplitude multiplier
    pub eccentricity: f64,
    /// Fraction of the kissing distance two stones must keep
    pub contact_factor: f64,
    /// Relaxation rounds per query
    pub iterations: u32,
}

impl Default for JitterConfig {
    fn default() -> Self {
        Self {
            sigma: 0.10,
            max_offset: 0.22,
            eccentricity: 1.0,
            contact_factor: 0.92,
            iterations: 6,
        }
    }
}

impl JitterConfig {
    /// Sigma after eccentricity scaling
    pub fn effective_sigma(&self) -> f64 {
        self.sigma * self.eccentricity.max(0.0)
    }

    /// Per-axis clamp after eccentricity scaling
    pub fn effective_clamp(&self) -> f64 {
        self.max_offset * self.eccentricity.max(0.0)
    }

    /// Contact factor limited to the accepted range
    pub fn contact(&self) -> f64 {
        self.contact_factor.clamp(MIN_CONTACT_FACTOR, MAX_CONTACT_FACTOR)
    }

    /// Minimum centre distance for stones of `radius`, in grid units
    pub fn min_separation(&self, radius: f64) -> f64 {
        2.0 * radius * self.contact()
    }

    /// Same configuration with another amplitude
    pub fn with_eccentricity(self, eccentricity: f64) -> Self {
        Self {
            eccentricity,
            ..self
        }
    }
}
