//! Configuration types deserialized from `sinew.toml`.

use serde::{Deserialize, Serialize};
use sinew_diagnostics::Severity;

/// The top-level router configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouterConfig {
    /// Job scheduling settings.
    #[serde(default)]
    pub router: JobConfig,
    /// Search bounds shared by every fabric query.
    #[serde(default)]
    pub search: SearchConfig,
    /// Per-hop cost model used to rank route templates.
    #[serde(default)]
    pub cost: CostConfig,
}

/// Job scheduling settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobConfig {
    /// Number of concurrent routing jobs.
    pub jobs: usize,
    /// Least severe diagnostic kept by the session; `"warning"` drops progress notes.
    pub min_severity: Severity,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            jobs: 4,
            min_severity: Severity::Note,
        }
    }
}

/// Bounds on the fabric searches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Maximum number of buffer hops traversed inside one tile.
    pub max_depth: u32,
    /// Slack above the cheapest tile path within which alternatives are kept.
    pub tolerance: u32,
    /// Maximum number of long-haul hops in a route template.
    pub max_template_hops: usize,
    /// Maximum number of partial templates expanded by one skeleton search.
    pub max_expansions: usize,
    /// Maximum number of slot reverts while realizing one route.
    pub max_backtracks: usize,
    /// How many times a lane is re-realized after losing a claim race.
    pub max_claim_attempts: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_depth: 8,
            tolerance: 3,
            max_template_hops: 16,
            max_expansions: 20_000,
            max_backtracks: 2_000,
            max_claim_attempts: 4,
        }
    }
}

/// Cost weights applied per long-haul hop when ranking templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostConfig {
    /// Base cost of every hop.
    pub hop: u32,
    /// Wires shorter than this count as short hops.
    pub long_line_length: u32,
    /// Added for each short hop.
    pub short_hop_penalty: u32,
    /// Added when a hop reverses the direction of the hop after it.
    pub reversal_penalty: u32,
    /// Added when a hop turns 90 degrees relative to the hop after it.
    pub orthogonal_turn_penalty: u32,
}

impl Default for CostConfig {
    fn default() -> Self {
        Self {
            hop: 2,
            long_line_length: 6,
            short_hop_penalty: 4,
            reversal_penalty: 2,
            orthogonal_turn_penalty: 8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_tuned_values() {
        let config = RouterConfig::default();
        assert_eq!(config.router.jobs, 4);
        assert_eq!(config.router.min_severity, Severity::Note);
        assert_eq!(config.search.max_depth, 8);
        assert_eq!(config.search.tolerance, 3);
        assert_eq!(config.cost.long_line_length, 6);
        assert_eq!(config.cost.orthogonal_turn_penalty, 8);
    }

    #[test]
    fn min_severity_is_lowercase() {
        let text = "[router]\nmin_severity = \"warning\"\n";
        let config: RouterConfig = toml::from_str(text).unwrap();
        assert_eq!(config.router.min_severity, Severity::Warning);
        assert_eq!(config.router.jobs, 4);
        assert!(toml::from_str::<RouterConfig>("[router]\nmin_severity = \"Loud\"\n").is_err());
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let config: RouterConfig = toml::from_str("[cost]\nhop = 5\n").unwrap();
        assert_eq!(config.cost.hop, 5);
        assert_eq!(config.cost.short_hop_penalty, 4);
        assert_eq!(config.search, SearchConfig::default());
    }
}
