//! Best-effort categorisation of questions by identifier.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Report category a question is grouped under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportCategory {
    /// Security tooling and posture.
    Security,
    /// Campus, WAN, and wireless networking.
    Networking,
    /// Public cloud and SaaS.
    Cloud,
    /// Compute, storage, and virtualisation.
    DataCenter,
    /// Voice, video, and messaging.
    Collaboration,
    /// Monitoring and logging.
    Observability,
    /// Anything no rule matched.
    General,
}

impl ReportCategory {
    /// Returns the canonical identifier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Security => "security",
            Self::Networking => "networking",
            Self::Cloud => "cloud",
            Self::DataCenter => "data_center",
            Self::Collaboration => "collaboration",
            Self::Observability => "observability",
            Self::General => "general",
        }
    }

    /// Returns the display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Security => "Security",
            Self::Networking => "Networking",
            Self::Cloud => "Cloud",
            Self::DataCenter => "Data Center",
            Self::Collaboration => "Collaboration",
            Self::Observability => "Observability",
            Self::General => "General",
        }
    }
}

impl fmt::Display for ReportCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Substring rules, checked in order. The first rule with a matching
/// fragment wins, so `network_security_stack` is a security question.
pub const CATEGORY_RULES: [(ReportCategory, &[&str]); 6] = [
    (
        ReportCategory::Security,
        &[
            "security", "firewall", "edr", "siem", "identity", "zero_trust", "threat",
        ],
    ),
    (
        ReportCategory::Observability,
        &["observ", "monitor", "logging", "apm", "telemetry"],
    ),
    (
        ReportCategory::Collaboration,
        &["collab", "voice", "video", "contact_center", "meeting"],
    ),
    (
        ReportCategory::Cloud,
        &["cloud", "aws", "azure", "gcp", "saas"],
    ),
    (
        ReportCategory::DataCenter,
        &[
            "data_center", "datacenter", "compute", "storage", "server", "virtual",
        ],
    ),
    (
        ReportCategory::Networking,
        &[
            "network", "switch", "router", "routing", "wan", "lan", "wireless", "wifi", "campus",
        ],
    ),
];

/// Infers a report category from a question identifier.
///
/// Matching is case-insensitive substring matching against
/// [`CATEGORY_RULES`]; unmatched identifiers fall into
/// [`ReportCategory::General`]. The result is a heuristic: an identifier
/// that happens to contain a fragment (`swan_song` contains `wan`) is
/// classified by it.
#[must_use]
pub fn infer_category(question_id: &str) -> ReportCategory {
    let lowered = question_id.to_ascii_lowercase();
    CATEGORY_RULES
        .iter()
        .find(|(_, fragments)| fragments.iter().any(|fragment| lowered.contains(fragment)))
        .map_or(ReportCategory::General, |(category, _)| *category)
}
