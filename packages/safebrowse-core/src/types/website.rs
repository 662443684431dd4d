//! Website analysis results and their display mapping.

use serde::{Deserialize, Serialize};

use super::settings::Settings;

/// Verdict produced by a `WebsiteRiskAnalyzer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Safe,
    Caution,
    Danger,
}

impl RiskLevel {
    pub const ALL: [RiskLevel; 3] = [RiskLevel::Safe, RiskLevel::Caution, RiskLevel::Danger];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Safe => "safe",
            Self::Caution => "caution",
            Self::Danger => "danger",
        }
    }
}

impl std::str::FromStr for RiskLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "safe" => Ok(Self::Safe),
            "caution" => Ok(Self::Caution),
            "danger" => Ok(Self::Danger),
            other => Err(format!("unknown risk level: {other}")),
        }
    }
}

/// Individual checks behind a verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebsiteDetails {
    pub https_enabled: bool,
    /// Human-readable age, e.g. "2 years".
    pub domain_age_description: String,
    pub impersonation_suspected: bool,
    pub reported_as_scam: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebsiteAnalysisResult {
    pub risk_level: RiskLevel,
    pub summary: String,
    pub details: WebsiteDetails,
    /// In the order the analyzer reported them.
    pub warnings: Vec<String>,
}

impl WebsiteAnalysisResult {
    pub fn category(&self) -> RiskCategory {
        RiskCategory::from(self.risk_level)
    }

    /// Alert the user about this site.
    pub fn should_notify(&self, settings: &Settings) -> bool {
        settings.show_notifications && self.risk_level == RiskLevel::Danger
    }

    /// Keep the user away from this site.
    pub fn should_block(&self, settings: &Settings) -> bool {
        settings.block_high_risk && self.risk_level == RiskLevel::Danger
    }
}

/// How a verdict is presented. `Unknown` is only shown before any result
/// exists; no analyzer can produce it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskCategory {
    Safe,
    Caution,
    Danger,
    Unknown,
}

/// Visual emphasis for a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Positive,
    Warning,
    Critical,
    Neutral,
}

impl RiskCategory {
    /// Category for the latest result, or `Unknown` without one.
    pub fn for_result(result: Option<&WebsiteAnalysisResult>) -> Self {
        result.map_or(Self::Unknown, WebsiteAnalysisResult::category)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Safe => "Safe to Browse",
            Self::Caution => "Proceed with Caution",
            Self::Danger => "Potential Risk Detected",
            Self::Unknown => "Unknown Risk",
        }
    }

    pub fn tone(&self) -> Tone {
        match self {
            Self::Safe => Tone::Positive,
            Self::Caution => Tone::Warning,
            Self::Danger => Tone::Critical,
            Self::Unknown => Tone::Neutral,
        }
    }
}

impl From<RiskLevel> for RiskCategory {
    fn from(level: RiskLevel) -> Self {
        match level {
            RiskLevel::Safe => Self::Safe,
            RiskLevel::Caution => Self::Caution,
            RiskLevel::Danger => Self::Danger,
        }
    }
}

/// One labelled line in the details table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailRow {
    pub label: &'static str,
    pub value: String,
}

impl DetailRow {
    fn new(label: &'static str, value: impl Into<String>) -> Self {
        Self {
            label,
            value: value.into(),
        }
    }
}

/// Display-ready view of a completed website analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WebsiteReport {
    pub category: RiskCategory,
    pub label: &'static str,
    pub tone: Tone,
    pub summary: String,
    pub details: Vec<DetailRow>,
    pub warnings: Vec<String>,
}

impl From<&WebsiteAnalysisResult> for WebsiteReport {
    fn from(result: &WebsiteAnalysisResult) -> Self {
        let category = result.category();
        let yes_no = |flag: bool| if flag { "Yes" } else { "No" };
        let d = &result.details;

        Self {
            category,
            label: category.label(),
            tone: category.tone(),
            summary: result.summary.clone(),
            details: vec![
                DetailRow::new("HTTPS Secure", yes_no(d.https_enabled)),
                DetailRow::new("Domain Age", d.domain_age_description.clone()),
                DetailRow::new(
                    "Impersonation Risk",
                    if d.impersonation_suspected { "Detected" } else { "None" },
                ),
                DetailRow::new("Reported as Scam", yes_no(d.reported_as_scam)),
            ],
            warnings: result.warnings.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(level: RiskLevel) -> WebsiteAnalysisResult {
        WebsiteAnalysisResult {
            risk_level: level,
            summary: "summary".into(),
            details: WebsiteDetails {
                https_enabled: true,
                domain_age_description: "2 years".into(),
                impersonation_suspected: false,
                reported_as_scam: true,
            },
            warnings: vec!["first".into(), "second".into()],
        }
    }

    #[test]
    fn test_each_level_maps_to_one_category() {
        let categories: Vec<RiskCategory> =
            RiskLevel::ALL.iter().map(|l| RiskCategory::from(*l)).collect();
        assert_eq!(
            categories,
            vec![RiskCategory::Safe, RiskCategory::Caution, RiskCategory::Danger]
        );
        assert!(!categories.contains(&RiskCategory::Unknown));
    }

    #[test]
    fn test_danger_label() {
        let category = result(RiskLevel::Danger).category();
        assert_eq!(category.label(), "Potential Risk Detected");
        assert_eq!(category.tone(), Tone::Critical);
    }

    #[test]
    fn test_unknown_only_without_result() {
        assert_eq!(RiskCategory::for_result(None), RiskCategory::Unknown);
        assert_eq!(RiskCategory::Unknown.label(), "Unknown Risk");
        let r = result(RiskLevel::Safe);
        assert_eq!(RiskCategory::for_result(Some(&r)), RiskCategory::Safe);
    }

    #[test]
    fn test_report_rows() {
        let report = WebsiteReport::from(&result(RiskLevel::Caution));
        assert_eq!(report.label, "Proceed with Caution");
        let rows: Vec<(&str, &str)> = report
            .details
            .iter()
            .map(|r| (r.label, r.value.as_str()))
            .collect();
        assert_eq!(
            rows,
            vec![
                ("HTTPS Secure", "Yes"),
                ("Domain Age", "2 years"),
                ("Impersonation Risk", "None"),
                ("Reported as Scam", "Yes"),
            ]
        );
        assert_eq!(report.warnings, vec!["first", "second"]);
    }

    #[test]
    fn test_protection_policy() {
        let mut settings = Settings::default();
        let danger = result(RiskLevel::Danger);
        let safe = result(RiskLevel::Safe);

        assert!(danger.should_notify(&settings));
        assert!(!danger.should_block(&settings));
        assert!(!safe.should_notify(&settings));

        settings.block_high_risk = true;
        settings.show_notifications = false;
        assert!(danger.should_block(&settings));
        assert!(!danger.should_notify(&settings));
        assert!(!safe.should_block(&settings));
    }

    #[test]
    fn test_risk_level_serde_is_lowercase() {
        assert_eq!(serde_json::to_string(&RiskLevel::Danger).unwrap(), "\"danger\"");
        assert_eq!("Caution".parse::<RiskLevel>().unwrap(), RiskLevel::Caution);
        assert!("default".parse::<RiskLevel>().is_err());
    }
}
