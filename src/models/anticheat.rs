use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    ClockManipulation,
    ExcessiveTime,
    RapidFire,
}

impl ViolationKind {
    pub fn message(&self) -> &'static str {
        match self {
            ViolationKind::ClockManipulation => {
                "Negative time detected - possible clock manipulation"
            }
            ViolationKind::ExcessiveTime => "Excessive time for session",
            ViolationKind::RapidFire => "Suspiciously fast answers detected",
        }
    }
}

/// Verdict of the timing validator. Warnings are ordered by rule; the first
/// corrective value produced wins `adjusted_time`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub warnings: Vec<String>,
    pub adjusted_time: Option<f64>,
}

impl ValidationResult {
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            warnings: Vec::new(),
            adjusted_time: None,
        }
    }

    pub fn flag(&mut self, kind: ViolationKind, adjusted: Option<f64>) {
        self.is_valid = false;
        self.warnings.push(kind.message().to_string());
        if self.adjusted_time.is_none() {
            self.adjusted_time = adjusted;
        }
    }
}
