use serde::{Deserialize, Serialize};
use std::fmt;

/// Planning horizon selected on the form
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Timeframe {
    #[default]
    Now,
    ThreeMonths,
    SixMonths,
    OneYear,
    ThreeYears,
    FiveYears,
    HundredYears,
}

impl Timeframe {
    pub const ALL: [Timeframe; 7] = [
        Timeframe::Now,
        Timeframe::ThreeMonths,
        Timeframe::SixMonths,
        Timeframe::OneYear,
        Timeframe::ThreeYears,
        Timeframe::FiveYears,
        Timeframe::HundredYears,
    ];

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Timeframe::Now => "right now",
            Timeframe::ThreeMonths => "the next 3 months",
            Timeframe::SixMonths => "the next 6 months",
            Timeframe::OneYear => "the next year",
            Timeframe::ThreeYears => "the next 3 years",
            Timeframe::FiveYears => "the next 5 years",
            Timeframe::HundredYears => "the next 100 years",
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_names() {
        let parsed: Timeframe = serde_json::from_str("\"three_months\"").unwrap();
        assert_eq!(parsed, Timeframe::ThreeMonths);
        assert_eq!(serde_json::to_string(&Timeframe::HundredYears).unwrap(), "\"hundred_years\"");
    }

    #[test]
    fn test_default_is_now() {
        assert_eq!(Timeframe::default(), Timeframe::Now);
    }
}
