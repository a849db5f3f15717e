use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Fill level at or above which a bin needs collection and raises an alert.
pub const ALERT_THRESHOLD: i64 = 75;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum BinKind {
    Wet,
    Dry,
}

impl BinKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "wet" => Some(BinKind::Wet),
            "dry" => Some(BinKind::Dry),
            _ => None,
        }
    }
}

/// Coarse fill bucket shown on the dashboard. Always derived from the fill
/// level, never stored independently of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "kebab-case")]
#[sqlx(rename_all = "kebab-case")]
pub enum FillStatus {
    Empty,
    Half,
    ThreeQuarter,
    Full,
}

impl FillStatus {
    /// Top-down ladder: 75 / 50 / 25.
    pub fn from_fill_level(level: i64) -> Self {
        if level >= ALERT_THRESHOLD {
            FillStatus::Full
        } else if level >= 50 {
            FillStatus::ThreeQuarter
        } else if level >= 25 {
            FillStatus::Half
        } else {
            FillStatus::Empty
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FillStatus::Empty => "empty",
            FillStatus::Half => "half",
            FillStatus::ThreeQuarter => "three-quarter",
            FillStatus::Full => "full",
        }
    }

    /// Accepts the canonical labels plus the old numeric ones ("25", "50", "75")
    /// that dashboards still send as list filters.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "empty" => Some(FillStatus::Empty),
            "half" | "25" | "50" => Some(FillStatus::Half),
            "three-quarter" | "75" => Some(FillStatus::ThreeQuarter),
            "full" => Some(FillStatus::Full),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Dustbin {
    pub id: i64,
    pub user_id: String,
    pub name: String,

    #[serde(rename = "type")]
    pub kind: BinKind,

    pub location_name: String,
    pub latitude: String,
    pub longitude: String,

    pub fill_level: i64,
    pub status: FillStatus,

    pub last_collection_date: Option<String>,
    pub next_collection_date: Option<String>,

    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ladder_partitions_at_25_50_75() {
        for level in 0..25 {
            assert_eq!(FillStatus::from_fill_level(level), FillStatus::Empty, "level {level}");
        }
        for level in 25..50 {
            assert_eq!(FillStatus::from_fill_level(level), FillStatus::Half, "level {level}");
        }
        for level in 50..75 {
            assert_eq!(FillStatus::from_fill_level(level), FillStatus::ThreeQuarter, "level {level}");
        }
        for level in 75..=100 {
            assert_eq!(FillStatus::from_fill_level(level), FillStatus::Full, "level {level}");
        }
    }

    #[test]
    fn labels_round_trip_through_parse() {
        for s in [
            FillStatus::Empty,
            FillStatus::Half,
            FillStatus::ThreeQuarter,
            FillStatus::Full,
        ] {
            assert_eq!(FillStatus::parse(s.as_str()), Some(s));
        }
    }

    #[test]
    fn legacy_labels_are_aliases() {
        assert_eq!(FillStatus::parse("50"), Some(FillStatus::Half));
        assert_eq!(FillStatus::parse("75"), Some(FillStatus::ThreeQuarter));
        assert_eq!(FillStatus::parse("25"), Some(FillStatus::Half));
        assert_eq!(FillStatus::parse("100"), None);
    }

    #[test]
    fn serde_label_matches_as_str() {
        let json = serde_json::to_string(&FillStatus::ThreeQuarter).unwrap();
        assert_eq!(json, "\"three-quarter\"");
    }
}
