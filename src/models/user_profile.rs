use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum OrgCategory {
    College,
    #[serde(rename = "Municipal Corporation")]
    #[sqlx(rename = "Municipal Corporation")]
    MunicipalCorporation,
    School,
    Cafe,
    Restaurant,
    #[serde(rename = "Railway Station")]
    #[sqlx(rename = "Railway Station")]
    RailwayStation,
    Airport,
    Others,
}

impl OrgCategory {
    pub const ALL: [OrgCategory; 8] = [
        OrgCategory::College,
        OrgCategory::MunicipalCorporation,
        OrgCategory::School,
        OrgCategory::Cafe,
        OrgCategory::Restaurant,
        OrgCategory::RailwayStation,
        OrgCategory::Airport,
        OrgCategory::Others,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OrgCategory::College => "College",
            OrgCategory::MunicipalCorporation => "Municipal Corporation",
            OrgCategory::School => "School",
            OrgCategory::Cafe => "Cafe",
            OrgCategory::Restaurant => "Restaurant",
            OrgCategory::RailwayStation => "Railway Station",
            OrgCategory::Airport => "Airport",
            OrgCategory::Others => "Others",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == s)
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: i64,
    pub user_id: String,
    pub organization_name: String,
    pub category: OrgCategory,
    pub mobile_number: String,
    pub created_at: String,
    pub updated_at: String,
}
