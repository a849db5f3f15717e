pub mod user;
pub mod dustbin;
pub mod notification;
pub mod collection;
pub mod analytics;
pub mod user_profile;

pub use user::{CurrentUser, User};
pub use dustbin::{BinKind, Dustbin, FillStatus};
pub use notification::{Notification, NotificationKind};
pub use collection::{Collection, CollectionStatus};
pub use analytics::{AnalyticsRecord, AnalyticsSummary};
pub use user_profile::{OrgCategory, UserProfile};

use chrono::{SecondsFormat, Utc};

/// ISO-8601 UTC with millisecond precision, e.g. `2026-10-15T08:30:00.000Z`.
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
