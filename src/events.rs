use tokio::sync::broadcast;

pub const DUSTBINS_UPDATED: &str = "dustbinsUpdated";
pub const NOTIFICATIONS_UPDATED: &str = "notificationsUpdated";

/// A change notice for one user's dashboard. Carries no row data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppEvent {
    pub user_id: String,
    pub name: &'static str,
}

/// Fire-and-forget: no subscribers is not an error.
pub fn publish(tx: &broadcast::Sender<AppEvent>, user_id: &str, name: &'static str) {
    let _ = tx.send(AppEvent {
        user_id: user_id.to_string(),
        name,
    });
}
