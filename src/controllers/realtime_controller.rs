use std::{convert::Infallible, time::Duration};

use axum::{
    extract::{Extension, State},
    response::{
        IntoResponse, Response,
        sse::{Event, KeepAlive, Sse},
    },
};
use tokio::sync::broadcast::{Receiver, error::RecvError};

use crate::{
    AppState,
    controllers::require_user,
    events::AppEvent,
    models::CurrentUser,
};

/// Next event for `user_id`, skipping everyone else's. `None` once the
/// channel is gone.
async fn next_for_user(rx: &mut Receiver<AppEvent>, user_id: &str) -> Option<Event> {
    loop {
        match rx.recv().await {
            Ok(evt) if evt.user_id == user_id => {
                return Some(Event::default().event(evt.name).data("1"));
            }
            Ok(_) => continue,
            // a slow client missed some; tell it to refetch everything
            Err(RecvError::Lagged(n)) => {
                tracing::debug!(user_id, skipped = n, "sse client lagged");
                return Some(Event::default().event("resync").data(n.to_string()));
            }
            Err(RecvError::Closed) => return None,
        }
    }
}

// GET /events  (SSE)
pub async fn sse_events(
    State(state): State<AppState>,
    user: Option<Extension<CurrentUser>>,
) -> Response {
    let user = match require_user(user) {
        Ok(u) => u,
        Err(e) => return e.into_response(),
    };

    let rx = state.events_tx.subscribe();
    tracing::debug!(user_id = %user.id, "sse client connected");

    let stream = futures_util::stream::unfold((rx, user.id), |(mut rx, user_id)| async move {
        let evt = next_for_user(&mut rx, &user_id).await?;
        Some((Ok::<_, Infallible>(evt), (rx, user_id)))
    });

    Sse::new(stream)
        .keep_alive(
            KeepAlive::new()
                .interval(Duration::from_secs(20))
                .text("keep-alive"),
        )
        .into_response()
}

#[cfg(test)]
mod tests {
    use tokio::sync::broadcast;

    use super::*;
    use crate::events::{DUSTBINS_UPDATED, NOTIFICATIONS_UPDATED, publish};

    #[tokio::test]
    async fn other_users_events_are_skipped() {
        let (tx, mut rx) = broadcast::channel(8);
        publish(&tx, "someone-else", DUSTBINS_UPDATED);
        publish(&tx, "me", NOTIFICATIONS_UPDATED);

        assert!(next_for_user(&mut rx, "me").await.is_some());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn closed_channel_ends_the_stream() {
        let (tx, mut rx) = broadcast::channel::<AppEvent>(8);
        drop(tx);
        assert!(next_for_user(&mut rx, "me").await.is_none());
    }
}
