use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use crate::events::EventBus;
use crate::notify::NotificationHandler;

/// Spawns the notification worker.
///
/// The task runs until every `EventBus` handle is dropped. A slow worker that
/// falls behind the channel capacity skips the missed events and keeps going.
pub fn spawn(events: &EventBus, handlers: Vec<Arc<dyn NotificationHandler>>) -> JoinHandle<()> {
    let mut rx = events.subscribe();

    tokio::spawn(async move {
        log::info!("Notification worker started ({} handlers)", handlers.len());

        loop {
            match rx.recv().await {
                Ok(event) => {
                    for handler in &handlers {
                        if let Err(e) = handler.handle(&event).await {
                            log::error!("Failed to handle {:?}: {}", event, e);
                        }
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    log::warn!("Notification worker lagged, skipped {} events", skipped);
                }
                Err(RecvError::Closed) => break,
            }
        }

        log::info!("Notification worker stopped");
    })
}
