//! Countdown timer for timed quiz attempts.
//!
//! Expiry sends the owning session's id on a channel; the receiver checks
//! that id against the current session before auto-submitting, so a stale
//! timer left over from a replaced session can never finalize the wrong
//! attempt. The countdown itself never touches session state.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use uuid::Uuid;

/// Handle to a running countdown.
///
/// Cancelling (or dropping) the handle aborts the timer task; a cancelled
/// countdown never sends.
pub struct Countdown {
    session_id: Uuid,
    handle: JoinHandle<()>,
}

impl Countdown {
    /// Spawn a timer that sends `session_id` on `tx` after `remaining`.
    pub fn start(session_id: Uuid, remaining: Duration, tx: mpsc::Sender<Uuid>) -> Self {
        let handle = tokio::spawn(async move {
            tokio::time::sleep(remaining).await;
            // A closed receiver means nobody cares about expiry any more.
            let _ = tx.send(session_id).await;
        });
        Self { session_id, handle }
    }

    /// The session this countdown belongs to.
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Stop the timer; the expiry message will never be sent.
    pub fn cancel(&self) {
        self.handle.abort();
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn fires_once_the_time_is_up() {
        let (tx, mut rx) = mpsc::channel(1);
        let id = Uuid::new_v4();
        let _countdown = Countdown::start(id, Duration::from_secs(60), tx);

        tokio::time::sleep(Duration::from_secs(61)).await;
        assert_eq!(rx.try_recv().unwrap(), id);
    }

    #[tokio::test(start_paused = true)]
    async fn does_not_fire_early() {
        let (tx, mut rx) = mpsc::channel(1);
        let _countdown = Countdown::start(Uuid::new_v4(), Duration::from_secs(60), tx);

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_countdown_never_fires() {
        let (tx, mut rx) = mpsc::channel(1);
        let countdown = Countdown::start(Uuid::new_v4(), Duration::from_secs(60), tx);
        countdown.cancel();

        tokio::time::sleep(Duration::from_secs(120)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_handle_cancels() {
        let (tx, mut rx) = mpsc::channel(1);
        drop(Countdown::start(Uuid::new_v4(), Duration::from_secs(60), tx));

        tokio::time::sleep(Duration::from_secs(120)).await;
        assert!(rx.try_recv().is_err());
    }
}
