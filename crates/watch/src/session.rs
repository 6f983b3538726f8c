//! How a tracking run ended, and the matching process exit status.

use std::future::Future;

use autoinsight_tracker::TrackingOutcome;
use tokio::sync::oneshot;

const EXIT_SUCCESS: u8 = 0;
const EXIT_FAILURE: u8 = 1;
const EXIT_INTERRUPTED: u8 = 130;

#[derive(Debug)]
pub enum SessionEnd {
    /// The tracker delivered a terminal outcome.
    Finished(TrackingOutcome),
    /// The user interrupted tracking before it finished.
    Interrupted,
    /// The tracking task went away without delivering an outcome.
    Abandoned,
}

impl SessionEnd {
    pub fn exit_status(&self) -> u8 {
        match self {
            Self::Finished(outcome) if outcome.is_completed() => EXIT_SUCCESS,
            Self::Finished(_) | Self::Abandoned => EXIT_FAILURE,
            Self::Interrupted => EXIT_INTERRUPTED,
        }
    }
}

/// Wait for the terminal outcome or an interrupt, whichever comes first.
///
/// If the interrupt listener itself fails, the error is logged and the
/// outcome is awaited without it.
pub async fn wait_for_end<S>(
    interrupt: S,
    mut outcome_rx: oneshot::Receiver<TrackingOutcome>,
) -> SessionEnd
where
    S: Future<Output = std::io::Result<()>>,
{
    let received = tokio::select! {
        biased;
        received = &mut outcome_rx => Some(received),
        signal = interrupt => match signal {
            Ok(()) => return SessionEnd::Interrupted,
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for interrupt, waiting for the outcome");
                None
            }
        },
    };
    let received = match received {
        Some(received) => received,
        None => outcome_rx.await,
    };

    match received {
        Ok(outcome) => SessionEnd::Finished(outcome),
        Err(_) => SessionEnd::Abandoned,
    }
}
