use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

pub const NOTICE: &str = "[*] Interrupted";

/// Cancels `cancel` on Ctrl-C. Once installed, Ctrl-C no longer kills the
/// process; every blocking phase watches the token instead. The task ends
/// when the token is cancelled for any reason.
pub fn watch(cancel: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            _ = cancel.cancelled() => {}
            result = tokio::signal::ctrl_c() => match result {
                Ok(()) => {
                    debug!("Received Ctrl-C");
                    cancel.cancel();
                }
                Err(err) => warn!("Unable to listen for Ctrl-C: {}", err),
            },
        }
    })
}
