use std::fmt;
use std::future::{Future, pending};

use tracing::warn;

/// Process signal that ends the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shutdown {
    Interrupt,
    Terminate,
}

impl fmt::Display for Shutdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Interrupt => "SIGINT",
            Self::Terminate => "SIGTERM",
        })
    }
}

/// Wait for the first SIGINT or SIGTERM.
///
/// A handler that cannot be installed is logged and never fires; the other
/// one still does.
pub async fn wait_for_shutdown() -> Shutdown {
    tokio::select! {
        () = interrupt() => Shutdown::Interrupt,
        () = terminate() => Shutdown::Terminate,
    }
}

fn interrupt() -> impl Future<Output = ()> {
    async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            warn!(error = %error, "Failed to install SIGINT handler");
            pending::<()>().await;
        }
    }
}

#[cfg(unix)]
fn terminate() -> impl Future<Output = ()> {
    use tokio::signal::unix::{SignalKind, signal};

    async {
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(error) => {
                warn!(error = %error, "Failed to install SIGTERM handler");
                pending::<()>().await;
            }
        }
    }
}

#[cfg(not(unix))]
fn terminate() -> impl Future<Output = ()> {
    pending::<()>()
}
