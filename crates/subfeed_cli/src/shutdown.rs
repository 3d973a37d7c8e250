use std::future::Future;

use console::Term;

/// Exit status used when the user interrupts a command.
pub(crate) const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Run `work` until it completes or Ctrl+C is pressed.
///
/// Returns `None` when interrupted. The cache is only written after `work`
/// finishes, so an interrupted refresh leaves the stored cache untouched.
pub(crate) async fn run_until_interrupted<F: Future>(work: F) -> Option<F::Output> {
    interruptible(work, async {
        if tokio::signal::ctrl_c().await.is_err() {
            // No handler could be installed; never resolve.
            std::future::pending::<()>().await;
        }
    })
    .await
}

async fn interruptible<F: Future>(work: F, interrupt: impl Future<Output = ()>) -> Option<F::Output> {
    tokio::select! {
        output = work => Some(output),
        () = interrupt => {
            if Term::stdout().is_term() {
                eprintln!("\n\nInterrupted, nothing was saved.");
            } else {
                tracing::warn!("Interrupted, nothing was saved");
            }
            None
        }
    }
}
