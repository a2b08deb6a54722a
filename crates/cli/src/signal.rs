use std::sync::Arc;

use async_trait::async_trait;
use faultline_scenario::{OperatorSignal, SignalError};
use tokio::{
    io::{AsyncBufReadExt, BufReader, Lines, Stdin},
    sync::Mutex,
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Line-oriented operator input shared by the menu prompt and the manual-step waits.
#[derive(Clone, Debug)]
pub struct OperatorInput {
    lines: Arc<Mutex<Lines<BufReader<Stdin>>>>,
}

impl OperatorInput {
    pub fn stdin() -> Self {
        Self { lines: Arc::new(Mutex::new(BufReader::new(tokio::io::stdin()).lines())) }
    }

    /// Next input line, `None` at end of input.
    pub async fn next_line(&self) -> Result<Option<String>, SignalError> {
        self.lines.lock().await.next_line().await.map_err(|e| SignalError::Io(e.to_string()))
    }
}

#[async_trait]
impl OperatorSignal for OperatorInput {
    async fn await_proceed(&self, prompt: &str) -> Result<(), SignalError> {
        info!("{prompt}");
        match self.next_line().await? {
            Some(_) => Ok(()),
            None => Err(SignalError::Closed),
        }
    }
}

/// Cancels its token on Ctrl+C for as long as it is alive.
#[derive(Debug)]
pub struct InterruptGuard {
    token: CancellationToken,
    watcher: JoinHandle<()>,
}

impl InterruptGuard {
    /// Must be called from within the runtime.
    pub fn new() -> Self {
        let token = CancellationToken::new();
        let watcher = tokio::spawn({
            let token = token.clone();
            async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("Interrupt received, cancelling the running experiment...");
                    token.cancel();
                }
            }
        });
        Self { token, watcher }
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

impl Drop for InterruptGuard {
    fn drop(&mut self) {
        self.watcher.abort();
    }
}
