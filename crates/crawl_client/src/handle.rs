use std::io;
use std::rc::Rc;
use std::sync::{mpsc, Arc};
use std::thread::{self, JoinHandle};

use crawl_core::{Command, JobStore, Notification};
use crawl_logging::{crawl_error, crawl_info};
use tokio::sync::mpsc as async_mpsc;
use tokio::task::LocalSet;

use crate::Orchestrator;

/// A command that has finished, with the notification to show for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSettled {
    pub command: Command,
    pub notification: Notification,
}

/// Runs an [`Orchestrator`] on a background thread.
///
/// The thread drives a single-threaded runtime; every command becomes its own
/// task, so commands interleave only while awaiting the crawl service.
pub struct OrchestratorHandle {
    cmd_tx: Option<async_mpsc::UnboundedSender<Command>>,
    event_rx: mpsc::Receiver<CommandSettled>,
    worker: Option<JoinHandle<()>>,
    store: Arc<JobStore>,
}

impl OrchestratorHandle {
    pub fn spawn(orchestrator: Orchestrator) -> io::Result<Self> {
        let (cmd_tx, mut cmd_rx) = async_mpsc::unbounded_channel::<Command>();
        let (event_tx, event_rx) = mpsc::channel();
        let store = orchestrator.store().clone();
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        let worker = thread::Builder::new()
            .name("crawl-orchestrator".to_string())
            .spawn(move || {
                let orchestrator = Rc::new(orchestrator);
                let local = LocalSet::new();
                local.block_on(&runtime, async move {
                    while let Some(command) = cmd_rx.recv().await {
                        let orchestrator = orchestrator.clone();
                        let event_tx = event_tx.clone();
                        tokio::task::spawn_local(async move {
                            let notification = orchestrator.execute(command.clone()).await;
                            let _ = event_tx.send(CommandSettled {
                                command,
                                notification,
                            });
                        });
                    }
                });
                // Let in-flight commands settle before the runtime goes away.
                runtime.block_on(local);
                crawl_info!("Orchestrator worker stopped");
            })?;

        crawl_info!("Orchestrator worker started");
        Ok(Self {
            cmd_tx: Some(cmd_tx),
            event_rx,
            worker: Some(worker),
            store,
        })
    }

    /// Queues a command; returns `false` once the worker is gone.
    pub fn send(&self, command: Command) -> bool {
        self.cmd_tx
            .as_ref()
            .is_some_and(|tx| tx.send(command).is_ok())
    }

    pub fn try_recv(&self) -> Option<CommandSettled> {
        self.event_rx.try_recv().ok()
    }

    pub fn store(&self) -> &Arc<JobStore> {
        &self.store
    }

    /// Stops accepting commands, waits for in-flight ones and clears the store.
    ///
    /// Returns the commands that settled but were not received yet.
    pub fn shutdown(mut self) -> Vec<CommandSettled> {
        self.cmd_tx.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                crawl_error!("Orchestrator worker panicked");
            }
        }
        self.store.clear();
        self.event_rx.try_iter().collect()
    }
}

impl Drop for OrchestratorHandle {
    fn drop(&mut self) {
        // Closing the channel ends the worker loop; the thread is not joined here.
        self.cmd_tx.take();
    }
}
