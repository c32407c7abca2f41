use std::io::{self, BufRead, Write};
use std::sync::mpsc::{self, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Context;
use chrono::Local;
use crawl_client::{CommandSettled, LocalCrawlService, Orchestrator, OrchestratorHandle};
use crawl_core::{Command, JobStore};
use crawl_logging::{crawl_debug, crawl_info};

use crate::config::{build_backend, DashboardConfig};
use crate::ui::input::{parse_input, Input};
use crate::ui::render::{render, render_analysis, render_notification};
use crate::ui::USAGE;

const TICK: Duration = Duration::from_millis(50);

pub fn run(config: DashboardConfig) -> anyhow::Result<()> {
    let backend = build_backend(&config.backend)?;
    let store = Arc::new(JobStore::new());
    let orchestrator =
        Orchestrator::new(backend.service, store.clone()).with_policies(config.policies);
    let handle = OrchestratorHandle::spawn(orchestrator).context("failed to start orchestrator")?;

    let input_rx = spawn_input_reader();
    let mut out = io::stdout().lock();
    writeln!(out, "{USAGE}")?;

    let mut dashboard = Dashboard {
        handle,
        store,
        simulator: backend.simulator,
        refresh_interval: Duration::from_secs(config.refresh_interval_secs),
        last_refresh: Instant::now(),
    };
    dashboard.handle.send(Command::Refresh);

    let result = dashboard.event_loop(&input_rx, &mut out);

    let Dashboard { handle, .. } = dashboard;
    for settled in handle.shutdown() {
        print_settled(&mut out, &settled)?;
    }
    crawl_info!("Crawl dashboard stopped");
    result
}

struct Dashboard {
    handle: OrchestratorHandle,
    store: Arc<JobStore>,
    simulator: Option<Arc<LocalCrawlService>>,
    refresh_interval: Duration,
    last_refresh: Instant,
}

impl Dashboard {
    fn event_loop(
        &mut self,
        input_rx: &mpsc::Receiver<String>,
        out: &mut impl Write,
    ) -> anyhow::Result<()> {
        loop {
            match input_rx.try_recv() {
                Ok(line) => {
                    if !self.handle_line(&line, out)? {
                        return Ok(());
                    }
                    continue;
                }
                // Input closed: stop once the pending commands have settled.
                Err(TryRecvError::Disconnected) => return Ok(()),
                Err(TryRecvError::Empty) => {}
            }

            while let Some(settled) = self.handle.try_recv() {
                print_settled(out, &settled)?;
            }

            if self.refresh_due() {
                if let Some(simulator) = &self.simulator {
                    let moved = simulator.advance();
                    crawl_debug!("Simulated crawl progress for {} jobs", moved);
                }
                self.handle.send(Command::Refresh);
                self.last_refresh = Instant::now();
            }

            if self.store.consume_dirty() {
                write!(out, "{}", render(&self.store.view()))?;
                out.flush()?;
            }

            thread::sleep(TICK);
        }
    }

    /// Returns `false` when the operator asked to quit.
    fn handle_line(&mut self, line: &str, out: &mut impl Write) -> anyhow::Result<bool> {
        match parse_input(line) {
            Ok(Input::Command(command)) => {
                crawl_debug!("Operator issued {}", command);
                self.handle.send(command);
            }
            Ok(Input::List) => write!(out, "{}", render(&self.store.view()))?,
            Ok(Input::Help) => writeln!(out, "{USAGE}")?,
            Ok(Input::Quit) => return Ok(false),
            Err(err) => writeln!(out, "{err} (type `help` for commands)")?,
        }
        out.flush()?;
        Ok(true)
    }

    fn refresh_due(&self) -> bool {
        !self.refresh_interval.is_zero() && self.last_refresh.elapsed() >= self.refresh_interval
    }
}

fn print_settled(out: &mut impl Write, settled: &CommandSettled) -> io::Result<()> {
    // Periodic refreshes only speak up when they fail.
    if settled.command == Command::Refresh && !settled.notification.is_error() {
        return Ok(());
    }
    writeln!(out, "{}", render_notification(&settled.notification, Local::now()))?;
    if let Some(analysis) = &settled.notification.analysis {
        write!(out, "{}", render_analysis(analysis))?;
    }
    Ok(())
}

fn spawn_input_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}
