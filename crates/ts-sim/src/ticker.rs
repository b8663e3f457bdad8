//! `Ticker`: drives a shared [`Simulation`] in wall-clock time.
//!
//! A named background thread calls [`Simulation::tick_with`] once per
//! `SimConfig::tick_period`.  Stopping sends on a channel, which wakes the
//! thread out of its wait immediately rather than after the next period.

use std::sync::Arc;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};

use log::{debug, info, warn};

use crate::{SimObserver, SimResult, Simulation};

struct Worker<O> {
    stop_tx: Sender<()>,
    handle:  JoinHandle<O>,
}

/// Real-time driver for a shared [`Simulation`].
///
/// The observer moves onto the ticker thread on [`start`][Self::start] and is
/// handed back by [`stop`][Self::stop], so it can accumulate state across the
/// run.  Commands (incidents, snapshots) keep going through the shared
/// `Arc<Simulation>` while the ticker runs.
pub struct Ticker<O: SimObserver + Send + 'static> {
    sim:    Arc<Simulation>,
    worker: Option<Worker<O>>,
}

impl<O: SimObserver + Send + 'static> Ticker<O> {
    pub fn new(sim: Arc<Simulation>) -> Self {
        Self { sim, worker: None }
    }

    pub fn simulation(&self) -> &Arc<Simulation> {
        &self.sim
    }

    /// Whether the ticker thread is alive.
    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }

    /// Start the simulation and the ticker thread.  No-op (the observer is
    /// dropped) if the ticker is already running.
    pub fn start(&mut self, mut observer: O) -> SimResult<()> {
        if self.worker.is_some() {
            debug!("ticker already running");
            return Ok(());
        }

        let period = self.sim.config().tick_period();
        let sim = Arc::clone(&self.sim);
        let (stop_tx, stop_rx) = mpsc::channel::<()>();

        sim.start();
        let spawned = thread::Builder::new()
            .name("ts-ticker".into())
            .spawn(move || {
                loop {
                    match stop_rx.recv_timeout(period) {
                        Err(RecvTimeoutError::Timeout) => {
                            sim.tick_with(&mut observer);
                        }
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                observer.on_sim_end(sim.current_tick());
                observer
            });

        let handle = match spawned {
            Ok(handle) => handle,
            Err(e) => {
                self.sim.stop();
                return Err(e.into());
            }
        };
        info!("ticker started ({} ms per tick)", period.as_millis());
        self.worker = Some(Worker { stop_tx, handle });
        Ok(())
    }

    /// Stop the ticker thread and the simulation.  Returns the observer, or
    /// `None` if the ticker was not running.
    pub fn stop(&mut self) -> Option<O> {
        let worker = self.worker.take()?;
        // A send error means the thread already exited; join still applies.
        let _ = worker.stop_tx.send(());
        self.sim.stop();
        match worker.handle.join() {
            Ok(observer) => {
                info!("ticker stopped at {}", self.sim.current_tick());
                Some(observer)
            }
            Err(_) => {
                warn!("ticker thread panicked");
                None
            }
        }
    }

    /// Stop the ticker and reset the simulation to tick 0.
    pub fn reset(&mut self) -> Option<O> {
        let observer = self.stop();
        self.sim.reset();
        observer
    }
}

impl<O: SimObserver + Send + 'static> Drop for Ticker<O> {
    fn drop(&mut self) {
        self.stop();
    }
}
