//! Simulation observer trait for progress reporting and display.

use ts_core::Tick;

use crate::SimSnapshot;

/// Callbacks invoked by [`Simulation::tick_with`][crate::Simulation::tick_with]
/// and the real-time [`Ticker`][crate::Ticker].
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
///
/// `on_tick_start` runs while the tick holds the simulation's locks and must
/// not call back into the [`Simulation`][crate::Simulation].  The other hooks
/// run after the tick has released them and may issue commands.
///
/// # Example: status line printer
///
/// ```rust,ignore
/// struct StatusLine { every: u64 }
///
/// impl SimObserver for StatusLine {
///     fn on_snapshot(&mut self, snap: &SimSnapshot) {
///         if snap.clock_secs % self.every == 0 {
///             println!("{}s: {}", snap.clock_secs, snap.congestion_summary());
///         }
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called at the start of each tick, after the clock has advanced.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called at the end of each tick.
    ///
    /// `transitions` is the number of phase timers that fired this tick.
    fn on_tick_end(&mut self, _tick: Tick, _transitions: usize) {}

    /// Called once per tick with the aggregated snapshot.
    fn on_snapshot(&mut self, _snapshot: &SimSnapshot) {}

    /// Called once when a batch run or the real-time ticker finishes.
    fn on_sim_end(&mut self, _final_tick: Tick) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
