//! Emergency auto-clear timers.
//!
//! Each room gets exactly one long-lived clear task, spawned once on the
//! host's [`TimerHost`] when the room's [`ClearTimer`] is created.  Arming,
//! cancelling and shutting down are commands sent to that task through a
//! [`Signal`]; only the latest command counts, so a re-arm replaces the
//! pending deadline instead of starting a second timer.
//!
//! ```text
//!   ClearTimer::rearm(hold) ──Signal──▶ clear task (one per room)
//!                                          │  Timer::at(deadline)
//!                                          ▼
//!                                 EmergencyState::clear()
//! ```
//!
//! The executor's run queue holds at most one entry per task, so a host
//! never has more live rooms than executor slots.  [`TimerHost::clear_timer`]
//! refuses the room that would exceed them instead of spawning past the
//! queue.  Nothing fires unless the host is driving [`TimerHost::run`].

use std::cell::{Cell, RefCell};
use std::future::Future;
use std::rc::Rc;

use edge_executor::{LocalExecutor, Task};
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Instant, Timer};
use futures_lite::future;
use log::{debug, warn};

use crate::error::SchedulerError;
use crate::safety::EmergencyState;

/// Executor slots, and therefore rooms, per [`TimerHost`].
pub const EXECUTOR_TASKS: usize = 8;

/// Executor type the clear tasks run on.
pub type Executor = LocalExecutor<'static, EXECUTOR_TASKS>;

enum ClearCommand {
    Arm(Instant),
    Cancel,
    Stop,
}

/// State shared between a [`ClearTimer`] and its task.
struct ClearShared {
    state: EmergencyState,
    commands: Signal<NoopRawMutex, ClearCommand>,
    pending: Cell<bool>,
}

// ───────────────────────────────────────────────────────────────
// TimerHost
// ───────────────────────────────────────────────────────────────

/// Host-side owner of the executor that runs every room's clear task.
pub struct TimerHost {
    tasks: RefCell<Vec<Task<()>>>,
    executor: Executor,
}

impl Default for TimerHost {
    fn default() -> Self {
        Self::new()
    }
}

impl TimerHost {
    pub fn new() -> Self {
        Self {
            tasks: RefCell::new(Vec::with_capacity(EXECUTOR_TASKS)),
            executor: Executor::new(),
        }
    }

    /// Rooms this host can serve.
    pub const fn capacity(&self) -> usize {
        EXECUTOR_TASKS
    }

    /// Clear tasks still alive.  A dropped [`ClearTimer`] frees its slot
    /// once the host has run its task to completion.
    pub fn live_timers(&self) -> usize {
        let mut tasks = self.tasks.borrow_mut();
        tasks.retain(|t| !t.is_finished());
        tasks.len()
    }

    /// Spawn the clear task for a new room.
    ///
    /// Fails with [`SchedulerError::Full`] when every slot is taken.
    pub fn clear_timer(&self) -> Result<ClearTimer, SchedulerError> {
        let live = self.live_timers();
        if live >= EXECUTOR_TASKS {
            warn!("TimerHost: all {EXECUTOR_TASKS} clear-timer slots in use");
            return Err(SchedulerError::Full {
                capacity: EXECUTOR_TASKS,
            });
        }

        let shared = Rc::new(ClearShared {
            state: EmergencyState::new(),
            commands: Signal::new(),
            pending: Cell::new(false),
        });
        let task = self.executor.spawn(clear_loop(shared.clone()));
        self.tasks.borrow_mut().push(task);
        debug!("TimerHost: clear timer {} of {EXECUTOR_TASKS} spawned", live + 1);
        Ok(ClearTimer { shared })
    }

    /// Drive the clear tasks until `fut` completes.
    pub async fn run<F: Future>(&self, fut: F) -> F::Output {
        self.executor.run(fut).await
    }
}

async fn clear_loop(shared: Rc<ClearShared>) {
    let mut deadline: Option<Instant> = None;
    loop {
        let command = match deadline {
            None => shared.commands.wait().await,
            Some(at) => {
                // Commands are polled first so a re-arm that lands after the
                // old deadline still wins over the stale clear.
                let next = future::or(async { Some(shared.commands.wait().await) }, async {
                    Timer::at(at).await;
                    None
                })
                .await;
                match next {
                    Some(command) => command,
                    None => {
                        shared.state.clear();
                        shared.pending.set(false);
                        deadline = None;
                        continue;
                    }
                }
            }
        };
        match command {
            ClearCommand::Arm(at) => deadline = Some(at),
            ClearCommand::Cancel => deadline = None,
            ClearCommand::Stop => break,
        }
    }
    debug!("ClearTimer: task stopped");
}

// ───────────────────────────────────────────────────────────────
// ClearTimer
// ───────────────────────────────────────────────────────────────

/// One room's handle to its clear task and emergency override.
pub struct ClearTimer {
    shared: Rc<ClearShared>,
}

impl ClearTimer {
    /// The override flag this timer clears.
    pub fn state(&self) -> EmergencyState {
        self.shared.state.clone()
    }

    /// Schedule a clear `hold` from now, replacing any earlier deadline.
    pub fn rearm(&mut self, hold: Duration) {
        if self.shared.pending.get() {
            debug!("ClearTimer: superseding pending clear");
        }
        self.shared.pending.set(true);
        self.shared
            .commands
            .signal(ClearCommand::Arm(Instant::now() + hold));
        debug!("ClearTimer: clear in {}ms", hold.as_millis());
    }

    /// Drop the pending clear without touching the override.
    pub fn cancel(&mut self) {
        self.shared.pending.set(false);
        self.shared.commands.signal(ClearCommand::Cancel);
    }

    pub fn is_pending(&self) -> bool {
        self.shared.pending.get()
    }
}

impl Drop for ClearTimer {
    fn drop(&mut self) {
        self.shared.commands.signal(ClearCommand::Stop);
    }
}
