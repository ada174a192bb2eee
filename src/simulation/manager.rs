//! Session orchestration: shared population, worker threads, shutdown
//!
//! Three workers share one population arena:
//! - movement: exclusive move pass, then shared-lock proximity scan
//! - combat: drains the fight queue, mutating liveness under the write lock
//! - render: periodic snapshots, and the run-length timer that triggers stop
//!
//! Lock order is always population before queue. Observers are called with
//! no lock held. A panic inside one loop iteration is logged and the worker
//! carries on with the next one.

use std::fmt;
use std::io::{self, Write};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicU8, Ordering};
use std::sync::{Arc, Condvar, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::combat::observer::ObserverSet;
use crate::combat::queue::{FightQueue, FightTask};
use crate::combat::resolver::{CombatResolver, FightOutcome};
use crate::core::config::SimulationConfig;
use crate::core::error::{panic_message, ArenaError, Result};
use crate::core::types::MapBounds;
use crate::entity::agent::Agent;
use crate::entity::factory::AgentFactory;
use crate::simulation::render::{DensityGrid, StatusLine, SurvivorReport};
use crate::simulation::scanner::ProximityScanner;

/// Generator streams, one per consumer of randomness
const STREAM_POPULATION: u64 = 0;
const STREAM_MOVEMENT: u64 = 1;
const STREAM_COMBAT: u64 = 2;

/// Lifecycle of one session; transitions only move forward
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RunState {
    Idle = 0,
    Running = 1,
    Stopping = 2,
    Stopped = 3,
}

impl RunState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => RunState::Idle,
            1 => RunState::Running,
            2 => RunState::Stopping,
            _ => RunState::Stopped,
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunState::Idle => "idle",
            RunState::Running => "running",
            RunState::Stopping => "stopping",
            RunState::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// State reachable from every worker
struct Shared {
    config: SimulationConfig,
    bounds: MapBounds,
    agents: RwLock<Vec<Agent>>,
    queue: FightQueue,
    scanner: ProximityScanner,
    resolver: CombatResolver,
    observers: ObserverSet,

    state: AtomicU8,
    running: AtomicBool,
    stop_requested: AtomicBool,
    /// Set once the only producer of fight tasks has exited
    movement_finished: AtomicBool,
    fights_processed: AtomicU64,

    pacer: Mutex<()>,
    pace: Condvar,
}

impl Shared {
    fn read_agents(&self) -> RwLockReadGuard<'_, Vec<Agent>> {
        self.agents.read().unwrap_or_else(|poisoned| {
            tracing::warn!("Population lock poisoned, continuing with last state");
            poisoned.into_inner()
        })
    }

    fn write_agents(&self) -> RwLockWriteGuard<'_, Vec<Agent>> {
        self.agents.write().unwrap_or_else(|poisoned| {
            tracing::warn!("Population lock poisoned, continuing with last state");
            poisoned.into_inner()
        })
    }

    fn state(&self) -> RunState {
        RunState::from_u8(self.state.load(Ordering::SeqCst))
    }

    fn transition(&self, from: RunState, to: RunState) -> bool {
        self.state
            .compare_exchange(from as u8, to as u8, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    fn stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::SeqCst)
    }

    fn request_stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        if !self.stop_requested.swap(true, Ordering::SeqCst) {
            tracing::info!("Stop requested");
        }
        self.transition(RunState::Running, RunState::Stopping);

        self.queue.wake_all();
        drop(self.pacer.lock().unwrap_or_else(PoisonError::into_inner));
        self.pace.notify_all();
    }

    /// Sleep for `period` unless a stop arrives first; true means stop
    fn pause(&self, period: Duration) -> bool {
        let guard = self.pacer.lock().unwrap_or_else(PoisonError::into_inner);
        let _ = self
            .pace
            .wait_timeout_while(guard, period, |_| !self.stop_requested())
            .unwrap_or_else(PoisonError::into_inner);
        self.stop_requested()
    }

    fn alive_count(&self) -> usize {
        self.read_agents().iter().filter(|a| a.is_alive()).count()
    }

    fn density_grid(&self) -> DensityGrid {
        let agents = self.read_agents();
        DensityGrid::from_agents(
            &agents,
            self.config.map_width,
            self.config.map_height,
            self.config.grid_cell_size,
        )
    }

    fn survivors(&self) -> SurvivorReport {
        SurvivorReport::from_agents(&self.read_agents())
    }

    fn print(&self, block: impl fmt::Display) {
        if !self.config.render_snapshots {
            return;
        }
        let mut out = io::stdout().lock();
        if let Err(e) = writeln!(out, "\n{}", block) {
            tracing::warn!(error = %e, "Failed to render to stdout");
        }
    }
}

/// Marks the producer as finished even if the movement loop unwinds
struct ProducerGuard<'a>(&'a Shared);

impl Drop for ProducerGuard<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            tracing::error!("Movement worker panicked, ending the session");
            self.0.request_stop();
        }
        self.0.movement_finished.store(true, Ordering::SeqCst);
        self.0.queue.wake_all();
    }
}

/// Ends the session if a worker thread unwinds past its loop
struct StopOnPanic<'a> {
    shared: &'a Shared,
    worker: &'static str,
}

impl Drop for StopOnPanic<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            tracing::error!(worker = self.worker, "Worker panicked, ending the session");
            self.shared.request_stop();
        }
    }
}

/// Run one loop iteration; a panic is logged and yields `None`
fn contained<T>(worker: &'static str, body: impl FnOnce() -> T) -> Option<T> {
    match panic::catch_unwind(AssertUnwindSafe(body)) {
        Ok(value) => Some(value),
        Err(payload) => {
            tracing::error!(worker, panic = %panic_message(&*payload), "Worker iteration panicked");
            None
        }
    }
}

fn movement_worker(shared: Arc<Shared>, mut rng: ChaCha8Rng) {
    let _producer = ProducerGuard(&shared);
    tracing::info!("Movement worker started");

    let mut ticks: u64 = 0;
    while !shared.stop_requested() {
        let detected = contained("movement", || {
            {
                let mut agents = shared.write_agents();
                for agent in agents.iter_mut().filter(|a| a.is_alive()) {
                    agent.move_within(shared.bounds, &mut rng);
                }
            }
            let agents = shared.read_agents();
            shared.scanner.scan_all(&agents, &shared.queue)
        });

        ticks += 1;
        tracing::trace!(tick = ticks, ?detected, "Movement tick");

        if shared.pause(shared.config.movement_tick()) {
            break;
        }
    }

    tracing::info!(ticks, "Movement worker stopped");
}

fn combat_worker(shared: Arc<Shared>, mut rng: ChaCha8Rng) {
    let _guard = StopOnPanic { shared: &shared, worker: "combat" };
    tracing::info!("Combat worker started");
    let wait = shared.config.queue_wait();

    loop {
        // Waking on "producer finished" rather than "stop requested" keeps
        // the last scan's tasks from slipping in after the drain.
        match shared.queue.pop_timeout(wait, &shared.movement_finished) {
            Some(task) => {
                contained("combat", || process_fight(&shared, task, &mut rng));
            }
            None => {
                if shared.stop_requested()
                    && shared.movement_finished.load(Ordering::SeqCst)
                    && shared.queue.is_empty()
                {
                    break;
                }
            }
        }
    }

    tracing::info!(
        fights = shared.fights_processed.load(Ordering::SeqCst),
        "Combat worker stopped"
    );
}

fn process_fight(shared: &Shared, task: FightTask, rng: &mut ChaCha8Rng) {
    let outcome = {
        let mut agents = shared.write_agents();
        shared.resolver.resolve(&mut agents, task, rng)
    };

    match outcome {
        FightOutcome::Stale => {
            tracing::trace!(attacker = task.attacker.0, defender = task.defender.0, "Dropped stale fight");
        }
        FightOutcome::Resolved { deaths } => {
            shared.fights_processed.fetch_add(1, Ordering::SeqCst);
            for death in deaths {
                tracing::debug!(killer = %death.killer_label, victim = %death.victim_label, "Kill");
                shared.observers.notify(&death.killer_label, &death.victim_label);
            }
        }
    }
}

fn render_worker(shared: Arc<Shared>, started: Instant) {
    let _guard = StopOnPanic { shared: &shared, worker: "render" };
    tracing::info!("Render worker started");
    let run_duration = shared.config.run_duration();
    let summary_every = u64::from(shared.config.summary_every_frames);

    let mut frame: u64 = 0;
    while !shared.stop_requested() {
        let elapsed = started.elapsed();
        if elapsed >= run_duration {
            tracing::info!(elapsed_secs = elapsed.as_secs(), "Run duration reached");
            shared.request_stop();
            break;
        }

        contained("render", || render_frame(&shared, frame, summary_every, elapsed));

        frame += 1;
        if shared.pause(shared.config.render_tick()) {
            break;
        }
    }

    shared.print(shared.density_grid());
    let survivors = shared.survivors();
    tracing::info!(survivors = survivors.total(), "Render worker stopped");
    shared.print(survivors);
}

fn render_frame(shared: &Shared, frame: u64, summary_every: u64, elapsed: Duration) {
    shared.print(shared.density_grid());

    if frame % summary_every == 0 {
        let status = StatusLine {
            elapsed_secs: elapsed.as_secs(),
            alive: shared.alive_count(),
            fights_processed: shared.fights_processed.load(Ordering::SeqCst),
        };
        tracing::info!(
            elapsed_secs = status.elapsed_secs,
            alive = status.alive,
            fights = status.fights_processed,
            "Status"
        );
        shared.print(status);
    }
}

/// Owns one simulation session
pub struct GameManager {
    shared: Arc<Shared>,
    workers: Vec<JoinHandle<()>>,
}

impl GameManager {
    /// New session with a randomly generated population
    pub fn new(config: SimulationConfig, observers: ObserverSet) -> Result<Self> {
        config.validate()?;
        let mut rng = worker_rng(config.seed, STREAM_POPULATION);
        let agents = AgentFactory::new(config.bounds()).populate(config.initial_agents, &mut rng);
        Self::with_agents(config, agents, observers)
    }

    /// New session over a caller-supplied population
    pub fn with_agents(
        config: SimulationConfig,
        agents: Vec<Agent>,
        observers: ObserverSet,
    ) -> Result<Self> {
        config.validate()?;
        tracing::info!(
            agents = agents.len(),
            observers = observers.len(),
            range = config.combat_range,
            "Game manager ready"
        );

        let shared = Shared {
            bounds: config.bounds(),
            scanner: ProximityScanner::new(config.combat_range),
            resolver: CombatResolver::standard(config.combat_range),
            agents: RwLock::new(agents),
            queue: FightQueue::new(),
            observers,
            state: AtomicU8::new(RunState::Idle as u8),
            running: AtomicBool::new(false),
            stop_requested: AtomicBool::new(false),
            movement_finished: AtomicBool::new(false),
            fights_processed: AtomicU64::new(0),
            pacer: Mutex::new(()),
            pace: Condvar::new(),
            config,
        };

        Ok(Self {
            shared: Arc::new(shared),
            workers: Vec::new(),
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.shared.config
    }

    pub fn state(&self) -> RunState {
        self.shared.state()
    }

    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::SeqCst)
    }

    /// Spawn the movement, combat and render workers
    ///
    /// Only valid from `Idle`. If a worker fails to spawn, the ones already
    /// started are stopped and joined before the error is returned.
    pub fn start(&mut self) -> Result<()> {
        if !self.shared.transition(RunState::Idle, RunState::Running) {
            return Err(ArenaError::InvalidState(format!(
                "cannot start a session that is {}",
                self.state()
            )));
        }
        self.shared.running.store(true, Ordering::SeqCst);

        let seed = self.shared.config.seed;
        let started = Instant::now();

        let shared = Arc::clone(&self.shared);
        let rng = worker_rng(seed, STREAM_MOVEMENT);
        if let Err(e) = self.spawn("movement", move || movement_worker(shared, rng)) {
            // No producer will ever run
            self.shared.movement_finished.store(true, Ordering::SeqCst);
            return Err(e);
        }

        let shared = Arc::clone(&self.shared);
        let rng = worker_rng(seed, STREAM_COMBAT);
        self.spawn("combat", move || combat_worker(shared, rng))?;

        let shared = Arc::clone(&self.shared);
        self.spawn("render", move || render_worker(shared, started))?;

        tracing::info!(
            duration_secs = self.shared.config.run_duration_secs,
            "Simulation started"
        );
        Ok(())
    }

    fn spawn<F>(&mut self, name: &str, body: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        match thread::Builder::new().name(name.to_string()).spawn(body) {
            Ok(handle) => {
                self.workers.push(handle);
                Ok(())
            }
            Err(e) => {
                tracing::error!(worker = name, error = %e, "Failed to spawn worker");
                self.stop();
                Err(e.into())
            }
        }
    }

    /// Ask every worker to finish its current unit of work and exit
    ///
    /// Non-blocking; pair with `join`.
    pub fn request_stop(&self) {
        self.shared.transition(RunState::Idle, RunState::Stopped);
        self.shared.request_stop();
    }

    /// Wait for all workers; the session ends `Stopped`
    ///
    /// Without a prior stop request this blocks until the run length elapses.
    pub fn join(&mut self) {
        for handle in self.workers.drain(..) {
            let name = handle.thread().name().unwrap_or("worker").to_string();
            if handle.join().is_err() {
                tracing::error!(worker = %name, "Worker panicked");
            }
        }
        self.shared.running.store(false, Ordering::SeqCst);
        if self.shared.transition(RunState::Stopping, RunState::Stopped)
            || self.shared.transition(RunState::Running, RunState::Stopped)
        {
            tracing::info!(
                fights = self.fights_processed(),
                survivors = self.alive_count(),
                "Simulation stopped"
            );
        }
    }

    pub fn stop(&mut self) {
        self.request_stop();
        self.join();
    }

    /// Start and block until the configured run length has elapsed
    pub fn run(&mut self) -> Result<()> {
        self.start()?;
        self.join();
        Ok(())
    }

    /// Snapshot copy of the population
    pub fn agents(&self) -> Vec<Agent> {
        self.shared.read_agents().clone()
    }

    pub fn alive_count(&self) -> usize {
        self.shared.alive_count()
    }

    pub fn fights_processed(&self) -> u64 {
        self.shared.fights_processed.load(Ordering::SeqCst)
    }

    pub fn queue_len(&self) -> usize {
        self.shared.queue.len()
    }

    /// Queue a fight directly, bypassing the scanner
    pub fn enqueue(&self, task: FightTask) {
        self.shared.queue.push(task);
    }

    pub fn density_grid(&self) -> DensityGrid {
        self.shared.density_grid()
    }

    pub fn survivors(&self) -> SurvivorReport {
        self.shared.survivors()
    }
}

impl Drop for GameManager {
    fn drop(&mut self) {
        if !self.workers.is_empty() {
            self.stop();
        }
    }
}

impl fmt::Debug for GameManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameManager")
            .field("state", &self.state())
            .field("workers", &self.workers.len())
            .field("fights_processed", &self.fights_processed())
            .finish()
    }
}

/// Independent generator per worker; seeded runs split one seed into streams
fn worker_rng(seed: Option<u64>, stream: u64) -> ChaCha8Rng {
    let mut rng = match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };
    rng.set_stream(stream);
    rng
}
