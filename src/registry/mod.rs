//! The single source of truth for named loggers and the global policy applied to them.
//!
//! Independent locks guard the logger map (with all policy knobs), the default-logger fast
//! view, the periodic flusher and the worker-pool handle. Lookups never wait on flusher
//! start/stop.
//!
//! The map lock is never held while a sink or backtrace lock is taken: formatter, error
//! handler and backtrace changes update the stored policy and snapshot the loggers under the
//! lock, then apply outside it. Level changes only touch atomics and stay under the lock.
//! A sink's delivery handler and callbacks passed to [`Registry::apply_all`] may therefore
//! call back into the registry.

mod from_config;
mod periodic;

pub use from_config::LEVEL_ENV;
use periodic::PeriodicWorker;

use crate::Error;
use crate::fmt::{Formatter, PatternFormatter};
use crate::internal;
use crate::level::{Level, LevelConfig};
use crate::logger::{ErrorHandler, Logger};
use crate::pool::ThreadPool;
use crate::sink::{ColorMode, ColorSink};
use parking_lot::{MappedRwLockReadGuard, Mutex, RwLock, RwLockReadGuard};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, Weak};
use std::time::Duration;

/// Name of the logger every new registry starts with.
pub const DEFAULT_LOGGER_NAME: &str = "default";

struct State {
    loggers: HashMap<String, Arc<Logger>>,
    default: Option<Arc<Logger>>,
    formatter: Box<dyn Formatter>,
    level: Level,
    flush_level: Level,
    levels: LevelConfig,
    error_handler: Option<ErrorHandler>,
    automatic_registration: bool,
    backtrace_capacity: usize,
    /// Bumped by every fan-out applied outside the lock.
    policy_version: u64,
}

/// The part of the global policy that is applied outside the map lock.
struct Policy {
    formatter: Box<dyn Formatter>,
    error_handler: Option<ErrorHandler>,
    backtrace_capacity: usize,
}

impl Policy {
    fn apply(self, logger: &Logger) {
        logger.set_formatter(self.formatter);
        if let Some(handler) = self.error_handler {
            logger.set_error_handler(Some(handler));
        }
        if self.backtrace_capacity > 0 {
            logger.enable_backtrace(self.backtrace_capacity);
        }
    }
}

impl State {
    fn register(&mut self, logger: Arc<Logger>) -> Result<(), Error> {
        let name = logger.name();
        if name.is_empty() {
            return Err(Error::EmptyName);
        }
        if self.loggers.contains_key(name) {
            return Err(Error::NameCollision(name.to_string()));
        }
        self.loggers.insert(name.to_string(), logger);
        Ok(())
    }

    fn level_for(&self, name: &str) -> Level {
        self.levels.get(name).unwrap_or(self.level)
    }

    fn snapshot(&self) -> Vec<Arc<Logger>> {
        self.loggers.values().cloned().collect()
    }

    fn policy(&self) -> Policy {
        Policy {
            formatter: self.formatter.clone_box(),
            error_handler: self.error_handler.clone(),
            backtrace_capacity: self.backtrace_capacity,
        }
    }
}

pub struct Registry {
    state: Arc<Mutex<State>>,
    /// Second view of the default logger for the lock-light fast path.
    default_view: RwLock<Option<Arc<Logger>>>,
    flusher: Mutex<Option<PeriodicWorker>>,
    pool: Mutex<Option<Arc<ThreadPool>>>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Registry whose default logger writes colored output to stdout.
    #[must_use]
    pub fn new() -> Self {
        let registry = Self::empty();
        let default = Arc::new(
            Logger::builder(DEFAULT_LOGGER_NAME)
                .sink(ColorSink::stdout(ColorMode::Automatic))
                .build(),
        );
        {
            let mut state = registry.state.lock();
            state.loggers.insert(DEFAULT_LOGGER_NAME.to_string(), Arc::clone(&default));
            state.default = Some(Arc::clone(&default));
        }
        *registry.default_view.write() = Some(default);
        registry
    }

    /// Registry with no default logger.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                loggers: HashMap::new(),
                default: None,
                formatter: Box::new(PatternFormatter::default()),
                level: Level::Info,
                flush_level: Level::Off,
                levels: LevelConfig::new(),
                error_handler: None,
                automatic_registration: true,
                backtrace_capacity: 0,
                policy_version: 0,
            })),
            default_view: RwLock::new(None),
            flusher: Mutex::new(None),
            pool: Mutex::new(None),
        }
    }

    /// Inserts `logger` under its name. Registration is always explicit here; the
    /// automatic-registration flag only affects [`initialize_logger`](Self::initialize_logger).
    ///
    /// # Errors
    /// [`Error::EmptyName`] or [`Error::NameCollision`]; the existing entry is left untouched.
    pub fn register_logger(&self, logger: Arc<Logger>) -> Result<(), Error> {
        self.state.lock().register(logger)
    }

    /// Applies the current global policy to `logger`, then registers it when automatic
    /// registration is on. The policy is applied outside the map lock; if a fan-out ran in the
    /// meantime it is applied again, so the logger never becomes visible to [`get`](Self::get)
    /// with a stale policy.
    ///
    /// # Errors
    /// Same as [`register_logger`](Self::register_logger) when registration happens.
    pub fn initialize_logger(&self, logger: Arc<Logger>) -> Result<(), Error> {
        loop {
            let (version, policy) = {
                let state = self.state.lock();
                (state.policy_version, state.policy())
            };
            policy.apply(&logger);

            let mut state = self.state.lock();
            if state.policy_version != version {
                continue;
            }
            logger.set_level(state.level_for(logger.name()));
            logger.flush_on(state.flush_level);
            if state.automatic_registration {
                state.register(logger)?;
            }
            return Ok(());
        }
    }

    /// Absence is a normal outcome, not an error.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<Logger>> {
        self.state.lock().loggers.get(name).cloned()
    }

    #[must_use]
    pub fn default_logger(&self) -> Option<Arc<Logger>> {
        self.state.lock().default.clone()
    }

    /// Fast path to the default logger: no map lock and no `Arc` clone.
    ///
    /// The returned guard blocks [`set_default_logger`](Self::set_default_logger) while held;
    /// calling it on the same thread while holding the guard deadlocks. Keep the guard for a
    /// single logging call and change the default only during startup or shutdown phases.
    #[must_use]
    pub fn default_logger_raw(&self) -> Option<MappedRwLockReadGuard<'_, Logger>> {
        RwLockReadGuard::try_map(self.default_view.read(), |default| default.as_deref()).ok()
    }

    /// Replaces the default. The new default is also registered under its name, replacing any
    /// entry there; the previous default is unregistered. `None` clears it.
    ///
    /// # Errors
    /// [`Error::EmptyName`] if the new default has no name.
    pub fn set_default_logger(&self, logger: Option<Arc<Logger>>) -> Result<(), Error> {
        if logger.as_ref().is_some_and(|l| l.name().is_empty()) {
            return Err(Error::EmptyName);
        }
        let mut state = self.state.lock();
        if let Some(old) = state.default.take()
            && state
                .loggers
                .get(old.name())
                .is_some_and(|entry| Arc::ptr_eq(entry, &old))
        {
            state.loggers.remove(old.name());
        }
        if let Some(new) = &logger {
            state.loggers.insert(new.name().to_string(), Arc::clone(new));
        }
        state.default.clone_from(&logger);
        *self.default_view.write() = logger;
        Ok(())
    }

    pub fn set_thread_pool(&self, pool: Option<Arc<ThreadPool>>) {
        *self.pool.lock() = pool;
    }

    #[must_use]
    pub fn thread_pool(&self) -> Option<Arc<ThreadPool>> {
        self.pool.lock().clone()
    }

    /// Returns the registry's pool, creating one with `make` if there is none yet.
    ///
    /// # Errors
    /// Whatever `make` returns.
    pub fn thread_pool_or_init(
        &self,
        make: impl FnOnce() -> Result<ThreadPool, Error>,
    ) -> Result<Arc<ThreadPool>, Error> {
        let mut pool = self.pool.lock();
        if let Some(existing) = pool.as_ref() {
            return Ok(Arc::clone(existing));
        }
        let created = Arc::new(make()?);
        *pool = Some(Arc::clone(&created));
        Ok(created)
    }

    /// Updates the stored policy and snapshots the loggers under the map lock. The caller
    /// applies the change to the snapshot after the lock is released.
    fn fan_out(&self, update: impl FnOnce(&mut State)) -> Vec<Arc<Logger>> {
        let mut state = self.state.lock();
        update(&mut state);
        state.policy_version += 1;
        state.snapshot()
    }

    /// Stores the template and gives every registered logger's sinks their own copy.
    pub fn set_formatter(&self, formatter: Box<dyn Formatter>) {
        let loggers = self.fan_out(|state| state.formatter = formatter.clone_box());
        for logger in &loggers {
            logger.set_formatter(formatter.clone_box());
        }
    }

    pub fn set_pattern(&self, pattern: &str) {
        self.set_formatter(Box::new(PatternFormatter::new(pattern)));
    }

    /// Also becomes the catch-all of the stored level config, so later loggers get it unless a
    /// more specific pattern matches.
    pub fn set_level(&self, level: Level) {
        let mut state = self.state.lock();
        state.level = level;
        state.levels.insert("*", level);
        for logger in state.loggers.values() {
            logger.set_level(level);
        }
    }

    #[must_use]
    pub fn level(&self) -> Level {
        self.state.lock().level
    }

    pub fn flush_on(&self, level: Level) {
        let mut state = self.state.lock();
        state.flush_level = level;
        for logger in state.loggers.values() {
            logger.flush_on(level);
        }
    }

    pub fn set_error_handler(&self, handler: Option<ErrorHandler>) {
        let loggers = self.fan_out(|state| state.error_handler.clone_from(&handler));
        for logger in &loggers {
            logger.set_error_handler(handler.clone());
        }
    }

    pub fn enable_backtrace(&self, capacity: usize) {
        let loggers = self.fan_out(|state| state.backtrace_capacity = capacity);
        for logger in &loggers {
            logger.enable_backtrace(capacity);
        }
    }

    pub fn disable_backtrace(&self) {
        let loggers = self.fan_out(|state| state.backtrace_capacity = 0);
        for logger in &loggers {
            logger.disable_backtrace();
        }
    }

    /// Starts, retimes or (with a zero interval) stops the background flush of all loggers.
    ///
    /// # Errors
    /// I/O errors from spawning the flusher thread.
    pub fn flush_every(&self, interval: Duration) -> Result<(), Error> {
        let mut flusher = self.flusher.lock();
        // Stop-then-join before a replacement starts.
        drop(flusher.take());
        if interval.is_zero() {
            return Ok(());
        }
        let state = Arc::downgrade(&self.state);
        *flusher = Some(PeriodicWorker::start(
            "logcore-flusher",
            interval,
            move || flush_snapshot(&state),
        )?);
        Ok(())
    }

    /// Current periodic flush interval, if one is running.
    #[must_use]
    pub fn flush_interval(&self) -> Option<Duration> {
        self.flusher.lock().as_ref().map(PeriodicWorker::interval)
    }

    /// Runs `f` on a snapshot of every registered logger, outside the registry lock.
    pub fn apply_all(&self, mut f: impl FnMut(&Arc<Logger>)) {
        let loggers = self.state.lock().snapshot();
        for logger in &loggers {
            f(logger);
        }
    }

    pub fn flush_all(&self) {
        self.apply_all(|logger| logger.flush());
    }

    /// Unregisters `name`, clearing the default too if it is the one dropped.
    pub fn drop_logger(&self, name: &str) -> Option<Arc<Logger>> {
        let mut state = self.state.lock();
        let removed = state.loggers.remove(name);
        if state.default.as_ref().is_some_and(|d| d.name() == name) {
            state.default = None;
            *self.default_view.write() = None;
        }
        removed
    }

    pub fn drop_all(&self) {
        let mut state = self.state.lock();
        state.loggers.clear();
        state.default = None;
        *self.default_view.write() = None;
    }

    /// Stops the flusher, flushes and drops every logger, and releases the worker pool.
    /// Safe to call more than once, including from an exit hook.
    pub fn shutdown(&self) {
        let flusher = self.flusher.lock().take();
        drop(flusher);

        self.flush_all();
        self.drop_all();

        let pool = self.pool.lock().take();
        drop(pool);
        internal::debug("REGISTRY", "Registry shut down");
    }

    pub fn set_automatic_registration(&self, enabled: bool) {
        self.state.lock().automatic_registration = enabled;
    }

    #[must_use]
    pub fn automatic_registration(&self) -> bool {
        self.state.lock().automatic_registration
    }

    /// Applies `levels` to every registered logger it matches and keeps it for loggers
    /// initialized later. Without a `*` entry, loggers no pattern names keep their level.
    pub fn update_levels(&self, levels: LevelConfig) {
        let mut state = self.state.lock();
        state.levels = levels;
        if let Some(default) = state.levels.default_level() {
            state.level = default;
        }
        for (name, logger) in &state.loggers {
            if let Some(level) = state.levels.get(name) {
                logger.set_level(level);
            }
        }
    }

    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.state.lock().loggers.keys().cloned().collect();
        names.sort();
        names
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.state.lock().loggers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.lock().loggers.is_empty()
    }
}

fn flush_snapshot(state: &Weak<Mutex<State>>) {
    let Some(state) = state.upgrade() else {
        return;
    };
    let loggers = state.lock().snapshot();
    for logger in &loggers {
        logger.flush();
    }
}

/// The process-wide registry, built on first use.
pub fn instance() -> &'static Registry {
    static REGISTRY: OnceLock<Registry> = OnceLock::new();
    REGISTRY.get_or_init(Registry::new)
}
