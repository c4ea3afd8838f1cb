//! Tests for the logger registry: registration, global policy fan-out, default logger and
//! lifecycle.

use logcore::fmt::Formatter;
use logcore::registry::DEFAULT_LOGGER_NAME;
use logcore::{
    Error, Level, LevelConfig, LogRecord, Logger, Registry, SharedBuffer, Sink, StreamSink,
    ThreadPool,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, mpsc};
use std::thread;
use std::time::Duration;

fn logger(name: &str) -> Arc<Logger> {
    Arc::new(Logger::new(name, Vec::new()))
}

#[derive(Default)]
struct CountingSink {
    logs: AtomicUsize,
    flushes: AtomicUsize,
}

impl Sink for CountingSink {
    fn log(&self, _record: &LogRecord<'_>) -> Result<(), Error> {
        self.logs.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn flush(&self) -> Result<(), Error> {
        self.flushes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn set_pattern(&self, _pattern: &str) {}

    fn set_formatter(&self, _formatter: Box<dyn Formatter>) {}

    fn set_level(&self, _level: Level) {}

    fn level(&self) -> Level {
        Level::Trace
    }
}

struct FailingSink;

impl Sink for FailingSink {
    fn log(&self, _record: &LogRecord<'_>) -> Result<(), Error> {
        Err(Error::Io(std::io::Error::other("disk full")))
    }

    fn flush(&self) -> Result<(), Error> {
        Ok(())
    }

    fn set_pattern(&self, _pattern: &str) {}

    fn set_formatter(&self, _formatter: Box<dyn Formatter>) {}

    fn set_level(&self, _level: Level) {}

    fn level(&self) -> Level {
        Level::Trace
    }
}

#[test]
fn new_registry_has_default_logger() {
    let registry = Registry::new();
    let default = registry.default_logger().unwrap();

    assert_eq!(default.name(), DEFAULT_LOGGER_NAME);
    assert!(Arc::ptr_eq(&registry.get(DEFAULT_LOGGER_NAME).unwrap(), &default));
    assert_eq!(registry.len(), 1);
}

#[test]
fn empty_registry_has_nothing() {
    let registry = Registry::empty();
    assert!(registry.is_empty());
    assert!(registry.default_logger().is_none());
    assert!(registry.default_logger_raw().is_none());
}

#[test]
fn register_duplicate_fails_and_keeps_existing() {
    let registry = Registry::empty();
    let first = logger("svc");
    registry.register_logger(Arc::clone(&first)).unwrap();

    let result = registry.register_logger(logger("svc"));
    assert!(matches!(result, Err(Error::NameCollision(ref name)) if name == "svc"));
    assert!(Arc::ptr_eq(&registry.get("svc").unwrap(), &first));
    assert_eq!(registry.len(), 1);
}

#[test]
fn register_empty_name_is_rejected() {
    let registry = Registry::empty();
    let result = registry.register_logger(logger(""));
    assert!(matches!(result, Err(Error::EmptyName)));
    assert!(registry.is_empty());
}

#[test]
fn get_missing_returns_none() {
    let registry = Registry::empty();
    assert!(registry.get("nope").is_none());
}

#[test]
fn set_level_fans_out_and_reaches_later_loggers() {
    let registry = Registry::empty();
    registry.register_logger(logger("a")).unwrap();
    registry.register_logger(logger("b")).unwrap();

    registry.set_level(Level::Warn);
    assert_eq!(registry.get("a").unwrap().level(), Level::Warn);
    assert_eq!(registry.get("b").unwrap().level(), Level::Warn);

    registry.initialize_logger(logger("c")).unwrap();
    assert_eq!(registry.get("c").unwrap().level(), Level::Warn);
    assert_eq!(registry.level(), Level::Warn);
}

#[test]
fn initialize_applies_formatter_and_flush_level() {
    let registry = Registry::empty();
    registry.set_pattern("{level}|{msg}");
    registry.flush_on(Level::Error);

    let buffer = SharedBuffer::new();
    let svc = Arc::new(
        Logger::builder("svc")
            .sink(StreamSink::new(buffer.clone()))
            .build(),
    );
    registry.initialize_logger(Arc::clone(&svc)).unwrap();

    svc.info("hi");
    assert_eq!(buffer.contents(), "info|hi\n");
    assert_eq!(svc.flush_level(), Level::Error);
}

#[test]
fn initialize_without_automatic_registration_still_applies_policy() {
    let registry = Registry::empty();
    registry.set_level(Level::Error);
    registry.set_automatic_registration(false);
    assert!(!registry.automatic_registration());

    let detached = logger("detached");
    registry.initialize_logger(Arc::clone(&detached)).unwrap();

    assert!(registry.get("detached").is_none());
    assert_eq!(detached.level(), Level::Error);

    // Explicit registration still works.
    registry.register_logger(detached).unwrap();
    assert!(registry.get("detached").is_some());
}

#[test]
fn initialize_duplicate_name_fails() {
    let registry = Registry::empty();
    registry.initialize_logger(logger("dup")).unwrap();
    let result = registry.initialize_logger(logger("dup"));
    assert!(matches!(result, Err(Error::NameCollision(_))));
}

#[test]
fn set_default_logger_registers_and_replaces() {
    let registry = Registry::new();
    let custom = logger("custom");
    registry
        .set_default_logger(Some(Arc::clone(&custom)))
        .unwrap();

    assert!(Arc::ptr_eq(&registry.get("custom").unwrap(), &custom));
    assert!(Arc::ptr_eq(&registry.default_logger().unwrap(), &custom));
    assert_eq!(
        registry.default_logger_raw().map(|l| l.name().to_string()),
        Some("custom".to_string())
    );
    assert!(registry.get(DEFAULT_LOGGER_NAME).is_none());
}

#[test]
fn set_default_logger_replaces_entry_with_same_name() {
    let registry = Registry::empty();
    registry.register_logger(logger("svc")).unwrap();

    let replacement = logger("svc");
    registry
        .set_default_logger(Some(Arc::clone(&replacement)))
        .unwrap();
    assert!(Arc::ptr_eq(&registry.get("svc").unwrap(), &replacement));
}

#[test]
fn set_default_logger_none_clears() {
    let registry = Registry::new();
    registry.set_default_logger(None).unwrap();

    assert!(registry.default_logger().is_none());
    assert!(registry.default_logger_raw().is_none());
    assert!(registry.get(DEFAULT_LOGGER_NAME).is_none());
}

#[test]
fn set_default_logger_rejects_empty_name() {
    let registry = Registry::new();
    let result = registry.set_default_logger(Some(logger("")));
    assert!(matches!(result, Err(Error::EmptyName)));
    assert!(registry.default_logger().is_some());
}

#[test]
fn drop_removes_entry_and_matching_default() {
    let registry = Registry::new();
    registry.register_logger(logger("other")).unwrap();

    assert!(registry.drop_logger("other").is_some());
    assert!(registry.get("other").is_none());
    assert!(registry.default_logger().is_some());

    assert!(registry.drop_logger(DEFAULT_LOGGER_NAME).is_some());
    assert!(registry.default_logger().is_none());
    assert!(registry.drop_logger("never-registered").is_none());
}

#[test]
fn drop_all_clears_everything() {
    let registry = Registry::new();
    let names = ["a", "b", "c"];
    for name in names {
        registry.register_logger(logger(name)).unwrap();
    }

    registry.drop_all();

    for name in names.iter().chain(std::iter::once(&DEFAULT_LOGGER_NAME)) {
        assert!(registry.get(name).is_none());
    }
    assert!(registry.default_logger().is_none());
    assert!(registry.is_empty());
}

#[test]
fn names_are_sorted() {
    let registry = Registry::empty();
    for name in ["zeta", "alpha", "mid"] {
        registry.register_logger(logger(name)).unwrap();
    }
    assert_eq!(registry.names(), vec!["alpha", "mid", "zeta"]);
}

#[test]
fn apply_all_may_call_back_into_registry() {
    let registry = Registry::new();
    registry.register_logger(logger("a")).unwrap();
    registry.register_logger(logger("b")).unwrap();

    let mut visited = 0;
    registry.apply_all(|l| {
        assert!(registry.get(l.name()).is_some());
        registry.set_level(Level::Debug);
        visited += 1;
    });

    assert_eq!(visited, 3);
    assert_eq!(registry.get("a").unwrap().level(), Level::Debug);
}

#[test]
fn update_levels_applies_patterns_and_default() {
    let registry = Registry::empty();
    for name in ["net", "db.pool", "ui"] {
        registry.register_logger(logger(name)).unwrap();
    }
    registry.set_level(Level::Warn);
    registry.get("ui").unwrap().set_level(Level::Trace);

    registry.update_levels(
        LevelConfig::new()
            .with("net", Level::Debug)
            .with("db.*", Level::Trace),
    );
    assert_eq!(registry.get("net").unwrap().level(), Level::Debug);
    assert_eq!(registry.get("db.pool").unwrap().level(), Level::Trace);
    // No pattern names "ui" and there is no "*" entry, so its own level stays.
    assert_eq!(registry.get("ui").unwrap().level(), Level::Trace);
    assert_eq!(registry.level(), Level::Warn);

    registry.initialize_logger(logger("db.cache")).unwrap();
    assert_eq!(registry.get("db.cache").unwrap().level(), Level::Trace);

    registry.update_levels(LevelConfig::new().with("*", Level::Error));
    assert_eq!(registry.get("net").unwrap().level(), Level::Error);
    assert_eq!(registry.get("ui").unwrap().level(), Level::Error);
    assert_eq!(registry.level(), Level::Error);

    registry.initialize_logger(logger("late")).unwrap();
    assert_eq!(registry.get("late").unwrap().level(), Level::Error);
}

#[test]
fn delivery_handler_can_reenter_registry_during_fan_out() {
    let registry = Arc::new(Registry::empty());
    let sink = Arc::new(StreamSink::new(SharedBuffer::new()));
    let lookups = Arc::new(AtomicUsize::new(0));
    {
        let registry = Arc::clone(&registry);
        let lookups = Arc::clone(&lookups);
        sink.set_delivery_handler(move |_bytes| {
            if registry.get("svc").is_some() {
                lookups.fetch_add(1, Ordering::SeqCst);
            }
        });
    }
    let svc = Arc::new(Logger::new("svc", vec![sink as Arc<dyn Sink>]));
    registry.initialize_logger(Arc::clone(&svc)).unwrap();

    let (done_tx, done_rx) = mpsc::channel();
    let writer = {
        let done_tx = done_tx.clone();
        thread::spawn(move || {
            for i in 0..500 {
                svc.info(&format!("record {i}"));
            }
            done_tx.send(()).unwrap();
        })
    };
    let configurer = {
        let registry = Arc::clone(&registry);
        thread::spawn(move || {
            for i in 0..500 {
                registry.set_pattern(if i % 2 == 0 { "{msg}" } else { "{level} {msg}" });
                registry.enable_backtrace(4);
                registry.disable_backtrace();
            }
            done_tx.send(()).unwrap();
        })
    };

    for _ in 0..2 {
        done_rx
            .recv_timeout(Duration::from_secs(10))
            .expect("logging and fan-out should both finish");
    }
    writer.join().unwrap();
    configurer.join().unwrap();
    assert_eq!(lookups.load(Ordering::SeqCst), 500);
}

#[test]
fn initialize_logger_picks_up_policy_set_before_registration() {
    let registry = Registry::empty();
    registry.set_pattern("{name}: {msg}");
    registry.enable_backtrace(2);

    let buffer = SharedBuffer::new();
    let svc = Arc::new(Logger::builder("svc").sink(StreamSink::new(buffer.clone())).build());
    registry.initialize_logger(Arc::clone(&svc)).unwrap();

    svc.info("ready");
    assert_eq!(buffer.contents(), "svc: ready\n");
    assert_eq!(svc.backtracer().capacity(), 2);
}

#[test]
fn set_error_handler_fans_out() {
    let registry = Registry::empty();
    let failing = Arc::new(
        Logger::builder("failing")
            .sink(FailingSink)
            .build(),
    );
    registry.register_logger(Arc::clone(&failing)).unwrap();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    registry.set_error_handler(Some(Arc::new(move |name: &str, err: &Error| {
        sink.lock().unwrap().push(format!("{name}: {err}"));
    })));

    failing.info("boom");
    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert!(seen[0].starts_with("failing: "));
    assert!(seen[0].contains("disk full"));
}

#[test]
fn flush_every_runs_and_stops() {
    let registry = Registry::empty();
    let counting = Arc::new(CountingSink::default());
    registry
        .register_logger(Arc::new(
            Logger::builder("periodic")
                .shared_sink(Arc::clone(&counting) as Arc<dyn Sink>)
                .build(),
        ))
        .unwrap();

    registry.flush_every(Duration::from_millis(10)).unwrap();
    assert_eq!(registry.flush_interval(), Some(Duration::from_millis(10)));
    thread::sleep(Duration::from_millis(150));
    assert!(counting.flushes.load(Ordering::SeqCst) > 0);

    registry.flush_every(Duration::ZERO).unwrap();
    assert_eq!(registry.flush_interval(), None);

    let after_stop = counting.flushes.load(Ordering::SeqCst);
    thread::sleep(Duration::from_millis(50));
    assert_eq!(counting.flushes.load(Ordering::SeqCst), after_stop);
}

#[test]
fn shutdown_flushes_drops_and_is_idempotent() {
    let registry = Registry::new();
    let counting = Arc::new(CountingSink::default());
    registry
        .register_logger(Arc::new(
            Logger::builder("svc")
                .shared_sink(Arc::clone(&counting) as Arc<dyn Sink>)
                .build(),
        ))
        .unwrap();
    registry.flush_every(Duration::from_secs(60)).unwrap();
    registry.set_thread_pool(Some(Arc::new(ThreadPool::new(16, 1).unwrap())));

    registry.shutdown();
    assert_eq!(counting.flushes.load(Ordering::SeqCst), 1);
    assert!(registry.is_empty());
    assert!(registry.default_logger().is_none());
    assert!(registry.thread_pool().is_none());
    assert!(registry.flush_interval().is_none());

    registry.shutdown();
    assert_eq!(counting.flushes.load(Ordering::SeqCst), 1);
}

#[test]
fn thread_pool_or_init_creates_once() {
    let registry = Registry::empty();
    let first = registry
        .thread_pool_or_init(|| ThreadPool::new(8, 1))
        .unwrap();
    let second = registry
        .thread_pool_or_init(|| panic!("pool already exists"))
        .unwrap();
    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn concurrent_initialize_and_set_level_converge() {
    let registry = Arc::new(Registry::empty());

    let creators: Vec<_> = (0..4)
        .map(|t| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                for i in 0..25 {
                    registry
                        .initialize_logger(logger(&format!("t{t}-{i}")))
                        .unwrap();
                }
            })
        })
        .collect();
    let setter = {
        let registry = Arc::clone(&registry);
        thread::spawn(move || registry.set_level(Level::Error))
    };

    for h in creators {
        h.join().unwrap();
    }
    setter.join().unwrap();

    assert_eq!(registry.len(), 100);
    registry.apply_all(|l| assert_eq!(l.level(), Level::Error, "{}", l.name()));
}
