//! Tests for logger functionality.

use logcore::{Level, Logger, PatternFormatter, SharedBuffer, SourceLoc, StreamSink};
use std::sync::Arc;

fn buffered(name: &str, buffer: &SharedBuffer) -> Logger {
    Logger::builder(name)
        .sink(StreamSink::new(buffer.clone()).with_formatter(PatternFormatter::new("{level} {msg}")))
        .build()
}

#[test]
fn builder_default() {
    let logger = Logger::builder("svc").build();
    assert_eq!(logger.name(), "svc");
    assert_eq!(logger.level(), Level::Info);
    assert_eq!(logger.flush_level(), Level::Off);
    assert!(logger.sinks().is_empty());
    assert!(!logger.is_async());
    assert!(!logger.backtracer().is_enabled());
}

#[test]
fn builder_with_level_and_backtrace() {
    let logger = Logger::builder("svc")
        .level(Level::Debug)
        .flush_on(Level::Warn)
        .backtrace(8)
        .build();
    assert_eq!(logger.level(), Level::Debug);
    assert_eq!(logger.flush_level(), Level::Warn);
    assert!(logger.backtracer().is_enabled());
    assert_eq!(logger.backtracer().capacity(), 8);
}

#[test]
fn log_respects_level() {
    let buffer = SharedBuffer::new();
    let logger = buffered("svc", &buffer);
    logger.set_level(Level::Warn);

    logger.trace("t");
    logger.debug("d");
    logger.info("i");
    logger.warn("w");
    logger.error("e");
    logger.critical("c");

    assert_eq!(buffer.lines(), vec!["warn w", "error e", "critical c"]);
}

#[test]
fn off_disables_everything() {
    let buffer = SharedBuffer::new();
    let logger = buffered("svc", &buffer);
    logger.set_level(Level::Off);
    logger.critical("nope");
    assert!(buffer.contents().is_empty());

    logger.set_level(Level::Trace);
    assert!(!logger.should_log(Level::Off));
    logger.log(Level::Off, "never");
    assert!(buffer.contents().is_empty());
}

#[test]
fn log_at_attaches_source() {
    let buffer = SharedBuffer::new();
    let logger = Logger::builder("svc")
        .sink(StreamSink::new(buffer.clone()).with_formatter(PatternFormatter::new("{source} {msg}")))
        .build();

    logger.log_at(SourceLoc::new("main.rs", 42, "app"), Level::Info, "hi");
    assert_eq!(buffer.contents(), "main.rs:42 hi\n");
}

#[test]
fn backtrace_captures_below_level() {
    let buffer = SharedBuffer::new();
    let logger = buffered("svc", &buffer);
    logger.enable_backtrace(3);

    for i in 0..4 {
        logger.debug(&format!("step {i}"));
    }
    logger.info("visible");

    assert_eq!(buffer.lines(), vec!["info visible"]);
    assert_eq!(logger.backtracer().len(), 3);
}

#[test]
fn dump_backtrace_replays_between_banners() {
    let buffer = SharedBuffer::new();
    let logger = buffered("svc", &buffer);
    logger.enable_backtrace(2);
    logger.debug("a");
    logger.debug("b");
    logger.debug("c");

    logger.dump_backtrace();

    let lines = buffer.lines();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].contains("Backtrace Start"));
    assert_eq!(lines[1], "debug b");
    assert_eq!(lines[2], "debug c");
    assert!(lines[3].contains("Backtrace End"));
    assert!(logger.backtracer().is_empty());

    buffer.clear();
    logger.dump_backtrace();
    assert!(buffer.contents().is_empty());
}

#[test]
fn disable_backtrace_stops_capture() {
    let logger = Logger::builder("svc").backtrace(4).build();
    logger.debug("kept");
    logger.disable_backtrace();
    logger.debug("dropped");
    assert_eq!(logger.backtracer().len(), 1);
}

#[test]
fn set_formatter_gives_each_sink_its_own_copy() {
    let first = SharedBuffer::new();
    let second = SharedBuffer::new();
    let logger = Logger::builder("svc")
        .sink(StreamSink::new(first.clone()))
        .sink(StreamSink::new(second.clone()))
        .build();

    logger.set_pattern("{msg}");
    logger.sinks()[1].set_pattern("{level}");
    logger.info("x");

    assert_eq!(first.contents(), "x\n");
    assert_eq!(second.contents(), "info\n");
}

#[test]
fn clone_with_name_shares_sinks_and_levels() {
    let buffer = SharedBuffer::new();
    let original = Logger::builder("orig")
        .level(Level::Debug)
        .sink(StreamSink::new(buffer.clone()).with_formatter(PatternFormatter::new("{name} {msg}")))
        .backtrace(2)
        .build();
    original.debug("before");

    let copy = original.clone_with_name("copy");
    assert_eq!(copy.name(), "copy");
    assert_eq!(copy.level(), Level::Debug);
    assert_eq!(copy.backtracer().len(), 1);
    assert!(Arc::ptr_eq(&original.sinks()[0], &copy.sinks()[0]));

    copy.info("after");
    assert_eq!(buffer.lines(), vec!["orig before", "copy after"]);
}

#[test]
fn debug_output_names_the_logger() {
    let logger = Logger::builder("dbg").build();
    assert!(format!("{logger:?}").contains("dbg"));
}
