use std::fs::File;

use svec_common::{
    prelude::*,
    collections::OutOfRange,
    mem::{global_alloc_stats, thread_alloc_stats},
};
use svec_logging::{log_error, log_info, log_verbose, set_logger, LogCategory, LogLevel, Logger};

pub const LOG_CAT : LogCategory = LogCategory::new("Main");

static LOGGER : Logger = Logger::new();

fn setup_logging() {
    set_logger(&LOGGER);
    LOGGER.set_max_level(LogLevel::Verbose);

    // Optionally mirror the log to a file
    if let Some(path) = std::env::args().nth(1) {
        match File::create(&path) {
            Ok(file) => {
                _ = LOGGER.add_writer(Box::new(file));
            },
            Err(err) => log_error!(LOG_CAT, setup_logging, "Failed to create log file '{path}': {err}"),
        }
    }
}

fn main() {
    setup_logging();

    edit_scenario();
    checked_access_scenario();
    growth_scenario();
    copy_and_move_scenario();

    let stats = thread_alloc_stats();
    log_info!(LOG_CAT, "Buffers allocated: {}, released: {}, peak bytes: {}", stats.allocs, stats.deallocs, stats.peak_bytes);
    let global = global_alloc_stats();
    if global.live_allocs() != 0 {
        log_error!(LOG_CAT, main, "{} buffers were never released", global.live_allocs());
    }

    LOGGER.flush();
}

fn edit_scenario() {
    let mut arr = dynarr![1, 2, 3];
    log_info!(LOG_CAT, "start: {arr:?}");

    arr.insert(1, 9);
    log_info!(LOG_CAT, "insert(1, 9): {arr:?}");

    let next = arr.erase(0);
    log_info!(LOG_CAT, "erase(0): {arr:?}, next element at {next}");

    arr.push(4);
    log_info!(LOG_CAT, "push(4): {arr:?}, len {}", arr.len());
}

fn checked_access_scenario() {
    let mut arr: DynArr<i32> = DynArr::new();
    match arr.at(0) {
        Ok(value) => log_info!(LOG_CAT, "at(0) on an empty array returned {value}"),
        Err(OutOfRange) => log_info!(LOG_CAT, "at(0) on an empty array: {}", OutOfRange),
    }

    arr.push(5);
    if let Ok(value) = arr.at(0) {
        log_info!(LOG_CAT, "at(0) after push(5): {value}");
    }
}

fn growth_scenario() {
    let mut arr = DynArr::<u64>::with_reserve_hint(make_reserve_hint(4));
    log_info!(LOG_CAT, "with_reserve_hint(4): len {}, capacity {}", arr.len(), arr.capacity());

    let mut capacity = arr.capacity();
    for i in 0..64 {
        arr.push(i);
        if arr.capacity() != capacity {
            log_verbose!(LOG_CAT, "push #{} grew the capacity from {capacity} to {}", i + 1, arr.capacity());
            capacity = arr.capacity();
        }
    }

    arr.resize(100);
    log_info!(LOG_CAT, "resize(100): len {}, capacity {}", arr.len(), arr.capacity());
    arr.resize(10);
    log_info!(LOG_CAT, "resize(10): len {}, capacity {}", arr.len(), arr.capacity());
    arr.clear();
    log_info!(LOG_CAT, "clear(): len {}, capacity {}", arr.len(), arr.capacity());
}

fn copy_and_move_scenario() {
    let mut src = DynArr::<String>::with_capacity(8);
    src.extend(["a", "b", "c"].map(String::from));

    let copy = src.clone();
    log_info!(LOG_CAT, "clone: {copy:?}, capacity {}", copy.capacity());

    let moved = src.take();
    log_info!(LOG_CAT, "take: moved {moved:?}, source len {} capacity {}", src.len(), src.capacity());

    log_info!(LOG_CAT, "copy == moved: {}, copy < [\"b\"]: {}", copy == moved, copy < dynarr!["b".to_string()]);
}
