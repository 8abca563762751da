//! End-to-end boot-log flow tests for the printing and logging library.

use plog::layout::{CHANNEL_RECORD_OFFSET, FSBL_LOG_SIZE, LOG_BUFFER_LEN, LOG_MAX_RECS};
use plog::{
    BufferConsole, ChannelRecord, Console, Logger, MappedRegion, MemoryRegion, PlogError,
    PlogResult, Providers, SharedRing, Verbosity,
};
use std::sync::Arc;

const SHARED_LEN: usize = CHANNEL_RECORD_OFFSET + 8 + LOG_BUFFER_LEN;
const BUFFER_OFFSET: u32 = (CHANNEL_RECORD_OFFSET + 8) as u32;

struct Harness {
    logger: Logger,
    console: Arc<BufferConsole>,
    shared: Arc<dyn MemoryRegion>,
    fsbl: Arc<dyn MemoryRegion>,
}

fn harness(output: Verbosity, logging: Verbosity) -> PlogResult<Harness> {
    let shared: Arc<dyn MemoryRegion> = Arc::new(MappedRegion::anon(SHARED_LEN)?);
    ChannelRecord {
        buffer_offset: BUFFER_OFFSET,
        buffer_length: LOG_BUFFER_LEN as u32,
    }
    .store(&*shared)?;

    let fsbl: Arc<dyn MemoryRegion> = Arc::new(MappedRegion::anon(FSBL_LOG_SIZE)?);

    let console = Arc::new(BufferConsole::new());
    let mut providers = Providers::new(Arc::clone(&shared), Arc::clone(&fsbl))?;
    providers.console = Arc::clone(&console) as Arc<dyn Console>;

    Ok(Harness {
        logger: Logger::new(output, logging, providers)?,
        console,
        shared,
        fsbl,
    })
}

fn shared_slots(region: &Arc<dyn MemoryRegion>) -> Vec<String> {
    let ring = SharedRing::new(Arc::clone(region));
    let mut slots = Vec::new();
    ring.dump(|text| slots.push(text.to_owned())).unwrap();
    slots
}

#[test]
fn test_output_at_info_prints_and_collects() -> PlogResult<()> {
    let h = harness(Verbosity::Info, Verbosity::Info)?;

    h.logger.output(Verbosity::Info, format_args!("x={}\r\n", 5))?;
    assert_eq!(h.console.captured(), "x=5\r\n");

    // The collected copy surfaces in the shared ring once the channel opens.
    h.logger.send_boot_records()?;
    assert_eq!(shared_slots(&h.shared), vec!["x=5".to_owned()]);
    Ok(())
}

#[test]
fn test_local_ring_retains_last_n_messages() -> PlogResult<()> {
    let h = harness(Verbosity::ErrorOnly, Verbosity::Info)?;

    for i in 0..LOG_MAX_RECS + 1 {
        h.logger
            .output(Verbosity::Info, format_args!("boot {i}\r\n"))?;
    }

    h.logger.send_boot_records()?;
    let slots = shared_slots(&h.shared);
    assert_eq!(slots.len(), LOG_MAX_RECS);

    // The overwritten first message is gone; the last N survive.
    assert!(!slots.contains(&"boot 0".to_owned()));
    for i in 1..=LOG_MAX_RECS {
        assert!(slots.contains(&format!("boot {i}")), "missing boot {i}");
    }
    Ok(())
}

#[test]
fn test_shared_ring_wraps_after_m_plus_one() -> PlogResult<()> {
    let h = harness(Verbosity::ErrorOnly, Verbosity::Info)?;
    h.logger.send_boot_records()?;

    for i in 0..LOG_MAX_RECS + 1 {
        h.logger
            .output(Verbosity::Info, format_args!("rec {i}\r\n"))?;
    }

    let ring = SharedRing::new(Arc::clone(&h.shared));
    assert_eq!(ring.write_index()?, 1);
    assert_eq!(shared_slots(&h.shared)[0], format!("rec {LOG_MAX_RECS}"));
    Ok(())
}

#[test]
fn test_dump_log_replays_collected_message() -> PlogResult<()> {
    let h = harness(Verbosity::ErrorOnly, Verbosity::Info)?;
    h.logger.send_boot_records()?;
    h.logger
        .output(Verbosity::Info, format_args!("needle\r\n"))?;

    h.console.reset();
    h.logger.dump_log()?;

    let captured = h.console.captured();
    assert_eq!(captured.matches("needle\r\n").count(), 1);
    assert!(captured.contains("Dumping log from shared memory..."));
    Ok(())
}

#[test]
fn test_fsbl_replay_and_dump_drop_final_token() -> PlogResult<()> {
    let h = harness(Verbosity::Debug, Verbosity::Debug)?;
    h.fsbl.write(0, b"stage0 done\r\nstage1 done\r\npartial")?;

    h.logger.dump_fsbl_log()?;
    let captured = h.console.captured();
    assert!(captured.contains("stage0 done\r\n"));
    assert!(captured.contains("stage1 done\r\n"));
    assert!(!captured.contains("partial"));

    h.logger.send_boot_records()?;
    let slots = shared_slots(&h.shared);
    assert!(slots.contains(&"stage0 done".to_owned()));
    assert!(slots.contains(&"stage1 done".to_owned()));
    assert!(!slots.contains(&"partial".to_owned()));
    Ok(())
}

#[test]
fn test_statistics_clear_then_print_shows_zeros() -> PlogResult<()> {
    let h = harness(Verbosity::Info, Verbosity::Info)?;
    h.logger.output(Verbosity::Info, format_args!("warm up\r\n"))?;

    h.logger.clear_statistics()?;
    h.console.reset();
    h.logger.print_statistics()?;

    let captured = h.console.captured();
    // Counters unrelated to printing itself must read zero.
    assert!(captured.contains(&format!("{:>40} . . . . 0\r\n", "init complete")));
    assert!(captured.contains(&format!("{:>40} . . . . 0\r\n", "level changed")));
    assert!(captured.contains(&format!("{:>40} . . . . 0\r\n", "validation failed")));
    Ok(())
}

#[test]
fn test_clear_log_after_collect() -> PlogResult<()> {
    let h = harness(Verbosity::ErrorOnly, Verbosity::Info)?;
    h.logger.send_boot_records()?;
    h.logger.output(Verbosity::Info, format_args!("stale\r\n"))?;
    assert_eq!(shared_slots(&h.shared).len(), 1);

    h.logger.clear_log()?;
    assert!(shared_slots(&h.shared).is_empty());
    Ok(())
}

#[test]
fn test_unseeded_channel_fails_send_boot_records() -> PlogResult<()> {
    let shared: Arc<dyn MemoryRegion> = Arc::new(MappedRegion::anon(SHARED_LEN)?);
    let fsbl: Arc<dyn MemoryRegion> = Arc::new(MappedRegion::anon(FSBL_LOG_SIZE)?);
    let console = Arc::new(BufferConsole::new());
    let mut providers = Providers::new(Arc::clone(&shared), fsbl)?;
    providers.console = console;

    let logger = Logger::new(Verbosity::Info, Verbosity::Info, providers)?;
    let result = logger.send_boot_records();
    assert!(matches!(result, Err(PlogError::ChannelRange { .. })));

    // Capture still works in local mode afterwards.
    logger.output(Verbosity::Info, format_args!("still alive\r\n"))?;
    Ok(())
}

#[test]
fn test_concurrent_outputs_all_delivered() -> PlogResult<()> {
    let h = harness(Verbosity::Debug, Verbosity::ErrorOnly)?;
    let logger = Arc::new(h.logger);

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let logger = Arc::clone(&logger);
            std::thread::spawn(move || {
                for i in 0..50 {
                    let _ = logger.output(Verbosity::Info, format_args!("t{t} m{i}\r\n"));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let captured = h.console.captured();
    assert_eq!(captured.matches("\r\n").count(), 200);
    Ok(())
}
