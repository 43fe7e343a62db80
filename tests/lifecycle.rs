//! Pool lifecycle: growth, reuse, teardown, and the global context.

use dynpool::{global, MultiPool, MultiPoolConfig, PoolConfig, PoolError, SinglePool};
use dynpool_alloc::{GlobalAllocator, PooledBytes, ScratchAllocator};

#[test]
fn growth_then_reuse() {
    dynpool_tests::init_tracing();
    let pool = SinglePool::with_config(4096, &PoolConfig { track_usage: true }).unwrap();
    assert!(pool.is_empty());

    let first = pool.acquire().unwrap();
    assert_eq!(pool.usage().unwrap().allocated, 1);
    let ptr = first.as_ptr();
    drop(first);
    assert!(!pool.is_empty());

    let second = pool.acquire().unwrap();
    assert_eq!(second.as_ptr(), ptr);
    let usage = pool.usage().unwrap();
    assert_eq!(usage.allocated, 1);
    assert_eq!(usage.reused, 1);
}

#[test]
fn teardown_reclaims_everything() {
    const N: usize = 10;
    const M: usize = 6;
    let pool = SinglePool::with_config(1024, &PoolConfig { track_usage: true }).unwrap();

    let mut held: Vec<_> = (0..N).map(|_| pool.acquire().unwrap()).collect();
    for block in held.drain(..M) {
        pool.release(block);
    }
    assert_eq!(pool.usage().unwrap().available, M as u64);

    // The caller quiesces by releasing the rest before teardown.
    for block in held {
        pool.release(block);
    }
    assert_eq!(pool.destroy_all(), N);
    let usage = pool.usage().unwrap();
    assert_eq!(usage.allocated, N as u64);
    assert_eq!(usage.reclaimed, N as u64);
    assert_eq!(usage.available, 0);
    assert_eq!(usage.in_use(), 0);
    pool.destroy();
}

#[test]
fn round_trip_byte_patterns() {
    let pool = SinglePool::new(777).unwrap();
    for pattern in [0x00u8, 0xFF, 0xA5, 0x3C] {
        let mut block = pool.acquire().unwrap();
        assert!(block.len() >= 777);
        for (i, byte) in block.iter_mut().enumerate() {
            *byte = pattern ^ (i as u8);
        }
        assert!(block
            .iter()
            .enumerate()
            .all(|(i, &byte)| byte == pattern ^ (i as u8)));
    }
}

#[test]
fn multipool_example_scenario() {
    let multipool = MultiPool::new().unwrap();
    assert_eq!(multipool.class_count(), 14);
    assert_eq!(multipool.max_block_size(), 4 * 1024 * 1024);

    let block = multipool.acquire(4096).unwrap();
    assert_eq!(multipool.class_for(4096), 3);
    assert!(block.len() >= 4096);
    let ptr = block.as_ptr();
    block.release();
    assert_eq!(multipool.acquire(4096).unwrap().as_ptr(), ptr);

    assert!(matches!(
        multipool.acquire(4 * 1024 * 1024 + 1),
        Err(PoolError::SizeClassOutOfRange { .. })
    ));
    multipool.destroy();
}

#[test]
fn multipool_from_json_config() {
    let config = MultiPoolConfig::from_json(
        r#"{ "min_class_bits": 10, "class_count": 3, "track_usage": true }"#,
    )
    .unwrap();
    let multipool = MultiPool::with_config(&config).unwrap();
    assert_eq!(multipool.acquire(1).unwrap().len(), 1024);
    assert_eq!(multipool.max_block_size(), 4096);
    assert!(multipool.acquire(4097).is_err());
}

// Single test for the process-wide context; other tests in this binary
// do not touch it.
#[test]
fn global_context_lifecycle() {
    assert!(matches!(
        GlobalAllocator.alloc(100),
        Err(PoolError::NotInitialized)
    ));

    global::init().unwrap();
    let mut bytes = PooledBytes::acquire(&GlobalAllocator, 16 * 1024).unwrap();
    bytes.extend_from_slice(b"deflate me").unwrap();
    let ptr = bytes.as_ptr();
    drop(bytes);

    let block = global::acquire(16 * 1024).unwrap();
    assert_eq!(block.as_ptr(), ptr);
    global::release(block);

    global::teardown().unwrap();
    assert!(matches!(
        global::acquire(1),
        Err(PoolError::NotInitialized)
    ));
}
