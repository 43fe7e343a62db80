#![no_main]

use libfuzzer_sys::fuzz_target;

use dynpool::{MultiPool, MultiPoolConfig, PooledBlock};

fuzz_target!(|data: &[u8]| {
    // Small ladder keeps every class cheap: 16..=512 bytes.
    let config = MultiPoolConfig {
        min_class_bits: 4,
        class_count: 6,
        track_usage: true,
    };
    let multipool = MultiPool::with_config(&config).unwrap();
    let mut held: Vec<(PooledBlock, u8)> = Vec::new();

    // Each pair of bytes is one operation: opcode, argument.
    for pair in data.chunks_exact(2) {
        let (opcode, arg) = (pair[0], pair[1]);
        match opcode % 3 {
            0 => {
                let size = usize::from(arg) * 3;
                match multipool.acquire(size) {
                    Ok(mut block) => {
                        assert!(block.len() >= size);
                        block.fill(arg);
                        held.push((block, arg));
                    }
                    Err(_) => assert!(size > multipool.max_block_size()),
                }
            }
            1 if !held.is_empty() => {
                let (block, fill) = held.swap_remove(usize::from(arg) % held.len());
                assert!(block.iter().all(|&b| b == fill));
            }
            2 => {
                multipool.destroy_all();
            }
            _ => {}
        }
    }

    let in_use: u64 = multipool
        .usage()
        .unwrap()
        .iter()
        .map(|class| class.usage.in_use())
        .sum();
    assert_eq!(in_use, held.len() as u64);
});
