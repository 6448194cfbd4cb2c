use crate::common::get_current_time_or_zero;
use log::info;
use parking_lot::Mutex;
use rand::rngs::OsRng;
use rand::Rng;

const NODE_ID_BITS: u64 = 10;
const SEQUENCE_BITS: u64 = 12;
const MAX_NODE_ID: u64 = (1 << NODE_ID_BITS) - 1;
const SEQUENCE_MASK: u64 = (1 << SEQUENCE_BITS) - 1;
const TIMESTAMP_LEFT_SHIFT: u64 = SEQUENCE_BITS + NODE_ID_BITS;
const EPOCH: u64 = 1288834974657;

/// Time-ordered 64-bit id generator.
///
/// Layout: 41 bits of milliseconds since a fixed epoch, 10 bits of node id and
/// 12 bits of per-millisecond sequence. Ids from one generator are strictly
/// increasing, even if the wall clock moves backwards or more than 4096 ids are
/// requested within a millisecond.
pub struct SnowflakeIdGenerator {
    node_id: u64,
    state: Mutex<SnowflakeState>,
}

struct SnowflakeState {
    last_timestamp: u64,
    sequence: u64,
}

impl SnowflakeIdGenerator {
    pub fn new() -> Self {
        let node_id = Self::random_node_id();
        info!("Initialized snowflake id generator with node id: {}", node_id);
        SnowflakeIdGenerator {
            node_id,
            state: Mutex::new(SnowflakeState {
                last_timestamp: 0,
                sequence: 0,
            }),
        }
    }

    pub fn get_id(&self) -> u64 {
        let mut state = self.state.lock();
        let mut timestamp = get_current_time_or_zero().max(EPOCH);

        if timestamp <= state.last_timestamp {
            // same millisecond or clock moved backwards: stay on the last tick
            timestamp = state.last_timestamp;
            state.sequence = (state.sequence + 1) & SEQUENCE_MASK;
            if state.sequence == 0 {
                timestamp += 1;
            }
        } else {
            state.sequence = 0;
        }
        state.last_timestamp = timestamp;

        ((timestamp - EPOCH) << TIMESTAMP_LEFT_SHIFT)
            | (self.node_id << SEQUENCE_BITS)
            | state.sequence
    }

    pub fn node_id(&self) -> u64 {
        self.node_id
    }

    fn random_node_id() -> u64 {
        let uuid = uuid::Uuid::new_v4();
        let uid = uuid.as_bytes();
        let rnd_byte = OsRng.gen::<u64>() & 0xFF;
        ((uid[uid.len() - 1] as u64) | (rnd_byte << 8)) & MAX_NODE_ID
    }
}

impl Default for SnowflakeIdGenerator {
    fn default() -> Self {
        SnowflakeIdGenerator::new()
    }
}
