//! Key encoding for the persisted index layout.

mod partition_keys;

pub use partition_keys::{
    decode_partition_key, encode_partition_key, partition_prefix, toggle_window_bit,
    KEY_HASH_BITS, KEY_MAX_ERROR, PARTITION_TAG,
};
