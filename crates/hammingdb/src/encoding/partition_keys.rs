//! Partition key encoding.
//!
//! Every stored hash is indexed once per partition, under a key built from
//! the bits the partition covers:
//!
//! ```text
//! byte 0               b'P'
//! byte 1               partition index
//! bytes 2..2+N         masked window slice, N = partition_key_bytes
//! ```
//!
//! Each slice byte samples exactly one byte of the source hash and keeps
//! only the bits inside the partition window, preserving their in-byte
//! position. Bit indices are MSB-first: bit 0 of a byte is `0x80`. Two
//! hashes that agree on a partition's window therefore produce identical
//! keys no matter what the rest of their bits look like, and flipping one
//! window bit of a key yields exactly the key an off-by-one-bit hash would
//! have been stored under.
//!
//! Config records share the keyspace under the `_hb` / `_me` keys, holding
//! the hash width and max error as ASCII decimal.

use crate::config::IndexConfig;

/// First byte of every partition key.
pub const PARTITION_TAG: u8 = b'P';

/// Config record key holding the hash width in bits (ASCII decimal).
pub const KEY_HASH_BITS: &[u8] = b"_hb";

/// Config record key holding the max error (ASCII decimal).
pub const KEY_MAX_ERROR: &[u8] = b"_me";

/// Build the partition key for `hash` and `partition`.
///
/// Returns the key and the number of window bits the partition covers;
/// the caller probes that many 1-bit variants during lookup.
///
/// The key always has length `partition_key_bytes + 2`; slice bytes past
/// the window stay zero.
#[must_use]
pub fn encode_partition_key(
    config: &IndexConfig,
    hash: &[u8],
    partition: u32,
) -> (Vec<u8>, u32) {
    debug_assert_eq!(hash.len(), config.hash_bytes());
    debug_assert!(partition < config.partitions());

    let window = config.window_bits(partition);

    let mut key = vec![0u8; config.partition_key_bytes() + 2];
    key[0] = PARTITION_TAG;
    key[1] = partition as u8;

    let mut bits_left = window;
    let mut hash_bit = partition * config.partition_bits();

    for slot in &mut key[2..] {
        if bits_left == 0 {
            break;
        }
        let byte = (hash_bit / 8) as usize;
        let bit = hash_bit % 8;
        let take = (8 - bit).min(bits_left);

        let mask = (((1u16 << take) - 1) as u8) << (8 - bit - take);
        *slot = hash[byte] & mask;

        bits_left -= take;
        hash_bit += take;
    }

    (key, window)
}

/// Flip window bit `bit` of `partition` in an encoded partition key.
///
/// `bit` counts from the start of the partition's window. Toggling is an
/// involution; toggling produces the key of a hash whose corresponding
/// bit differs.
pub fn toggle_window_bit(config: &IndexConfig, key: &mut [u8], partition: u32, bit: u32) {
    debug_assert!(bit < config.window_bits(partition));

    let start = partition * config.partition_bits();
    let abs = start + bit;
    // The first slice byte samples the hash byte containing the window's
    // first bit; later window bits land in subsequent slots.
    let slot = (abs / 8 - start / 8) as usize + 2;
    key[slot] ^= 0x80 >> (abs % 8);
}

/// Split a partition key into its partition index and window slice.
///
/// Returns `None` for keys of the wrong shape (config records, foreign
/// data).
#[must_use]
pub fn decode_partition_key<'a>(config: &IndexConfig, key: &'a [u8]) -> Option<(u8, &'a [u8])> {
    if key.len() != config.partition_key_bytes() + 2 || key[0] != PARTITION_TAG {
        return None;
    }
    Some((key[1], &key[2..]))
}

/// Key prefix shared by every key of one partition.
#[must_use]
pub fn partition_prefix(partition: u32) -> [u8; 2] {
    [PARTITION_TAG, partition as u8]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(bits: u32, err: u32) -> IndexConfig {
        IndexConfig::new(bits, err).unwrap()
    }

    #[test]
    fn key_shape() {
        let cfg = config(16, 3);
        let (key, window) = encode_partition_key(&cfg, &[0xB4, 0xCA], 1);
        assert_eq!(key.len(), cfg.partition_key_bytes() + 2);
        assert_eq!(key[0], b'P');
        assert_eq!(key[1], 1);
        assert_eq!(window, 6);
    }

    #[test]
    fn slices_mask_to_window() {
        // 16 bits over partitions of 6: windows [0..6), [6..12), [12..16).
        let cfg = config(16, 3);
        let hash = [0b1011_0100, 0b1100_1010];

        let (key, window) = encode_partition_key(&cfg, &hash, 0);
        assert_eq!(window, 6);
        assert_eq!(&key[2..], &[0b1011_0100, 0x00]);

        // Window 1 straddles the byte boundary: 2 bits of byte 0, 4 of byte 1.
        let (key, window) = encode_partition_key(&cfg, &hash, 1);
        assert_eq!(window, 6);
        assert_eq!(&key[2..], &[0b0000_0000, 0b1100_0000]);

        let (key, window) = encode_partition_key(&cfg, &hash, 2);
        assert_eq!(window, 4);
        assert_eq!(&key[2..], &[0b0000_1010, 0x00]);
    }

    #[test]
    fn byte_aligned_slices() {
        let cfg = config(8, 2);
        let (key, _) = encode_partition_key(&cfg, &[0xA5], 0);
        assert_eq!(&key[2..], &[0xA0, 0x00]);
        let (key, _) = encode_partition_key(&cfg, &[0xA5], 1);
        assert_eq!(&key[2..], &[0x05, 0x00]);
    }

    #[test]
    fn empty_window_encodes_all_zero_slice() {
        // 8 bits over 5 partitions of nominal width 2; partition 4 is empty.
        let cfg = config(8, 7);
        let (key, window) = encode_partition_key(&cfg, &[0xFF], 4);
        assert_eq!(window, 0);
        assert_eq!(&key[2..], &[0x00, 0x00]);
    }

    #[test]
    fn toggle_matches_flipped_hash() {
        let cfg = config(16, 3);
        let hash = [0xB4, 0xCA];

        // Flipping window bit 2 of partition 1 (absolute bit 8, the MSB of
        // byte 1) must give the key of the hash with that bit flipped.
        let (mut key, _) = encode_partition_key(&cfg, &hash, 1);
        toggle_window_bit(&cfg, &mut key, 1, 2);

        let flipped = [0xB4, 0xCA ^ 0x80];
        let (expected, _) = encode_partition_key(&cfg, &flipped, 1);
        assert_eq!(key, expected);

        // Toggling again restores the original key.
        toggle_window_bit(&cfg, &mut key, 1, 2);
        let (original, _) = encode_partition_key(&cfg, &hash, 1);
        assert_eq!(key, original);
    }

    #[test]
    fn decode_partition_keys_only() {
        let cfg = config(16, 3);
        let (key, _) = encode_partition_key(&cfg, &[0xB4, 0xCA], 2);

        let (partition, slice) = decode_partition_key(&cfg, &key).unwrap();
        assert_eq!(partition, 2);
        assert_eq!(slice, &key[2..]);

        assert!(decode_partition_key(&cfg, KEY_HASH_BITS).is_none());
        assert!(decode_partition_key(&cfg, &key[..3]).is_none());
    }

    #[test]
    fn prefix_matches_encoded_keys() {
        let cfg = config(32, 4);
        let hash = [0xDE, 0xAD, 0xBE, 0xEF];
        for partition in 0..cfg.partitions() {
            let (key, _) = encode_partition_key(&cfg, &hash, partition);
            assert!(key.starts_with(&partition_prefix(partition)));
        }
    }
}
