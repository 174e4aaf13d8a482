//! Physical table definition and logical-key encoding.
//!
//! Redb requires table names to be known statically, so all logical tables
//! share one physical table and each key carries its logical table name as
//! a prefix, separated by a zero byte. Table names must not contain the
//! separator; the callers in this workspace use short ASCII names.

use redb::TableDefinition;

/// The single physical table holding every logical table's entries.
pub const DATA_TABLE: TableDefinition<'static, &[u8], &[u8]> =
    TableDefinition::new("hammingdb_data");

/// Separator between the table-name prefix and the key proper.
pub const KEY_SEPARATOR: u8 = 0x00;

/// Encode a logical table name and key into a physical key.
pub fn encode_key(table: &str, key: &[u8]) -> Vec<u8> {
    let mut encoded = Vec::with_capacity(table.len() + 1 + key.len());
    encoded.extend_from_slice(table.as_bytes());
    encoded.push(KEY_SEPARATOR);
    encoded.extend_from_slice(key);
    encoded
}

/// Split a physical key back into its logical table name and key.
///
/// Returns `None` if the key has no separator or a non-UTF-8 table name.
pub fn decode_key(encoded: &[u8]) -> Option<(&str, &[u8])> {
    let sep = encoded.iter().position(|&b| b == KEY_SEPARATOR)?;
    let table = std::str::from_utf8(&encoded[..sep]).ok()?;
    Some((table, &encoded[sep + 1..]))
}

/// First physical key belonging to a logical table.
pub fn table_start_key(table: &str) -> Vec<u8> {
    let mut key = Vec::with_capacity(table.len() + 1);
    key.extend_from_slice(table.as_bytes());
    key.push(KEY_SEPARATOR);
    key
}

/// First physical key past the end of a logical table.
pub fn table_end_key(table: &str) -> Vec<u8> {
    let mut key = Vec::with_capacity(table.len() + 1);
    key.extend_from_slice(table.as_bytes());
    key.push(KEY_SEPARATOR + 1);
    key
}
