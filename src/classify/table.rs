//! Fixed table of recognised command verbs.

/// Shape of a command's arguments, used to name classified fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandFamily {
    /// `SET key value [options...]`
    Set,
    /// Every argument is a key.
    MultiKey,
    /// First argument is the key.
    SingleKey,
    /// `key amount`
    Counter,
    /// `key field [value]`
    Hash,
    /// `key value...`
    ListPush,
    /// `key member...`
    SetMembers,
    /// `key [count]`
    SetSample,
    /// `key score member [score member...]`
    SortedSetAdd,
}

/// Verb → family. Lookups are case-insensitive.
pub const COMMAND_TABLE: &[(&str, CommandFamily)] = &[
    // strings
    ("SET", CommandFamily::Set),
    ("GET", CommandFamily::MultiKey),
    ("MGET", CommandFamily::MultiKey),
    ("INCR", CommandFamily::Counter),
    ("DECR", CommandFamily::Counter),
    ("INCRBY", CommandFamily::Counter),
    ("DECRBY", CommandFamily::Counter),
    ("INCRBYFLOAT", CommandFamily::Counter),
    // keyspace
    ("DEL", CommandFamily::SingleKey),
    ("EXISTS", CommandFamily::SingleKey),
    ("EXPIRE", CommandFamily::SingleKey),
    ("TTL", CommandFamily::SingleKey),
    ("PTTL", CommandFamily::SingleKey),
    ("PERSIST", CommandFamily::SingleKey),
    ("TYPE", CommandFamily::SingleKey),
    // hashes
    ("HSET", CommandFamily::Hash),
    ("HGET", CommandFamily::Hash),
    ("HDEL", CommandFamily::Hash),
    ("HEXISTS", CommandFamily::Hash),
    ("HINCRBY", CommandFamily::Hash),
    ("HINCRBYFLOAT", CommandFamily::Hash),
    // lists
    ("LPUSH", CommandFamily::ListPush),
    ("RPUSH", CommandFamily::ListPush),
    ("LPUSHX", CommandFamily::ListPush),
    ("RPUSHX", CommandFamily::ListPush),
    // sets
    ("SADD", CommandFamily::SetMembers),
    ("SREM", CommandFamily::SetMembers),
    ("SISMEMBER", CommandFamily::SetMembers),
    ("SCARD", CommandFamily::SetMembers),
    ("SPOP", CommandFamily::SetSample),
    ("SRANDMEMBER", CommandFamily::SetSample),
    // sorted sets
    ("ZADD", CommandFamily::SortedSetAdd),
];

/// Find a verb in the table, returning its canonical spelling and family.
pub fn lookup(name: &str) -> Option<(&'static str, CommandFamily)> {
    COMMAND_TABLE
        .iter()
        .find(|(verb, _)| verb.eq_ignore_ascii_case(name))
        .copied()
}
