//! The redaction mapper: category-indexed original→redacted mappings with
//! deterministic replacement generators.
//!
//! One mapper is exclusively owned by one sanitization run. Entries are
//! only ever added; an original value, once mapped, keeps its replacement
//! for the rest of the document — that is what preserves referential
//! integrity across sections.
use std::collections::BTreeMap;

use serde::Serialize;

use crate::enums::{Category, SanitizeMode};

/// The fixed literal every credential collapses to.
///
/// Credentials are deliberately not mapped 1-to-1: distinct secrets must
/// not be distinguishable in the sanitized output.
pub const REDACTED: &str = "REDACTED";

/// Category-indexed mapping from original to redacted values.
#[derive(Debug, Clone)]
pub struct Mapper {
    mode: SanitizeMode,
    seed: Option<u64>,
    maps: BTreeMap<Category, BTreeMap<String, String>>,
    /// Per-category scalar counters (mac, email, hostname, domain, username).
    counters: BTreeMap<Category, u64>,
    /// Input /24 (or v6 /112 equivalent) prefix → allocated block index.
    subnet_blocks: BTreeMap<String, u64>,
    /// Per-block host counters for IP allocation.
    host_counters: BTreeMap<u64, u64>,
    next_block: u64,
}

/// Serialized form of the mapper; field order is the declared order.
#[derive(Debug, Serialize)]
struct MapperJson<'a> {
    mode: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u64>,
    mappings: BTreeMap<&'static str, &'a BTreeMap<String, String>>,
}

impl Mapper {
    /// Creates an empty mapper for one sanitization run.
    ///
    /// Without a seed every counter starts at zero. With a seed the scalar
    /// counters start at the seed value and subnet blocks are offset by it,
    /// and the seed is recorded in the serialized mapping.
    pub fn new(mode: SanitizeMode, seed: Option<u64>) -> Self {
        let offset = seed.unwrap_or(0);
        Self {
            mode,
            seed,
            maps: BTreeMap::new(),
            counters: BTreeMap::new(),
            subnet_blocks: BTreeMap::new(),
            host_counters: BTreeMap::new(),
            next_block: offset % 256,
        }
    }

    /// The mode this mapper was created for.
    pub fn mode(&self) -> SanitizeMode {
        self.mode
    }

    /// Returns the redacted replacement for `normalized`, allocating one
    /// from the category's generator on first sight.
    ///
    /// `normalized` must already be in the category's canonical form (the
    /// engine normalizes before consulting the mapper) so textual variants
    /// share a single entry.
    ///
    /// Credential categories always return [`REDACTED`] and record nothing.
    pub fn redact(&mut self, category: Category, normalized: &str) -> String {
        if category.is_credential() {
            return REDACTED.to_owned();
        }
        if let Some(existing) = self
            .maps
            .get(&category)
            .and_then(|map| map.get(normalized))
        {
            return existing.clone();
        }
        let replacement = self.generate(category, normalized);
        self.maps
            .entry(category)
            .or_default()
            .insert(normalized.to_owned(), replacement.clone());
        replacement
    }

    /// Number of recorded mappings in a category.
    pub fn mapping_count(&self, category: Category) -> usize {
        self.maps.get(&category).map_or(0, BTreeMap::len)
    }

    /// Looks up an existing mapping without allocating.
    pub fn lookup(&self, category: Category, normalized: &str) -> Option<&str> {
        self.maps
            .get(&category)
            .and_then(|map| map.get(normalized))
            .map(String::as_str)
    }

    /// Serializes the mapper to pretty JSON with stable key order:
    /// categories sorted by key, originals sorted within each category.
    /// Credential categories are omitted — no pairs are recorded for them.
    pub fn to_json_string(&self) -> String {
        let mappings: BTreeMap<&'static str, &BTreeMap<String, String>> = self
            .maps
            .iter()
            .filter(|(_, map)| !map.is_empty())
            .map(|(category, map)| (category.key(), map))
            .collect();
        let json = MapperJson {
            mode: self.mode.to_string(),
            seed: self.seed,
            mappings,
        };
        // A struct of strings and string maps cannot fail to serialize.
        serde_json::to_string_pretty(&json).unwrap_or_default()
    }

    fn generate(&mut self, category: Category, normalized: &str) -> String {
        match category {
            Category::PublicIp | Category::PrivateIp => self.next_ip(normalized),
            Category::Mac => {
                let n = self.bump(Category::Mac);
                format!(
                    "02:00:5e:{:02x}:{:02x}:{:02x}",
                    (n >> 16) & 0xff,
                    (n >> 8) & 0xff,
                    n & 0xff
                )
            }
            Category::Email => format!("user{}@example.invalid", self.bump(Category::Email)),
            Category::Hostname => format!("host-{}", self.bump(Category::Hostname)),
            Category::Domain => format!("example{}.invalid", self.bump(Category::Domain)),
            Category::Username => format!("user{}", self.bump(Category::Username)),
            Category::Password
            | Category::Secret
            | Category::PrivateKey
            | Category::Certificate => REDACTED.to_owned(),
        }
    }

    fn bump(&mut self, category: Category) -> u64 {
        let counter = self
            .counters
            .entry(category)
            .or_insert(self.seed.unwrap_or(0));
        *counter += 1;
        *counter
    }

    /// Allocates the next address from the private 10.0.0.0/8 pool.
    ///
    /// Each distinct input /24 gets its own /16 block (`10.B.0.0/16`), so
    /// subnet structure observable in the document survives redaction.
    /// Hosts within a block are handed out successively starting at
    /// `10.B.0.1`, skipping the .0 and .255 addresses of each /24.
    fn next_ip(&mut self, normalized: &str) -> String {
        let subnet = subnet_key(normalized);
        let block = match self.subnet_blocks.get(&subnet) {
            Some(block) => *block,
            None => {
                let block = self.next_block % 256;
                self.next_block += 1;
                self.subnet_blocks.insert(subnet, block);
                block
            }
        };
        let counter = self.host_counters.entry(block).or_insert(0);
        loop {
            *counter += 1;
            let host = *counter;
            let third = (host >> 8) & 0xff;
            let fourth = host & 0xff;
            if fourth == 0 || fourth == 255 {
                continue;
            }
            return format!("10.{block}.{third}.{fourth}");
        }
    }
}

/// Groups an address into its enclosing subnet for block allocation:
/// the /24 prefix for IPv4, everything before the last group for IPv6.
fn subnet_key(normalized: &str) -> String {
    if let Some((prefix, _)) = normalized.rsplit_once('.') {
        return prefix.to_owned();
    }
    if let Some((prefix, _)) = normalized.rsplit_once(':') {
        return prefix.to_owned();
    }
    normalized.to_owned()
}
