//! Mirror-node identifier and decimals resolution.

mod resolver;

pub use resolver::{is_entity_id, is_hex_address, MirrorClient, TokenInfo, DEFAULT_MIRROR_BASE_URL};
