//! Decoder options

use serde::{Deserialize, Serialize};

/// Tunables for one decoding session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeOptions {
    /// Fail when a parsable skippable chunk's reader does not consume exactly the
    /// declared size. When false, the cursor is moved to the declared end instead.
    pub strict_chunk_sizes: bool,
    /// Decode zip archives embedded in maps; when false the archive is kept as bytes
    pub decode_embedded: bool,
    /// Maximum nesting of embedded archives
    pub max_embedded_depth: u32,
    /// Maximum nesting of node references
    pub max_node_depth: u32,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            strict_chunk_sizes: true,
            decode_embedded: true,
            max_embedded_depth: 4,
            max_node_depth: 256,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let opts: DecodeOptions = serde_json::from_str(r#"{"strict_chunk_sizes":false}"#).unwrap();
        assert!(!opts.strict_chunk_sizes);
        assert!(opts.decode_embedded);
        assert_eq!(opts.max_node_depth, 256);
    }
}
