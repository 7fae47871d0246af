use serde::Deserialize;

/// Subset of the `getblockheader` answer the collector needs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BlockHeader {
    pub hash: String,
    pub height: i64,
    pub time: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_block_header() {
        let json = r#"{
            "hash": "8f2b5e6a0d3c2e1f00112233445566778899aabbccddeeff0011223344556677",
            "confirmations": 1,
            "height": 1000,
            "version": 536870912,
            "merkleroot": "00",
            "time": 1700000000,
            "mediantime": 1699999000,
            "nonce": 0,
            "bits": "1a0ffff0",
            "difficulty": 1.0,
            "chainwork": "00",
            "previousblockhash": "00"
        }"#;

        let header: BlockHeader = serde_json::from_str(json).unwrap();
        assert_eq!(header.height, 1000);
        assert_eq!(header.time, 1700000000);
        assert!(header.hash.starts_with("8f2b5e6a"));
    }
}
