// BLOB version prefix helpers. [version: u8][wincode payload].

pub(super) const BLOB_VERSION: u8 = 1;

pub(super) fn with_version_prefix(payload: Vec<u8>) -> Vec<u8> {
    let mut out = Vec::with_capacity(1 + payload.len());
    out.push(BLOB_VERSION);
    out.extend_from_slice(&payload);
    out
}

/// Payload after the version byte, or `Err(version)` when the blob is empty or foreign.
pub(super) fn blob_payload(bytes: &[u8]) -> Result<&[u8], u8> {
    match bytes.split_first() {
        Some((&BLOB_VERSION, rest)) => Ok(rest),
        Some((&v, _)) => Err(v),
        None => Err(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_then_strip() {
        let blob = with_version_prefix(vec![7, 8]);
        assert_eq!(blob, vec![BLOB_VERSION, 7, 8]);
        assert_eq!(blob_payload(&blob), Ok(&[7u8, 8][..]));
    }

    #[test]
    fn unknown_version_or_empty() {
        assert_eq!(blob_payload(&[9, 1]), Err(9));
        assert_eq!(blob_payload(&[]), Err(0));
    }
}
