use encoding_rs::WINDOWS_1252;

/// Decodes a name field. Bytes past the first NUL are ignored.
pub fn decode_name(raw: &[u8]) -> String {
    let end = raw.iter().position(|b| *b == 0).unwrap_or(raw.len());
    let (result, _, _) = WINDOWS_1252.decode(&raw[..end]);
    result.into()
}

pub fn encode_name(name: &str) -> Vec<u8> {
    let (result, _, _) = WINDOWS_1252.encode(name);
    result.into()
}

/// Encodes a name into a fixed-width, zero padded field.
/// Names longer than the field are truncated.
#[cfg(test)]
pub fn encode_fixed_name(name: &str, width: usize) -> Vec<u8> {
    let mut raw = encode_name(name);
    raw.resize(width, 0);
    raw
}
