//! Minimal Solidity-ABI codec for the fixed supply-chain contract ABI.
//!
//! Covers exactly what the five contract methods need: 4-byte selectors,
//! `uint256`/`string` argument encoding, and decoding of the
//! `getAllProducts()` return value — a dynamic array of
//! `(uint256, string, uint8, address, address, address, address, uint256)`
//! tuples. This is not a general ABI library.

use std::fmt;

use sha3::{Digest, Keccak256};

use crate::address::Address;
use crate::product::{Product, ProductState};

/// Size of one ABI word.
const WORD: usize = 32;

/// Decode failures. The gateway maps these into `GatewayError::Decode`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiError {
    /// Payload ends before the word at `offset` could be read.
    Truncated { offset: usize, len: usize },
    /// A word meant to hold a u64 (id, timestamp, offset, length) carried
    /// high bits the client cannot represent.
    IntOverflow { offset: usize },
    /// A string payload was not valid UTF-8.
    BadUtf8 { offset: usize },
    /// A state ordinal outside 0..=3.
    BadState(u64),
    /// A hex payload from the provider failed to parse.
    BadHex(String),
}

impl fmt::Display for AbiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbiError::Truncated { offset, len } => {
                write!(f, "payload truncated: need word at {offset}, have {len} bytes")
            }
            AbiError::IntOverflow { offset } => {
                write!(f, "integer at offset {offset} exceeds u64 range")
            }
            AbiError::BadUtf8 { offset } => write!(f, "invalid UTF-8 string at offset {offset}"),
            AbiError::BadState(raw) => write!(f, "unknown product state ordinal {raw}"),
            AbiError::BadHex(msg) => write!(f, "invalid hex payload: {msg}"),
        }
    }
}

/// First four bytes of keccak256 over the canonical method signature.
pub fn selector(signature: &str) -> [u8; 4] {
    let digest = Keccak256::digest(signature.as_bytes());
    [digest[0], digest[1], digest[2], digest[3]]
}

/// Calldata for a nullary method, e.g. `getAllProducts()`.
pub fn encode_nullary_call(signature: &str) -> Vec<u8> {
    selector(signature).to_vec()
}

/// Calldata for a method taking a single `uint256` (the transition methods).
pub fn encode_uint_call(signature: &str, value: u64) -> Vec<u8> {
    let mut out = selector(signature).to_vec();
    out.extend_from_slice(&uint_word(value));
    out
}

/// Calldata for a method taking a single `string`, e.g. `addProduct(string)`.
pub fn encode_string_call(signature: &str, value: &str) -> Vec<u8> {
    let mut out = selector(signature).to_vec();
    // Head: offset of the string payload, relative to the start of the args
    out.extend_from_slice(&uint_word(WORD as u64));
    // Tail: length word, then the bytes padded up to a word boundary
    out.extend_from_slice(&uint_word(value.len() as u64));
    out.extend_from_slice(value.as_bytes());
    let pad = (WORD - value.len() % WORD) % WORD;
    out.resize(out.len() + pad, 0);
    out
}

/// Render calldata as the 0x-prefixed hex string the provider expects.
pub fn to_hex(data: &[u8]) -> String {
    format!("0x{}", hex::encode(data))
}

/// Parse a 0x-prefixed (or bare) hex payload from the provider.
pub fn from_hex(payload: &str) -> Result<Vec<u8>, AbiError> {
    let bare = payload.strip_prefix("0x").unwrap_or(payload);
    hex::decode(bare).map_err(|e| AbiError::BadHex(e.to_string()))
}

/// Decode the return payload of `getAllProducts()`.
pub fn decode_product_array(data: &[u8]) -> Result<Vec<Product>, AbiError> {
    let cur = Cursor { data };
    // Word 0 points at the array; the array starts with its length,
    // followed by per-element offsets relative to the element area.
    let array_at = offset(0, cur.uint(0)?, data.len())?;
    let count = cur.uint(array_at)? as usize;
    let elements_at = array_at + WORD;

    let mut products = Vec::with_capacity(count.min(1024));
    for i in 0..count {
        let elem_at = offset(elements_at, cur.uint(elements_at + i * WORD)?, data.len())?;
        products.push(decode_product(&cur, elem_at)?);
    }
    Ok(products)
}

/// One product tuple: 8 head words with the name spilled into the tail.
fn decode_product(cur: &Cursor<'_>, at: usize) -> Result<Product, AbiError> {
    let id = cur.uint(at)?;
    let name_at = offset(at, cur.uint(at + WORD)?, cur.data.len())?;
    let name = cur.string(name_at)?;
    let state_raw = cur.uint(at + 2 * WORD)?;
    let state = u8::try_from(state_raw)
        .ok()
        .and_then(ProductState::from_u8)
        .ok_or(AbiError::BadState(state_raw))?;
    Ok(Product {
        id,
        name,
        state,
        manufacturer: cur.address(at + 3 * WORD)?,
        packer: cur.address(at + 4 * WORD)?,
        shipper: cur.address(at + 5 * WORD)?,
        retailer: cur.address(at + 6 * WORD)?,
        timestamp: cur.uint(at + 7 * WORD)?,
    })
}

/// Resolve a wire offset relative to `base`, bounds-checked against the
/// payload so hostile offsets cannot wrap.
fn offset(base: usize, rel: u64, len: usize) -> Result<usize, AbiError> {
    usize::try_from(rel)
        .ok()
        .and_then(|rel| base.checked_add(rel))
        .filter(|&at| at < len)
        .ok_or(AbiError::Truncated { offset: base, len })
}

struct Cursor<'a> {
    data: &'a [u8],
}

impl Cursor<'_> {
    fn word(&self, at: usize) -> Result<&[u8], AbiError> {
        at.checked_add(WORD)
            .and_then(|end| self.data.get(at..end))
            .ok_or(AbiError::Truncated { offset: at, len: self.data.len() })
    }

    /// Read a word holding a value that must fit in u64.
    fn uint(&self, at: usize) -> Result<u64, AbiError> {
        let word = self.word(at)?;
        if word[..WORD - 8].iter().any(|&b| b != 0) {
            return Err(AbiError::IntOverflow { offset: at });
        }
        let mut raw = [0u8; 8];
        raw.copy_from_slice(&word[WORD - 8..]);
        Ok(u64::from_be_bytes(raw))
    }

    /// Read an address word: last 20 bytes, rendered as lowercase hex.
    fn address(&self, at: usize) -> Result<Address, AbiError> {
        let word = self.word(at)?;
        Ok(Address(format!("0x{}", hex::encode(&word[WORD - 20..]))))
    }

    /// Read a length-prefixed UTF-8 string.
    fn string(&self, at: usize) -> Result<String, AbiError> {
        let len = self.uint(at)? as usize;
        let start = at + WORD;
        let bytes = start
            .checked_add(len)
            .and_then(|end| self.data.get(start..end))
            .ok_or(AbiError::Truncated { offset: start, len: self.data.len() })?;
        String::from_utf8(bytes.to_vec()).map_err(|_| AbiError::BadUtf8 { offset: start })
    }
}

fn uint_word(value: u64) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    word[WORD - 8..].copy_from_slice(&value.to_be_bytes());
    word
}
