//! Modular-arithmetic core of the Vigenere transform.
//!
//! Every attack goes through these functions rather than re-deriving the
//! arithmetic, so all strategies agree on ground truth: non-letters pass
//! through unchanged and the key index advances on letters only.

/// Working alphabet for the whole crate.
pub const ALPHABET: &[u8; 26] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Strips everything outside A-Z and uppercases the remainder.
///
/// Idempotent: `sanitize(sanitize(x)) == sanitize(x)`.
pub fn sanitize(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// Deciphers `ciphertext` against a repeating uppercase `key`.
///
/// Letters are shifted by `(c - k + 26) % 26`; anything else is copied
/// through without consuming a key position, so punctuation and word
/// boundaries survive decryption.
///
/// # Panics
///
/// Panics if `key` is empty. Callers construct keys themselves and must
/// guarantee at least one character.
pub fn decrypt(ciphertext: &str, key: &str) -> String {
    assert!(!key.is_empty(), "decrypt called with an empty key");

    let key = key.as_bytes();
    let mut key_index = 0;
    let mut out = String::with_capacity(ciphertext.len());

    for c in ciphertext.chars() {
        if c.is_ascii_alphabetic() {
            out.push(lookup(c as u8, key[key_index]));
            key_index = (key_index + 1) % key.len();
        } else {
            out.push(c);
        }
    }
    out
}

/// Enciphers `plaintext` against a repeating uppercase `key`.
///
/// Inverse of [`decrypt`] with the same key-advance and passthrough rules,
/// so `decrypt(&encrypt(p, k), k) == p` for uppercase input.
///
/// # Panics
///
/// Panics if `key` is empty.
pub fn encrypt(plaintext: &str, key: &str) -> String {
    assert!(!key.is_empty(), "encrypt called with an empty key");

    let key = key.as_bytes();
    let mut key_index = 0;
    let mut out = String::with_capacity(plaintext.len());

    for c in plaintext.chars() {
        if c.is_ascii_alphabetic() {
            let c = c.to_ascii_uppercase();
            let shifted = (c as u8 - b'A' + (key[key_index] - b'A')) % 26;
            out.push((b'A' + shifted) as char);
            key_index = (key_index + 1) % key.len();
        } else {
            out.push(c);
        }
    }
    out
}

/// Shifts every character of `text` by a single key letter.
///
/// Used to test each of the 26 possible shifts of a coset during frequency
/// analysis. `text` is expected to be sanitized (A-Z only).
pub fn shift(text: &str, letter: char) -> String {
    text.bytes().map(|b| lookup(b, letter as u8)).collect()
}

// One cell of the Vigenere square: cipher letter row, key letter column.
fn lookup(cipher: u8, key: u8) -> char {
    let idx = (cipher as i16 - key as i16 + 26) % 26;
    (b'A' + idx as u8) as char
}
