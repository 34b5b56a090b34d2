//! Escape decoding for string and char literals.
//!
//! Literal text reaches this module exactly as the tokenizer saw it. Every
//! escape resolves to a single byte, including `\u`, which keeps only the
//! low byte of its code unit.

use snafu::Snafu;

#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
pub enum EscapeError {
  #[snafu(display("incomplete escape sequence"))]
  Incomplete,

  #[snafu(display("incomplete hex escape"))]
  IncompleteHex,

  #[snafu(display("incomplete unicode escape"))]
  IncompleteUnicode,

  #[snafu(display("invalid hex escape '{digits}'"))]
  InvalidHex { digits: String },

  #[snafu(display("unknown escape sequence: \\{ch}"))]
  Unknown { ch: char },
}

/// Decode the byte at `*cursor`.
///
/// A plain byte is returned as-is and the cursor stays put. On a backslash
/// the cursor is left on the last byte of the escape, so callers step past
/// it with a single increment either way. Past the end of `text` the result
/// is `0`.
pub fn decode_escape(text: &[u8], cursor: &mut usize) -> Result<u8, EscapeError> {
  let Some(&c) = text.get(*cursor) else {
    return Ok(0);
  };
  if c != b'\\' {
    return Ok(c);
  }

  *cursor += 1;
  let Some(&c) = text.get(*cursor) else {
    return IncompleteSnafu.fail();
  };

  let byte = match c {
    b'n' => b'\n',
    b't' => b'\t',
    b'r' => b'\r',
    b'0' => 0,
    b'\\' => b'\\',
    b'\'' => b'\'',
    b'"' => b'"',
    b'b' => 0x08,
    b'f' => 0x0c,
    b'v' => 0x0b,
    b'a' => 0x07,
    b'x' => {
      let value = hex_digits(text, cursor, 2).ok_or(EscapeError::IncompleteHex)??;
      value as u8
    }
    b'u' => {
      let value = hex_digits(text, cursor, 4).ok_or(EscapeError::IncompleteUnicode)??;
      // Only the low byte survives.
      (value & 0xff) as u8
    }
    _ => {
      let ch = std::str::from_utf8(&text[*cursor..])
        .ok()
        .and_then(|rest| rest.chars().next())
        .unwrap_or(c as char);
      return UnknownSnafu { ch }.fail();
    }
  };
  Ok(byte)
}

/// Read `count` hex digits after the escape letter at `*cursor`.
///
/// `None` when the text is too short; the cursor then stays on the letter.
fn hex_digits(
  text: &[u8],
  cursor: &mut usize,
  count: usize,
) -> Option<Result<u32, EscapeError>> {
  let start = *cursor + 1;
  let digits = text.get(start..start + count)?;
  *cursor += count;

  let digits = String::from_utf8_lossy(digits).into_owned();
  let parsed = if digits.bytes().all(|b| b.is_ascii_hexdigit()) {
    u32::from_str_radix(&digits, 16).ok()
  } else {
    None
  };
  Some(parsed.ok_or(EscapeError::InvalidHex { digits }))
}

/// Decode a whole literal, one byte per plain character or per escape.
///
/// Errors are handed to `on_error` and stand in as a `0` byte so decoding
/// carries on across the rest of the literal.
pub fn unescape(text: &str, mut on_error: impl FnMut(EscapeError)) -> Vec<u8> {
  let bytes = text.as_bytes();
  let mut out = Vec::with_capacity(bytes.len());
  let mut i = 0;
  while i < bytes.len() {
    let byte = decode_escape(bytes, &mut i).unwrap_or_else(|err| {
      on_error(err);
      0
    });
    out.push(byte);
    i += 1;
  }
  out
}
