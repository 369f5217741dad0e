//! Masked interactive secret entry.
//!
//! When no secret arrives through configuration, one is read from the
//! terminal a byte at a time, echoing a masking character per byte so the
//! secret never appears in scrollback. The read stops at the first CR or LF
//! (excluded from the secret) or at end of input, and is bounded by
//! [`MAX_SECRET_LEN`]. The same terminator and bound rules apply under
//! piped input, where the masking is cosmetic.

use std::io::{self, Read, Write};

use zeroize::Zeroizing;

use crate::domain::types::{CredentialSecret, MAX_SECRET_LEN};
use crate::infra::error::{VeoError, VeoResult};

/// Backspace-then-asterisk, overwriting the echoed character on terminals
/// that echo input themselves.
const MASK: &[u8] = b"\x08*";

/// Prompt on stdout and read a masked secret from stdin.
pub fn prompt_for_secret() -> VeoResult<CredentialSecret> {
    let stdout = io::stdout();
    {
        let mut out = stdout.lock();
        out.write_all(b"Password: ")?;
        out.flush()?;
    }
    let secret = read_masked_secret(io::stdin().lock(), stdout.lock())?;
    let mut out = stdout.lock();
    out.write_all(b"\n")?;
    out.flush()?;
    Ok(secret)
}

/// Read a secret from `input`, echoing one mask per collected byte to `echo`.
///
/// Terminates at the first CR or LF (not collected) or at end of input.
/// Collecting more than [`MAX_SECRET_LEN`] bytes is a configuration error.
pub fn read_masked_secret<R: Read, W: Write>(input: R, mut echo: W) -> VeoResult<CredentialSecret> {
    let mut collected = Zeroizing::new(Vec::new());
    for byte in input.bytes() {
        let byte =
            byte.map_err(|e| VeoError::io("prompt", 60, format!("error reading secret: {e}")))?;
        if byte == b'\r' || byte == b'\n' {
            break;
        }
        if collected.len() == MAX_SECRET_LEN {
            return Err(VeoError::configuration(
                "prompt",
                61,
                format!("credential secret exceeds {MAX_SECRET_LEN} bytes"),
            ));
        }
        echo.write_all(MASK)?;
        echo.flush()?;
        collected.push(byte);
    }
    let text = String::from_utf8(collected.to_vec())
        .map_err(|_| VeoError::configuration("prompt", 62, "credential secret is not valid UTF-8"))?;
    CredentialSecret::new(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn mask_count(echoed: &[u8]) -> usize {
        echoed.iter().filter(|&&b| b == b'*').count()
    }

    #[test]
    fn collects_until_carriage_return() {
        let mut echoed = Vec::new();
        let secret = read_masked_secret(Cursor::new(b"pass\rrest"), &mut echoed).unwrap();
        assert_eq!(secret.as_str(), "pass");
        assert_eq!(mask_count(&echoed), 4);
    }

    #[test]
    fn collects_until_line_feed() {
        let mut echoed = Vec::new();
        let secret = read_masked_secret(Cursor::new(b"pass\n"), &mut echoed).unwrap();
        assert_eq!(secret.as_str(), "pass");
        assert_eq!(mask_count(&echoed), 4);
    }

    #[test]
    fn terminator_is_not_masked_or_collected() {
        let mut echoed = Vec::new();
        let secret = read_masked_secret(Cursor::new(b"\r"), &mut echoed).unwrap();
        assert_eq!(secret.as_str(), "");
        assert_eq!(mask_count(&echoed), 0);
    }

    #[test]
    fn end_of_input_terminates() {
        let mut echoed = Vec::new();
        let secret = read_masked_secret(Cursor::new(b"abc"), &mut echoed).unwrap();
        assert_eq!(secret.as_str(), "abc");
        assert_eq!(mask_count(&echoed), 3);
    }

    #[test]
    fn over_long_secret_is_rejected() {
        let long = vec![b'x'; MAX_SECRET_LEN + 1];
        let mut echoed = Vec::new();
        let err = read_masked_secret(Cursor::new(long), &mut echoed).unwrap_err();
        assert!(matches!(err, VeoError::Configuration { .. }));
        assert_eq!(err.component(), "prompt");
    }

    #[test]
    fn secret_at_limit_is_accepted() {
        let exact = vec![b'x'; MAX_SECRET_LEN];
        let mut echoed = Vec::new();
        let secret = read_masked_secret(Cursor::new(exact), &mut echoed).unwrap();
        assert_eq!(secret.as_str().len(), MAX_SECRET_LEN);
    }
}
