// Constant-time equality for signatures

use subtle::ConstantTimeEq;

/// Compare two byte strings without leaking where they first differ.
///
/// Both inputs are padded to the longer length with different fill bytes and
/// compared in full, so a length mismatch costs the same as a content
/// mismatch. Timing depends only on the lengths, which are not secret.
pub fn compare_digest(a: impl AsRef<[u8]>, b: impl AsRef<[u8]>) -> bool {
    let a = a.as_ref();
    let b = b.as_ref();
    let max_len = a.len().max(b.len());

    let mut a_padded = vec![0x00u8; max_len];
    let mut b_padded = vec![0xFFu8; max_len];
    a_padded[..a.len()].copy_from_slice(a);
    b_padded[..b.len()].copy_from_slice(b);

    let lengths_equal = (a.len() as u64).ct_eq(&(b.len() as u64));
    let contents_equal = a_padded.ct_eq(&b_padded);

    (lengths_equal & contents_equal).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_values() {
        assert!(compare_digest("", ""));
        assert!(!compare_digest("a", ""));
        assert!(!compare_digest("", "a"));
    }

    #[test]
    fn test_equal_length_mismatch() {
        assert!(!compare_digest("abcd", "abce"));
        assert!(!compare_digest("abcd", "zbcd"));
    }

    #[test]
    fn test_prefix_is_not_equal() {
        assert!(!compare_digest("abc", "abcd"));
        assert!(!compare_digest("abcd", "abc"));
    }

    #[test]
    fn test_padding_bytes_do_not_match() {
        // A shorter input must not compare equal to one ending in the fill byte
        assert!(!compare_digest(b"ab".as_slice(), b"ab\x00".as_slice()));
        assert!(!compare_digest(b"ab\xff".as_slice(), b"ab".as_slice()));
    }

    #[test]
    fn test_full_length_signatures() {
        let sig = "0123456789abcdef".repeat(4);
        assert_eq!(sig.len(), 64);
        assert!(compare_digest(&sig, &sig.clone()));

        let mut altered = sig.clone().into_bytes();
        altered[63] = b'0';
        assert!(!compare_digest(sig.as_bytes(), &altered));
    }

    #[test]
    fn test_bytes_and_str_mix() {
        assert!(compare_digest("ACK", b"ACK"));
        assert!(compare_digest(vec![1u8, 2, 3], [1u8, 2, 3]));
    }
}
