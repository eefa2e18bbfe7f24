//! Content equality across differently shaped trees

use crate::text::Text;

/// Compare two texts chunk by chunk without materializing either
pub(crate) fn eq_content(a: &Text, b: &Text) -> bool {
    if a.len() != b.len() || a.line_breaks() != b.line_breaks() {
        return false;
    }

    let (mut left, mut right) = (a.chunks(), b.chunks());
    let (mut l, mut r): (&[u8], &[u8]) = (&[], &[]);
    loop {
        if l.is_empty() {
            match left.next() {
                Some(chunk) => l = chunk.as_bytes(),
                None => return r.is_empty() && right.next().is_none(),
            }
        }
        if r.is_empty() {
            match right.next() {
                Some(chunk) => r = chunk.as_bytes(),
                None => return false,
            }
        }

        // Consume the shorter side from both
        let n = l.len().min(r.len());
        if l[..n] != r[..n] {
            return false;
        }
        l = &l[n..];
        r = &r[n..];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_content_different_shapes() {
        let content = "shape independent\n".repeat(200);
        let built = Text::of(&content);

        let mut typed = Text::empty();
        for (i, ch) in content.char_indices() {
            typed = typed.replace(i, i, ch.encode_utf8(&mut [0; 4]));
        }

        assert!(!built.ptr_eq(&typed));
        assert!(eq_content(&built, &typed));
        assert_eq!(built, typed);
    }

    #[test]
    fn test_length_mismatch_rejects() {
        assert!(!eq_content(&Text::of("abc"), &Text::of("abcd")));
    }

    #[test]
    fn test_difference_in_last_chunk() {
        let a = Text::of(&format!("{}x", "y".repeat(3000)));
        let b = Text::of(&format!("{}z", "y".repeat(3000)));
        assert!(!eq_content(&a, &b));
        assert_ne!(a, b);
    }
}
