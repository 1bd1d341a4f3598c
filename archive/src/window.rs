use crate::error::InflateError;

pub const MAX_DISTANCE: usize = 32768;

/// Everything decoded so far in a session. Back-references read from it
/// and append to it.
#[derive(Debug, Default)]
pub struct OutputWindow {
    data: Vec<u8>,
}

impl OutputWindow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(n: usize) -> Self {
        Self {
            data: Vec::with_capacity(n),
        }
    }

    #[inline]
    pub fn push(&mut self, byte: u8) {
        self.data.push(byte);
    }

    pub fn extend_from_slice(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    /// Appends `length` bytes starting `distance` bytes back from the end.
    ///
    /// When `distance < length` the source overlaps the bytes being written,
    /// so the copy goes one byte at a time and repeats the most recent
    /// `distance` bytes.
    pub fn copy_match(&mut self, distance: usize, length: usize) -> Result<(), InflateError> {
        let available = self.data.len();
        if distance == 0 || distance > available || distance > MAX_DISTANCE {
            return Err(InflateError::InvalidBackReference {
                distance,
                available,
            });
        }

        let start = available - distance;
        if distance >= length {
            self.data.extend_from_within(start..start + length);
        } else {
            self.data.reserve(length);
            for i in 0..length {
                let byte = self.data[start + i];
                self.data.push(byte);
            }
        }

        Ok(())
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    #[case(b"abc", 3, 6, b"abcabcabc")]
    #[case(b"xabc", 3, 3, b"xabcabc")]
    #[case(b"a", 1, 5, b"aaaaaa")]
    #[case(b"abcd", 4, 2, b"abcdab")]
    #[case(b"ab", 2, 5, b"abababa")]
    fn test_copy_match(
        #[case] initial: &[u8],
        #[case] distance: usize,
        #[case] length: usize,
        #[case] expected: &[u8],
    ) {
        let mut window = OutputWindow::new();
        window.extend_from_slice(initial);
        window.copy_match(distance, length).unwrap();
        assert_eq!(window.as_slice(), expected);
    }

    #[rstest]
    #[case(b"", 1)]
    #[case(b"abc", 4)]
    #[case(b"abc", 0)]
    fn test_invalid_back_reference(#[case] initial: &[u8], #[case] distance: usize) {
        let mut window = OutputWindow::new();
        window.extend_from_slice(initial);

        assert!(matches!(
            window.copy_match(distance, 3),
            Err(InflateError::InvalidBackReference { available, .. }) if available == initial.len()
        ));
        assert_eq!(window.len(), initial.len());
    }
}
