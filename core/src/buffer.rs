//! Growable in-memory sink for a streamed HTTP response.

use std::collections::TryReserveError;

use crate::error::TransportError;

/// Owned byte buffer the transport appends response chunks into.
///
/// Capacity only ever grows. Growth goes through `Vec::try_reserve`, so an
/// allocator refusal surfaces as an error instead of an abort, and an
/// optional `limit` caps the total size.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ResponseBuffer {
    data: Vec<u8>,
    limit: Option<usize>,
    live: LiveToken,
}

#[cfg(not(test))]
type LiveToken = ();

#[cfg(test)]
type LiveToken = live::Token;


/// Why an append was refused.
#[derive(Debug)]
pub enum GrowError {
    LimitExceeded { requested: usize, limit: usize },
    Alloc { requested: usize, source: TryReserveError },
}

impl From<GrowError> for TransportError {
    fn from(err: GrowError) -> Self {
        match err {
            GrowError::LimitExceeded { requested, limit } => TransportError::AllocationFailure {
                requested,
                limit: Some(limit),
            },
            GrowError::Alloc { requested, .. } => TransportError::AllocationFailure {
                requested,
                limit: None,
            },
        }
    }
}

impl ResponseBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A buffer that refuses to grow past `limit` bytes.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            data: Vec::new(),
            limit: Some(limit),
            live: Default::default(),
        }
    }

    /// Append `chunk`, growing the allocation as needed. On failure the
    /// buffer is left exactly as it was.
    pub fn append(&mut self, chunk: &[u8]) -> Result<(), GrowError> {
        let requested = self.data.len().saturating_add(chunk.len());
        if let Some(limit) = self.limit {
            if requested > limit {
                return Err(GrowError::LimitExceeded { requested, limit });
            }
        }
        self.data
            .try_reserve(chunk.len())
            .map_err(|source| GrowError::Alloc { requested, source })?;
        self.data.extend_from_slice(chunk);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Split at `offset` into `(head, tail)`. An offset past the end is
    /// clamped, so the head takes everything and the tail is empty.
    pub fn split_at(&self, offset: usize) -> (&[u8], &[u8]) {
        self.data.split_at(offset.min(self.data.len()))
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn chunks_are_concatenated_in_order() {
        let mut buf = ResponseBuffer::new();
        for chunk in ["ab", "cd", "ef"] {
            buf.append(chunk.as_bytes()).unwrap();
        }
        assert_eq!(buf.as_bytes(), b"abcdef");
        assert_eq!(buf.len(), 6);
    }

    #[test]
    fn capacity_is_monotonic_and_covers_len() {
        let mut buf = ResponseBuffer::new();
        let mut last = buf.capacity();
        for i in 0..64 {
            buf.append(&vec![b'x'; i]).unwrap();
            assert!(buf.len() <= buf.capacity());
            assert!(buf.capacity() >= last);
            last = buf.capacity();
        }
    }

    #[test]
    fn empty_chunk_is_noop() {
        let mut buf = ResponseBuffer::new();
        buf.append(b"").unwrap();
        assert!(buf.is_empty());
    }

    #[test]
    fn limit_refuses_growth_without_truncating() {
        let mut buf = ResponseBuffer::with_limit(4);
        buf.append(b"abc").unwrap();
        let err = buf.append(b"de").unwrap_err();
        assert!(matches!(err, GrowError::LimitExceeded { requested: 5, limit: 4 }));
        assert_eq!(buf.as_bytes(), b"abc");
    }

    #[test]
    fn grow_error_maps_to_allocation_failure() {
        let err: TransportError = GrowError::LimitExceeded { requested: 9, limit: 8 }.into();
        assert!(matches!(
            err,
            TransportError::AllocationFailure { requested: 9, limit: Some(8) }
        ));
    }

    #[test]
    fn live_count_tracks_buffers() {
        let before = live::count();
        let a = ResponseBuffer::new();
        let b = a.clone();
        let c = ResponseBuffer::with_limit(8);
        assert_eq!(live::count(), before + 3);
        let bytes = c.into_bytes();
        assert!(bytes.is_empty());
        drop((a, b));
        assert_eq!(live::count(), before);
    }

    #[test]
    fn split_at_clamps_offset() {
        let mut buf = ResponseBuffer::new();
        buf.append(b"HTTP/1.1 200 OK\r\n\r\nbody").unwrap();
        let (head, body) = buf.split_at(19);
        assert_eq!(head, b"HTTP/1.1 200 OK\r\n\r\n");
        assert_eq!(body, b"body");

        let (head, body) = buf.split_at(1000);
        assert_eq!(head.len(), buf.len());
        assert!(body.is_empty());
    }

    proptest! {
        #[test]
        fn accumulation_ignores_chunk_boundaries(
            bytes in proptest::collection::vec(any::<u8>(), 0..512),
            cuts in proptest::collection::vec(0usize..512, 0..8),
        ) {
            let mut cuts: Vec<usize> = cuts.into_iter().map(|c| c.min(bytes.len())).collect();
            cuts.sort_unstable();

            let mut buf = ResponseBuffer::new();
            let mut start = 0;
            for cut in cuts.into_iter().chain(std::iter::once(bytes.len())) {
                buf.append(&bytes[start..cut]).unwrap();
                start = cut;
            }
            prop_assert_eq!(buf.as_bytes(), &bytes[..]);
        }
    }
}
