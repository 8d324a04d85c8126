//! Opaque auxiliary payload passed to pricing functions and pumps.

use std::sync::Arc;

use primitive_types::U256;

/// Opaque byte payload owned by a collaborator.
///
/// The engine stores and forwards it without interpreting it.  Cloning is
/// cheap because the bytes are shared.  Built-in collaborators encode their
/// parameters as consecutive 32-byte big-endian words, which
/// [`from_words`](Self::from_words) and [`word`](Self::word) support.
///
/// # Examples
///
/// ```
/// use primitive_types::U256;
/// use well_engine::domain::AuxData;
///
/// let data = AuxData::from_words(&[U256::from(100u8)]);
/// assert_eq!(data.len(), 32);
/// assert_eq!(data.word(0), Some(U256::from(100u8)));
/// assert_eq!(data.word(1), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AuxData(Arc<[u8]>);

impl AuxData {
    /// Wraps raw bytes.
    #[must_use]
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(Arc::from(bytes.into()))
    }

    /// An empty payload.
    #[must_use]
    pub fn empty() -> Self {
        Self(Arc::from(Vec::new()))
    }

    /// Encodes each word as 32 big-endian bytes.
    #[must_use]
    pub fn from_words(words: &[U256]) -> Self {
        let mut bytes = Vec::with_capacity(words.len() * 32);
        for word in words {
            bytes.extend_from_slice(&word.to_big_endian());
        }
        Self::new(bytes)
    }

    /// Decodes the `index`-th 32-byte big-endian word, if present.
    #[must_use]
    pub fn word(&self, index: usize) -> Option<U256> {
        let start = index.checked_mul(32)?;
        let end = start.checked_add(32)?;
        self.0.get(start..end).map(U256::from_big_endian)
    }

    /// Borrowed bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Payload length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` for an empty payload.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for AuxData {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<Vec<u8>> for AuxData {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

impl From<&[u8]> for AuxData {
    fn from(bytes: &[u8]) -> Self {
        Self(Arc::from(bytes))
    }
}
