use std::ops::Deref;

use crate::error::{LengthErrorKind, Result, RtpError};

/// Bounded list of contributing source identifiers (RFC 3550 §5.1).
///
/// The header's CC field is 4 bits wide, so a packet carries at most 15
/// CSRCs. Every mutation checks that bound before touching the list: a
/// rejected call leaves the contents exactly as they were. Values are
/// `u32`, which already covers the full `0..2^32` range.
///
/// Reads go through [`Deref`] to `[u32]`; there is no way to reach the
/// inner `Vec` and grow it unchecked.
///
/// ```
/// use rtp::CsrcList;
///
/// let mut list = CsrcList::try_from(vec![1, 2, 3]).unwrap();
/// list.insert(0, 9).unwrap();
/// assert_eq!(&list[..], &[9, 1, 2, 3]);
///
/// assert!(list.extend([0; 12]).is_err());
/// assert_eq!(list.len(), 4);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CsrcList {
    csrcs: Vec<u32>,
}

impl CsrcList {
    /// Maximum number of CSRCs a packet can carry.
    pub const MAX_LEN: usize = 15;

    /// Create an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    fn check_len(len: usize) -> Result<()> {
        if len > Self::MAX_LEN {
            tracing::debug!(len, "rejecting CSRC list over 15 entries");
            return Err(RtpError::length(LengthErrorKind::TooManyCsrcs { len }));
        }
        Ok(())
    }

    /// Add a CSRC to the end of the list.
    ///
    /// Returns a length error if the list is already full.
    pub fn append(&mut self, csrc: u32) -> Result<()> {
        Self::check_len(self.csrcs.len() + 1)?;
        self.csrcs.push(csrc);
        Ok(())
    }

    /// Insert a CSRC before position `index`.
    ///
    /// `index == len()` appends. An index past the end, or one that would
    /// land at position 15 or later, is an index error. Inserting into a
    /// full list at a valid position is a length error.
    pub fn insert(&mut self, index: usize, csrc: u32) -> Result<()> {
        let len = self.csrcs.len();
        if index > len || index >= Self::MAX_LEN {
            return Err(RtpError::Index { index, len });
        }
        Self::check_len(len + 1)?;

        self.csrcs.insert(index, csrc);
        Ok(())
    }

    /// Append every CSRC from `csrcs`, or none of them.
    ///
    /// The combined length is checked before the list is modified.
    pub fn extend<I>(&mut self, csrcs: I) -> Result<()>
    where
        I: IntoIterator<Item = u32>,
    {
        let incoming: Vec<u32> = csrcs.into_iter().collect();
        Self::check_len(self.csrcs.len() + incoming.len())?;
        self.csrcs.extend(incoming);
        Ok(())
    }

    /// A new list holding `self` followed by `other`. `self` is untouched.
    pub fn concat(&self, other: &[u32]) -> Result<Self> {
        let mut joined = self.clone();
        joined.extend(other.iter().copied())?;
        Ok(joined)
    }

    /// Overwrite the CSRC at `index`.
    pub fn set(&mut self, index: usize, csrc: u32) -> Result<()> {
        let len = self.csrcs.len();
        let slot = self
            .csrcs
            .get_mut(index)
            .ok_or(RtpError::Index { index, len })?;
        *slot = csrc;
        Ok(())
    }

    /// Remove and return the CSRC at `index`, shifting later entries left.
    pub fn remove(&mut self, index: usize) -> Result<u32> {
        let len = self.csrcs.len();
        if index >= len {
            return Err(RtpError::Index { index, len });
        }
        Ok(self.csrcs.remove(index))
    }

    pub fn pop(&mut self) -> Option<u32> {
        self.csrcs.pop()
    }

    pub fn clear(&mut self) {
        self.csrcs.clear();
    }

    /// Whether another CSRC can still be appended.
    pub fn is_full(&self) -> bool {
        self.csrcs.len() == Self::MAX_LEN
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.csrcs
    }
}

impl Deref for CsrcList {
    type Target = [u32];

    fn deref(&self) -> &[u32] {
        &self.csrcs
    }
}

impl TryFrom<Vec<u32>> for CsrcList {
    type Error = RtpError;

    fn try_from(csrcs: Vec<u32>) -> Result<Self> {
        Self::check_len(csrcs.len())?;
        Ok(Self { csrcs })
    }
}

impl TryFrom<&[u32]> for CsrcList {
    type Error = RtpError;

    fn try_from(csrcs: &[u32]) -> Result<Self> {
        Self::try_from(csrcs.to_vec())
    }
}

impl<'a> IntoIterator for &'a CsrcList {
    type Item = &'a u32;
    type IntoIter = std::slice::Iter<'a, u32>;

    fn into_iter(self) -> Self::IntoIter {
        self.csrcs.iter()
    }
}

impl From<CsrcList> for Vec<u32> {
    fn from(list: CsrcList) -> Vec<u32> {
        list.csrcs
    }
}
