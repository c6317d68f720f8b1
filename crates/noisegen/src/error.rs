// SPDX-License-Identifier: LGPL-3.0-or-later

//! Errors raised while building a noise generator plugin.

/// Construction error. Processing itself never fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A scratch buffer could not be reserved.
    #[error("failed to allocate {size} samples for {what}")]
    Allocation { what: &'static str, size: usize },
    /// Channel or generator count outside the supported range.
    #[error("invalid topology: {0}")]
    InvalidTopology(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Allocate a zeroed sample buffer, reporting failure instead of aborting.
pub(crate) fn alloc_buffer(what: &'static str, size: usize) -> Result<Vec<f32>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(size)
        .map_err(|_| Error::Allocation { what, size })?;
    buf.resize(size, 0.0);
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alloc_buffer_is_zeroed() {
        let buf = alloc_buffer("test", 128).unwrap();
        assert_eq!(buf.len(), 128);
        assert!(buf.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_alloc_failure_is_reported() {
        let err = alloc_buffer("huge", usize::MAX / 2).unwrap_err();
        assert_eq!(
            err,
            Error::Allocation {
                what: "huge",
                size: usize::MAX / 2
            }
        );
        assert!(err.to_string().contains("huge"));
    }
}
