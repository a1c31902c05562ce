//! Domain invariants enforced at creation time, independent of ownership.
//!
//! These are pure decisions over counts the handler has just read. They are
//! the friendly fast path; under concurrent creation the storage layer is
//! authoritative (the reviews unique index, see the migration), and handlers
//! map a storage-level violation to the same error.

use crate::error::ApiError;

/// Maximum images attached to one review. Evaluated against the count at the
/// instant of the check, not enforced retroactively.
pub const REVIEW_IMAGE_CAP: i64 = 10;

/// At most one review per (user, spot) pair. Deleting a review frees the key.
pub fn enforce_unique_review(already_exists: bool) -> Result<(), ApiError> {
    if already_exists {
        Err(ApiError::conflict("User already has a review for this spot"))
    } else {
        Ok(())
    }
}

/// Cap the number of images on a review at [`REVIEW_IMAGE_CAP`].
pub fn enforce_image_cap(current_count: i64) -> Result<(), ApiError> {
    if current_count >= REVIEW_IMAGE_CAP {
        Err(ApiError::forbidden(
            "Maximum number of images for this resource was reached",
        ))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_review_is_a_conflict() {
        match enforce_unique_review(true) {
            Err(ApiError::Conflict(msg)) => {
                assert_eq!(msg, "User already has a review for this spot");
            }
            other => panic!("expected Conflict, got {:?}", other),
        }
        assert!(enforce_unique_review(false).is_ok());
    }

    #[test]
    fn tenth_image_is_allowed_eleventh_is_not() {
        assert!(enforce_image_cap(9).is_ok());
        match enforce_image_cap(10) {
            Err(ApiError::Forbidden(msg)) => {
                assert_eq!(msg, "Maximum number of images for this resource was reached");
            }
            other => panic!("expected Forbidden, got {:?}", other),
        }
    }

    #[test]
    fn cap_error_maps_to_403() {
        let err = enforce_image_cap(REVIEW_IMAGE_CAP).unwrap_err();
        assert_eq!(err.status_code(), 403);
    }
}
