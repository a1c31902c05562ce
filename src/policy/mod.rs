//! Ownership policy: the single rule deciding whether the current identity
//! may mutate a resource.
//!
//! Every owned resource reduces to an [`OwnedResource`] descriptor before
//! authorization, so the owner-match branch lives here once instead of being
//! re-implemented per route. For dependent resources (images) the descriptor
//! carries the parent's owner. Existence is always checked before ownership:
//! a missing resource is 404, never 403, so ownership checks cannot leak
//! whether a resource exists.

use uuid::Uuid;

use crate::database::models::{Review, Spot};
use crate::database::queries::review_images::ReviewImageWithOwner;
use crate::database::queries::spot_images::SpotImageWithOwner;
use crate::error::ApiError;
use crate::middleware::Identity;

pub mod constraints;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Spot,
    Review,
    SpotImage,
    ReviewImage,
}

impl ResourceKind {
    pub fn not_found_message(self) -> &'static str {
        match self {
            ResourceKind::Spot => "Spot couldn't be found",
            ResourceKind::Review => "Review couldn't be found",
            ResourceKind::SpotImage => "Spot Image couldn't be found",
            ResourceKind::ReviewImage => "Review Image couldn't be found",
        }
    }
}

/// Descriptor of a resource for authorization purposes. `owner_id` is the
/// creating user for direct resources, or the parent's owner for images.
#[derive(Debug, Clone, Copy)]
pub struct OwnedResource {
    pub kind: ResourceKind,
    pub owner_id: Uuid,
}

/// Anything the ownership policy can authorize a mutation against.
pub trait Owned {
    fn resource(&self) -> OwnedResource;
}

impl Owned for Spot {
    fn resource(&self) -> OwnedResource {
        OwnedResource {
            kind: ResourceKind::Spot,
            owner_id: self.owner_id,
        }
    }
}

impl Owned for Review {
    fn resource(&self) -> OwnedResource {
        OwnedResource {
            kind: ResourceKind::Review,
            owner_id: self.user_id,
        }
    }
}

impl Owned for SpotImageWithOwner {
    fn resource(&self) -> OwnedResource {
        OwnedResource {
            kind: ResourceKind::SpotImage,
            owner_id: self.owner_id,
        }
    }
}

impl Owned for ReviewImageWithOwner {
    fn resource(&self) -> OwnedResource {
        OwnedResource {
            kind: ResourceKind::ReviewImage,
            owner_id: self.owner_id,
        }
    }
}

/// Existence gate, applied before any ownership comparison.
pub fn require_found<T>(found: Option<T>, kind: ResourceKind) -> Result<T, ApiError> {
    found.ok_or_else(|| ApiError::not_found(kind.not_found_message()))
}

/// Owner-only mutation rule, uniform across resource types.
///
/// Idempotent and side-effect free; the action being attempted does not
/// change the outcome (reads of listings are public and never come here).
pub fn authorize_mutation(identity: &Identity, resource: &impl Owned) -> Result<(), ApiError> {
    let descriptor = resource.resource();
    if descriptor.owner_id == identity.id {
        Ok(())
    } else {
        tracing::debug!(
            "denied mutation of {:?} owned by {} to user {}",
            descriptor.kind,
            descriptor.owner_id,
            identity.id
        );
        Err(ApiError::forbidden("Forbidden"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;

    fn identity(id: Uuid) -> Identity {
        Identity {
            id,
            email: "user@example.com".to_string(),
            username: "user".to_string(),
        }
    }

    fn spot(owner_id: Uuid) -> Spot {
        Spot {
            id: Uuid::new_v4(),
            owner_id,
            address: "123 Main St".to_string(),
            city: "Springfield".to_string(),
            state: "OR".to_string(),
            country: "USA".to_string(),
            lat: 44.05,
            lng: -123.09,
            name: "Cozy cabin".to_string(),
            description: "A cabin".to_string(),
            price: Decimal::new(12000, 2),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn owner_may_mutate_own_spot() {
        let owner = Uuid::new_v4();
        assert!(authorize_mutation(&identity(owner), &spot(owner)).is_ok());
    }

    #[test]
    fn non_owner_is_forbidden() {
        let result = authorize_mutation(&identity(Uuid::new_v4()), &spot(Uuid::new_v4()));
        match result {
            Err(ApiError::Forbidden(_)) => {}
            other => panic!("expected Forbidden, got {:?}", other),
        }
    }

    #[test]
    fn review_owner_is_the_author() {
        let author = Uuid::new_v4();
        let review = Review {
            id: Uuid::new_v4(),
            spot_id: Uuid::new_v4(),
            user_id: author,
            review: "Great stay".to_string(),
            stars: 5,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(authorize_mutation(&identity(author), &review).is_ok());
        assert!(authorize_mutation(&identity(Uuid::new_v4()), &review).is_err());
    }

    #[test]
    fn image_ownership_follows_the_parent() {
        let parent_owner = Uuid::new_v4();
        let image = SpotImageWithOwner {
            id: Uuid::new_v4(),
            spot_id: Uuid::new_v4(),
            owner_id: parent_owner,
        };
        assert!(authorize_mutation(&identity(parent_owner), &image).is_ok());
        assert!(authorize_mutation(&identity(Uuid::new_v4()), &image).is_err());
    }

    #[test]
    fn missing_resource_is_not_found_never_forbidden() {
        let result = require_found(None::<Spot>, ResourceKind::Spot);
        match result {
            Err(ApiError::NotFound(msg)) => assert_eq!(msg, "Spot couldn't be found"),
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn found_resource_passes_through() {
        let owner = Uuid::new_v4();
        let found = require_found(Some(spot(owner)), ResourceKind::Spot).expect("found");
        assert_eq!(found.owner_id, owner);
    }
}
