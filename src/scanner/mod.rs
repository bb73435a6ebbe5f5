//! Aggregation of a governor's complete member surface.
//!
//! [`MemberDetailsScanner::member_details`] walks the governor's superclass
//! chain from the root down. For each level it takes the level's own declared
//! members and then asks every registered ITD provider, other than the one
//! asking, for the members it contributes to that level. The result is passed
//! through every [`MemberDetailsDecorator`] until a whole pass leaves it
//! untouched.
//!
//! Decorators let one add-on tag members that another add-on later reacts to
//! without either knowing about the other: one decorator marks the identifier
//! field, and an unrelated `equals` generator then leaves that field out.

use parking_lot::RwLock;
use std::sync::Arc;

use crate::core::Result;
use crate::metadata::{MetadataId, MetadataService};
use crate::model::{ClassOrInterfaceTypeDetails, MemberDetails, MemberHoldingTypeDetails};

/// Cross-cutting enrichment of member details.
///
/// `decorate` must return the very same `Arc` it received when it makes no
/// change (build through [`crate::model::MemberDetailsBuilder`], which does
/// this). Decorators must converge: applying one twice in a row changes
/// nothing the second time.
pub trait MemberDetailsDecorator: Send + Sync {
    fn name(&self) -> &str;

    fn decorate(&self, requesting_class: &MetadataId, details: &Arc<MemberDetails>) -> Arc<MemberDetails>;
}

/// Builds [`MemberDetails`] for ITD providers.
#[derive(Default)]
pub struct MemberDetailsScanner {
    decorators: RwLock<Vec<Arc<dyn MemberDetailsDecorator>>>,
}

impl MemberDetailsScanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_decorator(&self, decorator: Arc<dyn MemberDetailsDecorator>) {
        tracing::debug!("Registered member details decorator {}", decorator.name());
        self.decorators.write().push(decorator);
    }

    pub fn remove_decorator(&self, name: &str) -> bool {
        let mut decorators = self.decorators.write();
        let before = decorators.len();
        decorators.retain(|d| d.name() != name);
        decorators.len() != before
    }

    pub fn decorator_count(&self) -> usize {
        self.decorators.read().len()
    }

    /// Complete member details of `governor` as seen by `requesting_class`.
    ///
    /// Returns `Ok(None)` when there is no governor. ITD metadata that is
    /// unavailable, invalid or empty contributes nothing.
    ///
    /// # Errors
    ///
    /// Propagates failures from retrieving other ITD metadata.
    pub fn member_details(
        &self,
        service: &MetadataService,
        requesting_class: &MetadataId,
        governor: Option<&ClassOrInterfaceTypeDetails>,
    ) -> Result<Option<Arc<MemberDetails>>> {
        let Some(governor) = governor else {
            return Ok(None);
        };

        let itd_providers: Vec<_> = service
            .itd_providers()
            .into_iter()
            .filter(|p| p.provides_type() != *requesting_class)
            .collect();

        let mut details = Vec::new();
        for level in governor.hierarchy().into_iter().rev() {
            details.push(Arc::clone(level.members()));
            for provider in &itd_providers {
                let Some(itd_id) = provider
                    .as_itd_provider()
                    .and_then(|itd| itd.id_for_physical_type(level.declared_by()))
                else {
                    continue;
                };
                if let Some(members) = contributed_members(service, &itd_id)? {
                    details.push(members);
                }
            }
        }

        Ok(Some(self.decorate(requesting_class, Arc::new(MemberDetails::new(details)))))
    }

    /// Apply every decorator repeatedly until a full pass makes no change.
    pub fn decorate(&self, requesting_class: &MetadataId, mut details: Arc<MemberDetails>) -> Arc<MemberDetails> {
        let decorators = self.decorators.read().clone();
        let mut passes = 0;
        loop {
            passes += 1;
            let mut changed = false;
            for decorator in &decorators {
                let next = decorator.decorate(requesting_class, &details);
                if !Arc::ptr_eq(&next, &details) {
                    tracing::trace!("Decorator {} changed member details", decorator.name());
                    details = next;
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }
        tracing::trace!("Member details for {requesting_class} settled after {passes} pass(es)");
        details
    }
}

fn contributed_members(
    service: &MetadataService,
    itd_id: &MetadataId,
) -> Result<Option<Arc<MemberHoldingTypeDetails>>> {
    let Some(item) = service.get(itd_id)? else {
        return Ok(None);
    };
    if !item.is_valid() {
        return Ok(None);
    }
    Ok(item
        .itd_type_details()
        .filter(|members| !members.is_empty())
        .cloned())
}
