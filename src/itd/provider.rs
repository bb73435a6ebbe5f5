//! Generic ITD metadata provider.
//!
//! An add-on only describes *what* members it contributes by implementing
//! [`ItdGenerator`]. Wrapping it in [`ItdProvider`] supplies everything else:
//!
//! 1. At registration, a class-level dependency from physical types to the
//!    add-on's class and the generator's trigger annotations.
//! 2. On `get`, the governor's physical type is fetched; untriggered
//!    governors produce nothing; otherwise the governor is registered as
//!    upstream, the generator runs, and when it looked at the governor's
//!    member details every other ITD of the governor is registered as upstream
//!    too (unless that edge would close a cycle).
//! 3. On notification, the ITD is recomputed and downstream is only notified
//!    when its content hash changed.

use std::any::Any;
use std::cell::RefCell;
use std::sync::Arc;

use super::physical::{governor_details, is_physical_type_id, physical_type_class_id};
use crate::constants::PHYSICAL_TYPE_CLASS;
use crate::core::{MetadataError, Result};
use crate::metadata::{
    HashTrackingNotifier, ItdMetadataProvider, MetadataId, MetadataItem,
    MetadataNotificationListener, MetadataProvider, MetadataService, SharedItem, content_hash_of,
};
use crate::model::{
    ClassOrInterfaceTypeDetails, JavaType, MemberDetails, MemberHoldingTypeDetails,
    TypeDetailsBuilder, TypeKind,
};
use crate::scanner::MemberDetailsScanner;

/// Contributes the members of one kind of ITD.
pub trait ItdGenerator: Send + Sync + 'static {
    /// Metadata class name, e.g. `org.springframework.roo.addon.equals.EqualsMetadata`.
    fn class_name(&self) -> &str;

    /// Annotations on a governor that activate this generator.
    ///
    /// An empty list activates it for every governor.
    fn triggers(&self) -> Vec<JavaType>;

    /// Add this ITD's members to `itd`.
    fn generate(&self, ctx: &ItdContext<'_>, itd: &mut TypeDetailsBuilder) -> Result<()>;
}

/// Everything a generator may consult while generating.
pub struct ItdContext<'a> {
    service: &'a MetadataService,
    scanner: &'a MemberDetailsScanner,
    itd_id: &'a MetadataId,
    governor: &'a ClassOrInterfaceTypeDetails,
    member_details: RefCell<Option<Arc<MemberDetails>>>,
}

impl<'a> ItdContext<'a> {
    pub fn new(
        service: &'a MetadataService,
        scanner: &'a MemberDetailsScanner,
        itd_id: &'a MetadataId,
        governor: &'a ClassOrInterfaceTypeDetails,
    ) -> Self {
        Self {
            service,
            scanner,
            itd_id,
            governor,
            member_details: RefCell::new(None),
        }
    }

    pub fn service(&self) -> &MetadataService {
        self.service
    }

    /// Identifier of the ITD being generated; members should be declared by it.
    pub fn itd_id(&self) -> &MetadataId {
        self.itd_id
    }

    pub fn governor(&self) -> &ClassOrInterfaceTypeDetails {
        self.governor
    }

    /// The governor's complete member surface, scanned on first use.
    ///
    /// Includes members from the superclass chain and from every other ITD.
    pub fn member_details(&self) -> Result<Arc<MemberDetails>> {
        if let Some(details) = self.member_details.borrow().as_ref() {
            return Ok(Arc::clone(details));
        }
        let details = self
            .scanner
            .member_details(self.service, &self.itd_id.class_id(), Some(self.governor))?
            .unwrap_or_else(|| Arc::new(MemberDetails::new(vec![Arc::clone(self.governor.members())])));
        *self.member_details.borrow_mut() = Some(Arc::clone(&details));
        Ok(details)
    }

    /// Whether [`Self::member_details`] was consulted.
    pub fn scanned(&self) -> bool {
        self.member_details.borrow().is_some()
    }
}

/// Members one ITD contributes to its governor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ItdMetadata {
    id: MetadataId,
    governor: JavaType,
    members: Arc<MemberHoldingTypeDetails>,
}

impl ItdMetadata {
    pub fn new(id: MetadataId, governor: JavaType, members: MemberHoldingTypeDetails) -> Self {
        Self {
            id,
            governor,
            members: Arc::new(members),
        }
    }

    pub fn governor(&self) -> &JavaType {
        &self.governor
    }

    pub fn members(&self) -> &Arc<MemberHoldingTypeDetails> {
        &self.members
    }
}

impl MetadataItem for ItdMetadata {
    fn id(&self) -> &MetadataId {
        &self.id
    }

    fn is_valid(&self) -> bool {
        true
    }

    fn content_hash(&self) -> u64 {
        content_hash_of(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn itd_type_details(&self) -> Option<&Arc<MemberHoldingTypeDetails>> {
        Some(&self.members)
    }
}

/// Metadata provider driving an [`ItdGenerator`].
pub struct ItdProvider<G: ItdGenerator> {
    generator: G,
    class_id: MetadataId,
    scanner: Arc<MemberDetailsScanner>,
    notifier: HashTrackingNotifier,
}

impl<G: ItdGenerator> ItdProvider<G> {
    /// # Errors
    ///
    /// Returns [`MetadataError::InvalidIdentifier`] if the generator's class
    /// name cannot form a class identifier.
    pub fn new(generator: G, scanner: Arc<MemberDetailsScanner>) -> Result<Self> {
        let class_id = MetadataId::class(generator.class_name())
            .ok_or_else(|| MetadataError::invalid_id(generator.class_name(), "a class"))?;
        Ok(Self {
            notifier: HashTrackingNotifier::new(class_id.clone()),
            generator,
            class_id,
            scanner,
        })
    }

    /// Register every other ITD of the governor's hierarchy as upstream of `id`.
    fn register_itd_dependencies(
        &self,
        service: &MetadataService,
        governor: &ClassOrInterfaceTypeDetails,
        id: &MetadataId,
    ) -> Result<()> {
        let others: Vec<_> = service
            .itd_providers()
            .into_iter()
            .filter(|p| p.provides_type() != self.class_id)
            .collect();
        for level in governor.hierarchy() {
            for provider in &others {
                let Some(upstream) = provider
                    .as_itd_provider()
                    .and_then(|itd| itd.id_for_physical_type(level.declared_by()))
                else {
                    continue;
                };
                if service.is_valid_dependency(&upstream, id) {
                    service.register_dependency(&upstream, id)?;
                } else {
                    tracing::trace!("Skipping cyclic ITD dependency {upstream} -> {id}");
                }
            }
        }
        Ok(())
    }
}

impl<G: ItdGenerator> MetadataProvider for ItdProvider<G> {
    fn provides_type(&self) -> MetadataId {
        self.class_id.clone()
    }

    fn on_register(&self, service: &MetadataService) -> Result<()> {
        service.register_dependency(&physical_type_class_id(), &self.class_id)?;
        for trigger in self.generator.triggers() {
            service.register_trigger(trigger, &self.class_id);
        }
        Ok(())
    }

    fn get(&self, service: &MetadataService, id: &MetadataId) -> Result<Option<SharedItem>> {
        let Some(physical_id) = id
            .instance_key()
            .and_then(|key| MetadataId::instance(PHYSICAL_TYPE_CLASS, key))
        else {
            return Ok(None);
        };
        let Some(governor) = governor_details(service, &physical_id)? else {
            tracing::debug!("No governor for {id}");
            return Ok(None);
        };

        service.deregister_dependencies(id);
        if !service.is_triggered(&self.class_id, governor.annotations()) {
            return Ok(None);
        }
        service.register_dependency(&physical_id, id)?;

        let ctx = ItdContext::new(service, &self.scanner, id, &governor);
        let mut builder = TypeDetailsBuilder::new(id.clone(), TypeKind::Itd, governor.name().clone());
        self.generator.generate(&ctx, &mut builder)?;
        if ctx.scanned() {
            self.register_itd_dependencies(service, &governor, id)?;
        }

        let metadata = ItdMetadata::new(id.clone(), governor.name().clone(), builder.build());
        tracing::trace!(
            "Generated {} with {} field(s) and {} method(s)",
            id,
            metadata.members().fields().len(),
            metadata.members().methods().len()
        );
        Ok(Some(Arc::new(metadata)))
    }

    fn as_notification_listener(&self) -> Option<&dyn MetadataNotificationListener> {
        Some(self)
    }

    fn as_itd_provider(&self) -> Option<&dyn ItdMetadataProvider> {
        Some(self)
    }
}

impl<G: ItdGenerator> MetadataNotificationListener for ItdProvider<G> {
    fn notify(
        &self,
        service: &MetadataService,
        upstream: &MetadataId,
        downstream: Option<&MetadataId>,
    ) -> Result<()> {
        let Some(downstream) = downstream else {
            return Ok(());
        };

        let target = if downstream.is_class() {
            // A governor changed; the class-level edge reaches governors that
            // were not triggered last time and so have no instance edge.
            let Some(target) = self.id_for_physical_type(upstream) else {
                return Ok(());
            };
            if service.upstream(&target).contains(upstream) {
                return Ok(());
            }
            target
        } else {
            downstream.clone()
        };

        super::refresh(service, &self.notifier, &target)
    }
}

impl<G: ItdGenerator> ItdMetadataProvider for ItdProvider<G> {
    fn id_for_physical_type(&self, physical_type_id: &MetadataId) -> Option<MetadataId> {
        if !is_physical_type_id(physical_type_id) {
            return None;
        }
        self.class_id.with_instance(physical_type_id.instance_key()?)
    }
}
