//! Member details aggregation across the hierarchy and decorator fixpoint.

use anyhow::Result;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use roo_metadata::itd::governor_details;
use roo_metadata::metadata::MetadataId;
use roo_metadata::model::{MemberDetails, MemberDetailsBuilder};
use roo_metadata::scanner::{MemberDetailsDecorator, MemberDetailsScanner};

use crate::common::{
    EQUALS_CLASS, JAVA_BEAN_CLASS, PETCLINIC, TO_STRING_CLASS, itd_id, physical_id, session,
};

/// Tags the first declaration with `X`.
struct TagX(AtomicUsize);

impl MemberDetailsDecorator for TagX {
    fn name(&self) -> &str {
        "tag-x"
    }

    fn decorate(&self, _requesting_class: &MetadataId, details: &Arc<MemberDetails>) -> Arc<MemberDetails> {
        self.0.fetch_add(1, Ordering::SeqCst);
        if details.is_type_tagged("X") {
            return Arc::clone(details);
        }
        let first = details.details()[0].declared_by().clone();
        let mut builder = MemberDetailsBuilder::new(details);
        builder.tag_type(&first, "X", Vec::new());
        builder.build()
    }
}

/// Tags the first declaration with `Y` once `X` is present.
struct TagYAfterX;

impl MemberDetailsDecorator for TagYAfterX {
    fn name(&self) -> &str {
        "tag-y"
    }

    fn decorate(&self, _requesting_class: &MetadataId, details: &Arc<MemberDetails>) -> Arc<MemberDetails> {
        if !details.is_type_tagged("X") || details.is_type_tagged("Y") {
            return Arc::clone(details);
        }
        let first = details.details()[0].declared_by().clone();
        let mut builder = MemberDetailsBuilder::new(details);
        builder.tag_type(&first, "Y", Vec::new());
        builder.build()
    }
}

fn requester() -> MetadataId {
    MetadataId::class("test.Requester").unwrap()
}

#[test]
fn test_no_governor_yields_nothing() -> Result<()> {
    let session = session(PETCLINIC)?;
    let scanner = MemberDetailsScanner::new();
    assert!(scanner.member_details(session.service(), &requester(), None)?.is_none());
    Ok(())
}

#[test]
fn test_hierarchy_is_root_first_with_itd_contributions() -> Result<()> {
    let session = session(PETCLINIC)?;
    let service = session.service();
    let governor = governor_details(service, &physical_id("com.example.Owner"))?.expect("owner loaded");
    let to_string_class = MetadataId::class(TO_STRING_CLASS).unwrap();

    let details = session
        .scanner()
        .member_details(service, &to_string_class, Some(&governor))?
        .expect("governor present");
    let contributors: Vec<MetadataId> = details.details().iter().map(|d| d.declared_by().clone()).collect();

    assert_eq!(
        contributors,
        vec![
            physical_id("com.example.BaseEntity"),
            itd_id(JAVA_BEAN_CLASS, "com.example.BaseEntity"),
            physical_id("com.example.Owner"),
            itd_id(EQUALS_CLASS, "com.example.Owner"),
            itd_id(JAVA_BEAN_CLASS, "com.example.Owner"),
        ]
    );
    assert!(details.method("getCode", &[]).is_some());
    assert!(details.method("getLastName", &[]).is_some());
    Ok(())
}

#[test]
fn test_decorators_converge_in_either_order() -> Result<()> {
    let session = session(PETCLINIC)?;
    let service = session.service();
    let governor = governor_details(service, &physical_id("com.example.Plain"))?.expect("plain loaded");

    for tag_x_first in [true, false] {
        let scanner = MemberDetailsScanner::new();
        let tag_x = Arc::new(TagX(AtomicUsize::new(0)));
        if tag_x_first {
            scanner.add_decorator(tag_x.clone());
            scanner.add_decorator(Arc::new(TagYAfterX));
        } else {
            scanner.add_decorator(Arc::new(TagYAfterX));
            scanner.add_decorator(tag_x.clone());
        }

        let details = scanner
            .member_details(service, &requester(), Some(&governor))?
            .expect("governor present");

        assert!(details.is_type_tagged("X"));
        assert!(details.is_type_tagged("Y"));
        // One changing pass, at most one more to pick up Y, then one quiet pass.
        assert!(tag_x.0.load(Ordering::SeqCst) <= 3);
    }
    Ok(())
}

#[test]
fn test_decorator_removal() {
    let scanner = MemberDetailsScanner::new();
    scanner.add_decorator(Arc::new(TagYAfterX));
    assert_eq!(scanner.decorator_count(), 1);
    assert!(scanner.remove_decorator("tag-y"));
    assert!(!scanner.remove_decorator("tag-y"));
    assert_eq!(scanner.decorator_count(), 0);
}
