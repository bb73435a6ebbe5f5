//! Bundled add-ons over a two-level entity hierarchy.

use anyhow::Result;

use roo_metadata::constants::{IDENTIFIER_FIELD, PERSISTENT_TYPE};
use roo_metadata::itd::{ItdMetadata, TypeDeclaration, governor_details};
use roo_metadata::metadata::{MetadataId, downcast_item};
use roo_metadata::model::JavaType;

use crate::common::{
    EQUALS_CLASS, JAVA_BEAN_CLASS, PETCLINIC, TO_STRING_CLASS, itd_id, method_fields, physical_id, session,
};

const OWNER: &str = "com.example.Owner";
const BASE: &str = "com.example.BaseEntity";

#[test]
fn test_equals_excludes_identifier_and_version() -> Result<()> {
    let session = session(PETCLINIC)?;
    let item = session.service().get(&itd_id(EQUALS_CLASS, OWNER))?.expect("equals generated");

    assert_eq!(method_fields(&item, "equals", &["java.lang.Object"]), Some(vec!["lastName".to_string()]));
    assert_eq!(method_fields(&item, "hashCode", &[]), Some(vec!["lastName".to_string()]));

    let itd = downcast_item::<ItdMetadata>(&item).expect("ITD metadata");
    let equals = itd.members().method("equals", &[JavaType::object()]).expect("equals method");
    assert!(equals.body().expect("body").contains(".appendSuper(super.equals(obj))"));
    Ok(())
}

#[test]
fn test_to_string_sees_accessors_from_other_itds() -> Result<()> {
    let session = session(PETCLINIC)?;
    let item = session.service().get(&itd_id(TO_STRING_CLASS, OWNER))?.expect("toString generated");

    let fields = method_fields(&item, "toString", &[]).expect("toString method");
    assert_eq!(fields, vec!["code", "id", "version", "lastName"]);
    Ok(())
}

#[test]
fn test_untriggered_governor_has_no_itd() -> Result<()> {
    let session = session(PETCLINIC)?;
    let service = session.service();

    assert!(service.get(&itd_id(EQUALS_CLASS, BASE))?.is_none());
    assert!(service.get(&itd_id(TO_STRING_CLASS, "com.example.Plain"))?.is_none());
    assert!(service.get(&itd_id(JAVA_BEAN_CLASS, "com.example.Missing"))?.is_none());
    Ok(())
}

#[test]
fn test_superclass_change_propagates_to_subclass_itds() -> Result<()> {
    let session = session(PETCLINIC)?;
    let service = session.service();
    let to_string = itd_id(TO_STRING_CLASS, OWNER);
    service.get(&to_string)?;

    let base = session
        .physical()
        .declaration(&JavaType::new(BASE))
        .expect("base loaded")
        .field("title", "java.lang.String", &[]);
    assert!(session.physical().update_type(service, base)?);

    let refreshed = service.get(&to_string)?.expect("toString regenerated");
    let fields = method_fields(&refreshed, "toString", &[]).expect("toString method");
    assert!(fields.contains(&"title".to_string()));

    let java_bean = service.get(&itd_id(JAVA_BEAN_CLASS, BASE))?.expect("javabean generated");
    let itd = downcast_item::<ItdMetadata>(&java_bean).expect("ITD metadata");
    assert!(itd.members().method("getTitle", &[]).is_some());
    Ok(())
}

#[test]
fn test_unchanged_declaration_is_not_propagated() -> Result<()> {
    let session = session(PETCLINIC)?;
    let declaration = session.physical().declaration(&JavaType::new(OWNER)).expect("owner loaded");
    assert!(!session.physical().update_type(session.service(), declaration)?);
    Ok(())
}

#[test]
fn test_late_annotation_activates_provider() -> Result<()> {
    let session = session(PETCLINIC)?;
    let service = session.service();
    let id = itd_id(TO_STRING_CLASS, "com.example.Plain");
    assert!(service.get(&id)?.is_none());

    let plain = TypeDeclaration::new("com.example.Plain")
        .annotated("org.springframework.roo.addon.tostring.RooToString")
        .field("nickname", "java.lang.String", &[])
        .method("getNickname", "java.lang.String", &[]);
    session.physical().update_type(service, plain)?;

    let item = service.get(&id)?.expect("toString generated");
    assert_eq!(method_fields(&item, "toString", &[]), Some(vec!["nickname".to_string()]));
    Ok(())
}

#[test]
fn test_hand_written_method_suppresses_generation() -> Result<()> {
    let session = session(PETCLINIC)?;
    let service = session.service();
    let owner = session
        .physical()
        .declaration(&JavaType::new(OWNER))
        .expect("owner loaded")
        .method("toString", "java.lang.String", &[]);
    session.physical().update_type(service, owner)?;

    let item = service.get(&itd_id(TO_STRING_CLASS, OWNER))?.expect("metadata still produced");
    let itd = downcast_item::<ItdMetadata>(&item).expect("ITD metadata");
    assert!(itd.members().is_empty());
    Ok(())
}

#[test]
fn test_removed_type_invalidates_itds() -> Result<()> {
    let session = session(PETCLINIC)?;
    let service = session.service();
    let equals = itd_id(EQUALS_CLASS, OWNER);
    assert!(service.get(&equals)?.is_some());

    assert!(session.physical().remove_type(service, &JavaType::new(OWNER))?);
    assert!(service.cached(&equals).is_none());
    assert!(service.get(&equals)?.is_none());
    assert!(!session.physical().remove_type(service, &JavaType::new(OWNER))?);
    Ok(())
}

#[test]
fn test_decorators_tag_persistent_hierarchy() -> Result<()> {
    let session = session(PETCLINIC)?;
    let service = session.service();
    let governor = governor_details(service, &physical_id(OWNER))?.expect("owner loaded");
    let requester = MetadataId::class(EQUALS_CLASS).unwrap();

    let details = session
        .scanner()
        .member_details(service, &requester, Some(&governor))?
        .expect("governor present");

    let tagged: Vec<&str> = details.fields_with_tag(IDENTIFIER_FIELD).map(|f| f.name()).collect();
    assert_eq!(tagged, vec!["id"]);
    assert!(details.is_type_tagged(PERSISTENT_TYPE));
    Ok(())
}

#[test]
fn test_colliding_accessor_names_generated_once() -> Result<()> {
    let session = session(
        r#"
[[types]]
name = "com.example.Code"
annotations = ["org.springframework.roo.addon.javabean.RooJavaBean"]

[[types.fields]]
name = "aB"
type = "java.lang.String"

[[types.fields]]
name = "AB"
type = "java.lang.String"
"#,
    )?;
    let item = session
        .service()
        .get(&itd_id(JAVA_BEAN_CLASS, "com.example.Code"))?
        .expect("javabean generated");
    let itd = downcast_item::<ItdMetadata>(&item).expect("ITD metadata");

    let names: Vec<&str> = itd.members().methods().iter().map(|m| m.name()).collect();
    assert_eq!(names, vec!["getAB", "setAB"]);
    let getter = itd.members().method("getAB", &[]).expect("accessor");
    assert_eq!(getter.body(), Some("return this.aB;"));
    Ok(())
}
