use crate::constants::{FIELDS, IDENTIFIER_FIELD, VERSION_FIELD};
use crate::core::Result;
use crate::itd::{ItdContext, ItdGenerator};
use crate::model::{JavaType, MethodMetadata, TypeDetailsBuilder};

use super::ROO_EQUALS;

/// `equals(Object)` and `hashCode()` over the governor's own fields.
///
/// Fields tagged as identifier or version fields are left out; those tags come
/// from member details decorators.
pub struct EqualsGenerator;

impl ItdGenerator for EqualsGenerator {
    fn class_name(&self) -> &str {
        "org.springframework.roo.addon.equals.EqualsMetadata"
    }

    fn triggers(&self) -> Vec<JavaType> {
        vec![JavaType::new(ROO_EQUALS)]
    }

    fn generate(&self, ctx: &ItdContext<'_>, itd: &mut TypeDetailsBuilder) -> Result<()> {
        let details = ctx.member_details()?;
        let governor_id = ctx.governor().declared_by();

        let fields: Vec<String> = details
            .fields()
            .filter(|f| f.declared_by() == governor_id)
            .filter(|f| {
                !f.custom_data().contains(IDENTIFIER_FIELD) && !f.custom_data().contains(VERSION_FIELD)
            })
            .map(|f| f.name().to_string())
            .collect();
        let append_super = ctx.governor().superclass_name().is_some();
        let simple_name = ctx.governor().name().simple_name();

        let object = [JavaType::object()];
        if !details.is_method_declared_by_another("equals", &object, ctx.itd_id()) {
            let mut body = format!(
                "if (this == obj) return true;\nif (!(obj instanceof {simple_name})) return false;\n{simple_name} rhs = ({simple_name}) obj;\nreturn new EqualsBuilder()"
            );
            if append_super {
                body.push_str(".appendSuper(super.equals(obj))");
            }
            for field in &fields {
                body.push_str(&format!(".append({field}, rhs.{field})"));
            }
            body.push_str(".isEquals();");

            itd.add_method(
                MethodMetadata::builder(ctx.itd_id().clone(), "equals", JavaType::boolean_primitive())
                    .parameter("obj", JavaType::object())
                    .custom_data(FIELDS, fields.clone())
                    .body(body)
                    .build(),
            );
        }

        if !details.is_method_declared_by_another("hashCode", &[], ctx.itd_id()) {
            let mut body = String::from("return new HashCodeBuilder()");
            if append_super {
                body.push_str(".appendSuper(super.hashCode())");
            }
            for field in &fields {
                body.push_str(&format!(".append({field})"));
            }
            body.push_str(".toHashCode();");

            itd.add_method(
                MethodMetadata::builder(ctx.itd_id().clone(), "hashCode", JavaType::int_primitive())
                    .custom_data(FIELDS, fields)
                    .body(body)
                    .build(),
            );
        }
        Ok(())
    }
}
