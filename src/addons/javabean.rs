use crate::core::Result;
use crate::itd::{ItdContext, ItdGenerator};
use crate::model::{JavaType, MethodMetadata, TypeDetailsBuilder};

use super::{ROO_JAVA_BEAN, capitalize};

/// Accessor and mutator for every field the governor declares.
///
/// Works from the governor's own declaration only, so it never depends on
/// other ITDs and is safe for them to depend on.
pub struct JavaBeanGenerator;

impl JavaBeanGenerator {
    fn accessor_name(field_name: &str, field_type: &JavaType) -> String {
        let prefix = if *field_type == JavaType::boolean_primitive() {
            "is"
        } else {
            "get"
        };
        format!("{prefix}{}", capitalize(field_name))
    }
}

impl ItdGenerator for JavaBeanGenerator {
    fn class_name(&self) -> &str {
        "org.springframework.roo.addon.javabean.JavaBeanMetadata"
    }

    fn triggers(&self) -> Vec<JavaType> {
        vec![JavaType::new(ROO_JAVA_BEAN)]
    }

    /// Fields whose accessor names collide (`aB` and `AB` both give `getAB`)
    /// get a single accessor, for the first field declared.
    fn generate(&self, ctx: &ItdContext<'_>, itd: &mut TypeDetailsBuilder) -> Result<()> {
        let governor = ctx.governor().members();
        for field in governor.fields() {
            let accessor = Self::accessor_name(field.name(), field.field_type());
            if governor.method(&accessor, &[]).is_none() && !itd.has_method(&accessor, &[]) {
                itd.add_method(
                    MethodMetadata::builder(ctx.itd_id().clone(), accessor, field.field_type().clone())
                        .body(format!("return this.{};", field.name()))
                        .build(),
                );
            }

            let mutator = format!("set{}", capitalize(field.name()));
            let parameter_types = std::slice::from_ref(field.field_type());
            if governor.method(&mutator, parameter_types).is_none() && !itd.has_method(&mutator, parameter_types) {
                itd.add_method(
                    MethodMetadata::builder(ctx.itd_id().clone(), mutator, JavaType::void_primitive())
                        .parameter(field.name(), field.field_type().clone())
                        .body(format!("this.{0} = {0};", field.name()))
                        .build(),
                );
            }
        }
        Ok(())
    }
}
