use crate::core::Result;
use crate::itd::{ItdContext, ItdGenerator};
use crate::model::{JavaType, MethodMetadata, TypeDetailsBuilder};

use super::{ROO_TO_STRING, decapitalize};

/// `toString()` listing every accessor-backed property of the governor.
///
/// Accessors contributed by other ITDs count, which is what makes this
/// generator depend on the JavaBean ITD.
pub struct ToStringGenerator;

/// Property name for a no-argument accessor, e.g. `name` for `getName`.
fn property_name(method: &MethodMetadata) -> Option<String> {
    if !method.parameter_types().is_empty() || method.return_type() == &JavaType::void_primitive() {
        return None;
    }
    let suffix = method
        .name()
        .strip_prefix("get")
        .or_else(|| method.name().strip_prefix("is"))?;
    if suffix.is_empty() || suffix == "Class" || !suffix.starts_with(char::is_uppercase) {
        return None;
    }
    Some(decapitalize(suffix))
}

impl ItdGenerator for ToStringGenerator {
    fn class_name(&self) -> &str {
        "org.springframework.roo.addon.tostring.ToStringMetadata"
    }

    fn triggers(&self) -> Vec<JavaType> {
        vec![JavaType::new(ROO_TO_STRING)]
    }

    fn generate(&self, ctx: &ItdContext<'_>, itd: &mut TypeDetailsBuilder) -> Result<()> {
        let details = ctx.member_details()?;
        if details.is_method_declared_by_another("toString", &[], ctx.itd_id()) {
            return Ok(());
        }

        let mut properties: Vec<(String, &str)> = Vec::new();
        for method in details.methods() {
            if let Some(property) = property_name(method)
                && !properties.iter().any(|(p, _)| *p == property)
            {
                properties.push((property, method.name()));
            }
        }

        let simple_name = ctx.governor().name().simple_name();
        let parts: Vec<String> = properties
            .iter()
            .map(|(property, accessor)| format!("\"{property}=\" + {accessor}()"))
            .collect();
        let body = if parts.is_empty() {
            format!("return \"{simple_name}[]\";")
        } else {
            format!("return \"{simple_name}[\" + {} + \"]\";", parts.join(" + \", \" + "))
        };

        itd.add_method(
            MethodMetadata::builder(ctx.itd_id().clone(), "toString", JavaType::string())
                .custom_data(
                    crate::constants::FIELDS,
                    properties.into_iter().map(|(p, _)| p).collect(),
                )
                .body(body)
                .build(),
        );
        Ok(())
    }
}
