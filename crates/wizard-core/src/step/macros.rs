//! Macro para declarar steps como tipos con poco boilerplate.
//!
//! Exportada en la raíz del crate:
//!   use wizard_core::wizard_step;

/// Declara un step como struct que implementa `StepDefinition`.
///
/// Formas soportadas:
/// - wizard_step!(Name { id: "one", fields: [FieldSpec::text_line("a", "A")] });
/// - wizard_step!(Name { id: "two", label: "Two", fields: [...], condition: "test" });
#[macro_export]
macro_rules! wizard_step {
    (
        $name:ident {
            id: $id:expr,
            $(label: $label:expr,)?
            fields: [$($field:expr),* $(,)?]
            $(, condition: $cond:expr)?
            $(,)?
        }
    ) => {
        #[derive(Debug, Clone)]
        pub struct $name {
            fields: Vec<$crate::field::FieldSpec>,
        }
        impl $name {
            pub fn new() -> Self {
                Self { fields: vec![$($field),*] }
            }
        }
        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }
        impl $crate::step::StepDefinition for $name {
            fn id(&self) -> &str {
                $id
            }
            $(fn label(&self) -> &str {
                $label
            })?
            fn fields(&self) -> &[$crate::field::FieldSpec] {
                &self.fields
            }
            $(fn condition(&self) -> Option<&str> {
                Some($cond)
            })?
        }
    };
}
