//! Built-in runtime field types.

pub mod composite;
pub mod date;
pub mod leaf;

pub use composite::{CompositeField, CompositeFieldBuilder};
pub use date::{DateField, DateFieldBuilder, DateFormat};
pub use leaf::{LeafField, LeafFieldBuilder, LeafType};

use crate::registry::{TypeParser, TypeRegistry};

pub const COMPOSITE: &str = "composite";
pub const DATE: &str = "date";

/// Register `boolean`, `composite`, `date`, `double`, `geo_point`, `ip`,
/// `keyword` and `long`.
pub fn register_builtin_types(registry: &mut TypeRegistry) {
    for leaf in LeafType::ALL {
        registry.register(
            leaf.name(),
            TypeParser::new(move |name| Box::new(LeafFieldBuilder::new(name, leaf))),
        );
    }
    registry.register(
        DATE,
        TypeParser::new(|name| Box::new(DateFieldBuilder::new(name))),
    );
    registry.register(
        COMPOSITE,
        TypeParser::new(|name| Box::new(CompositeFieldBuilder::new(name))),
    );
}

/// Whether `type_name` may be used for a composite sub-field.
pub fn is_sub_field_type(type_name: &str) -> bool {
    type_name == DATE || LeafType::from_name(type_name).is_some()
}
