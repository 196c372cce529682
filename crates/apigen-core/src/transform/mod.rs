pub mod default_value;
pub mod grouping;
pub mod imports;
pub mod model_builder;
pub mod name_normalizer;
pub mod operation_builder;
pub mod pipeline;
pub mod schema_index;
pub mod type_resolver;
pub mod variant;

pub use pipeline::generate;
