pub mod encoder;
pub mod tables;
pub mod treegen;

pub use encoder::BlockEncoder;
pub use treegen::{CodeTable, DynamicTables, FrequencyTables, TreeBuilder};
