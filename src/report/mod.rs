pub mod records;
pub mod table;
pub mod writer;

pub use records::{
    duplicate_diff_table, information_table, marker_table, source_stats_table, tool_matrix_table,
};
pub use table::Table;
pub use writer::{render, write_report, write_table};
