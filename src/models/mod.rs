pub mod electricity;
pub mod price_table;
