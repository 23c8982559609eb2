pub mod electricity;
