pub mod json_table_store;
