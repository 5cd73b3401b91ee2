pub mod alter_format_column;
