pub mod add_column_sync_type;
