pub mod file_record;
pub mod stored_value;
