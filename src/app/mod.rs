pub mod merge_use_case;
pub mod ports;
