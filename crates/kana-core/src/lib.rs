#[cfg(not(target_endian = "little"))]
compile_error!("kana-core requires a little-endian platform");

pub mod bit_stream;
pub mod bit_vector;
pub mod data_set;
pub mod dict;
pub mod louds;
pub mod settings;
pub mod unicode;
