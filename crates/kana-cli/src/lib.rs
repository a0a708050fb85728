pub mod commands;
pub mod word_list;
