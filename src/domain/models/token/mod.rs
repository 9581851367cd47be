pub mod token_record;

pub use token_record::*;
