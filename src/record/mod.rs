pub mod builder;
pub mod info;
pub mod time;

pub use builder::RecordBuilder;
pub use info::{InfoBlock, InfoField, parse_info_block};
