pub mod reader;
pub mod reporter;

pub use reader::{RecordReader, StreamEnd};
pub use reporter::SummaryWriter;
