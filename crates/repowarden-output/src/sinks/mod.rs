mod writer_core;

pub mod console;
pub mod emit;
pub mod file;
pub mod report;

pub use console::ConsoleSink;
pub use emit::EmitSink;
pub use file::FileSink;
pub use report::{render_report_document, ReportDocument, ReportSink};
