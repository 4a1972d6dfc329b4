use std::fs::File;
use std::io::BufWriter;
use std::io::Write;
use std::path::PathBuf;

use log::warn;

/// Where trace lines end up.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TraceSink {
    Discard,
    Stderr,
    /// Lines are kept in memory and can be taken with [`crate::Diagnostics::take_buffer`].
    Buffer,
    /// The file is created when the first line is written.
    File(PathBuf),
}

#[derive(Debug)]
pub(super) struct SinkWriter {
    sink: TraceSink,
    buffer: String,
    file: Option<BufWriter<File>>,
    failed: bool,
}

impl SinkWriter {
    pub(super) fn new(sink: TraceSink) -> SinkWriter {
        SinkWriter {
            sink,
            buffer: String::new(),
            file: None,
            failed: false,
        }
    }

    pub(super) fn write_line(&mut self, line: &str) {
        match &self.sink {
            TraceSink::Discard => {}
            TraceSink::Stderr => eprintln!("{line}"),
            TraceSink::Buffer => {
                self.buffer.push_str(line);
                self.buffer.push('\n');
            }
            TraceSink::File(path) => {
                if self.failed {
                    return;
                }

                if self.file.is_none() {
                    match File::create(path) {
                        Ok(file) => self.file = Some(BufWriter::new(file)),
                        Err(error) => {
                            warn!("Could not open trace file {}: {error}", path.display());
                            self.failed = true;
                            return;
                        }
                    }
                }

                if let Some(file) = self.file.as_mut() {
                    if let Err(error) = writeln!(file, "{line}") {
                        warn!("Writing to trace file {} failed: {error}", path.display());
                        self.failed = true;
                    }
                }
            }
        }
    }

    pub(super) fn take_buffer(&mut self) -> String {
        std::mem::take(&mut self.buffer)
    }

    pub(super) fn flush(&mut self) {
        if let Some(file) = self.file.as_mut() {
            if let Err(error) = file.flush() {
                warn!("Flushing the trace file failed: {error}");
            }
        }
    }
}
