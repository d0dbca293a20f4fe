//! Production device adapters.

use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::Path;
use tracing::info;
use work_backends::SerialLink;

/// Serial link over a character device node.
///
/// The port must already be configured for raw 115200-8N1 (via `stty` or a
/// udev rule); this adapter only moves bytes. Opening takes exclusive
/// ownership for the process lifetime - one solver per device, acquired
/// once at startup.
pub struct TtyLink {
    reader: BufReader<File>,
    writer: File,
}

impl TtyLink {
    /// Open the device node read/write.
    pub fn open(path: &Path) -> io::Result<Self> {
        let writer = OpenOptions::new().read(true).write(true).open(path)?;
        let reader = BufReader::new(writer.try_clone()?);
        info!(device = %path.display(), "serial device opened");
        Ok(Self { reader, writer })
    }
}

impl SerialLink for TtyLink {
    fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        self.writer.write_all(data)?;
        self.writer.flush()
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> io::Result<()> {
        self.reader.read_exact(buf)
    }

    fn read_line(&mut self) -> io::Result<String> {
        let mut line = String::new();
        let read = self.reader.read_line(&mut line)?;
        if read == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "device closed the stream",
            ));
        }
        Ok(line)
    }
}
