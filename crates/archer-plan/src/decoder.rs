//! Decompression through host tools for codecs archer cannot decode itself.

use std::io::{self, Read};
use std::path::Path;
use std::process::{Child, ChildStdout, Command, Stdio};

use archer_format::{ExternalDecoder, FormatDescriptor};
use archer_tool::ToolResolver;
use tracing::trace;

use crate::template::{self, Args};

/// Streams `<tool> -dc <archive>` using the format's extraction tools.
pub struct ToolDecoder<'r> {
    resolver: &'r ToolResolver,
}

impl<'r> ToolDecoder<'r> {
    pub fn new(resolver: &'r ToolResolver) -> Self {
        Self { resolver }
    }
}

impl ExternalDecoder for ToolDecoder<'_> {
    fn decode(&self, path: &Path, format: &FormatDescriptor) -> io::Result<Box<dyn Read>> {
        let Some((tool, group)) = self.resolver.find_tool_group(format.extract) else {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no {} decompressor installed", format.id),
            ));
        };

        let archive = path.to_string_lossy();
        let invocation = template::render(
            group,
            &tool,
            Args {
                archive: &archive,
                ..Args::default()
            },
        );
        trace!(%invocation, "decoding header");

        let mut child = Command::new(&invocation.program)
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| io::Error::other("decompressor stdout not captured"))?;

        Ok(Box::new(ChildReader { child, stdout }))
    }
}

/// Decompressor output; a failed exit surfaces as a read error at end of stream.
struct ChildReader {
    child: Child,
    stdout: ChildStdout,
}

impl Read for ChildReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.stdout.read(buf)?;
        if n == 0 && !buf.is_empty() {
            let status = self.child.wait()?;
            if !status.success() {
                let message = format!("decompressor exited with {status}");
                return Err(io::Error::other(message));
            }
        }
        Ok(n)
    }
}

impl Drop for ChildReader {
    fn drop(&mut self) {
        if let Ok(None) = self.child.try_wait() {
            let _ = self.child.kill();
        }
        let _ = self.child.wait();
    }
}
