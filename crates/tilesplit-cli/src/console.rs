//! Terminal operator console

use parking_lot::Mutex;
use std::io::{self, BufRead, BufReader, Stdin, Stderr, Write};
use tilesplit_core::OperatorConsole;

/// Console that prompts on a writer and reads one line per answer
///
/// End of input counts as the operator cancelling.
pub struct LineConsole<R, W> {
    io: Mutex<(R, W)>,
}

impl LineConsole<BufReader<Stdin>, Stderr> {
    /// Console over the process's stdin, prompting on stderr
    #[must_use]
    pub fn stdio() -> Self {
        Self::new(BufReader::new(io::stdin()), io::stderr())
    }
}

impl<R: BufRead, W: Write> LineConsole<R, W> {
    /// Console over arbitrary streams
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            io: Mutex::new((reader, writer)),
        }
    }

    /// Release the underlying streams
    pub fn into_inner(self) -> (R, W) {
        self.io.into_inner()
    }
}

impl<R, W> OperatorConsole for LineConsole<R, W>
where
    R: BufRead + Send,
    W: Write + Send,
{
    fn prompt(&self, message: &str) -> Option<String> {
        let mut guard = self.io.lock();
        let (reader, writer) = &mut *guard;

        if let Err(e) = writeln!(writer, "{message}").and_then(|()| writer.flush()) {
            tracing::warn!(error = %e, "could not show prompt");
        }

        let mut line = String::new();
        match reader.read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
            Err(e) => {
                tracing::warn!(error = %e, "could not read operator input");
                None
            }
        }
    }

    fn alert(&self, message: &str) {
        let mut guard = self.io.lock();
        if let Err(e) = writeln!(guard.1, "{message}") {
            tracing::warn!(error = %e, alert = message, "could not show alert");
        }
    }
}
