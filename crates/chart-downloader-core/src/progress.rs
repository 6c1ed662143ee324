//! Byte-level download progress
//!
//! [`ObservedStream`] wraps a body stream and hands every chunk size to a
//! [`ProgressObserver`] before passing the chunk on untouched.
//! [`TerminalProgress`] is the observer used for interactive runs: it keeps a
//! running total and redraws a single status line.

use std::io::{self, Write};
use std::pin::Pin;
use std::task::{Context, Poll, ready};

use futures::Stream;

/// Width of the status line cleared before each redraw
const LINE_WIDTH: usize = 35;

/// Receives the size of every chunk of a transfer
pub trait ProgressObserver {
    /// Called once per chunk, in order
    fn observe(&mut self, bytes: usize);

    /// Called once after the transfer ends, whether it succeeded or not
    fn finish(&mut self) {}
}

impl<T: ProgressObserver + ?Sized> ProgressObserver for &mut T {
    fn observe(&mut self, bytes: usize) {
        (**self).observe(bytes);
    }

    fn finish(&mut self) {
        (**self).finish();
    }
}

/// Stream adapter that reports chunk sizes to an observer
pub struct ObservedStream<S, O> {
    inner: S,
    observer: O,
}

impl<S, O> ObservedStream<S, O> {
    pub fn new(inner: S, observer: O) -> Self {
        Self { inner, observer }
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    pub fn into_inner(self) -> (S, O) {
        (self.inner, self.observer)
    }
}

impl<S, O, B, E> Stream for ObservedStream<S, O>
where
    S: Stream<Item = Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
    O: ProgressObserver + Unpin,
{
    type Item = Result<B, E>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        let item = ready!(Pin::new(&mut this.inner).poll_next(cx));
        if let Some(Ok(chunk)) = &item {
            this.observer.observe(chunk.as_ref().len());
        }
        Poll::Ready(item)
    }
}

/// Running byte total rendered as `Downloading... 10 MB complete`
pub struct TerminalProgress<W: Write> {
    total: u64,
    out: W,
}

impl<W: Write> TerminalProgress<W> {
    pub fn new(out: W) -> Self {
        Self { total: 0, out }
    }

    /// Bytes observed so far
    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn render(&mut self) -> io::Result<()> {
        write!(self.out, "\r{}", " ".repeat(LINE_WIDTH))?;
        write!(
            self.out,
            "\rDownloading... {} complete",
            format_bytes(self.total)
        )?;
        self.out.flush()
    }
}

impl<W: Write> ProgressObserver for TerminalProgress<W> {
    fn observe(&mut self, bytes: usize) {
        self.total += bytes as u64;
        // A closed terminal must not fail the download
        let _ = self.render();
    }

    fn finish(&mut self) {
        let _ = writeln!(self.out);
        let _ = self.out.flush();
    }
}

/// Format a byte count with SI units (`999 B`, `1.5 kB`, `10 MB`)
#[must_use]
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 7] = ["B", "kB", "MB", "GB", "TB", "PB", "EB"];

    if bytes < 10 {
        return format!("{} B", bytes);
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1000.0 && unit < UNITS.len() - 1 {
        value /= 1000.0;
        unit += 1;
    }

    let rounded = (value * 10.0 + 0.5).floor() / 10.0;
    if rounded < 10.0 {
        format!("{:.1} {}", rounded, UNITS[unit])
    } else {
        format!("{:.0} {}", rounded, UNITS[unit])
    }
}
