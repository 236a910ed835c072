//! Output formatting.
//!
//! Command results go to stdout as pretty-printed JSON. Keep this module
//! format-only; anything that needs domain knowledge belongs in a handler.

use std::io::{self, Write};

use serde::Serialize;

/// Write `value` as pretty JSON followed by a newline.
pub fn write_json<W, T>(writer: &mut W, value: &T) -> io::Result<()>
where
    W: Write + ?Sized,
    T: Serialize + ?Sized,
{
    serde_json::to_writer_pretty(&mut *writer, value)?;
    writeln!(writer)
}
