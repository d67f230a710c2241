use std::io::Write;

use crate::transcript::record::SessionRecord;

/// Write one compact JSON record per line, in the order given.
pub fn write_records<W: Write>(records: &[SessionRecord], out: &mut W) -> anyhow::Result<()> {
    for record in records {
        serde_json::to_writer(&mut *out, record)?;
        writeln!(out)?;
    }
    Ok(())
}
