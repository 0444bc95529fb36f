//! Marker workload
//!
//! The process the agent under test is expected to detect. It sleeps for the
//! requested duration and then prints its tag.

use std::io::Write;
use std::time::Duration;

use crate::common::Result;

/// Sleep `duration` seconds, then print `tag` on stdout
pub async fn run_marker(duration: u64, tag: &str) -> Result<()> {
    tokio::time::sleep(Duration::from_secs(duration)).await;

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", tag)?;
    stdout.flush()?;
    Ok(())
}
