//! Fixed-size time-block accounting.
//!
//! Effort is tracked in 5-minute blocks independent of calendar
//! scheduling: a task estimated at 47 minutes costs 10 blocks.

/// Length of one block, in minutes.
pub const BLOCK_MINUTES: u32 = 5;

/// Blocks in an hour.
pub const BLOCKS_PER_HOUR: u32 = 12;

/// Converts minutes to blocks, rounding up (4 min = 1 block, 6 min = 2).
#[must_use]
pub const fn minutes_to_blocks(minutes: u32) -> u32 {
    minutes.div_ceil(BLOCK_MINUTES)
}

/// Converts blocks to minutes.
#[must_use]
pub const fn blocks_to_minutes(blocks: u32) -> u32 {
    blocks * BLOCK_MINUTES
}

/// Formats a block count as `"1h 30m"` or `"45m"`.
#[must_use]
pub fn format_blocks(blocks: u32) -> String {
    let total = blocks_to_minutes(blocks);
    let h = total / 60;
    let m = total % 60;
    if h > 0 {
        format!("{h}h {m}m")
    } else {
        format!("{m}m")
    }
}
