// Build metadata for the boot banner.
//
// Values are provided via environment variables set in build.rs and read
// here at compile time through option_env!.

use core::cmp::min;

/// Print a short build banner to the serial console.
pub fn print_build_info() {
    let commit = option_env!("GIT_COMMIT").unwrap_or("unknown");
    let branch = option_env!("GIT_BRANCH").unwrap_or("unknown");
    let dirty = option_env!("GIT_DIRTY") == Some("1");
    let profile = option_env!("PROFILE").unwrap_or("unknown");

    crate::serial_println!("ASOS build {} @ {}{}  [{}]",
        &commit[..min(12, commit.len())],
        branch,
        if dirty { " (dirty)" } else { "" },
        profile,
    );
}
