//! Process liveness helpers for launch tests (Unix only).

use std::time::{Duration, Instant};

/// True while `pid` exists and is not a zombie.
#[cfg(target_os = "linux")]
pub fn is_process_alive(pid: u32) -> bool {
    let Ok(stat) = std::fs::read_to_string(format!("/proc/{pid}/stat")) else {
        return false;
    };

    // "<pid> (<comm>) <state> ...": comm may itself contain ')'.
    let state = stat
        .rfind(')')
        .and_then(|idx| stat[idx + 1..].trim_start().chars().next());

    !matches!(state, None | Some('Z') | Some('X'))
}

#[cfg(all(unix, not(target_os = "linux")))]
pub fn is_process_alive(pid: u32) -> bool {
    std::process::Command::new("kill")
        .args(["-0", &pid.to_string()])
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Poll until `pid` is gone or `timeout` elapses. Returns whether it is gone.
pub async fn wait_until_dead(pid: u32, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if !is_process_alive(pid) {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    !is_process_alive(pid)
}

/// SIGKILL `pid`, ignoring failures. Used to clean up after tests.
pub fn kill_process(pid: u32) {
    let _ = std::process::Command::new("kill")
        .args(["-9", &pid.to_string()])
        .status();
}
