//! Keep-awake lock
//!
//! Holds off screen blanking and idle suspend while numbers are being
//! called. Failures are never fatal to the session.

use crate::error::{CallerError, CallerResult};
use std::process::{Child, Command, Stdio};
use tracing::{debug, info};

pub trait WakeLock: Send + std::fmt::Debug {
    /// Take the lock. Taking it twice is a no-op.
    fn acquire(&mut self) -> CallerResult<()>;

    /// Let go of the lock. Releasing when not held is a no-op.
    fn release(&mut self) -> CallerResult<()>;

    fn is_held(&self) -> bool;
}

/// Inhibits idle via `systemd-inhibit` for as long as the child lives
#[derive(Debug, Default)]
pub struct InhibitWakeLock {
    child: Option<Child>,
}

impl InhibitWakeLock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl WakeLock for InhibitWakeLock {
    fn acquire(&mut self) -> CallerResult<()> {
        if self.child.is_some() {
            return Ok(());
        }

        let child = Command::new("systemd-inhibit")
            .args([
                "--what=idle:sleep",
                "--who=bingo-caller",
                "--why=Calling numbers",
                "--mode=block",
                "sleep",
                "infinity",
            ])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| CallerError::WakeLock(format!("systemd-inhibit: {}", e)))?;

        info!("☀️ Keep-awake lock acquired");
        self.child = Some(child);
        Ok(())
    }

    fn release(&mut self) -> CallerResult<()> {
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };

        child
            .kill()
            .map_err(|e| CallerError::WakeLock(format!("failed to stop inhibitor: {}", e)))?;
        let _ = child.wait();
        debug!("Keep-awake lock released");
        Ok(())
    }

    fn is_held(&self) -> bool {
        self.child.is_some()
    }
}

impl Drop for InhibitWakeLock {
    fn drop(&mut self) {
        let _ = self.release();
    }
}
