use std::sync::Arc;

use content_sdk::ContentError;
use parking_lot::RwLock;

use crate::domain::permitter::Permitter;

/// Open/closed state of one repository for one request.
#[derive(Debug, Default)]
pub struct Session {
    permitter: RwLock<Option<Arc<Permitter>>>,
}

impl Session {
    /// # Errors
    ///
    /// `NilPermitter` when no permitter is supplied.
    pub fn open(&self, permitter: Option<Arc<Permitter>>) -> Result<(), ContentError> {
        let permitter = permitter.ok_or(ContentError::NilPermitter)?;
        *self.permitter.write() = Some(permitter);
        Ok(())
    }

    /// Returns the permitter the session was opened with, if it was open.
    pub fn close(&self) -> Option<Arc<Permitter>> {
        self.permitter.write().take()
    }

    /// # Errors
    ///
    /// `ConnClosed` before `open` or after `close`.
    pub fn permitter(&self) -> Result<Arc<Permitter>, ContentError> {
        self.permitter
            .read()
            .clone()
            .ok_or(ContentError::ConnClosed)
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.permitter.read().is_some()
    }
}
