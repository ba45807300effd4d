//! Release of several owned resources where one failure must not prevent the rest.

use strata_common::{Result, error::Error};

/// Closes a set of resources in order, attempting every one of them.
///
/// The first failure is kept and reported by [`finish`](Closer::finish) as a
/// resource-release error naming the resource. Later failures are logged and
/// dropped.
#[derive(Default)]
pub struct Closer {
    first_error: Option<Error>,
}

impl Closer {
    pub fn new() -> Closer {
        Default::default()
    }

    /// Runs `close` for the resource named `resource`, recording its failure.
    pub fn close(&mut self, resource: &str, close: impl FnOnce() -> Result<()>) -> &mut Self {
        if let Err(e) = close() {
            if self.first_error.is_none() {
                self.first_error = Some(Error::resource_release(resource, e));
            } else {
                log::warn!("suppressed failure while releasing '{resource}': {e}");
            }
        }
        self
    }

    /// Reports the first recorded failure, if any.
    pub fn finish(self) -> Result<()> {
        match self.first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
