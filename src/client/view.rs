//! What the submitter sees: the submit control and a status line

use std::ops::{Deref, DerefMut};

use tracing::debug;

/// UI surface the form client drives.
pub trait FormView {
    fn set_submit_enabled(&mut self, enabled: bool);
    fn set_status(&mut self, status: &str);
    /// Clear the form fields.
    fn reset(&mut self);
}

/// Keeps the submit control disabled while alive and re-enables it on drop,
/// whichever way the submission ends.
pub struct SubmitGuard<'a, V: FormView + ?Sized> {
    view: &'a mut V,
}

impl<'a, V: FormView + ?Sized> SubmitGuard<'a, V> {
    pub fn engage(view: &'a mut V) -> Self {
        view.set_submit_enabled(false);
        Self { view }
    }
}

impl<V: FormView + ?Sized> Deref for SubmitGuard<'_, V> {
    type Target = V;

    fn deref(&self) -> &V {
        &*self.view
    }
}

impl<V: FormView + ?Sized> DerefMut for SubmitGuard<'_, V> {
    fn deref_mut(&mut self) -> &mut V {
        &mut *self.view
    }
}

impl<V: FormView + ?Sized> Drop for SubmitGuard<'_, V> {
    fn drop(&mut self) {
        self.view.set_submit_enabled(true);
    }
}

/// Prints status lines to stdout for the `send` command.
#[derive(Debug, Default)]
pub struct TerminalView;

impl FormView for TerminalView {
    fn set_submit_enabled(&mut self, enabled: bool) {
        debug!(enabled, "submit control");
    }

    fn set_status(&mut self, status: &str) {
        println!("{}", status);
    }

    fn reset(&mut self) {
        debug!("form reset");
    }
}
