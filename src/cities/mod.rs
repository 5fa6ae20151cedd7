//! The city administration screen model.
//!
//! Holds the lists, the add/edit form and the access check. Rendering lives
//! in `ui::views::cities`; remote calls are run by `tasks`.

mod guard;
mod state;

pub use guard::{AccessGuard, Redirect};
pub use state::{CityAdmin, CityDraft, Command, FormMode, Generation, Outcome};
