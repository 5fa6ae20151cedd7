//! Reusable UI components.

mod country_select;
mod help_bar;
mod input;
mod notification;

pub use country_select::{CountrySelect, CountrySelectAction};
pub use help_bar::render_context_help;
pub use input::TextInput;
pub use notification::NotificationManager;
