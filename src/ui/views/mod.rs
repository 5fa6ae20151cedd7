//! Application views (screens).

mod cities;
mod help;
mod login;

pub use cities::{CitiesAction, CitiesView};
pub use help::{HelpAction, HelpView};
pub use login::render_login_required;
