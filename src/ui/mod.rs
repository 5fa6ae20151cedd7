//! User interface components and views.
//!
//! All TUI rendering lives here: the cities screen, the help overlay, the
//! login-required notice and the widgets they share.

mod components;
pub mod theme;
mod views;

pub use components::{render_context_help, NotificationManager};
pub use views::{render_login_required, CitiesAction, CitiesView, HelpAction, HelpView};
