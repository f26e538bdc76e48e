pub mod desktop;
#[cfg(test)]
pub(crate) mod testing;

pub use desktop::{default_desktop, wait_for_window, Desktop, SharedDesktop, XdotoolDesktop};
