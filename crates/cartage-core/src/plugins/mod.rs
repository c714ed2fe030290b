//! Plug-ins shipped with cartage.
//!
//! - [`BuildTarball`]: writes the final package tarball (`build_package`)
//! - [`VendorCommand`]: runs a configured vendoring command in the work area
//!   (`vendor_dependencies`)

mod build_tarball;
mod vendor_command;

pub use build_tarball::BuildTarball;
pub use vendor_command::{VendorCommand, VendorCommandSettings};
