mod executable;
mod paths;
mod target;

pub use executable::current_executable;
pub use paths::{AppPaths, AppPathsError};
pub use target::{ASSET_PREFIX, asset_name, asset_name_for, target_arch, target_os};
