//! Filesystem primitives shared across staging components.

pub mod copy;
pub mod link;

pub use copy::copy_tree;
pub use link::{link_dir, link_file, remove_path_if_exists, symlink_supported};
