// dockspace: a panel layout tree for docking workspaces.

pub mod config;
pub mod panel;
pub mod template;
