pub mod board_state;
pub mod browser;
pub mod preview;
pub mod upload;

/// Prefix for every request the widget makes. Empty means same origin.
pub const API_ROOT: &'static str = match option_env!("API_ROOT") {
    Some(api_root) => api_root,
    None => "",
};
