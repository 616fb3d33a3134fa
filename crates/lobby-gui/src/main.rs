mod app;
mod settings;

use tracing_subscriber::EnvFilter;

fn main() {
    // Log to stderr; RUST_LOG overrides the default filter.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    dioxus::LaunchBuilder::new()
        .with_cfg(
            dioxus::desktop::Config::new()
                .with_window(
                    dioxus::desktop::tao::window::WindowBuilder::new()
                        .with_title("Play by Cloud"),
                )
                .with_menu(None),
        )
        .launch(app::App);
}
