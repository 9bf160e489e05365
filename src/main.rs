//! Team Board Frontend Entry Point

mod animate;
mod counter;
mod dom;
mod filter;
mod models;
mod reconcile;
mod sched;
mod tree;

#[cfg(target_arch = "wasm32")]
mod app;
#[cfg(target_arch = "wasm32")]
mod browser;
#[cfg(target_arch = "wasm32")]
mod logging;
#[cfg(target_arch = "wasm32")]
mod state;

#[cfg(target_arch = "wasm32")]
fn main() {
    console_error_panic_hook::set_once();
    app::Application::mount().run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    eprintln!("teamboard targets wasm32-unknown-unknown; build it with trunk");
}
