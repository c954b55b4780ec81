mod app;
mod audio;
mod config;
mod effects;
mod library;
mod logging;
mod playlists;
mod runtime;
mod sleep;
mod smart;
mod stats;
mod ui;

fn main() -> anyhow::Result<()> {
    runtime::run()
}
