//! fxnode - play a tone through two hosted effect units
//!
//! Run with: cargo run --bin fxnode

mod app;
mod ui;

use app::FxNode;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    FxNode::new()
        .frequency(110.0)
        .cutoff(900.0)
        .delay_ms(330.0)
        .run()
}
