//! Probe a file and decode every frame, printing what was found.
//!
//! ```text
//! cargo run --example probe -- animation.gif
//! RUST_LOG=debug cargo run --example probe -- animation.gif
//! ```

use pictor::Registry;
use pictor_io::FileIo;
use tracing_subscriber::EnvFilter;

fn main() -> pictor::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let Some(path) = std::env::args().nth(1) else {
        eprintln!("usage: probe <image-file>");
        std::process::exit(2);
    };

    let registry = Registry::load();

    let (header, codec) = registry.probe(FileIo::open(&path)?)?;
    let info = registry.info(codec);
    println!(
        "{path}: {} ({}), {}x{}, {}",
        info.name, info.description, header.width, header.height, header.pixel_format
    );

    let mut session = registry.start_reading(FileIo::open(&path)?, Some(codec), None)?;
    let mut frames = 0u32;
    while let Some(frame) = session.next_frame()? {
        frames += 1;
        let animated = if frame.animated {
            format!(", {} ms", frame.delay_ms)
        } else {
            String::new()
        };
        println!(
            "  frame {frames}: {} bytes, {} pass(es){animated}",
            frame.pixels.len(),
            frame.passes
        );

        for entry in &frame.meta_data {
            match entry.key_unknown() {
                Some(key) => println!("  meta {key}: {} bytes", entry.value_data().map_or(0, <[u8]>::len)),
                None => println!("  meta {}: {:?}", entry.key(), entry.value_string().unwrap_or("")),
            }
        }
    }
    session.finish()?;

    println!("{frames} frame(s) decoded");
    Ok(())
}
