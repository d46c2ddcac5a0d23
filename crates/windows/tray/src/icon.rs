//! Tray icons, drawn at startup instead of decoded from embedded files.

use anyhow::{Context, Result};
use glpi_monitor_core::aggregator::IconVariant;
use glpi_monitor_core::status::Color;

const SIZE: u32 = 32;

pub fn load(variant: IconVariant) -> Result<tray_icon::Icon> {
    let color = match variant {
        IconVariant::Healthy => Color::GREEN,
        IconVariant::Error => Color::RED,
    };
    tray_icon::Icon::from_rgba(disc_rgba(SIZE, color), SIZE, SIZE)
        .with_context(|| format!("creating {variant:?} tray icon"))
}

/// RGBA pixels of a filled disc on a transparent square, with a one-pixel
/// white ring so it stays visible on dark and light taskbars.
fn disc_rgba(size: u32, color: Color) -> Vec<u8> {
    let mut rgba = Vec::with_capacity((size * size * 4) as usize);
    let center = (size as f32 - 1.0) / 2.0;
    let outer = size as f32 / 2.0;
    let inner = outer - 1.5;

    for y in 0..size {
        for x in 0..size {
            let dx = x as f32 - center;
            let dy = y as f32 - center;
            let d = (dx * dx + dy * dy).sqrt();
            let px = if d <= inner {
                [color.r, color.g, color.b, 0xff]
            } else if d <= outer {
                [0xff, 0xff, 0xff, 0xff]
            } else {
                [0, 0, 0, 0]
            };
            rgba.extend_from_slice(&px);
        }
    }
    rgba
}
