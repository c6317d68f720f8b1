// SPDX-License-Identifier: LGPL-3.0-or-later

//! GStreamer noise generator plugin.
//!
//! Registers one element backed by the [`noisegen`] engine:
//!
//! | Element           | Description                                        |
//! |-------------------|----------------------------------------------------|
//! | `lsp-rs-noisegen` | Colored LCG/MLS/velvet noise mixed into each channel |

use gstreamer::glib;
use gstreamer::prelude::*;

mod base;
mod noise_generator;

glib::wrapper! {
    /// Public GLib type for the noise generator element.
    pub struct LspRsNoiseGen(ObjectSubclass<noise_generator::LspRsNoiseGen>)
        @extends gstreamer_audio::AudioFilter, gstreamer_base::BaseTransform,
                 gstreamer::Element, gstreamer::Object;
}

/// GStreamer plugin entry point.
fn plugin_init(plugin: &gstreamer::Plugin) -> Result<(), glib::BoolError> {
    gstreamer::Element::register(
        Some(plugin),
        "lsp-rs-noisegen",
        gstreamer::Rank::NONE,
        LspRsNoiseGen::static_type(),
    )?;
    Ok(())
}

gstreamer::plugin_define!(
    noisegen,
    env!("CARGO_PKG_DESCRIPTION"),
    plugin_init,
    concat!(env!("CARGO_PKG_VERSION")),
    "LGPL-3.0-or-later",
    env!("CARGO_PKG_NAME"),
    env!("CARGO_PKG_NAME"),
    env!("CARGO_PKG_REPOSITORY"),
    "2026-10-19"
);

/// Initialise GStreamer and register the plugin once per test binary.
#[cfg(test)]
pub(crate) fn test_init() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        gstreamer::init().expect("Failed to initialize GStreamer");
        plugin_register_static().expect("Failed to register noisegen plugin");
    });
}
