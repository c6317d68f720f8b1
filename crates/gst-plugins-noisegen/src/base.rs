// SPDX-License-Identifier: LGPL-3.0-or-later

//! Caps, pad templates and `ParamSpec` helpers for the element.

use gstreamer::glib;
use gstreamer::prelude::*;
use noisegen::meta::ControlRange;
use once_cell::sync::Lazy;

/// Interleaved f32 caps accepted on both pads.
pub static F32_INTERLEAVED_CAPS: Lazy<gstreamer::Caps> = Lazy::new(|| {
    gstreamer_audio::AudioCapsBuilder::new_interleaved()
        .format(gstreamer_audio::AUDIO_FORMAT_F32)
        .build()
});

/// Src and sink pad templates for an in-place f32 filter.
pub fn f32_pad_templates() -> Vec<gstreamer::PadTemplate> {
    let caps = &*F32_INTERLEAVED_CAPS;

    let src = gstreamer::PadTemplate::new(
        "src",
        gstreamer::PadDirection::Src,
        gstreamer::PadPresence::Always,
        caps,
    )
    .expect("failed to create src pad template");

    let sink = gstreamer::PadTemplate::new(
        "sink",
        gstreamer::PadDirection::Sink,
        gstreamer::PadPresence::Always,
        caps,
    )
    .expect("failed to create sink pad template");

    vec![src, sink]
}

/// Float property bounded by a control range.
pub fn float_spec(name: &str, nick: &str, blurb: &str, range: ControlRange) -> glib::ParamSpec {
    glib::ParamSpecFloat::builder(name)
        .nick(nick)
        .blurb(blurb)
        .minimum(range.min)
        .maximum(range.max)
        .default_value(range.dfl)
        .mutable_playing()
        .build()
}

/// Selector property taking values `0..=max`.
pub fn selector_spec(name: &str, nick: &str, blurb: &str, max: u32, default: u32) -> glib::ParamSpec {
    glib::ParamSpecUInt::builder(name)
        .nick(nick)
        .blurb(blurb)
        .minimum(0)
        .maximum(max)
        .default_value(default)
        .mutable_playing()
        .build()
}

pub fn switch_spec(name: &str, nick: &str, blurb: &str, default: bool) -> glib::ParamSpec {
    glib::ParamSpecBoolean::builder(name)
        .nick(nick)
        .blurb(blurb)
        .default_value(default)
        .mutable_playing()
        .build()
}
