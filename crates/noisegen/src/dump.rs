// SPDX-License-Identifier: LGPL-3.0-or-later

//! Key-value state introspection.
//!
//! Objects implement [`Dump`] and describe themselves to a [`StateDumper`]
//! as a tree of named scalars, objects and arrays. The dumper decides what
//! to do with it; [`KeyValueDumper`] flattens the tree into dotted keys
//! such as `units.0.config.color`.

use noisegen_dsp::ctl::bypass::Bypass;
use noisegen_dsp::filters::butterworth::ButterworthFilter;
use noisegen_dsp::filters::spectral_tilt::SpectralTilt;
use noisegen_dsp::noise::generator::NoiseGenerator;
use noisegen_dsp::noise::mls::Mls;
use noisegen_dsp::noise::velvet::Velvet;

/// Visitor receiving an object's state.
pub trait StateDumper {
    fn write_bool(&mut self, name: &str, value: bool);
    fn write_f32(&mut self, name: &str, value: f32);
    fn write_u64(&mut self, name: &str, value: u64);
    fn write_str(&mut self, name: &str, value: &str);

    fn begin_object(&mut self, name: &str);
    fn end_object(&mut self);

    /// Elements follow as objects named by their index.
    fn begin_array(&mut self, name: &str, len: usize);
    fn end_array(&mut self);

    fn write_usize(&mut self, name: &str, value: usize) {
        self.write_u64(name, value as u64);
    }

    fn write_u32(&mut self, name: &str, value: u32) {
        self.write_u64(name, u64::from(value));
    }

    /// Write `value` as a nested object.
    fn write_object(&mut self, name: &str, value: &dyn Dump)
    where
        Self: Sized,
    {
        self.begin_object(name);
        value.dump(self);
        self.end_object();
    }
}

/// Something that can describe its state to a [`StateDumper`].
pub trait Dump {
    fn dump(&self, v: &mut dyn StateDumper);
}

/// Write `value` as a nested object through a trait object.
pub fn write_object(v: &mut dyn StateDumper, name: &str, value: &dyn Dump) {
    v.begin_object(name);
    value.dump(v);
    v.end_object();
}

/// Write `items` as an array of objects.
pub fn write_array<T: Dump>(v: &mut dyn StateDumper, name: &str, items: &[T]) {
    v.begin_array(name, items.len());
    for (i, item) in items.iter().enumerate() {
        write_object(v, &i.to_string(), item);
    }
    v.end_array();
}

/// Dumped scalar.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    F32(f32),
    U64(u64),
    Str(String),
}

/// Flattens a dump into `(dotted.key, value)` entries in visiting order.
#[derive(Debug, Default)]
pub struct KeyValueDumper {
    path: Vec<String>,
    entries: Vec<(String, Value)>,
}

impl KeyValueDumper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dump `root` into a fresh dumper.
    pub fn collect(root: &dyn Dump) -> Self {
        let mut dumper = Self::new();
        root.dump(&mut dumper);
        dumper
    }

    pub fn entries(&self) -> &[(String, Value)] {
        &self.entries
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, value)| value)
    }

    fn key(&self, name: &str) -> String {
        if self.path.is_empty() {
            name.to_string()
        } else {
            format!("{}.{}", self.path.join("."), name)
        }
    }

    fn push(&mut self, name: &str, value: Value) {
        let key = self.key(name);
        self.entries.push((key, value));
    }
}

impl StateDumper for KeyValueDumper {
    fn write_bool(&mut self, name: &str, value: bool) {
        self.push(name, Value::Bool(value));
    }

    fn write_f32(&mut self, name: &str, value: f32) {
        self.push(name, Value::F32(value));
    }

    fn write_u64(&mut self, name: &str, value: u64) {
        self.push(name, Value::U64(value));
    }

    fn write_str(&mut self, name: &str, value: &str) {
        self.push(name, Value::Str(value.to_string()));
    }

    fn begin_object(&mut self, name: &str) {
        self.path.push(name.to_string());
    }

    fn end_object(&mut self) {
        self.path.pop();
    }

    fn begin_array(&mut self, name: &str, len: usize) {
        self.write_usize(&format!("{name}.len"), len);
        self.path.push(name.to_string());
    }

    fn end_array(&mut self) {
        self.path.pop();
    }
}

impl Dump for Mls {
    fn dump(&self, v: &mut dyn StateDumper) {
        v.write_usize("n_bits", self.n_bits());
        v.write_u64("state", self.state());
        v.write_u64("period", self.period());
    }
}

impl Dump for Velvet {
    fn dump(&self, v: &mut dyn StateDumper) {
        v.write_str("type", self.velvet_type().name());
        v.write_f32("window_width", self.window_width());
        v.write_f32("arn_delta", self.delta());
        v.write_bool("crush", self.crush());
        v.write_f32("crush_probability", self.crush_probability());
    }
}

impl Dump for SpectralTilt {
    fn dump(&self, v: &mut dyn StateDumper) {
        v.write_f32("sample_rate", self.sample_rate());
        v.write_usize("order", self.order());
        v.write_f32("slope", self.slope());
        v.write_str("slope_unit", self.slope_unit().name());
        v.write_usize("active_sections", self.active_sections());
        v.write_bool("needs_update", self.needs_update());
    }
}

impl Dump for ButterworthFilter {
    fn dump(&self, v: &mut dyn StateDumper) {
        v.write_str("type", self.filter_type().name());
        v.write_f32("sample_rate", self.sample_rate());
        v.write_f32("cutoff", self.cutoff());
        v.write_usize("order", self.order());
        v.write_usize("sections", self.sections());
    }
}

impl Dump for NoiseGenerator {
    fn dump(&self, v: &mut dyn StateDumper) {
        v.write_str("generator", self.generator().name());
        v.write_str("color", self.noise_color().name());
        v.write_f32("sample_rate", self.sample_rate());
        v.write_f32("amplitude", self.amplitude());
        v.write_f32("offset", self.offset());
        v.write_str("lcg_distribution", self.lcg_distribution().name());
        let (slope, unit) = self.color_slope();
        v.write_f32("color_slope", slope);
        v.write_str("color_slope_unit", unit.name());
        v.write_bool("needs_update", self.needs_update());
        write_object(v, "mls", self.mls());
        write_object(v, "velvet", self.velvet());
        write_object(v, "color_filter", self.color_filter());
    }
}

impl Dump for Bypass {
    fn dump(&self, v: &mut dyn StateDumper) {
        v.write_bool("bypassing", self.bypassing());
        v.write_bool("on", self.is_on());
        v.write_bool("off", self.is_off());
        v.write_f32("wet_gain", self.wet_gain());
    }
}
