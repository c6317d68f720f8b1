// SPDX-License-Identifier: LGPL-3.0-or-later

//! Generator unit: one colored noise source plus its inaudibility path.
//!
//! A unit keeps two copies of its raw controls. [`GeneratorUnit::stage`]
//! records new values and accumulates the changed groups; the next
//! [`GeneratorUnit::commit`] evolves the converted configuration and pushes
//! only those groups into the DSP objects. Audio produced between the two
//! calls still uses the committed configuration.

use noisegen_dsp::dsp::ops;
use noisegen_dsp::filters::butterworth::ButterworthFilter;
use noisegen_dsp::noise::generator::{NoiseGenerator, NoiseGeneratorType};
use noisegen_dsp::noise::mls::Mls;

use crate::dump::{self, Dump, StateDumper};
use crate::meta::{Algorithm, InaudibleProfile, COLOR_FILTER_ORDER};
use crate::params::{self, Changes, GeneratorConfig, GeneratorControls};
use crate::seed::{self, SeedSource};

/// One independent noise source.
#[derive(Debug, Clone)]
pub struct GeneratorUnit {
    generator: NoiseGenerator,
    /// Filter moving the noise out of the audible band.
    stop: ButterworthFilter,
    profile: InaudibleProfile,

    config: GeneratorConfig,
    /// Raw values seen by the last `stage`.
    staged: GeneratorControls,
    /// Groups changed since the last commit.
    pending: Changes,
    /// Inaudible state that the next commit installs.
    staged_inaudible: bool,

    inaudible: bool,
    force_audible: bool,
    active: bool,
    level: f32,
}

impl GeneratorUnit {
    /// Create a unit drawing its seeds from `seeds`.
    pub fn new(profile: InaudibleProfile, seeds: &mut dyn SeedSource) -> Self {
        let mut generator = NoiseGenerator::new();
        generator.init_with_seeds(
            Mls::maximum_number_of_bits(),
            seeds.next_seed(),
            seed::fold_u32(seeds.next_seed()),
            seed::fold_u32(seeds.next_seed()),
            Mls::maximum_number_of_bits(),
            seeds.next_seed(),
        );
        generator.set_coloring_order(COLOR_FILTER_ORDER);

        let mut stop = ButterworthFilter::new();
        stop.set_filter_type(profile.kind)
            .set_order(profile.order)
            .set_cutoff(profile.cutoff);

        let mut unit = Self {
            generator,
            stop,
            profile,
            config: GeneratorConfig::default(),
            staged: GeneratorControls::default(),
            pending: Changes::ALL,
            staged_inaudible: false,
            inaudible: false,
            force_audible: false,
            active: true,
            level: 0.0,
        };
        unit.commit();
        unit
    }

    /// Change the sample rate, re-evaluate inaudible feasibility and commit
    /// whatever is pending.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.generator.set_sample_rate(sample_rate);
        self.stop.set_sample_rate(sample_rate);
        self.stop.update();
        self.stop.clear();

        let force_audible = !self.profile.is_feasible(sample_rate);
        if force_audible != self.force_audible {
            log::debug!(
                "inaudible path {} at {sample_rate} Hz (cutoff {} Hz)",
                if force_audible { "disabled" } else { "available" },
                self.profile.cutoff
            );
            self.force_audible = force_audible;
        }
        self.stage_inaudible(self.staged.inaudible);
        self.commit();
        self.generator.update();
    }

    /// Record new raw controls without touching the DSP state.
    pub fn stage(&mut self, raw: &GeneratorControls) {
        self.pending |= params::detect(&self.staged, raw);
        self.staged = *raw;
        self.stage_inaudible(raw.inaudible);
    }

    fn stage_inaudible(&mut self, requested: bool) {
        let inaudible = requested && !self.force_audible;
        if inaudible != self.staged_inaudible {
            // Color is forced to white while inaudible and restored after.
            self.pending |= Changes::COLOR | Changes::COLOR_SLOPE;
            self.staged_inaudible = inaudible;
        }
    }

    /// Apply the staged changes. Returns `false` when nothing was pending.
    pub fn commit(&mut self) -> bool {
        if self.pending.is_empty() {
            return false;
        }

        let changes = self.pending;
        self.config = self
            .config
            .evolve(&self.staged, changes, self.staged_inaudible);
        self.apply(changes);

        if self.staged_inaudible && !self.inaudible {
            self.stop.clear();
        }
        self.inaudible = self.staged_inaudible;
        self.pending = Changes::NONE;

        log::trace!("committed generator changes {:#06x}", changes.bits());
        true
    }

    /// Stage and commit in one step.
    pub fn update(&mut self, raw: &GeneratorControls) -> bool {
        self.stage(raw);
        self.commit()
    }

    fn apply(&mut self, changes: Changes) {
        let cfg = &self.config;
        let g = &mut self.generator;

        if changes.intersects(Changes::LCG_DIST) {
            g.set_lcg_distribution(cfg.distribution);
        }

        if changes.intersects(Changes::VELVET_TYPE) {
            g.set_velvet_type(cfg.velvet_type);
        }
        if changes.intersects(Changes::VELVET_WINDOW) {
            g.set_velvet_window_width(cfg.velvet_window);
        }
        if changes.intersects(Changes::VELVET_ARN_DELTA) {
            g.set_velvet_arn_delta(cfg.velvet_arn_delta);
        }
        if changes.intersects(Changes::VELVET_CRUSH) {
            g.set_velvet_crush(cfg.velvet_crush);
        }
        if changes.intersects(Changes::VELVET_CRUSH_PROB) {
            g.set_velvet_crushing_probability(cfg.velvet_crush_probability);
        }

        if changes.intersects(Changes::COLOR | Changes::COLOR_SLOPE) {
            g.set_noise_color(cfg.color);
            g.set_color_slope(cfg.slope, cfg.slope_unit);
        }

        if changes.intersects(Changes::NOISE_TYPE) {
            match cfg.algorithm {
                Algorithm::Off => {}
                Algorithm::Mls => g.set_generator(NoiseGeneratorType::Mls),
                Algorithm::Lcg => g.set_generator(NoiseGeneratorType::Lcg),
                Algorithm::Velvet => g.set_generator(NoiseGeneratorType::Velvet),
            }
        }

        if changes.intersects(Changes::AMPLITUDE) {
            g.set_amplitude(cfg.amplitude);
        }
        if changes.intersects(Changes::OFFSET) {
            g.set_offset(cfg.offset);
        }

        g.update();
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Write `dst.len()` samples of noise. Inactive units and the `Off`
    /// algorithm produce silence.
    pub fn process(&mut self, dst: &mut [f32]) {
        if !self.active || self.config.algorithm == Algorithm::Off {
            dst.fill(0.0);
            self.level = 0.0;
            return;
        }

        self.generator.process_overwrite(dst);
        if self.inaudible {
            ops::scale(dst, self.profile.attenuation);
            self.stop.process_inplace(dst);
        }
        self.level = ops::abs_max(dst);
    }

    /// Magnitude response at each of `freqs`, written to `dst`.
    pub fn freq_chart(&self, freqs: &[f32], dst: &mut [f32]) {
        let n = freqs.len().min(dst.len());
        let (freqs, dst) = (&freqs[..n], &mut dst[..n]);

        if self.config.algorithm == Algorithm::Off {
            dst.fill(0.0);
            return;
        }

        self.generator.freq_chart(freqs, dst);
        if self.inaudible {
            ops::scale(dst, self.profile.attenuation);
            self.stop.freq_chart(freqs, dst);
        }
    }

    pub fn reset_level(&mut self) {
        self.level = 0.0;
    }

    /// Peak of the last processed block.
    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Whether the inaudibility path is engaged.
    pub fn is_inaudible(&self) -> bool {
        self.inaudible
    }

    /// Whether the sample rate rules out inaudible operation.
    pub fn is_force_audible(&self) -> bool {
        self.force_audible
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn staged(&self) -> &GeneratorControls {
        &self.staged
    }

    pub fn generator(&self) -> &NoiseGenerator {
        &self.generator
    }

    pub fn stop_filter(&self) -> &ButterworthFilter {
        &self.stop
    }

    pub fn profile(&self) -> &InaudibleProfile {
        &self.profile
    }
}

impl Dump for GeneratorControls {
    fn dump(&self, v: &mut dyn StateDumper) {
        v.write_u32("algorithm", self.algorithm);
        v.write_u32("distribution", self.distribution);
        v.write_u32("velvet_type", self.velvet_type);
        v.write_f32("velvet_window", self.velvet_window);
        v.write_f32("velvet_arn_delta", self.velvet_arn_delta);
        v.write_bool("velvet_crush", self.velvet_crush);
        v.write_f32("velvet_crush_probability", self.velvet_crush_probability);
        v.write_u32("color", self.color);
        v.write_f32("slope_npn", self.slope_npn);
        v.write_f32("slope_dbo", self.slope_dbo);
        v.write_f32("slope_dbd", self.slope_dbd);
        v.write_f32("amplitude", self.amplitude);
        v.write_f32("offset", self.offset);
        v.write_bool("inaudible", self.inaudible);
        v.write_bool("solo", self.solo);
        v.write_bool("mute", self.mute);
    }
}

impl Dump for GeneratorConfig {
    fn dump(&self, v: &mut dyn StateDumper) {
        v.write_str("algorithm", self.algorithm.name());
        v.write_str("distribution", self.distribution.name());
        v.write_str("velvet_type", self.velvet_type.name());
        v.write_f32("velvet_window", self.velvet_window);
        v.write_f32("velvet_arn_delta", self.velvet_arn_delta);
        v.write_bool("velvet_crush", self.velvet_crush);
        v.write_f32("velvet_crush_probability", self.velvet_crush_probability);
        v.write_u32("selector", self.selector.into());
        v.write_str("color", self.color.name());
        v.write_f32("slope", self.slope);
        v.write_str("slope_unit", self.slope_unit.name());
        v.write_f32("amplitude", self.amplitude);
        v.write_f32("offset", self.offset);
    }
}

impl Dump for GeneratorUnit {
    fn dump(&self, v: &mut dyn StateDumper) {
        v.write_bool("active", self.active);
        v.write_bool("inaudible", self.inaudible);
        v.write_bool("force_audible", self.force_audible);
        v.write_u32("pending", u32::from(self.pending.bits()));
        v.write_f32("level", self.level);
        dump::write_object(v, "staged", &self.staged);
        dump::write_object(v, "config", &self.config);
        dump::write_object(v, "generator", &self.generator);
        dump::write_object(v, "stop", &self.stop);
    }
}
