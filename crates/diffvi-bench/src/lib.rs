//! Benchmark profiles for the diffvi workspace.
//!
//! - [`reference_profile`]: a short evaluation sweep over the micro MRPs
//!   with every algorithm family, small enough to run per iteration.
//! - [`control_profile`]: DVI and RVI control on the GARET presets.

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use diffvi_core::Precision;
use diffvi_envs::{GARET1, GARET2, GARET3, GARET_100};
use diffvi_sweep::{BetaSweep, EnvironmentSource, ScheduleRange, SweepConfig};

/// Evaluation sweep: 3 MRPs × (2 DVI + 2 MDVI + 1 RVI) × 3 step sizes,
/// 500 rounds max.
pub fn reference_profile(precision: Precision) -> SweepConfig {
    let betas = BetaSweep {
        betas: ScheduleRange {
            minimum: 0.01,
            maximum: 0.1,
            count: 2,
        },
        initial_r_bar: 0.0,
    };
    SweepConfig {
        max_iters: 500,
        step_sizes: ScheduleRange {
            minimum: 0.01,
            maximum: 1.0,
            count: 3,
        },
        precision,
        dvi: Some(betas),
        mdvi: Some(betas),
        rvi: Some(0),
        ..SweepConfig::default()
    }
}

/// Control sweep over every GARET preset, 200 rounds max.
pub fn control_profile(precision: Precision) -> SweepConfig {
    SweepConfig {
        max_iters: 200,
        step_sizes: ScheduleRange {
            minimum: 0.1,
            maximum: 1.0,
            count: 2,
        },
        precision,
        dvi: Some(BetaSweep {
            betas: ScheduleRange {
                minimum: 0.1,
                maximum: 0.1,
                count: 1,
            },
            initial_r_bar: 0.0,
        }),
        mdvi: None,
        rvi: Some(0),
        environments: [GARET1, GARET2, GARET3, GARET_100]
            .into_iter()
            .map(EnvironmentSource::Garet)
            .collect(),
        ..SweepConfig::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profiles_validate() {
        for precision in [Precision::F32, Precision::F64] {
            reference_profile(precision).validate().unwrap();
            control_profile(precision).validate().unwrap();
        }
        assert_eq!(reference_profile(Precision::F32).algorithms().len(), 5);
    }
}
