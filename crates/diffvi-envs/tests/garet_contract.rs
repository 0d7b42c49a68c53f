//! Generated and fixed environments survive a round trip through the
//! dynamic-rank process constructors.

use diffvi_core::{MarkovDecisionProcess, MarkovRewardProcess};
use diffvi_envs::{garet, micro, GaretParams, GARET1, GARET2, GARET3, GARET_100};

fn revalidate_mdp<T: diffvi_core::Element>(mdp: &MarkovDecisionProcess<T>) {
    let again = MarkovDecisionProcess::new(
        mdp.transitions().clone().into_dyn(),
        mdp.rewards().clone().into_dyn(),
        mdp.name(),
    )
    .unwrap();
    assert_eq!(&again, mdp);
}

#[test]
fn every_preset_revalidates_in_both_precisions() {
    for params in [GARET1, GARET2, GARET3, GARET_100] {
        revalidate_mdp(&garet::create::<f32>(&params).unwrap());
        revalidate_mdp(&garet::create::<f64>(&params).unwrap());
    }
}

#[test]
fn reseeded_presets_stay_valid() {
    for seed in 0..20 {
        let params: GaretParams = GARET3.with_seed(seed);
        revalidate_mdp(&garet::create::<f32>(&params).unwrap());
    }
}

#[test]
fn micro_processes_revalidate() {
    for mrp in [micro::mrp1::<f32>(), micro::mrp2(), micro::mrp3()] {
        let mrp = mrp.unwrap();
        let again = MarkovRewardProcess::new(
            mrp.transitions().clone().into_dyn(),
            mrp.rewards().clone().into_dyn(),
            mrp.name(),
        )
        .unwrap();
        assert_eq!(again, mrp);
    }
    revalidate_mdp(&micro::mdp1::<f64>().unwrap());
}
