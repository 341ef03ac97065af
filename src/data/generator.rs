use fastrand::Rng;

use crate::core::{
    device::{Device, Level},
    parameters::Parameters,
};

/// Generate a random device population.
#[must_use]
pub fn generate_devices(parameters: &Parameters, rng: &mut Rng) -> Vec<Device> {
    (0..parameters.n_devices).map(|id| generate_device(id, parameters, rng)).collect()
}

fn generate_device(id: usize, parameters: &Parameters, rng: &mut Rng) -> Device {
    let overall_capacity = uniform(rng, 0.5, 1.0);
    let mut series = || (0..parameters.n_time_slots).map(|_| uniform(rng, 0.0, 0.5)).collect();
    let current_storage = series();
    let demands = series();
    let produce = series();
    let charge_levels = generate_levels(parameters.n_charge_levels, rng);
    let discharge_levels = generate_levels(parameters.n_discharge_levels, rng);
    let agreement_price = uniform(rng, 0.0, 0.5);
    Device {
        id,
        overall_capacity,
        agreement_price,
        current_storage,
        demands,
        produce,
        charge_levels,
        discharge_levels,
    }
}

/// Levels with random rates, each costing a tenth of its rate.
fn generate_levels(n_levels: usize, rng: &mut Rng) -> Vec<Level> {
    (0..n_levels)
        .map(|_| {
            let speed = rng.f64();
            Level::new(speed, speed / 10.0)
        })
        .collect()
}

/// Draw from `[low, high)`.
fn uniform(rng: &mut Rng, low: f64, high: f64) -> f64 {
    low + (high - low) * rng.f64()
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::core::{station::Station, validation::validate};

    fn parameters() -> Parameters {
        Parameters::builder()
            .n_devices(7)
            .n_time_slots(12)
            .n_charge_levels(3)
            .n_discharge_levels(4)
            .build()
    }

    #[test]
    fn test_generated_population_is_valid() {
        let parameters = parameters();
        let devices = generate_devices(&parameters, &mut Rng::with_seed(1));
        let station = Station::builder().price(vec![0.5; 12]).build();
        assert_eq!(devices.len(), 7);
        assert_eq!(validate(&devices, &station, &parameters), Ok(()));
    }

    #[test]
    fn test_generated_ranges() {
        for device in generate_devices(&parameters(), &mut Rng::with_seed(2)) {
            assert!((0.5..1.0).contains(&device.overall_capacity));
            assert!((0.0..0.5).contains(&device.agreement_price));
            for series in [&device.current_storage, &device.demands, &device.produce] {
                assert!(series.iter().all(|value| (0.0..0.5).contains(value)));
            }
            assert_eq!(device.charge_levels.len(), 3);
            assert_eq!(device.discharge_levels.len(), 4);
            for level in device.charge_levels.iter().chain(&device.discharge_levels) {
                assert!((0.0..1.0).contains(&level.speed));
                assert_abs_diff_eq!(level.cost, level.speed / 10.0);
            }
        }
    }

    #[test]
    fn test_same_seed_same_population() {
        let parameters = parameters();
        assert_eq!(
            generate_devices(&parameters, &mut Rng::with_seed(3)),
            generate_devices(&parameters, &mut Rng::with_seed(3)),
        );
    }
}
