use crate::core::{device::Device, parameters::Parameters, station::Station};

/// Malformed market input, rejected before the game starts.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum InvalidInput {
    #[error("the device population is empty")]
    NoDevices,

    #[error("the horizon has no time slots")]
    NoTimeSlots,

    #[error("device at position {position} has id {id}, expected ids to be 0..n in order")]
    UnexpectedId { position: usize, id: usize },

    #[error("device #{id}: `{field}` has {actual} values, expected {expected}")]
    DeviceLength { id: usize, field: &'static str, actual: usize, expected: usize },

    #[error("device #{id}: `{field}` must be finite and non-negative, got {value}")]
    DeviceValue { id: usize, field: &'static str, value: f64 },

    #[error("device #{id} has neither charge nor discharge levels")]
    NoLevels { id: usize },

    #[error("the station has {actual} prices, expected {expected}")]
    PriceLength { actual: usize, expected: usize },

    #[error("the station price at slot {slot} must be finite and non-negative, got {value}")]
    Price { slot: usize, value: f64 },

    #[error("the station `{field}` ceiling must be finite and non-negative, got {value}")]
    Ceiling { field: &'static str, value: f64 },

    #[error("the slot duration must be finite and positive, got {0}")]
    SlotDuration(f64),
}

pub fn validate(
    devices: &[Device],
    station: &Station,
    parameters: &Parameters,
) -> Result<(), InvalidInput> {
    let n_time_slots = parameters.n_time_slots;
    if n_time_slots == 0 {
        return Err(InvalidInput::NoTimeSlots);
    }
    if !(parameters.slot_duration.is_finite() && parameters.slot_duration > 0.0) {
        return Err(InvalidInput::SlotDuration(parameters.slot_duration));
    }
    if devices.is_empty() {
        return Err(InvalidInput::NoDevices);
    }

    if station.price.len() != n_time_slots {
        return Err(InvalidInput::PriceLength {
            actual: station.price.len(),
            expected: n_time_slots,
        });
    }
    if let Some((slot, value)) =
        station.price.iter().copied().enumerate().find(|(_, value)| !is_non_negative(*value))
    {
        return Err(InvalidInput::Price { slot, value });
    }
    for (field, value) in [("maxCharge", station.max_charge), ("maxDischarge", station.max_discharge)]
    {
        if !is_non_negative(value) {
            return Err(InvalidInput::Ceiling { field, value });
        }
    }

    for (position, device) in devices.iter().enumerate() {
        validate_device(position, device, n_time_slots)?;
    }
    Ok(())
}

fn validate_device(
    position: usize,
    device: &Device,
    n_time_slots: usize,
) -> Result<(), InvalidInput> {
    let id = device.id;
    if id != position {
        return Err(InvalidInput::UnexpectedId { position, id });
    }
    for (field, values) in [
        ("currentStorage", &device.current_storage),
        ("demands", &device.demands),
        ("produce", &device.produce),
    ] {
        if values.len() != n_time_slots {
            return Err(InvalidInput::DeviceLength {
                id,
                field,
                actual: values.len(),
                expected: n_time_slots,
            });
        }
        if let Some(value) = values.iter().copied().find(|value| !is_non_negative(*value)) {
            return Err(InvalidInput::DeviceValue { id, field, value });
        }
    }
    for (field, value) in
        [("overallCapacity", device.overall_capacity), ("agreementPrice", device.agreement_price)]
    {
        if !is_non_negative(value) {
            return Err(InvalidInput::DeviceValue { id, field, value });
        }
    }
    if device.n_levels() == 0 {
        return Err(InvalidInput::NoLevels { id });
    }
    let levels = device.charge_levels.iter().chain(&device.discharge_levels);
    for level in levels {
        if !is_non_negative(level.speed) {
            return Err(InvalidInput::DeviceValue { id, field: "speed", value: level.speed });
        }
        if !level.cost.is_finite() {
            return Err(InvalidInput::DeviceValue { id, field: "cost", value: level.cost });
        }
    }
    Ok(())
}

fn is_non_negative(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::device::Level;

    fn device(id: usize, n_time_slots: usize) -> Device {
        Device {
            id,
            overall_capacity: 1.0,
            agreement_price: 0.5,
            current_storage: vec![0.1; n_time_slots],
            demands: vec![0.1; n_time_slots],
            produce: vec![0.1; n_time_slots],
            charge_levels: vec![Level::new(0.5, 0.05)],
            discharge_levels: vec![Level::new(0.5, 0.05)],
        }
    }

    fn station(n_time_slots: usize) -> Station {
        Station::builder().price(vec![0.5; n_time_slots]).build()
    }

    fn parameters(n_time_slots: usize) -> Parameters {
        Parameters::builder().n_time_slots(n_time_slots).build()
    }

    #[test]
    fn test_valid_input() {
        let devices = [device(0, 3), device(1, 3)];
        assert_eq!(validate(&devices, &station(3), &parameters(3)), Ok(()));
    }

    #[test]
    fn test_no_devices() {
        assert_eq!(validate(&[], &station(3), &parameters(3)), Err(InvalidInput::NoDevices));
    }

    #[test]
    fn test_no_time_slots() {
        assert_eq!(
            validate(&[device(0, 0)], &station(0), &parameters(0)),
            Err(InvalidInput::NoTimeSlots),
        );
    }

    #[test]
    fn test_ids_out_of_order() {
        let devices = [device(1, 3), device(0, 3)];
        assert_eq!(
            validate(&devices, &station(3), &parameters(3)),
            Err(InvalidInput::UnexpectedId { position: 0, id: 1 }),
        );
    }

    #[test]
    fn test_demand_length_mismatch() {
        let mut device = device(0, 3);
        device.demands.pop();
        assert_eq!(
            validate(&[device], &station(3), &parameters(3)),
            Err(InvalidInput::DeviceLength { id: 0, field: "demands", actual: 2, expected: 3 }),
        );
    }

    #[test]
    fn test_negative_capacity() {
        let mut device = device(0, 3);
        device.overall_capacity = -1.0;
        assert_eq!(
            validate(&[device], &station(3), &parameters(3)),
            Err(InvalidInput::DeviceValue { id: 0, field: "overallCapacity", value: -1.0 }),
        );
    }

    #[test]
    fn test_price_length_mismatch() {
        assert_eq!(
            validate(&[device(0, 3)], &station(2), &parameters(3)),
            Err(InvalidInput::PriceLength { actual: 2, expected: 3 }),
        );
    }

    #[test]
    fn test_negative_ceiling() {
        let mut station = station(3);
        station.max_discharge = -0.5;
        assert_eq!(
            validate(&[device(0, 3)], &station, &parameters(3)),
            Err(InvalidInput::Ceiling { field: "maxDischarge", value: -0.5 }),
        );
    }

    #[test]
    fn test_no_levels() {
        let mut device = device(0, 3);
        device.charge_levels.clear();
        device.discharge_levels.clear();
        assert_eq!(
            validate(&[device], &station(3), &parameters(3)),
            Err(InvalidInput::NoLevels { id: 0 }),
        );
    }
}
