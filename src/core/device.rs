use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// Discrete charging or discharging rate together with its cost fraction.
#[derive(Clone, Copy, Debug, PartialEq, derive_more::Constructor)]
pub struct Level {
    pub speed: f64,

    /// Fraction of the traded energy value lost to this rate.
    pub cost: f64,
}

/// Battery or prosumer taking part in the market.
///
/// Devices are immutable for the whole run: the game only ever produces decisions about them.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(try_from = "DeviceRecord", into = "DeviceRecord")]
pub struct Device {
    /// Position of the device in the population, `0..n_devices`.
    pub id: usize,

    /// Maximum energy the device can store.
    pub overall_capacity: f64,

    /// Price cap applied to the device's own discharging.
    pub agreement_price: f64,

    pub current_storage: Vec<f64>,
    pub demands: Vec<f64>,
    pub produce: Vec<f64>,

    pub charge_levels: Vec<Level>,
    pub discharge_levels: Vec<Level>,
}

impl Device {
    pub fn n_levels(&self) -> usize {
        self.discharge_levels.len() + self.charge_levels.len()
    }
}

/// Interchange shape of a [`Device`] with the level tables split into parallel lists.
#[derive(Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct DeviceRecord {
    id: usize,
    overall_capacity: f64,
    agreement_price: f64,
    current_storage: Vec<f64>,
    demands: Vec<f64>,
    produce: Vec<f64>,
    charge_speed: Vec<f64>,
    charge_cost: Vec<f64>,
    discharge_speed: Vec<f64>,
    discharge_cost: Vec<f64>,
}

impl TryFrom<DeviceRecord> for Device {
    type Error = String;

    fn try_from(record: DeviceRecord) -> Result<Self, Self::Error> {
        let charge_levels = zip_levels("charge", record.charge_speed, record.charge_cost)?;
        let discharge_levels =
            zip_levels("discharge", record.discharge_speed, record.discharge_cost)?;
        Ok(Self {
            id: record.id,
            overall_capacity: record.overall_capacity,
            agreement_price: record.agreement_price,
            current_storage: record.current_storage,
            demands: record.demands,
            produce: record.produce,
            charge_levels,
            discharge_levels,
        })
    }
}

impl From<Device> for DeviceRecord {
    fn from(device: Device) -> Self {
        let (charge_speed, charge_cost) =
            device.charge_levels.iter().map(|level| (level.speed, level.cost)).unzip();
        let (discharge_speed, discharge_cost) =
            device.discharge_levels.iter().map(|level| (level.speed, level.cost)).unzip();
        Self {
            id: device.id,
            overall_capacity: device.overall_capacity,
            agreement_price: device.agreement_price,
            current_storage: device.current_storage,
            demands: device.demands,
            produce: device.produce,
            charge_speed,
            charge_cost,
            discharge_speed,
            discharge_cost,
        }
    }
}

fn zip_levels(kind: &str, speeds: Vec<f64>, costs: Vec<f64>) -> Result<Vec<Level>, String> {
    if speeds.len() != costs.len() {
        return Err(format!(
            "{kind} level table has {} speeds but {} costs",
            speeds.len(),
            costs.len(),
        ));
    }
    Ok(speeds.into_iter().zip_eq(costs).map(|(speed, cost)| Level::new(speed, cost)).collect())
}
