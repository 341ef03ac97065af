use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path,
};

use serde::{Serialize, de::DeserializeOwned};

use crate::{
    core::{device::Device, report::Report},
    prelude::*,
};

#[instrument(skip_all, fields(path = %path.display()))]
pub fn read_devices(path: &Path) -> Result<Vec<Device>> {
    let devices: Vec<Device> = read_json(path)?;
    info!(n_devices = devices.len(), "read the devices");
    Ok(devices)
}

#[instrument(skip_all, fields(path = %path.display(), n_devices = devices.len()))]
pub fn write_devices(path: &Path, devices: &[Device]) -> Result {
    write_json(path, devices)?;
    info!("written the devices");
    Ok(())
}

#[instrument(skip_all, fields(path = %path.display()))]
pub fn write_report(path: &Path, report: &Report) -> Result {
    write_json(path, report)?;
    info!("written the report");
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).with_context(|| format!("failed to open `{}`", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("failed to deserialize `{}`", path.display()))
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result {
    let file =
        File::create(path).with_context(|| format!("failed to create `{}`", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)
        .with_context(|| format!("failed to serialize into `{}`", path.display()))?;
    writer.flush().with_context(|| format!("failed to flush `{}`", path.display()))
}
