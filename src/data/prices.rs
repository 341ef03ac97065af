use std::path::Path;

use calamine::{Data, Reader, Xlsx, open_workbook};
use chrono::{NaiveTime, Timelike};
use fastrand::Rng;

use crate::prelude::*;

/// Spreadsheet column holding the hourly price.
const PRICE_COLUMN: u32 = 2;

/// The spreadsheet prices are per megawatt-hour.
const PRICE_DIVISOR: f64 = 1000.0;

/// Wall-clock length of a time slot.
const SLOT_MINUTES: usize = 15;

/// Price curve for the slots starting at the given wall-clock time.
///
/// Falls back to random prices when the spreadsheet cannot be read.
#[instrument(skip_all, fields(path = %path.display(), %start, n_slots))]
pub fn load_price_curve(
    path: &Path,
    start: NaiveTime,
    n_slots: usize,
    rng: &mut Rng,
) -> Vec<f64> {
    match read_hourly_prices(path) {
        Ok(hourly_prices) => {
            info!("loaded hourly prices");
            hourly_price_curve(&hourly_prices, start, n_slots, SLOT_MINUTES)
        }
        Err(error) => {
            warn!("failed to read the price spreadsheet, falling back to random prices: {error:#}");
            (0..n_slots).map(|_| rng.f64()).collect()
        }
    }
}

/// Read the 24 hourly prices from the first worksheet.
///
/// Row `h + 1` holds the price for hour `h`, the first row being the header.
/// Missing or non-numeric cells are read as zero.
fn read_hourly_prices(path: &Path) -> Result<Vec<f64>> {
    let mut workbook: Xlsx<_> = open_workbook(path).context("failed to open the workbook")?;
    let range = workbook
        .worksheet_range_at(0)
        .context("the workbook has no worksheets")?
        .context("failed to read the first worksheet")?;
    Ok((1..=24)
        .map(|row| {
            range
                .get_value((row, PRICE_COLUMN))
                .and_then(numeric_value)
                .map_or(0.0, |price| price / PRICE_DIVISOR)
        })
        .collect())
}

#[expect(clippy::cast_precision_loss)]
const fn numeric_value(cell: &Data) -> Option<f64> {
    match cell {
        Data::Float(value) => Some(*value),
        Data::Int(value) => Some(*value as f64),
        _ => None,
    }
}

/// Map the hourly prices onto consecutive slots starting at the given time.
///
/// Slots that roll over midnight wrap around to the early hours.
#[must_use]
pub fn hourly_price_curve(
    hourly_prices: &[f64],
    start: NaiveTime,
    n_slots: usize,
    slot_minutes: usize,
) -> Vec<f64> {
    let start_minutes = (start.hour() * 60 + start.minute()) as usize;
    (0..n_slots)
        .map(|slot| {
            let hour = ((start_minutes + slot * slot_minutes) / 60) % 24;
            hourly_prices.get(hour).copied().unwrap_or(0.0)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hourly_prices() -> Vec<f64> {
        (0..24).map(f64::from).collect()
    }

    #[test]
    fn test_curve_within_the_hour() {
        let start = NaiveTime::from_hms_opt(13, 0, 0).unwrap();
        assert_eq!(hourly_price_curve(&hourly_prices(), start, 4, 15), [13.0, 13.0, 13.0, 13.0]);
    }

    #[test]
    fn test_curve_rolls_over_the_hour() {
        let start = NaiveTime::from_hms_opt(13, 45, 0).unwrap();
        assert_eq!(hourly_price_curve(&hourly_prices(), start, 3, 15), [13.0, 14.0, 14.0]);
    }

    #[test]
    fn test_curve_wraps_around_midnight() {
        let start = NaiveTime::from_hms_opt(23, 30, 0).unwrap();
        assert_eq!(hourly_price_curve(&hourly_prices(), start, 3, 15), [23.0, 23.0, 0.0]);
    }

    #[test]
    fn test_missing_hours_are_free() {
        let start = NaiveTime::from_hms_opt(1, 0, 0).unwrap();
        assert_eq!(hourly_price_curve(&[5.0], start, 2, 60), [0.0, 0.0]);
    }

    #[test]
    fn test_missing_workbook_falls_back_to_random_prices() {
        let start = NaiveTime::from_hms_opt(0, 0, 0).unwrap();
        let prices = load_price_curve(
            Path::new("definitely-missing-prices.xlsx"),
            start,
            8,
            &mut Rng::with_seed(1),
        );
        assert_eq!(prices.len(), 8);
        assert!(prices.iter().all(|price| (0.0..1.0).contains(price)));
    }
}
