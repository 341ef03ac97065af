use comfy_table::{Attribute, Cell, CellAlignment, Color, Table, modifiers, presets};

use crate::core::{
    decision::{Decision, Direction},
    market::Market,
    report::Report,
    station::Station,
};

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .apply_modifier(modifiers::UTF8_ROUND_CORNERS)
        .enforce_styling();
    table
}

const fn direction_glyph(direction: Direction) -> char {
    match direction {
        Direction::Charge => '▼',
        Direction::Idle => '·',
        Direction::Discharge => '▲',
    }
}

/// Energy moved in the given direction over the horizon.
fn energy(decision: &Decision, direction: Direction, slot_duration: f64) -> f64 {
    decision
        .slots
        .iter()
        .filter(|slot| slot.direction == direction)
        .map(|slot| slot.speed * slot_duration)
        .sum()
}

/// One row per device with its final plan.
pub fn build_decisions_table(report: &Report, slot_duration: f64) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Device", "Plan", "Active", "Charged", "Discharged", "Benefit"]);
    for (id, decision) in report.decisions.iter().enumerate() {
        let plan: String =
            decision.slots.iter().map(|slot| direction_glyph(slot.direction)).collect();
        table.add_row(vec![
            Cell::new(id).set_alignment(CellAlignment::Right),
            Cell::new(plan),
            Cell::new(decision.n_active_slots())
                .set_alignment(CellAlignment::Right)
                .add_attribute(Attribute::Dim),
            Cell::new(format!("{:.3}", energy(decision, Direction::Charge, slot_duration)))
                .set_alignment(CellAlignment::Right)
                .fg(Color::Green),
            Cell::new(format!("{:.3}", energy(decision, Direction::Discharge, slot_duration)))
                .set_alignment(CellAlignment::Right)
                .fg(Color::Red),
            Cell::new(format!("{:.4}", decision.benefit)).set_alignment(CellAlignment::Right).fg(
                if decision.benefit > 0.0 {
                    Color::Green
                } else if decision.benefit < 0.0 {
                    Color::Red
                } else {
                    Color::Reset
                },
            ),
        ]);
    }
    table
}

/// One row per time slot with the price and the aggregate station load.
pub fn build_slots_table(market: &Market<'_>, decisions: &[Decision]) -> Table {
    let station = market.station;
    let mut table = new_table();
    table.set_header(vec!["Slot", "Price", "Charge", "Discharge"]);
    for (slot, price) in station.price.iter().enumerate() {
        // Nobody's commitment is excluded:
        let load = |direction| Station::load_except(decisions, usize::MAX, slot, direction);
        let charge = load(Direction::Charge);
        let discharge = load(Direction::Discharge);
        table.add_row(vec![
            Cell::new(slot).set_alignment(CellAlignment::Right),
            Cell::new(format!("{price:.4}")).set_alignment(CellAlignment::Right).fg(
                if *price >= market.average_price { Color::Red } else { Color::Green },
            ),
            Cell::new(format!("{charge:.3} / {:.1}", station.max_charge))
                .set_alignment(CellAlignment::Right)
                .add_attribute(if charge > 0.0 { Attribute::Bold } else { Attribute::Dim }),
            Cell::new(format!("{discharge:.3} / {:.1}", station.max_discharge))
                .set_alignment(CellAlignment::Right)
                .add_attribute(if discharge > 0.0 { Attribute::Bold } else { Attribute::Dim }),
        ]);
    }
    table
}

pub fn build_summary_table(market: &Market<'_>, report: &Report) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Metric", "Value"]);
    table.add_row(vec![Cell::new("Benefit"), Cell::new(format!("{:.6}", report.benefit))]);
    table.add_row(vec![Cell::new("Revenue"), Cell::new(format!("{:.6}", report.revenue))]);
    table.add_row(vec![
        Cell::new("Average price"),
        Cell::new(format!("{:.4}", market.average_price)).add_attribute(Attribute::Dim),
    ]);
    table.add_row(vec![Cell::new("Commits"), Cell::new(report.n_commits)]);
    table.add_row(vec![Cell::new("Rounds"), Cell::new(report.n_rounds)]);
    table.add_row(vec![
        Cell::new("Outcome"),
        Cell::new(report.convergence).fg(if report.is_converged() {
            Color::Green
        } else {
            Color::DarkYellow
        }),
    ]);
    table.add_row(vec![
        Cell::new("Top device"),
        match report.top_device() {
            Some((id, decision)) => Cell::new(format!("#{id} ({:.4})", decision.benefit)),
            None => Cell::new("nobody").add_attribute(Attribute::Dim),
        },
    ]);
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{
        decision::Slot,
        device::{Device, Level},
        report::Convergence,
    };

    #[test]
    fn test_tables_render() {
        let station = Station::builder().price(vec![0.5, 1.5]).build();
        let market = Market::new(&station, 1.0);
        let device = Device {
            id: 0,
            overall_capacity: 1.0,
            agreement_price: 1.0,
            current_storage: vec![0.5; 2],
            demands: vec![0.0; 2],
            produce: vec![0.0; 2],
            charge_levels: vec![Level::new(0.5, 0.0)],
            discharge_levels: vec![Level::new(0.5, 0.0)],
        };
        let mut decision = Decision::idle(2);
        decision.slots[1] = Slot::active(Direction::Discharge, Level::new(0.5, 0.0));
        let report =
            Report::settle(&market, &[device], vec![decision], 1, 2, Convergence::Converged);

        let decisions = build_decisions_table(&report, 1.0).to_string();
        assert!(decisions.contains("·▲"));
        let slots = build_slots_table(&market, &report.decisions).to_string();
        assert!(slots.contains("0.500 / 1.0"));
        let summary = build_summary_table(&market, &report).to_string();
        assert!(summary.contains("converged"));
        assert!(summary.contains("#0"));
    }
}
